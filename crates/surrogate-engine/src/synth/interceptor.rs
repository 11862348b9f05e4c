//! Access-interceptor bodies
//!
//! Every body has the same four steps:
//!
//! 1. prefix block, guarded by "prefix hook registered for this method";
//!    returns the hook's value if the hook sets its early-return flag
//! 2. delegation to the original implementation, bound to `returnValue`
//! 3. suffix block, same shape as the prefix block plus `returnValue`
//! 4. `return returnValue`
//!
//! Void-shaped methods go through the same steps, so a suffix hook may
//! still hand back a value for them.

use crate::body::{ArgumentRef, Body, Expr, HookPhase, Stmt};
use crate::descriptor::MethodDescriptor;
use crate::strategy::ProxyStrategy;

use super::{local_name, MethodBodySynthesizer, SynthesisContext};

/// Synthesizer for [`ProxyStrategy::AccessInterceptor`]
#[derive(Debug, Clone, Copy, Default)]
pub struct InterceptorSynthesizer;

/// Locals of one intercepted body
struct Locals {
    return_value: String,
    return_early: String,
    prefix_return_value: String,
    suffix_return_value: String,
}

impl Locals {
    fn for_method(method: &MethodDescriptor) -> Self {
        Self {
            return_value: local_name("returnValue", method),
            return_early: local_name("returnEarly", method),
            prefix_return_value: local_name("prefixReturnValue", method),
            suffix_return_value: local_name("suffixReturnValue", method),
        }
    }
}

impl InterceptorSynthesizer {
    fn hook_block(
        phase: HookPhase,
        storage: &str,
        method: &MethodDescriptor,
        arguments: &[ArgumentRef],
        locals: &Locals,
    ) -> Stmt {
        let (result, return_value) = match phase {
            HookPhase::Prefix => (&locals.prefix_return_value, None),
            HookPhase::Suffix => (
                &locals.suffix_return_value,
                Some(locals.return_value.clone()),
            ),
        };

        Stmt::IfHookRegistered {
            storage: storage.to_string(),
            method: method.name.clone(),
            then: vec![
                Stmt::Let {
                    name: locals.return_early.clone(),
                    value: Expr::FreshFlag,
                },
                Stmt::Let {
                    name: result.clone(),
                    value: Expr::CallHook {
                        phase,
                        storage: storage.to_string(),
                        method: method.name.clone(),
                        arguments: arguments.to_vec(),
                        return_value,
                        return_early: locals.return_early.clone(),
                    },
                },
                Stmt::IfSet {
                    flag: locals.return_early.clone(),
                    then: vec![Stmt::Return(Expr::local(result.clone()))],
                },
            ],
        }
    }
}

impl MethodBodySynthesizer for InterceptorSynthesizer {
    fn strategy(&self) -> ProxyStrategy {
        ProxyStrategy::AccessInterceptor
    }

    /// Without hook storages in `context` the body is a plain passthrough.
    fn synthesize(&self, method: &MethodDescriptor, context: SynthesisContext<'_>) -> Body {
        let locals = Locals::for_method(method);
        let arguments: Vec<ArgumentRef> = method.parameters.iter().map(ArgumentRef::from).collect();
        let mut statements = Vec::with_capacity(4);

        if let Some(hooks) = context.hooks {
            statements.push(Self::hook_block(
                HookPhase::Prefix,
                &hooks.prefix_storage,
                method,
                &arguments,
                &locals,
            ));
        }

        statements.push(Stmt::Let {
            name: locals.return_value.clone(),
            value: Expr::Delegate {
                method: method.name.clone(),
                arguments: arguments.clone(),
            },
        });

        if let Some(hooks) = context.hooks {
            statements.push(Self::hook_block(
                HookPhase::Suffix,
                &hooks.suffix_storage,
                method,
                &arguments,
                &locals,
            ));
        }

        statements.push(Stmt::Return(Expr::local(locals.return_value)));
        Body::new(statements)
    }
}
