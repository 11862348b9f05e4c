//! Null-object bodies: accept any arguments, never delegate, return null.

use crate::body::{Body, Expr, Stmt};
use crate::descriptor::MethodDescriptor;
use crate::strategy::ProxyStrategy;

use super::{local_name, MethodBodySynthesizer, SynthesisContext};

/// Synthesizer for [`ProxyStrategy::NullObject`]
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObjectSynthesizer;

impl NullObjectSynthesizer {
    /// Local bound to the sentinel for by-reference returns
    pub const NULL_REFERENCE: &'static str = "nullReference";
}

impl MethodBodySynthesizer for NullObjectSynthesizer {
    fn strategy(&self) -> ProxyStrategy {
        ProxyStrategy::NullObject
    }

    fn synthesize(&self, method: &MethodDescriptor, _context: SynthesisContext<'_>) -> Body {
        if !method.returns_reference {
            return Body::new(vec![Stmt::Return(Expr::Null)]);
        }

        // A reference return has to name a slot.
        let slot = local_name(Self::NULL_REFERENCE, method);
        Body::new(vec![
            Stmt::Let {
                name: slot.clone(),
                value: Expr::Null,
            },
            Stmt::Return(Expr::local(slot)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Literal, ParameterDescriptor};

    #[test]
    fn test_plain_method_returns_null() {
        let method = MethodDescriptor::new("publicMethod");
        let body = NullObjectSynthesizer.synthesize(&method, SynthesisContext::default());
        assert_eq!(body, Body::new(vec![Stmt::Return(Expr::Null)]));
    }

    #[test]
    fn test_parameters_never_read() {
        let method = MethodDescriptor::new("buz")
            .with_param(ParameterDescriptor::new("param").typed("stdClass"))
            .with_param(ParameterDescriptor::new("flag").optional(Literal::Bool(true)))
            .with_param(ParameterDescriptor::new("names").variadic());

        let body = NullObjectSynthesizer.synthesize(&method, SynthesisContext::default());
        assert_eq!(body, Body::new(vec![Stmt::Return(Expr::Null)]));
        assert!(!body.contains_delegation());
    }

    #[test]
    fn test_by_reference_return_binds_slot() {
        let method = MethodDescriptor::new("publicByReferenceMethod").by_reference();
        let body = NullObjectSynthesizer.synthesize(&method, SynthesisContext::default());

        assert_eq!(
            body.statements,
            vec![
                Stmt::Let {
                    name: "nullReference".to_string(),
                    value: Expr::Null,
                },
                Stmt::Return(Expr::local("nullReference")),
            ]
        );
    }

    #[test]
    fn test_by_reference_slot_avoids_parameter_name() {
        let method = MethodDescriptor::new("ref")
            .by_reference()
            .with_param(ParameterDescriptor::new("nullReference"));
        let body = NullObjectSynthesizer.synthesize(&method, SynthesisContext::default());

        assert_eq!(body.statements[1], Stmt::Return(Expr::local("nullReference_")));
    }
}
