//! Method Body Synthesizers
//!
//! A synthesizer turns one method shape into one [`Body`]. Synthesis is a
//! pure function of its inputs: the same method and the same symbols
//! always produce the same body.
//!
//! | Strategy           | Synthesizer                 | Delegates |
//! |--------------------|-----------------------------|-----------|
//! | null-object        | [`NullObjectSynthesizer`]   | never     |
//! | access-interceptor | [`InterceptorSynthesizer`]  | always    |

mod interceptor;
mod null_object;

pub use interceptor::InterceptorSynthesizer;
pub use null_object::NullObjectSynthesizer;

use serde::Serialize;

use crate::body::Body;
use crate::descriptor::MethodDescriptor;
use crate::strategy::ProxyStrategy;

/// Names of the two hook-storage members of an interceptor proxy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookSymbols {
    /// Storage holding prefix hooks
    pub prefix_storage: String,
    /// Storage holding suffix hooks
    pub suffix_storage: String,
}

impl HookSymbols {
    /// Create hook symbols
    pub fn new(prefix_storage: impl Into<String>, suffix_storage: impl Into<String>) -> Self {
        Self {
            prefix_storage: prefix_storage.into(),
            suffix_storage: suffix_storage.into(),
        }
    }
}

/// Supporting symbols available while synthesizing one class
#[derive(Debug, Clone, Copy, Default)]
pub struct SynthesisContext<'a> {
    /// Hook storages, when the class has them
    pub hooks: Option<&'a HookSymbols>,
}

impl<'a> SynthesisContext<'a> {
    /// Context with hook storages
    pub fn with_hooks(hooks: &'a HookSymbols) -> Self {
        Self { hooks: Some(hooks) }
    }
}

/// Strategy-specific producer of method bodies
pub trait MethodBodySynthesizer: Send + Sync {
    /// Strategy this synthesizer implements
    fn strategy(&self) -> ProxyStrategy;

    /// Produce the body overriding `method`
    fn synthesize(&self, method: &MethodDescriptor, context: SynthesisContext<'_>) -> Body;
}

/// Pick a local name that does not shadow a parameter
///
/// Appends `_` until the name is free, so the result only depends on the
/// method's parameter names.
pub(crate) fn local_name(base: &str, method: &MethodDescriptor) -> String {
    let mut name = base.to_string();
    while method.parameters.iter().any(|p| p.name == name) {
        name.push('_');
    }
    name
}
