//! Interceptor Invocation Protocol
//!
//! The fixed call/return contract between intercepted method bodies and
//! user hooks.
//!
//! ## Hook call
//!
//! A hook receives the proxy, the target (the proxy itself: there is no
//! separate backing instance), the method name, and the ordered mapping
//! parameter name → current argument value. Variadic parameters appear
//! as a single entry holding the collected values.
//!
//! - **prefix**: runs before delegation. Calling
//!   [`HookInvocation::return_early`] makes the body return the hook's
//!   value at once; delegation and the suffix phase are skipped.
//! - **suffix**: runs after delegation and additionally sees the
//!   delegation result. Calling `return_early` replaces the result with
//!   the hook's value; otherwise the delegation result is returned.
//!
//! A method without a hook for a phase skips that phase entirely. Hook
//! failures are not caught: they reach the proxy's caller unchanged.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use thiserror::Error;

pub use crate::body::HookPhase;
use crate::runtime::{ProxyInstance, Value};

/// Ordered parameter name → argument value mapping handed to hooks
pub type ArgumentMap = IndexMap<String, Value>;

/// Failure raised by a hook
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    /// Create a hook error
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// One hook call
pub struct HookInvocation<'a> {
    phase: HookPhase,
    /// The proxy instance
    pub proxy: &'a ProxyInstance,
    /// The instance whose implementation runs; the proxy itself
    pub target: &'a ProxyInstance,
    /// Intercepted method
    pub method: &'a str,
    /// Current arguments
    pub arguments: &'a ArgumentMap,
    /// Delegation result (suffix phase only)
    pub return_value: Option<&'a Value>,
    return_early: bool,
}

impl<'a> HookInvocation<'a> {
    /// Prefix-phase invocation with a fresh early-return flag
    pub fn prefix(proxy: &'a ProxyInstance, method: &'a str, arguments: &'a ArgumentMap) -> Self {
        Self {
            phase: HookPhase::Prefix,
            proxy,
            target: proxy,
            method,
            arguments,
            return_value: None,
            return_early: false,
        }
    }

    /// Suffix-phase invocation with a fresh early-return flag
    pub fn suffix(
        proxy: &'a ProxyInstance,
        method: &'a str,
        arguments: &'a ArgumentMap,
        return_value: &'a Value,
    ) -> Self {
        Self {
            phase: HookPhase::Suffix,
            proxy,
            target: proxy,
            method,
            arguments,
            return_value: Some(return_value),
            return_early: false,
        }
    }

    /// Phase of this call
    pub fn phase(&self) -> HookPhase {
        self.phase
    }

    /// Make the hook's return value the method's result
    pub fn return_early(&mut self) {
        self.return_early = true;
    }

    /// Whether the hook asked to return early
    pub fn returns_early(&self) -> bool {
        self.return_early
    }

    /// Argument by parameter name
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }
}

/// User-supplied callable invoked around a proxied method
pub trait Hook: Send + Sync {
    /// Stable name; serialized proxies refer to hooks by it
    fn name(&self) -> &str;

    /// Run the hook
    fn call(&self, invocation: &mut HookInvocation<'_>) -> Result<Value, HookError>;
}

/// [`Hook`] backed by a closure
pub struct FnHook<F> {
    name: String,
    f: F,
}

impl<F> FnHook<F>
where
    F: Fn(&mut HookInvocation<'_>) -> Result<Value, HookError> + Send + Sync,
{
    /// Wrap a closure under a name
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Wrap a closure and share it
    pub fn shared(name: impl Into<String>, f: F) -> Arc<dyn Hook>
    where
        F: 'static,
    {
        Arc::new(Self::new(name, f))
    }
}

impl<F> Hook for FnHook<F>
where
    F: Fn(&mut HookInvocation<'_>) -> Result<Value, HookError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, invocation: &mut HookInvocation<'_>) -> Result<Value, HookError> {
        (self.f)(invocation)
    }
}

/// Hooks of one phase keyed by method name; last registration wins
#[derive(Clone, Default)]
pub struct HookMap {
    hooks: IndexMap<String, Arc<dyn Hook>>,
}

impl HookMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook for a method, returning the replaced one
    pub fn insert(&mut self, method: impl Into<String>, hook: Arc<dyn Hook>) -> Option<Arc<dyn Hook>> {
        self.hooks.insert(method.into(), hook)
    }

    /// Remove the hook of a method
    pub fn remove(&mut self, method: &str) -> Option<Arc<dyn Hook>> {
        self.hooks.shift_remove(method)
    }

    /// Hook of a method
    pub fn get(&self, method: &str) -> Option<&Arc<dyn Hook>> {
        self.hooks.get(method)
    }

    /// Whether a method has a hook
    pub fn contains(&self, method: &str) -> bool {
        self.hooks.contains_key(method)
    }

    /// Number of hooked methods
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no method is hooked
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// (method, hook name) pairs in registration order
    pub fn names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.hooks.iter().map(|(method, hook)| (method.as_str(), hook.name()))
    }
}

impl fmt::Debug for HookMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.names()).finish()
    }
}

/// Per-instance hook registrations
#[derive(Debug, Clone, Default)]
pub struct InterceptorRegistration {
    /// Prefix hooks
    pub prefix: HookMap,
    /// Suffix hooks
    pub suffix: HookMap,
}

impl InterceptorRegistration {
    /// Map of a phase
    pub fn map(&self, phase: HookPhase) -> &HookMap {
        match phase {
            HookPhase::Prefix => &self.prefix,
            HookPhase::Suffix => &self.suffix,
        }
    }

    /// Mutable map of a phase
    pub fn map_mut(&mut self, phase: HookPhase) -> &mut HookMap {
        match phase {
            HookPhase::Prefix => &mut self.prefix,
            HookPhase::Suffix => &mut self.suffix,
        }
    }
}

/// Hooks known by name, used to restore serialized registrations
#[derive(Clone, Default)]
pub struct HookCatalog {
    hooks: FxHashMap<String, Arc<dyn Hook>>,
}

impl HookCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook under its own name
    pub fn register(&mut self, hook: Arc<dyn Hook>) {
        self.hooks.insert(hook.name().to_string(), hook);
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, hook: Arc<dyn Hook>) -> Self {
        self.register(hook);
        self
    }

    /// Look up a hook by name
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Hook>> {
        self.hooks.get(name).cloned()
    }
}

impl fmt::Debug for HookCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.hooks.keys().collect();
        names.sort();
        f.debug_set().entries(names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(name: &str, value: i64) -> Arc<dyn Hook> {
        FnHook::shared(name.to_string(), move |_| Ok(Value::Int(value)))
    }

    #[test]
    fn test_last_registration_wins() {
        let mut map = HookMap::new();
        assert!(map.insert("run", constant("first", 1)).is_none());
        let replaced = map.insert("run", constant("second", 2));

        assert_eq!(replaced.map(|h| h.name().to_string()), Some("first".to_string()));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("run").map(|h| h.name()), Some("second"));
    }

    #[test]
    fn test_cloned_map_is_independent() {
        let mut original = HookMap::new();
        original.insert("run", constant("audit", 1));

        let mut copy = original.clone();
        copy.remove("run");
        copy.insert("stop", constant("audit", 1));

        assert!(original.contains("run"));
        assert!(!original.contains("stop"));
        assert!(!copy.contains("run"));
    }

    #[test]
    fn test_registration_phases() {
        let mut registration = InterceptorRegistration::default();
        registration.map_mut(HookPhase::Suffix).insert("run", constant("after", 0));

        assert!(registration.map(HookPhase::Prefix).is_empty());
        assert!(registration.suffix.contains("run"));
    }

    #[test]
    fn test_catalog_resolve() {
        let catalog = HookCatalog::new().with(constant("audit", 7));
        assert!(catalog.resolve("audit").is_some());
        assert!(catalog.resolve("missing").is_none());
    }
}
