//! Table-driven materialization
//!
//! Instead of printing source, pair the generated class with a table of
//! original implementations and evaluate the synthesized bodies at call
//! time. Delegation looks up the table; nothing else does.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::builder::GeneratedClass;
use crate::error::{MaterializeError, RuntimeError};
use crate::runtime::{PropertyStore, ProxyClass, Value};

use super::Materializer;

/// Original implementation of one method
///
/// `arguments` holds one slot per declared parameter, in order; a variadic
/// parameter is a single [`Value::List`]. Slots of by-reference parameters
/// are written back to the caller after the call.
pub trait MethodImplementation: Send + Sync {
    /// Run the implementation against the instance's properties
    fn call(&self, properties: &mut PropertyStore, arguments: &mut [Value]) -> Result<Value, RuntimeError>;
}

impl<F> MethodImplementation for F
where
    F: Fn(&mut PropertyStore, &mut [Value]) -> Result<Value, RuntimeError> + Send + Sync,
{
    fn call(&self, properties: &mut PropertyStore, arguments: &mut [Value]) -> Result<Value, RuntimeError> {
        self(properties, arguments)
    }
}

/// Original implementations keyed by method name (case-insensitive)
#[derive(Clone, Default)]
pub struct ImplementationTable {
    methods: FxHashMap<String, Arc<dyn MethodImplementation>>,
}

impl ImplementationTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the implementation of a method
    pub fn insert(&mut self, method: &str, implementation: Arc<dyn MethodImplementation>) {
        self.methods.insert(method.to_ascii_lowercase(), implementation);
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with<I>(mut self, method: &str, implementation: I) -> Self
    where
        I: MethodImplementation + 'static,
    {
        self.insert(method, Arc::new(implementation));
        self
    }

    /// Implementation of a method
    pub fn get(&self, method: &str) -> Option<&Arc<dyn MethodImplementation>> {
        self.methods.get(&method.to_ascii_lowercase())
    }

    /// Number of registered implementations
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl fmt::Debug for ImplementationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.methods.keys().collect();
        names.sort();
        f.debug_set().entries(names).finish()
    }
}

/// Materializes generated classes into runnable [`ProxyClass`]es
#[derive(Debug, Clone, Default)]
pub struct TableMaterializer {
    implementations: ImplementationTable,
}

impl TableMaterializer {
    /// Materializer delegating to `implementations`
    pub fn new(implementations: ImplementationTable) -> Self {
        Self { implementations }
    }
}

impl Materializer for TableMaterializer {
    type Output = ProxyClass;
    type Error = MaterializeError;

    fn materialize(&self, class: &GeneratedClass) -> Result<ProxyClass, MaterializeError> {
        let mut bound = ImplementationTable::new();

        for method in &class.methods {
            if !method.body.contains_delegation() {
                continue;
            }
            let implementation =
                self.implementations
                    .get(&method.name)
                    .ok_or_else(|| MaterializeError::MissingImplementation {
                        class: class.name.clone(),
                        method: method.name.clone(),
                    })?;
            bound.insert(&method.name, Arc::clone(implementation));
        }

        tracing::debug!(
            proxy = %class.name,
            implementations = bound.len(),
            "materialized proxy class"
        );
        Ok(ProxyClass::new(class.clone(), bound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ProxyGenerator;
    use crate::descriptor::{ClassDescriptor, MethodDescriptor};

    fn descriptor() -> ClassDescriptor {
        ClassDescriptor::new("Counter")
            .with_method(MethodDescriptor::new("increment"))
            .with_method(MethodDescriptor::new("reset"))
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = ImplementationTable::new().with(
            "Increment",
            |_: &mut PropertyStore, _: &mut [Value]| -> Result<Value, RuntimeError> { Ok(Value::Int(1)) },
        );
        assert!(table.get("increment").is_some());
        assert!(table.get("INCREMENT").is_some());
        assert!(table.get("reset").is_none());
    }

    #[test]
    fn test_missing_implementation() {
        let class = ProxyGenerator::new()
            .generate(&descriptor(), "access-interceptor")
            .unwrap();
        let table = ImplementationTable::new().with(
            "increment",
            |_: &mut PropertyStore, _: &mut [Value]| -> Result<Value, RuntimeError> { Ok(Value::Null) },
        );

        let err = TableMaterializer::new(table).materialize(&class).unwrap_err();
        assert!(matches!(err, MaterializeError::MissingImplementation { ref method, .. } if method == "reset"));
    }

    #[test]
    fn test_null_object_needs_no_implementations() {
        let class = ProxyGenerator::new().generate(&descriptor(), "null-object").unwrap();
        assert!(TableMaterializer::default().materialize(&class).is_ok());
    }
}
