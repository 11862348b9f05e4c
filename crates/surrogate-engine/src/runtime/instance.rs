//! Proxy classes and instances
//!
//! Instances are created through the factory path only: the original
//! constructor never runs, properties start at their accessor's initial
//! value and hook storages start empty.
//!
//! Cloning an instance copies every state member. Hook registrations are
//! copied, not shared, so later registrations on either copy stay local.
//! Serialization writes mirrored properties plus the names of registered
//! hooks; deserialization resolves those names through a [`HookCatalog`].

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::builder::{GeneratedClass, MirroredProperty};
use crate::error::RuntimeError;
use crate::interceptor::{Hook, HookCatalog, HookMap, HookPhase, InterceptorRegistration};
use crate::materialize::{ImplementationTable, MethodImplementation};

use super::accessor::{accessor_for, PropertyStore};
use super::eval::{Evaluator, Frame};
use super::Value;

struct ClassInner {
    class: GeneratedClass,
    implementations: ImplementationTable,
}

/// Materialized proxy class; cheap to clone
#[derive(Clone)]
pub struct ProxyClass {
    inner: Arc<ClassInner>,
}

impl ProxyClass {
    /// Pair a generated class with its bound implementations
    pub fn new(class: GeneratedClass, implementations: ImplementationTable) -> Self {
        Self {
            inner: Arc::new(ClassInner {
                class,
                implementations,
            }),
        }
    }

    /// Generated class name
    pub fn name(&self) -> &str {
        &self.inner.class.name
    }

    /// The generated class description
    pub fn description(&self) -> &GeneratedClass {
        &self.inner.class
    }

    /// Whether instances carry hook storages
    pub fn supports_interceptors(&self) -> bool {
        self.inner.class.hook_storage.is_some()
    }

    pub(super) fn implementation(&self, method: &str) -> Option<Arc<dyn MethodImplementation>> {
        self.inner.implementations.get(method).cloned()
    }

    /// Create an instance through the factory path
    pub fn instantiate(&self) -> ProxyInstance {
        let class = self.description();
        let mut properties = PropertyStore::new();
        for property in &class.properties {
            properties.insert(property.name.clone(), accessor_for(property.accessor).initial(property));
        }

        trace!(proxy = %class.name, "instantiated proxy");
        ProxyInstance {
            class: self.clone(),
            properties,
            interceptors: self
                .supports_interceptors()
                .then(InterceptorRegistration::default),
        }
    }

    /// Restore an instance from [`ProxyInstance::serialize`] output
    pub fn deserialize(&self, json: &str, catalog: &HookCatalog) -> Result<ProxyInstance, RuntimeError> {
        let snapshot: InstanceSnapshot = serde_json::from_str(json)?;
        if snapshot.class != self.name() {
            return Err(RuntimeError::ClassMismatch {
                expected: self.name().to_string(),
                found: snapshot.class,
            });
        }

        let mut instance = self.instantiate();
        for (name, value) in snapshot.properties.iter() {
            let accessor = accessor_for(instance.mirrored(name)?.accessor);
            accessor.write(&mut instance.properties, name, value.clone());
        }
        // Passthrough properties unset before serialization stay unset
        for property in &self.description().properties {
            if !snapshot.properties.contains(&property.name) {
                instance.properties.remove(&property.name);
            }
        }

        for (phase, hooks) in [
            (HookPhase::Prefix, snapshot.prefix_hooks),
            (HookPhase::Suffix, snapshot.suffix_hooks),
        ] {
            for (method, hook_name) in hooks {
                let hook = catalog
                    .resolve(&hook_name)
                    .ok_or(RuntimeError::UnknownHook { name: hook_name })?;
                instance.set_hook(phase, &method, hook)?;
            }
        }

        debug!(proxy = %self.name(), "deserialized proxy instance");
        Ok(instance)
    }
}

impl fmt::Debug for ProxyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyClass")
            .field("name", &self.name())
            .field("strategy", &self.inner.class.strategy)
            .field("implementations", &self.inner.implementations)
            .finish()
    }
}

/// Serialized form of a proxy instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSnapshot {
    /// Generated class name
    pub class: String,
    /// Mirrored property values
    pub properties: PropertyStore,
    /// Method → hook name (prefix phase)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub prefix_hooks: IndexMap<String, String>,
    /// Method → hook name (suffix phase)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub suffix_hooks: IndexMap<String, String>,
}

/// Instance of a materialized proxy class
#[derive(Debug, Clone)]
pub struct ProxyInstance {
    class: ProxyClass,
    pub(super) properties: PropertyStore,
    interceptors: Option<InterceptorRegistration>,
}

impl ProxyInstance {
    /// Class of this instance
    pub fn class(&self) -> &ProxyClass {
        &self.class
    }

    /// Call a method
    pub fn invoke(&mut self, method: &str, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        let mut arguments = arguments;
        self.invoke_by_ref(method, &mut arguments)
    }

    /// Call a method; by-reference parameters are written back to `arguments`
    pub fn invoke_by_ref(&mut self, method: &str, arguments: &mut [Value]) -> Result<Value, RuntimeError> {
        let class = self.class.clone();
        let synthesized = class
            .description()
            .method(method)
            .ok_or_else(|| RuntimeError::UnknownMethod {
                class: class.name().to_string(),
                method: method.to_string(),
            })?;
        trace!(proxy = %class.name(), method = %synthesized.name, "invoking");

        let frame = Frame::bind(synthesized, arguments)?;
        let mut evaluator = Evaluator {
            instance: self,
            class: &class,
            method: &synthesized.name,
            frame,
        };
        let result = evaluator.run(&synthesized.body)?;
        evaluator.frame.write_back(synthesized, arguments);
        Ok(result)
    }

    /// Read a mirrored property
    pub fn read(&self, name: &str) -> Result<Value, RuntimeError> {
        let property = self.mirrored(name)?;
        Ok(accessor_for(property.accessor).read(&self.properties, name))
    }

    /// Write a mirrored property
    pub fn write(&mut self, name: &str, value: impl Into<Value>) -> Result<(), RuntimeError> {
        let accessor = accessor_for(self.mirrored(name)?.accessor);
        accessor.write(&mut self.properties, name, value.into());
        Ok(())
    }

    /// Whether a property counts as set; undeclared properties never do
    pub fn exists(&self, name: &str) -> bool {
        match self.mirrored(name) {
            Ok(property) => accessor_for(property.accessor).exists(&self.properties, name),
            Err(_) => false,
        }
    }

    /// Unset a mirrored property
    pub fn unset(&mut self, name: &str) -> Result<(), RuntimeError> {
        let accessor = accessor_for(self.mirrored(name)?.accessor);
        accessor.unset(&mut self.properties, name);
        Ok(())
    }

    /// Register the prefix hook of a method, replacing any previous one
    pub fn set_prefix_hook(&mut self, method: &str, hook: Arc<dyn Hook>) -> Result<(), RuntimeError> {
        self.set_hook(HookPhase::Prefix, method, hook)
    }

    /// Register the suffix hook of a method, replacing any previous one
    pub fn set_suffix_hook(&mut self, method: &str, hook: Arc<dyn Hook>) -> Result<(), RuntimeError> {
        self.set_hook(HookPhase::Suffix, method, hook)
    }

    /// Remove the prefix hook of a method
    pub fn remove_prefix_hook(&mut self, method: &str) -> Result<Option<Arc<dyn Hook>>, RuntimeError> {
        Ok(self.registration_mut()?.prefix.remove(method))
    }

    /// Remove the suffix hook of a method
    pub fn remove_suffix_hook(&mut self, method: &str) -> Result<Option<Arc<dyn Hook>>, RuntimeError> {
        Ok(self.registration_mut()?.suffix.remove(method))
    }

    /// Hook registrations, if the class has hook storages
    pub fn interceptors(&self) -> Option<&InterceptorRegistration> {
        self.interceptors.as_ref()
    }

    /// Serialize mirrored properties and hook names to JSON
    ///
    /// Fails with [`RuntimeError::UnserializableValue`] rather than writing
    /// state that would not read back the same (non-finite floats).
    pub fn serialize(&self) -> Result<String, RuntimeError> {
        if let Some((property, value)) = self
            .properties
            .iter()
            .find(|(_, value)| !value.is_serializable())
        {
            return Err(RuntimeError::UnserializableValue {
                property: property.to_string(),
                value: value.to_string(),
            });
        }

        let hook_names = |map: &HookMap| -> IndexMap<String, String> {
            map.names()
                .map(|(method, hook)| (method.to_string(), hook.to_string()))
                .collect()
        };
        let (prefix_hooks, suffix_hooks) = match &self.interceptors {
            Some(registration) => (hook_names(&registration.prefix), hook_names(&registration.suffix)),
            None => Default::default(),
        };

        let snapshot = InstanceSnapshot {
            class: self.class.name().to_string(),
            properties: self.properties.clone(),
            prefix_hooks,
            suffix_hooks,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    pub(super) fn hook(&self, storage: &str, method: &str) -> Option<Arc<dyn Hook>> {
        let symbols = self.class.description().hook_storage.as_ref()?;
        let registration = self.interceptors.as_ref()?;
        let map = if storage == symbols.prefix_storage {
            &registration.prefix
        } else if storage == symbols.suffix_storage {
            &registration.suffix
        } else {
            return None;
        };
        map.get(method).cloned()
    }

    fn set_hook(&mut self, phase: HookPhase, method: &str, hook: Arc<dyn Hook>) -> Result<(), RuntimeError> {
        trace!(method, hook = hook.name(), ?phase, "registering hook");
        self.registration_mut()?.map_mut(phase).insert(method, hook);
        Ok(())
    }

    fn registration_mut(&mut self) -> Result<&mut InterceptorRegistration, RuntimeError> {
        let class = &self.class;
        self.interceptors
            .as_mut()
            .ok_or_else(|| RuntimeError::HooksUnsupported {
                class: class.name().to_string(),
            })
    }

    fn mirrored(&self, name: &str) -> Result<&MirroredProperty, RuntimeError> {
        self.class
            .description()
            .property(name)
            .ok_or_else(|| RuntimeError::UndefinedProperty {
                class: self.class.name().to_string(),
                property: name.to_string(),
            })
    }
}
