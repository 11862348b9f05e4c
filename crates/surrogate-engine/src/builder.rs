//! Proxy Structure Builder
//!
//! Assembles a [`GeneratedClass`] from a class descriptor and a registered
//! strategy: one synthesized override per proxyable method, mirrored
//! public properties, strategy state (hook storages), a factory entry
//! point that bypasses the original constructor, and the lifecycle glue
//! that clone and serialization need.

use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::{debug, trace};

use crate::body::Body;
use crate::config::{GeneratorConfig, NamingConfig};
use crate::descriptor::{
    ClassDescriptor, ClassKind, Literal, MethodDescriptor, ParameterDescriptor, Visibility,
};
use crate::error::SynthesisError;
use crate::naming::UniqueIdentifierGenerator;
use crate::strategy::{ProxyStrategy, StrategyEntry, StrategyRegistry};
use crate::synth::{HookSymbols, SynthesisContext};

/// Property accessor semantics of a mirrored property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyAccessorKind {
    /// Starts as the absence sentinel; writes stick
    NullObject,
    /// Plain property starting at its declared default
    Passthrough,
}

/// Synthesized override
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesizedMethod {
    /// Method name
    pub name: String,
    /// Visibility of the original
    pub visibility: Visibility,
    /// Parameters echoed from the original
    pub parameters: Vec<ParameterDescriptor>,
    /// Returns by reference
    pub returns_reference: bool,
    /// Declared return type
    pub return_type: Option<String>,
    /// Overrides an abstract or interface method
    pub implements_abstract: bool,
    /// Synthesized body
    pub body: Body,
}

/// Property mirrored on the proxy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MirroredProperty {
    /// Property name
    pub name: String,
    /// Declared default of the original
    pub default: Option<Literal>,
    /// Accessor semantics
    pub accessor: PropertyAccessorKind,
}

/// Factory entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactorySpec {
    /// Static method name
    pub name: String,
    /// The original constructor is never run
    pub bypasses_constructor: bool,
}

/// Clone behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CloneSpec {
    /// Copy every state member; hook maps are copied, not shared
    DeepCopy,
}

/// Clone and serialization glue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleSpec {
    /// Clone behavior
    pub clone: CloneSpec,
    /// State members that make up the serialized form, in order
    pub serialized_state: Vec<String>,
}

/// Description of a generated proxy class; the engine's sole output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedClass {
    /// Generated class name (namespaced, unique per process)
    pub name: String,
    /// Source class name
    pub parent: String,
    /// Kind of the source class
    pub parent_kind: ClassKind,
    /// Strategy implemented by this class
    pub strategy: ProxyStrategy,
    /// Overrides, in declaration order
    pub methods: Vec<SynthesizedMethod>,
    /// Mirrored properties, in declaration order
    pub properties: Vec<MirroredProperty>,
    /// Hook storages (access-interceptor only)
    pub hook_storage: Option<HookSymbols>,
    /// Factory entry point
    pub factory: FactorySpec,
    /// Lifecycle glue
    pub lifecycle: LifecycleSpec,
}

impl GeneratedClass {
    /// Short class name, without namespace
    pub fn short_name(&self) -> &str {
        self.name.rsplit('\\').next().unwrap_or(&self.name)
    }

    /// Namespace part of the name
    pub fn namespace(&self) -> Option<&str> {
        self.name.rsplit_once('\\').map(|(namespace, _)| namespace)
    }

    /// Override of a method (case-insensitive)
    pub fn method(&self, name: &str) -> Option<&SynthesizedMethod> {
        self.methods.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Mirrored property
    pub fn property(&self, name: &str) -> Option<&MirroredProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Names already taken in a generated class
///
/// Methods and state live in separate namespaces. Method names compare
/// case-insensitively.
struct SymbolTable<'a> {
    class: &'a str,
    members: FxHashSet<String>,
    state: FxHashSet<String>,
}

impl<'a> SymbolTable<'a> {
    fn new(class: &'a str) -> Self {
        Self {
            class,
            members: FxHashSet::default(),
            state: FxHashSet::default(),
        }
    }

    fn declare_member(&mut self, name: &str) -> Result<(), SynthesisError> {
        if self.members.insert(name.to_ascii_lowercase()) {
            Ok(())
        } else {
            Err(self.duplicate(name))
        }
    }

    fn declare_state(&mut self, name: &str) -> Result<(), SynthesisError> {
        if self.state.insert(name.to_string()) {
            Ok(())
        } else {
            Err(self.duplicate(name))
        }
    }

    fn has_member(&self, name: &str) -> bool {
        self.members.contains(&name.to_ascii_lowercase())
    }

    /// Declare a generated state member named `<prefix>_<suffix>`
    ///
    /// Suffixes are drawn until the name clashes with nothing the class
    /// declares or inherits. Fields and methods share one namespace in
    /// emitted source, so methods count too.
    fn fresh_state(&mut self, prefix: &str, descriptor: &ClassDescriptor) -> Result<String, SynthesisError> {
        let name = self.fresh_name(prefix, descriptor);
        self.declare_state(&name)?;
        Ok(name)
    }

    /// Declare the method `preferred`, or a suffixed variant when taken
    fn fresh_member(&mut self, preferred: &str, descriptor: &ClassDescriptor) -> Result<String, SynthesisError> {
        let name = if self.is_taken(preferred, descriptor) {
            self.fresh_name(preferred, descriptor)
        } else {
            preferred.to_string()
        };
        self.declare_member(&name)?;
        Ok(name)
    }

    fn fresh_name(&self, prefix: &str, descriptor: &ClassDescriptor) -> String {
        loop {
            let candidate = UniqueIdentifierGenerator::identifier(prefix);
            if !self.is_taken(&candidate, descriptor) {
                return candidate;
            }
        }
    }

    fn is_taken(&self, name: &str, descriptor: &ClassDescriptor) -> bool {
        self.state.contains(name)
            || self.has_member(name)
            || descriptor.method(name).is_some()
            || descriptor.properties.iter().any(|p| p.name == name)
    }

    fn duplicate(&self, symbol: &str) -> SynthesisError {
        SynthesisError::DuplicateSymbol {
            class: self.class.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

/// Builds generated classes
#[derive(Debug, Clone, Default)]
pub struct ProxyStructureBuilder {
    naming: NamingConfig,
}

impl ProxyStructureBuilder {
    /// Create a builder using the given naming rules
    pub fn new(naming: NamingConfig) -> Self {
        Self { naming }
    }

    /// Naming rules in use
    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }

    /// Build the proxy class of `descriptor` for `entry`
    pub fn build(
        &self,
        descriptor: &ClassDescriptor,
        entry: &StrategyEntry,
    ) -> Result<GeneratedClass, SynthesisError> {
        descriptor.validate()?;
        let policy = entry.policy;

        if policy.requires_backing {
            Self::check_backing(descriptor, entry.strategy)?;
        }

        let short_name = UniqueIdentifierGenerator::identifier(descriptor.short_name());
        let name = if self.naming.namespace.is_empty() {
            short_name
        } else {
            format!("{}\\{}", self.naming.namespace, short_name)
        };
        debug!(class = %descriptor.name, proxy = %name, strategy = %entry.strategy, "building proxy class");

        let mut symbols = SymbolTable::new(&name);
        let mut serialized_state = Vec::new();

        let mut properties = Vec::new();
        for property in descriptor.mirrored_properties() {
            symbols.declare_state(&property.name)?;
            serialized_state.push(property.name.clone());
            properties.push(MirroredProperty {
                name: property.name.clone(),
                default: property.default.clone(),
                accessor: policy.accessor,
            });
        }

        for method in descriptor.proxyable_methods() {
            symbols.declare_member(&method.name)?;
        }

        let hook_storage = if policy.hook_storage {
            let prefix_storage = symbols.fresh_state(&self.naming.prefix_storage, descriptor)?;
            let suffix_storage = symbols.fresh_state(&self.naming.suffix_storage, descriptor)?;
            serialized_state.push(prefix_storage.clone());
            serialized_state.push(suffix_storage.clone());
            Some(HookSymbols::new(prefix_storage, suffix_storage))
        } else {
            None
        };

        let context = SynthesisContext {
            hooks: hook_storage.as_ref(),
        };
        let mut methods = Vec::new();
        for method in descriptor.proxyable_methods() {
            trace!(method = %method.name, "synthesizing body");
            methods.push(Self::synthesize_method(descriptor, method, entry, context));
        }

        let factory_name = symbols.fresh_member(&self.naming.factory, descriptor)?;

        debug!(
            proxy = %name,
            methods = methods.len(),
            properties = properties.len(),
            "proxy class built"
        );

        Ok(GeneratedClass {
            name,
            parent: descriptor.name.clone(),
            parent_kind: descriptor.kind,
            strategy: entry.strategy,
            methods,
            properties,
            hook_storage,
            factory: FactorySpec {
                name: factory_name,
                bypasses_constructor: true,
            },
            lifecycle: LifecycleSpec {
                clone: CloneSpec::DeepCopy,
                serialized_state,
            },
        })
    }

    fn synthesize_method(
        descriptor: &ClassDescriptor,
        method: &MethodDescriptor,
        entry: &StrategyEntry,
        context: SynthesisContext<'_>,
    ) -> SynthesizedMethod {
        SynthesizedMethod {
            name: method.name.clone(),
            visibility: method.visibility,
            parameters: method.parameters.clone(),
            returns_reference: method.returns_reference,
            return_type: method.return_type.clone(),
            implements_abstract: method.is_abstract || descriptor.kind == ClassKind::Interface,
            body: entry.synthesizer.synthesize(method, context),
        }
    }

    fn check_backing(
        descriptor: &ClassDescriptor,
        strategy: ProxyStrategy,
    ) -> Result<(), SynthesisError> {
        let unsupported = |reason: String| SynthesisError::UnsupportedTarget {
            class: descriptor.name.clone(),
            reason,
        };

        if !descriptor.has_backing_implementation() {
            return Err(unsupported(format!(
                "{strategy} proxies need a backing implementation, but the descriptor is an interface"
            )));
        }

        if let Some(method) = descriptor
            .proxyable_methods()
            .find(|m| m.is_abstract)
        {
            return Err(unsupported(format!(
                "{strategy} proxies cannot delegate abstract method {}()",
                method.name
            )));
        }

        Ok(())
    }
}

/// Strategy registry plus structure builder
#[derive(Debug)]
pub struct ProxyGenerator {
    registry: StrategyRegistry,
    builder: ProxyStructureBuilder,
}

impl ProxyGenerator {
    /// Generator with the built-in strategies and default naming
    pub fn new() -> Self {
        Self::with_config(&GeneratorConfig::default())
    }

    /// Generator with the built-in strategies and configured naming
    pub fn with_config(config: &GeneratorConfig) -> Self {
        Self {
            registry: StrategyRegistry::with_defaults(),
            builder: ProxyStructureBuilder::new(config.naming.clone()),
        }
    }

    /// Generator over a custom registry
    pub fn with_registry(registry: StrategyRegistry, builder: ProxyStructureBuilder) -> Self {
        Self { registry, builder }
    }

    /// Registered strategies
    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Synthesize the proxy class of `descriptor` for the named strategy
    pub fn generate(
        &self,
        descriptor: &ClassDescriptor,
        strategy: &str,
    ) -> Result<GeneratedClass, SynthesisError> {
        let entry = self.registry.resolve(strategy)?;
        self.builder.build(descriptor, entry)
    }
}

impl Default for ProxyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ParameterDescriptor, PropertyDescriptor};

    fn base_class() -> ClassDescriptor {
        ClassDescriptor::new("ProxyTest\\BaseClass")
            .with_method(MethodDescriptor::new("publicMethod"))
            .with_method(MethodDescriptor::new("protectedMethod").visibility(Visibility::Protected))
            .with_method(MethodDescriptor::new("privateMethod").visibility(Visibility::Private))
            .with_method(
                MethodDescriptor::new("fooMethod")
                    .with_param(ParameterDescriptor::new("bar"))
                    .with_param(ParameterDescriptor::new("baz")),
            )
            .with_property(
                PropertyDescriptor::new("publicProperty")
                    .with_default(Literal::Str("publicPropertyDefault".to_string())),
            )
            .with_property(PropertyDescriptor::new("protectedProperty").visibility(Visibility::Protected))
    }

    #[test]
    fn test_null_object_structure() {
        let class = ProxyGenerator::new().generate(&base_class(), "null-object").unwrap();

        assert!(class.name.starts_with("Surrogate\\BaseClass_"));
        assert_eq!(class.namespace(), Some("Surrogate"));
        assert_eq!(class.parent, "ProxyTest\\BaseClass");
        assert_eq!(class.strategy, ProxyStrategy::NullObject);
        assert!(class.hook_storage.is_none());

        let names: Vec<_> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["publicMethod", "protectedMethod", "fooMethod"]);

        assert_eq!(class.properties.len(), 1);
        assert_eq!(class.properties[0].accessor, PropertyAccessorKind::NullObject);
        assert_eq!(class.factory.name, "staticProxyConstructor");
        assert!(class.factory.bypasses_constructor);
        assert_eq!(class.lifecycle.serialized_state, vec!["publicProperty".to_string()]);
    }

    #[test]
    fn test_interceptor_adds_hook_storage() {
        let class = ProxyGenerator::new()
            .generate(&base_class(), "access-interceptor")
            .unwrap();

        let hooks = class.hook_storage.as_ref().unwrap();
        assert!(hooks.prefix_storage.starts_with("prefixInterceptors_"));
        assert!(hooks.suffix_storage.starts_with("suffixInterceptors_"));
        assert_eq!(class.lifecycle.serialized_state.len(), 3);
        assert_eq!(class.properties[0].accessor, PropertyAccessorKind::Passthrough);
        assert!(class.methods.iter().all(|m| m.body.contains_delegation()));
    }

    #[test]
    fn test_factory_renamed_on_clash() {
        let descriptor = ClassDescriptor::new("Factoryish")
            .with_method(MethodDescriptor::new("staticProxyConstructor"));
        let class = ProxyGenerator::new().generate(&descriptor, "null-object").unwrap();

        assert_ne!(class.factory.name, "staticProxyConstructor");
        assert!(class.factory.name.starts_with("staticProxyConstructor_"));
    }

    #[test]
    fn test_fresh_state_avoids_method_names() {
        let marker = UniqueIdentifierGenerator::identifier("store");
        let next = u64::from_str_radix(marker.rsplit('_').next().unwrap(), 16).unwrap() + 1;
        let mut descriptor = ClassDescriptor::new("Methods");
        for suffix in next..next + 64 {
            descriptor = descriptor.with_method(MethodDescriptor::new(format!("store_{suffix:x}")));
        }

        let mut symbols = SymbolTable::new("Surrogate\\Methods_0");
        let name = symbols.fresh_state("store", &descriptor).unwrap();

        assert!(descriptor.method(&name).is_none());
        assert!(symbols.state.contains(&name));
    }

    #[test]
    fn test_interface_rejected_for_interceptor() {
        let descriptor = ClassDescriptor::interface("BaseInterface")
            .with_method(MethodDescriptor::new("publicMethod").as_abstract());
        let err = ProxyGenerator::new()
            .generate(&descriptor, "access-interceptor")
            .unwrap_err();

        assert!(matches!(err, SynthesisError::UnsupportedTarget { .. }));
    }

    #[test]
    fn test_abstract_method_rejected_for_interceptor() {
        let descriptor = ClassDescriptor::abstract_class("Partial")
            .with_method(MethodDescriptor::new("done"))
            .with_method(MethodDescriptor::new("todo").as_abstract());

        assert!(matches!(
            ProxyGenerator::new().generate(&descriptor, "access-interceptor"),
            Err(SynthesisError::UnsupportedTarget { .. })
        ));
        assert!(ProxyGenerator::new().generate(&descriptor, "null-object").is_ok());
    }

    #[test]
    fn test_state_collision_is_duplicate_symbol() {
        let mut symbols = SymbolTable::new("Surrogate\\Foo_0");
        symbols.declare_state("prefixInterceptors_1").unwrap();

        let err = symbols.declare_state("prefixInterceptors_1").unwrap_err();
        assert!(matches!(err, SynthesisError::DuplicateSymbol { ref symbol, .. } if symbol == "prefixInterceptors_1"));
    }

    #[test]
    fn test_unique_names_per_build() {
        let generator = ProxyGenerator::new();
        let first = generator.generate(&base_class(), "null-object").unwrap();
        let second = generator.generate(&base_class(), "null-object").unwrap();

        assert_ne!(first.name, second.name);
        assert_eq!(first.methods, second.methods);
    }
}
