//! Class Descriptors
//!
//! Read-only structural metadata about the class or interface being
//! proxied. Descriptors are produced by an external reflection layer and
//! usually arrive as JSON documents:
//!
//! ```json
//! {
//!   "name": "App\\Mailer",
//!   "kind": "concrete",
//!   "methods": [
//!     { "name": "send", "parameters": [{ "name": "to", "type_hint": "string" }] }
//!   ],
//!   "properties": [{ "name": "transport", "default": "smtp" }]
//! }
//! ```

use std::path::Path;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::SynthesisError;

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible everywhere
    #[default]
    Public,
    /// Visible to subclasses
    Protected,
    /// Visible to the declaring class only; never proxied
    Private,
}

impl Visibility {
    /// Whether a generated subclass may override or mirror the member
    pub fn is_proxyable(self) -> bool {
        !matches!(self, Visibility::Private)
    }

    /// Keyword used in emitted source
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

/// What kind of type the descriptor describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    /// Instantiable class
    #[default]
    Concrete,
    /// Abstract class (may mix concrete and abstract methods)
    Abstract,
    /// Pure interface, no implementation at all
    Interface,
}

/// Opaque literal used for parameter and property defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// Absence of value
    Null,
    /// Boolean literal
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Floating point literal
    Float(f64),
    /// String literal
    Str(String),
    /// List literal
    List(Vec<Literal>),
}

/// Parameter of a method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Parameter name
    pub name: String,
    /// Position in the parameter list
    #[serde(default)]
    pub index: usize,
    /// Declared type, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,
    /// Collects all remaining arguments
    #[serde(default)]
    pub is_variadic: bool,
    /// Passed by reference
    #[serde(default)]
    pub is_by_reference: bool,
    /// Default value, making the parameter optional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,
}

impl ParameterDescriptor {
    /// Create a required, untyped, by-value parameter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: 0,
            type_hint: None,
            is_variadic: false,
            is_by_reference: false,
            default: None,
        }
    }

    /// Set the type hint
    pub fn typed(mut self, type_hint: impl Into<String>) -> Self {
        self.type_hint = Some(type_hint.into());
        self
    }

    /// Mark as variadic
    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self
    }

    /// Mark as by-reference
    pub fn by_reference(mut self) -> Self {
        self.is_by_reference = true;
        self
    }

    /// Make optional with a default value
    pub fn optional(mut self, default: Literal) -> Self {
        self.default = Some(default);
        self
    }

    /// Whether a call may omit this parameter
    pub fn is_optional(&self) -> bool {
        self.is_variadic || self.default.is_some()
    }
}

/// Method of a class or interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Method name
    pub name: String,
    /// Ordered parameters
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    /// Returns by reference
    #[serde(default)]
    pub returns_reference: bool,
    /// Declared return type, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// Declared visibility
    #[serde(default)]
    pub visibility: Visibility,
    /// Has no body in the source class
    #[serde(default)]
    pub is_abstract: bool,
    /// Static method
    #[serde(default)]
    pub is_static: bool,
}

impl MethodDescriptor {
    /// Create a public, concrete method without parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            returns_reference: false,
            return_type: None,
            visibility: Visibility::Public,
            is_abstract: false,
            is_static: false,
        }
    }

    /// Append a parameter, assigning its position
    pub fn with_param(mut self, mut param: ParameterDescriptor) -> Self {
        param.index = self.parameters.len();
        self.parameters.push(param);
        self
    }

    /// Set the return type
    pub fn returns(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    /// Mark as returning by reference
    pub fn by_reference(mut self) -> Self {
        self.returns_reference = true;
        self
    }

    /// Set the visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as abstract
    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Mark as static
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Whether the last parameter is variadic
    pub fn is_variadic_last(&self) -> bool {
        self.parameters.last().is_some_and(|p| p.is_variadic)
    }

    /// Whether the builder overrides this method
    pub fn is_proxyable(&self) -> bool {
        self.visibility.is_proxyable() && !self.is_static
    }
}

/// Instance or static property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Property name
    pub name: String,
    /// Declared visibility
    #[serde(default)]
    pub visibility: Visibility,
    /// Static property
    #[serde(default)]
    pub is_static: bool,
    /// Default value (`None` means no default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,
}

impl PropertyDescriptor {
    /// Create a public instance property without default
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_static: false,
            default: None,
        }
    }

    /// Set the default value
    pub fn with_default(mut self, default: Literal) -> Self {
        self.default = Some(default);
        self
    }

    /// Set the visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as static
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Whether the builder mirrors this property
    pub fn is_mirrored(&self) -> bool {
        self.visibility == Visibility::Public && !self.is_static
    }
}

/// Structural view of a class or interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// Fully qualified class name
    pub name: String,
    /// Class, abstract class, or interface
    #[serde(default)]
    pub kind: ClassKind,
    /// Declared methods
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    /// Declared properties
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
}

impl ClassDescriptor {
    /// Create an empty concrete class
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Concrete,
            methods: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Create an empty interface
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            kind: ClassKind::Interface,
            ..Self::new(name)
        }
    }

    /// Create an empty abstract class
    pub fn abstract_class(name: impl Into<String>) -> Self {
        Self {
            kind: ClassKind::Abstract,
            ..Self::new(name)
        }
    }

    /// Add a method
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a property
    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Parse a JSON descriptor; parameter positions are taken from list order
    pub fn from_json(content: &str) -> Result<Self, SynthesisError> {
        let mut descriptor: ClassDescriptor = serde_json::from_str(content)?;
        for method in &mut descriptor.methods {
            for (index, param) in method.parameters.iter_mut().enumerate() {
                param.index = index;
            }
        }
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Read and parse a JSON descriptor file
    pub fn from_file(path: &Path) -> Result<Self, SynthesisError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Short name: last segment of a namespaced name
    pub fn short_name(&self) -> &str {
        self.name
            .rsplit(['\\', '.', ':'])
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.name)
    }

    /// Look up a method (method names are case-insensitive)
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Methods the builder overrides
    pub fn proxyable_methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.iter().filter(|m| m.is_proxyable())
    }

    /// Properties the builder mirrors
    pub fn mirrored_properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| p.is_mirrored())
    }

    /// Whether any method body exists to delegate to
    pub fn has_backing_implementation(&self) -> bool {
        self.kind != ClassKind::Interface
    }

    /// Check the structural invariants
    pub fn validate(&self) -> Result<(), SynthesisError> {
        let invalid = |reason: String| SynthesisError::InvalidDescriptor {
            class: self.name.clone(),
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid("class name cannot be empty".to_string()));
        }

        let mut method_names = FxHashSet::default();
        for method in &self.methods {
            if !method_names.insert(method.name.to_ascii_lowercase()) {
                return Err(invalid(format!("method {} declared twice", method.name)));
            }

            let mut param_names = FxHashSet::default();
            for (position, param) in method.parameters.iter().enumerate() {
                if param.index != position {
                    return Err(invalid(format!(
                        "parameter {} of {}() has index {}, expected {}",
                        param.name, method.name, param.index, position
                    )));
                }
                if !param_names.insert(param.name.as_str()) {
                    return Err(invalid(format!(
                        "parameter {} of {}() declared twice",
                        param.name, method.name
                    )));
                }
                if param.is_variadic && position + 1 != method.parameters.len() {
                    return Err(invalid(format!(
                        "variadic parameter {} of {}() must be last",
                        param.name, method.name
                    )));
                }
            }
        }

        let mut property_names = FxHashSet::default();
        for property in &self.properties {
            if !property_names.insert(property.name.as_str()) {
                return Err(invalid(format!("property {} declared twice", property.name)));
            }
        }

        Ok(())
    }
}
