//! Surrogate Proxy Engine
//!
//! Synthesizes proxy classes from class descriptors:
//! - **Descriptors**: classes, methods, parameters, properties (`descriptor` module)
//! - **Synthesis**: per-strategy method bodies (`synth`, `strategy` modules)
//! - **Structure**: the generated class and its naming (`builder`, `naming` modules)
//! - **Interceptors**: the prefix/suffix hook protocol (`interceptor` module)
//! - **Materialization**: source text or a table-driven runtime
//!   (`materialize`, `runtime` modules)
//!
//! Two strategies are built in: `null-object` proxies answer every call
//! with null, `access-interceptor` proxies wrap every call with optional
//! prefix and suffix hooks around the original implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use surrogate_engine::{ClassDescriptor, MethodDescriptor, Materializer, ProxyGenerator, TableMaterializer};
//!
//! let descriptor = ClassDescriptor::new("App\\Mailer")
//!     .with_method(MethodDescriptor::new("send"));
//!
//! let class = ProxyGenerator::new().generate(&descriptor, "null-object")?;
//! let mut proxy = TableMaterializer::default().materialize(&class)?.instantiate();
//! assert!(proxy.invoke("send", vec![])?.is_null());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// ============================================================================
// Modules
// ============================================================================

/// Method body statement trees
pub mod body;

/// Proxy structure builder and generator facade
pub mod builder;

/// Generator configuration
pub mod config;

/// Class descriptors
pub mod descriptor;

/// Error types
pub mod error;

/// Interceptor invocation protocol
pub mod interceptor;

/// Source and table materializers
pub mod materialize;

/// Unique identifier generation
pub mod naming;

/// Table-driven proxy runtime
pub mod runtime;

/// Strategy registry
pub mod strategy;

/// Method body synthesizers
pub mod synth;

// ============================================================================
// Re-exports
// ============================================================================

pub use body::{ArgumentRef, Body, Expr, HookPhase, Stmt};
pub use builder::{
    GeneratedClass, MirroredProperty, PropertyAccessorKind, ProxyGenerator, ProxyStructureBuilder,
    SynthesizedMethod,
};
pub use config::{ConfigError, EmitConfig, GeneratorConfig, NamingConfig};
pub use descriptor::{
    ClassDescriptor, ClassKind, Literal, MethodDescriptor, ParameterDescriptor, PropertyDescriptor,
    Visibility,
};
pub use error::{MaterializeError, RuntimeError, SynthesisError};
pub use interceptor::{
    ArgumentMap, FnHook, Hook, HookCatalog, HookError, HookInvocation, HookMap,
    InterceptorRegistration,
};
pub use materialize::{
    ImplementationTable, MethodImplementation, Materializer, SourceEmitter, TableMaterializer,
};
pub use naming::UniqueIdentifierGenerator;
pub use runtime::{PropertyStore, ProxyClass, ProxyInstance, Value};
pub use strategy::{ProxyStrategy, StrategyRegistry};
pub use synth::{
    HookSymbols, InterceptorSynthesizer, MethodBodySynthesizer, NullObjectSynthesizer,
    SynthesisContext,
};
