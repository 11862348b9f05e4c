//! Engine errors
//!
//! Synthesis errors are reported at request time and are fatal to that
//! request only. Materialization and runtime errors belong to the two
//! built-in materializers.

use thiserror::Error;

use crate::interceptor::HookError;

/// Errors that can occur while synthesizing a proxy class
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Requested proxy kind is not registered
    #[error("Unknown proxy strategy: {name}")]
    UnknownStrategy {
        /// Requested strategy name
        name: String,
    },

    /// Strategy cannot be applied to this class (no backing implementation)
    #[error("Unsupported target {class}: {reason}")]
    UnsupportedTarget {
        /// Source class name
        class: String,
        /// Why the strategy cannot be applied
        reason: String,
    },

    /// Two members of a generated class ended up with the same name
    #[error("Duplicate symbol {symbol} in generated class {class}")]
    DuplicateSymbol {
        /// Generated class name
        class: String,
        /// Colliding symbol
        symbol: String,
    },

    /// Class descriptor breaks its own structural invariants
    #[error("Invalid class descriptor {class}: {reason}")]
    InvalidDescriptor {
        /// Source class name
        class: String,
        /// Violated invariant
        reason: String,
    },

    /// Failed to read a descriptor file
    #[error("Failed to read class descriptor: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a descriptor document
    #[error("Failed to parse class descriptor: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised while turning a generated class into something loadable
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// A delegating body has no implementation to delegate to
    #[error("No implementation registered for {class}::{method}()")]
    MissingImplementation {
        /// Generated class name
        class: String,
        /// Method whose body delegates
        method: String,
    },

    /// Source formatting failed
    #[error("Failed to emit source: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Errors raised by materialized proxy instances
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Method is not part of the proxied contract
    #[error("Call to undefined method {class}::{method}()")]
    UnknownMethod {
        /// Generated class name
        class: String,
        /// Requested method
        method: String,
    },

    /// Property is not a mirrored public property
    #[error("Undefined property {class}::{property}")]
    UndefinedProperty {
        /// Generated class name
        class: String,
        /// Requested property
        property: String,
    },

    /// Required parameter was not supplied
    #[error("Missing argument {parameter} for {method}()")]
    MissingArgument {
        /// Called method
        method: String,
        /// Parameter without argument or default
        parameter: String,
    },

    /// Hook registration on a class without hook storage
    #[error("Proxy class {class} does not support interceptors")]
    HooksUnsupported {
        /// Generated class name
        class: String,
    },

    /// A hook failed; propagated unchanged
    #[error(transparent)]
    Hook(#[from] HookError),

    /// The original implementation failed
    #[error("Implementation of {method}() failed: {message}")]
    Implementation {
        /// Delegated method
        method: String,
        /// Failure description
        message: String,
    },

    /// Serialized state could not be written or read
    #[error("Failed to (de)serialize proxy state: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A property holds a value JSON cannot represent
    #[error("Property {property} holds {value}, which cannot be serialized")]
    UnserializableValue {
        /// Property name
        property: String,
        /// Offending value
        value: String,
    },

    /// Serialized state references a hook the catalog does not know
    #[error("Unknown hook {name} in serialized state")]
    UnknownHook {
        /// Hook name
        name: String,
    },

    /// Serialized state belongs to another generated class
    #[error("Serialized state belongs to {found}, expected {expected}")]
    ClassMismatch {
        /// Class the state was loaded into
        expected: String,
        /// Class recorded in the state
        found: String,
    },
}
