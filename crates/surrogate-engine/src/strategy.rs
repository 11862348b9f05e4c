//! Strategy Registry
//!
//! Maps a requested proxy kind to the synthesizer that writes its method
//! bodies and the structure policy the builder applies around them.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::builder::PropertyAccessorKind;
use crate::error::SynthesisError;
use crate::synth::{InterceptorSynthesizer, MethodBodySynthesizer, NullObjectSynthesizer};

/// Proxy behavior family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProxyStrategy {
    /// Every method returns the absence sentinel
    NullObject,
    /// Every method is wrapped with prefix/suffix hooks
    AccessInterceptor,
}

impl ProxyStrategy {
    /// All strategies, in registry order
    pub const ALL: [ProxyStrategy; 2] = [ProxyStrategy::NullObject, ProxyStrategy::AccessInterceptor];

    /// Canonical name
    pub fn as_str(self) -> &'static str {
        match self {
            ProxyStrategy::NullObject => "null-object",
            ProxyStrategy::AccessInterceptor => "access-interceptor",
        }
    }
}

impl fmt::Display for ProxyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ProxyStrategy {
    type Err = SynthesisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "null-object" | "null_object" | "NullObject" => Ok(ProxyStrategy::NullObject),
            "access-interceptor" | "access_interceptor" | "AccessInterceptor" | "interceptor" => {
                Ok(ProxyStrategy::AccessInterceptor)
            }
            _ => Err(SynthesisError::UnknownStrategy {
                name: s.to_string(),
            }),
        }
    }
}

/// What the builder adds around synthesized methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructurePolicy {
    /// Bodies delegate, so the source must have implementations
    pub requires_backing: bool,
    /// Add prefix/suffix hook storages
    pub hook_storage: bool,
    /// Accessor semantics of mirrored properties
    pub accessor: PropertyAccessorKind,
}

impl StructurePolicy {
    /// Policy of a strategy
    pub fn for_strategy(strategy: ProxyStrategy) -> Self {
        match strategy {
            ProxyStrategy::NullObject => Self {
                requires_backing: false,
                hook_storage: false,
                accessor: PropertyAccessorKind::NullObject,
            },
            ProxyStrategy::AccessInterceptor => Self {
                requires_backing: true,
                hook_storage: true,
                accessor: PropertyAccessorKind::Passthrough,
            },
        }
    }
}

/// Registered strategy
pub struct StrategyEntry {
    /// Strategy kind
    pub strategy: ProxyStrategy,
    /// Body synthesizer
    pub synthesizer: Box<dyn MethodBodySynthesizer>,
    /// Structure policy
    pub policy: StructurePolicy,
}

impl StrategyEntry {
    /// Create an entry with the strategy's default policy
    pub fn new(synthesizer: Box<dyn MethodBodySynthesizer>) -> Self {
        let strategy = synthesizer.strategy();
        Self {
            strategy,
            synthesizer,
            policy: StructurePolicy::for_strategy(strategy),
        }
    }
}

impl fmt::Debug for StrategyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyEntry")
            .field("strategy", &self.strategy)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Registry of available strategies
#[derive(Debug, Default)]
pub struct StrategyRegistry {
    entries: FxHashMap<ProxyStrategy, StrategyEntry>,
}

impl StrategyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with both built-in strategies
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(StrategyEntry::new(Box::new(NullObjectSynthesizer)));
        registry.register(StrategyEntry::new(Box::new(InterceptorSynthesizer)));
        registry
    }

    /// Register an entry, replacing any previous one of the same kind
    pub fn register(&mut self, entry: StrategyEntry) {
        self.entries.insert(entry.strategy, entry);
    }

    /// Get the entry of a strategy
    pub fn get(&self, strategy: ProxyStrategy) -> Option<&StrategyEntry> {
        self.entries.get(&strategy)
    }

    /// Resolve a requested strategy name
    pub fn resolve(&self, name: &str) -> Result<&StrategyEntry, SynthesisError> {
        let strategy = name.parse::<ProxyStrategy>()?;
        self.get(strategy).ok_or_else(|| SynthesisError::UnknownStrategy {
            name: name.to_string(),
        })
    }

    /// Registered kinds, sorted
    pub fn kinds(&self) -> Vec<ProxyStrategy> {
        let mut kinds: Vec<_> = self.entries.keys().copied().collect();
        kinds.sort();
        kinds
    }
}
