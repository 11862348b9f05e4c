//! Unique identifier generation
//!
//! Generated class names and auxiliary member names carry a suffix drawn
//! from a process-wide counter, so synthesizing many proxies of the same
//! base class never produces colliding symbols.

use std::sync::atomic::{AtomicU64, Ordering};

/// Next suffix handed out by [`UniqueIdentifierGenerator`]
static NEXT_SUFFIX: AtomicU64 = AtomicU64::new(0);

/// Process-wide source of never-repeating identifiers
pub struct UniqueIdentifierGenerator;

impl UniqueIdentifierGenerator {
    /// Prefix used when the requested one is not a valid identifier
    pub const DEFAULT_PREFIX: &'static str = "g";

    /// Produce `<prefix>_<hex suffix>`
    ///
    /// The suffix never contains `_`, so distinct (prefix, suffix) pairs
    /// always yield distinct identifiers.
    pub fn identifier(prefix: &str) -> String {
        let prefix = if is_identifier(prefix) {
            prefix
        } else {
            Self::DEFAULT_PREFIX
        };
        let suffix = NEXT_SUFFIX.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}_{suffix:x}")
    }
}

/// Whether `name` is a plain identifier (`[A-Za-z_][A-Za-z0-9_]*`)
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_identifier_keeps_valid_prefix() {
        let id = UniqueIdentifierGenerator::identifier("Foo");
        assert!(id.starts_with("Foo_"));
        assert!(is_identifier(&id));
    }

    #[test]
    fn test_invalid_prefix_replaced() {
        for prefix in ["", "1abc", "foo-bar", "a\\b"] {
            let id = UniqueIdentifierGenerator::identifier(prefix);
            assert!(id.starts_with("g_"), "{prefix:?} produced {id}");
        }
    }

    #[test]
    fn test_concurrent_identifiers_never_repeat() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                thread::spawn(|| {
                    (0..200)
                        .map(|_| UniqueIdentifierGenerator::identifier("Foo"))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "identifier handed out twice");
            }
        }
        assert_eq!(seen.len(), 1600);
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("prefixInterceptors"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("x y"));
        assert!(!is_identifier("9"));
    }
}
