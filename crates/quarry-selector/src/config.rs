//! Compiler settings.

use serde::Deserialize;

/// Settings for a [`SelectorCompiler`](crate::SelectorCompiler).
///
/// Deserializable so front ends can load it from a JSON file; missing fields
/// take their defaults.
///
/// ```
/// use quarry_selector::CompilerConfig;
///
/// let config = CompilerConfig::default();
/// assert!(config.native_probing);
/// assert_eq!(config.max_nesting_depth, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Probe the engine for native pseudo-class support. When off, every
    /// query-expressible pseudo-class is compiled to a path query.
    pub native_probing: bool,
    /// How deep `:has()`/`:not()` arguments may nest.
    pub max_nesting_depth: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            native_probing: true,
            max_nesting_depth: 8,
        }
    }
}
