//! Memo of native pseudo-class support, keyed by engine capability.
//!
//! A probe costs a round trip to the engine, so each `(capability id,
//! strategy)` pair is probed at most once for the lifetime of the cache.
//! The cache is shared between compilers through an `Arc`.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::pseudo::StrategyKind;

/// Thread-safe `(capability id, strategy) -> supported` map.
#[derive(Debug, Default)]
pub struct NativeSupportCache {
    entries: RwLock<HashMap<String, HashMap<StrategyKind, bool>>>,
}

impl NativeSupportCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded outcome, if this pair was probed before.
    #[must_use]
    pub fn get(&self, capability: &str, kind: StrategyKind) -> Option<bool> {
        self.entries
            .read()
            .get(capability)
            .and_then(|kinds| kinds.get(&kind))
            .copied()
    }

    /// The recorded outcome, running `probe` to record it on first use.
    ///
    /// The probe runs under the write lock, so concurrent first uses of the
    /// same pair probe once.
    #[must_use]
    pub fn get_or_probe(
        &self,
        capability: &str,
        kind: StrategyKind,
        probe: impl FnOnce() -> bool,
    ) -> bool {
        if let Some(supported) = self.get(capability, kind) {
            return supported;
        }
        let mut entries = self.entries.write();
        *entries
            .entry(capability.to_string())
            .or_default()
            .entry(kind)
            .or_insert_with(probe)
    }

    /// Number of recorded outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().values().map(HashMap::len).sum()
    }

    /// Whether nothing was probed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every outcome.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
