//! Deduplicated compiler warnings.
//!
//! Selector compilation runs repeatedly (every poll of a wait loop recompiles
//! or re-executes the same selector), so a fallback that is worth telling the
//! user about once would otherwise flood the log. Every message is emitted at
//! most once per process through `log::warn!`.

use std::collections::HashSet;

use parking_lot::Mutex;

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about a degraded code path (emits once per unique message).
///
/// Returns `true` when the message was emitted, `false` when it had already
/// been seen.
///
/// # Example
/// ```
/// use quarry_common::warning::warn_once;
///
/// let _ = warn_once("selector", ":nth-child is not native, using path queries");
/// assert!(!warn_once("selector", ":nth-child is not native, using path queries"));
/// ```
#[must_use]
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_emit = WARNED.lock().get_or_insert_with(HashSet::new).insert(key);

    if should_emit {
        log::warn!(target: "quarry", "[{component}] {message}");
    }
    should_emit
}
