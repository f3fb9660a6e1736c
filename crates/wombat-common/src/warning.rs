//! Parser warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the HTML tree builder to report markup it accepts without
//! modelling fully (foreign content namespaces, template contents).

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about a partially supported feature (prints once per unique message).
///
/// Returns `true` when the warning was printed, `false` when the same
/// `component`/`message` pair had already been reported.
///
/// # Example
/// ```
/// use wombat_common::warning::warn_once;
///
/// let _ = warn_once("HTML Parser", "<svg> content is parsed without namespace adjustment");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        eprintln!("{}", format!("[Wombat {component}] ⚠ {message}").yellow());
    }
    should_print
}

/// Returns true if this exact warning has been emitted since the last clear.
pub fn has_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&key))
}

/// Clear all recorded warnings (call between unrelated documents)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_deduplicates() {
        let message = "unit-test warning that nothing else emits";
        assert!(warn_once("Test", message));
        assert!(!warn_once("Test", message));
        assert!(has_warned("Test", message));
    }

    #[test]
    fn test_distinct_components_are_distinct_warnings() {
        assert!(warn_once("Test A", "same text"));
        assert!(warn_once("Test B", "same text"));
    }
}
