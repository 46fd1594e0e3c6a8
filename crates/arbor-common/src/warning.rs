//! Deduplicated warnings routed through the `log` facade.
//!
//! Tree construction can hit the same unsupported construct thousands of
//! times in one document. Each distinct message is logged once until
//! [`clear_warnings`] is called.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about an unsupported construct (logged once per unique message).
///
/// Returns `true` if this call emitted the warning, `false` if the same
/// message had already been reported.
///
/// # Example
/// ```
/// use arbor_common::warning::{clear_warnings, warn_once};
///
/// clear_warnings();
/// assert!(warn_once("HTML", "no handling for <table> in \"in body\""));
/// assert!(!warn_once("HTML", "no handling for <table> in \"in body\""));
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let first_time = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if first_time {
        log::warn!(target: "arbor", "[{component}] {message}");
    }
    first_time
}

/// Clear all recorded warnings (call when starting a new document)
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
    fn distinct_components_are_tracked_separately() {
        let message = "distinct-components-check";
        let _ = warn_once("A", message);
        assert!(warn_once("B", message));
        assert!(!warn_once("B", message));
    }
}
