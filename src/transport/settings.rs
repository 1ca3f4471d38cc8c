//! Per-session settings sent with every request.
//!
//! Settings pin server-side session behavior (output format, timeout
//! window, session identity). They are merged into the request's query
//! parameters on every call, not just at session start, and are fixed for
//! the lifetime of a transport once it is built.

use std::collections::BTreeMap;

/// Ordered string map of session settings.
///
/// Values are string-encoded on insertion since every entry crosses the
/// wire as a query-string parameter. Ordering is stable so requests are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    entries: BTreeMap<String, String>,
}

impl Settings {
    /// Create an empty settings map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a setting.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.entries.insert(key.into(), value.to_string());
    }

    /// Chainable [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Set the `session_id` used to pin server-side session state.
    pub fn session_id(self, id: impl ToString) -> Self {
        self.with("session_id", id)
    }

    /// Set the `session_timeout` window in seconds.
    pub fn session_timeout(self, seconds: u64) -> Self {
        self.with("session_timeout", seconds)
    }

    /// Look up a setting.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut settings = Settings::new();
        for (key, value) in iter {
            settings.set(key, value);
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let settings = Settings::new()
            .session_id("abc123")
            .session_timeout(300)
            .with("max_execution_time", 60);

        assert_eq!(settings.get("session_id"), Some("abc123"));
        assert_eq!(settings.get("session_timeout"), Some("300"));
        assert_eq!(settings.get("max_execution_time"), Some("60"));
        assert_eq!(settings.get("missing"), None);
        assert_eq!(settings.len(), 3);
    }

    #[test]
    fn test_overwrite_keeps_last_value() {
        let settings = Settings::new().with("k", 1).with("k", 2);
        assert_eq!(settings.get("k"), Some("2"));
        assert_eq!(settings.len(), 1);
    }

    #[test]
    fn test_iteration_is_key_ordered() {
        let settings = Settings::new().with("b", 2).with("a", 1).with("c", 3);
        let keys: Vec<&str> = settings.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_from_iterator() {
        let settings: Settings = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(settings.get("a"), Some("1"));
        assert!(!settings.is_empty());
    }
}
