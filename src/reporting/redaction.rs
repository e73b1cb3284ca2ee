use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Replacement for masked values.
pub const REDACTED: &str = "***REDACTED***";

/// Key fragments that mark a field as sensitive, compared after lowercasing
/// and dropping `_` and `-`.
pub const SENSITIVE_KEY_FRAGMENTS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "token",
    "apikey",
    "authorization",
    "credential",
    "cookie",
    "session",
    "bearer",
    "privatekey",
];

/// Keys that are sensitive only as an exact match.
const SENSITIVE_EXACT_KEYS: &[&str] = &["key", "auth", "pwd"];

const CREDENTIAL_PATTERNS: &[(&str, &str)] = &[
    (r"(?i)\bbearer\s+[A-Za-z0-9._~+/=-]+", "Bearer ***REDACTED***"),
    (
        r"(?i)\b(password|passwd|secret|token|api[_-]?key)\s*[=:]\s*[^\s&,;]+",
        "$1=***REDACTED***",
    ),
    (r"\beyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+", REDACTED),
    (r"\b(?:sk|pk|rk)-[A-Za-z0-9_-]{8,}", REDACTED),
    (r"\bAKIA[0-9A-Z]{16}\b", REDACTED),
    (r"\bgh[pousr]_[A-Za-z0-9]{20,}\b", REDACTED),
];

static CREDENTIAL_REGEXES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    CREDENTIAL_PATTERNS
        .iter()
        .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, *replacement)))
        .collect()
});

/// Masks credentials and bounds the size of input captured in diagnostics.
///
/// Sensitive keys are masked at any depth. Strings are scrubbed of
/// credential-shaped substrings and truncated. With a safe-field list only
/// those top-level fields of an object survive.
#[derive(Debug, Clone)]
pub struct Redactor {
    max_string_len: usize,
    max_depth: usize,
    safe_fields: Option<HashSet<String>>,
}

impl Default for Redactor {
    fn default() -> Self {
        Self {
            max_string_len: 256,
            max_depth: 8,
            safe_fields: None,
        }
    }
}

impl Redactor {
    /// Redactor with default limits and no safe-field list
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum characters kept from any string
    pub fn with_max_string_len(mut self, max: usize) -> Self {
        self.max_string_len = max;
        self
    }

    /// Maximum nesting kept; deeper values are replaced by a marker
    pub fn with_max_depth(mut self, max: usize) -> Self {
        self.max_depth = max;
        self
    }

    /// Keep only these top-level fields of object inputs
    pub fn with_safe_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.safe_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true if `key` names a credential-bearing field
    pub fn is_sensitive_key(key: &str) -> bool {
        let normalized: String = key
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        SENSITIVE_EXACT_KEYS.contains(&normalized.as_str())
            || SENSITIVE_KEY_FRAGMENTS
                .iter()
                .any(|fragment| normalized.contains(fragment))
    }

    /// Redacted copy of a JSON input
    pub fn redact_value(&self, value: &Value) -> Value {
        match (value, &self.safe_fields) {
            (Value::Object(map), Some(safe)) => {
                let kept: Map<String, Value> = map
                    .iter()
                    .filter(|(key, _)| safe.contains(key.as_str()))
                    .map(|(key, value)| (key.clone(), self.redact_entry(key, value, 1)))
                    .collect();
                Value::Object(kept)
            }
            _ => self.redact_at(value, 0),
        }
    }

    /// Scrub credential-shaped substrings, then truncate
    pub fn redact_str(&self, input: &str) -> String {
        let mut scrubbed = input.to_string();
        for (regex, replacement) in CREDENTIAL_REGEXES.iter() {
            if regex.is_match(&scrubbed) {
                scrubbed = regex.replace_all(&scrubbed, *replacement).into_owned();
            }
        }
        self.truncate(scrubbed)
    }

    fn redact_entry(&self, key: &str, value: &Value, depth: usize) -> Value {
        if Self::is_sensitive_key(key) && !value.is_null() {
            Value::String(REDACTED.to_string())
        } else {
            self.redact_at(value, depth)
        }
    }

    fn redact_at(&self, value: &Value, depth: usize) -> Value {
        if depth > self.max_depth {
            return Value::String("[nested too deep]".to_string());
        }

        match value {
            Value::String(s) => Value::String(self.redact_str(s)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.redact_at(item, depth + 1))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), self.redact_entry(key, value, depth + 1)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn truncate(&self, value: String) -> String {
        let total = value.chars().count();
        if total <= self.max_string_len {
            return value;
        }
        let kept: String = value.chars().take(self.max_string_len).collect();
        format!("{}...[{} chars truncated]", kept, total - self.max_string_len)
    }
}
