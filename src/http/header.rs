use std::collections::BTreeMap;

/// Returns the canonical form of a header key.
///
/// The first letter and any letter following a hyphen are upper-cased, the
/// rest are lower-cased: `content-TYPE` becomes `Content-Type`. Keys holding
/// anything other than ASCII letters, digits and hyphens are returned as-is.
///
/// ```
/// # use sitan::http::header::canonical_key;
/// assert_eq!(canonical_key("content-length"), "Content-Length");
/// assert_eq!(canonical_key("HOST"), "Host");
/// ```
pub fn canonical_key(key: &str) -> String {
    if !is_valid_key(key) {
        return key.to_string();
    }

    let mut out = String::with_capacity(key.len());
    let mut upper = true;
    for c in key.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    out
}

/// A header key may only contain ASCII letters, digits and `-`.
pub fn is_valid_key(key: &str) -> bool {
    key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// Header storage keyed by canonical name.
///
/// Keys are canonicalized once, on insertion. Lookups compare against the
/// stored canonical form, so callers pass canonical names (`"Content-Length"`).
/// Iteration yields keys in ascending byte order, which is what the response
/// writer relies on for deterministic output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: BTreeMap<String, String>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a header, replacing any previous value for the same key.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) -> Option<String> {
        self.entries.insert(canonical_key(key), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|v| v.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
