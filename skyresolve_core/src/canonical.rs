//! Name normalization and canonical identifier construction.
//!
//! Upstream services spell the same designation differently (`M 31`,
//! `M  31`, `m31`, `NAME Andromeda Galaxy`). Everything that compares names
//! goes through [`name_key`] so those spellings collapse to one key.

use serde::{Deserialize, Serialize};

/// Prefix SIMBAD and Sesame put in front of common (non-catalog) names.
const COMMON_NAME_PREFIX: &str = "NAME ";

/// Trim and collapse internal whitespace runs to a single space.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Comparison key: uppercase with all whitespace removed.
pub fn name_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_uppercase())
        .collect()
}

/// Strip the `NAME ` marker used for common names.
pub fn display_name(raw: &str) -> String {
    let normalized = normalize_name(raw);
    match normalized.get(..COMMON_NAME_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(COMMON_NAME_PREFIX) => {
            normalized[COMMON_NAME_PREFIX.len()..].to_string()
        }
        _ => normalized,
    }
}

/// Build a canonical identifier from candidate designations, most
/// authoritative first. The first non-empty candidate wins.
///
/// Returns an empty string when every candidate is blank.
pub fn build_canonical_id(candidates: &[&str]) -> String {
    candidates
        .iter()
        .map(|c| display_name(c))
        .find(|c| !c.is_empty())
        .map(|c| name_key(&c))
        .unwrap_or_default()
}

/// Insertion-ordered set of names, unique by [`name_key`].
///
/// Entries are stored whitespace-normalized; the first spelling seen is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameSet(Vec<String>);

impl NameSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a name. Returns `false` for blanks and duplicates.
    pub fn insert(&mut self, raw: &str) -> bool {
        let name = display_name(raw);
        if name.is_empty() || self.contains(&name) {
            return false;
        }
        self.0.push(name);
        true
    }

    pub fn contains(&self, raw: &str) -> bool {
        let key = name_key(&display_name(raw));
        self.0.iter().any(|n| name_key(n) == key)
    }

    /// True when at least one name appears in both sets.
    pub fn intersects(&self, other: &NameSet) -> bool {
        self.0.iter().any(|n| other.contains(n))
    }

    pub fn extend_from(&mut self, other: &NameSet) {
        for name in &other.0 {
            self.insert(name);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<'a> FromIterator<&'a str> for NameSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = NameSet::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}
