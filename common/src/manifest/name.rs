//! Package names as they appear in a manifest.
//!
//! Two spellings refer to the same package when their PEP 503 normalized forms
//! match, so `Django`, `django` and `DJANGO` all collide.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::manifest::error::ParseError;

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i-u)^[a-z0-9](?:[a-z0-9._-]*[a-z0-9])?$").expect("name pattern is valid")
});

#[derive(Clone, Debug)]
pub struct PackageName {
    raw: String,
    normalized: String,
}

impl PackageName {
    /// Validates `raw` against the PEP 508 name grammar.
    pub fn new(raw: &str) -> Result<Self, ParseError> {
        if !is_valid(raw) {
            return Err(ParseError::InvalidName(raw.to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            normalized: normalize(raw),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

/// Lowercases and collapses every run of `-`, `_` and `.` into a single `-`.
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;

    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.push(c.to_ascii_lowercase());
            in_separator = false;
        }
    }
    out
}

fn is_valid(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

impl PartialEq for PackageName {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for PackageName {}

impl Hash for PackageName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl PartialOrd for PackageName {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageName {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.normalized.cmp(&other.normalized)
    }
}

impl FromStr for PackageName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim())
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for PackageName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_separators() {
        assert_eq!(normalize("Django"), "django");
        assert_eq!(normalize("django_filter"), "django-filter");
        assert_eq!(normalize("zope.interface"), "zope-interface");
        assert_eq!(normalize("Foo-_.Bar"), "foo-bar");
    }

    #[test]
    fn equality_uses_normalized_form() {
        let a = PackageName::new("Django-Guardian").unwrap();
        let b = PackageName::new("django_guardian").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "Django-Guardian");
    }

    #[test]
    fn rejects_invalid_names() {
        assert!(PackageName::new("").is_err());
        assert!(PackageName::new("-django").is_err());
        assert!(PackageName::new("django_").is_err());
        assert!(PackageName::new("dj ango").is_err());
        assert!(PackageName::new("caf\u{e9}").is_err());
        assert!(PackageName::new("\u{17f}tuff").is_err());
        assert!(PackageName::new("a").is_ok());
    }
}
