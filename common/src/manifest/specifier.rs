//! Version specifiers (`==5.1.5`, `>=4.2,<5`, `~=3.1`, `==5.1.*`).

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::manifest::error::ParseError;
use crate::manifest::version::{Version, cmp_release};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    ArbitraryEqual,
    Equal,
    NotEqual,
    Compatible,
    GreaterEqual,
    LessEqual,
    Greater,
    Less,
}

// Longest operators first so that `===` is not read as `==` followed by `=`.
const OPERATORS: &[(&str, Operator)] = &[
    ("===", Operator::ArbitraryEqual),
    ("==", Operator::Equal),
    ("!=", Operator::NotEqual),
    ("~=", Operator::Compatible),
    (">=", Operator::GreaterEqual),
    ("<=", Operator::LessEqual),
    (">", Operator::Greater),
    ("<", Operator::Less),
];

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::ArbitraryEqual => "===",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Compatible => "~=",
            Operator::GreaterEqual => ">=",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::Less => "<",
        }
    }

    fn split_prefix(s: &str) -> Option<(Operator, &str)> {
        OPERATORS
            .iter()
            .find_map(|(token, op)| s.strip_prefix(token).map(|rest| (*op, rest)))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct Specifier {
    op: Operator,
    version: Version,
    raw_version: String,
    wildcard: bool,
}

impl Specifier {
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::EmptySpecifier);
        }

        let (op, rest) =
            Operator::split_prefix(s).ok_or_else(|| ParseError::MissingOperator(s.to_string()))?;
        let raw_version = rest.trim();
        if raw_version.is_empty() {
            return Err(ParseError::EmptySpecifier);
        }

        let (version_text, wildcard) = match raw_version.strip_suffix(".*") {
            Some(prefix) => (prefix, true),
            None => (raw_version, false),
        };

        if wildcard && !matches!(op, Operator::Equal | Operator::NotEqual) {
            return Err(ParseError::WildcardNotAllowed {
                op: op.as_str().to_string(),
            });
        }

        let version = Version::parse(version_text)?;

        if op == Operator::Compatible && version.release().len() < 2 {
            return Err(ParseError::CompatibleTooShort(raw_version.to_string()));
        }

        Ok(Self {
            op,
            version,
            raw_version: raw_version.to_string(),
            wildcard,
        })
    }

    pub fn op(&self) -> Operator {
        self.op
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn raw_version(&self) -> &str {
        &self.raw_version
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Whether `candidate` satisfies this single specifier.
    pub fn contains(&self, candidate: &Version) -> bool {
        let target = &self.version;

        match self.op {
            Operator::ArbitraryEqual => {
                candidate.to_string().eq_ignore_ascii_case(&self.raw_version)
                    || candidate.to_string() == target.to_string()
            }
            Operator::Equal => self.equals(candidate),
            Operator::NotEqual => !self.equals(candidate),
            Operator::Compatible => {
                let prefix = &target.release()[..target.release().len() - 1];
                candidate.public() >= *target
                    && candidate.epoch() == target.epoch()
                    && release_starts_with(candidate.release(), prefix)
            }
            Operator::GreaterEqual => candidate.public() >= *target,
            Operator::LessEqual => candidate.public() <= *target,
            Operator::Greater => {
                candidate.public() > *target
                    && !(candidate.is_postrelease()
                        && !target.is_postrelease()
                        && same_release(candidate, target))
            }
            Operator::Less => {
                candidate.public() < *target
                    && !(candidate.is_prerelease()
                        && !target.is_prerelease()
                        && same_release(candidate, target))
            }
        }
    }

    fn equals(&self, candidate: &Version) -> bool {
        let target = &self.version;
        if self.wildcard {
            return candidate.epoch() == target.epoch()
                && release_starts_with(candidate.release(), target.release());
        }
        if target.local().is_none() {
            candidate.public() == *target
        } else {
            candidate == target
        }
    }
}

fn release_starts_with(release: &[u64], prefix: &[u64]) -> bool {
    (0..prefix.len()).all(|i| release.get(i).copied().unwrap_or(0) == prefix[i])
}

fn same_release(a: &Version, b: &Version) -> bool {
    a.epoch() == b.epoch() && cmp_release(a.release(), b.release()) == Ordering::Equal
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.raw_version)
    }
}

impl Serialize for Specifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A comma separated conjunction of specifiers. Empty means "any version".
#[derive(Clone, Debug, Default)]
pub struct SpecifierSet(Vec<Specifier>);

impl SpecifierSet {
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }

        s.split(',')
            .map(Specifier::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Specifier> {
        self.0.iter()
    }

    /// The exact version when the set is a single `==` without wildcard.
    pub fn pinned(&self) -> Option<&Version> {
        match self.0.as_slice() {
            [spec] if spec.op == Operator::Equal && !spec.wildcard => Some(&spec.version),
            _ => None,
        }
    }

    /// True when a specifier names a pre-release, which opts the whole set in.
    pub fn allows_prereleases(&self) -> bool {
        self.0
            .iter()
            .any(|spec| spec.op != Operator::NotEqual && spec.version.is_prerelease())
    }

    pub fn contains(&self, candidate: &Version, prereleases: bool) -> bool {
        if candidate.is_prerelease() && !prereleases && !self.allows_prereleases() {
            return false;
        }
        self.0.iter().all(|spec| spec.contains(candidate))
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(","))
    }
}

impl Serialize for SpecifierSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
