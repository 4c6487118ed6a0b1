//! # Requirement Manifests
//!
//! A manifest is a `requirements.txt`-style file: one requirement per line,
//! `#` comments, blank lines, and pip option directives.
//!
//! Parsing is lenient. A malformed line never aborts the load; it is kept as
//! an entry carrying its [`ParseError`] so that callers can report every
//! problem in a single pass.
//!
//! Comments double as section headers: the first meaningful line of each
//! comment block titles the requirements that follow it.

pub mod error;
pub mod line;
pub mod name;
pub mod specifier;
pub mod version;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

pub use error::{ManifestError, ParseError};
pub use line::{Directive, Line, Requirement, parse_line};
pub use name::PackageName;
pub use specifier::{Operator, Specifier, SpecifierSet};
pub use version::Version;

/// Includes nested deeper than this are rejected.
pub const MAX_INCLUDE_DEPTH: usize = 16;

/// One logical line of a manifest file.
#[derive(Clone, Debug)]
pub struct Entry {
    /// 1-based number of the first physical line.
    pub line_no: usize,
    pub raw: String,
    pub line: Result<Line, ParseError>,
    pub section: Option<String>,
}

/// A requirement together with where it was declared.
#[derive(Clone, Copy, Debug)]
pub struct Located<'a> {
    pub origin: &'a Path,
    pub line_no: usize,
    pub section: Option<&'a str>,
    pub requirement: &'a Requirement,
}

#[derive(Clone, Copy, Debug)]
pub struct ParseIssue<'a> {
    pub origin: &'a Path,
    pub line_no: usize,
    pub raw: &'a str,
    pub error: &'a ParseError,
}

#[derive(Clone, Debug)]
pub struct Section<'a> {
    pub title: Option<&'a str>,
    pub requirements: Vec<Located<'a>>,
}

#[derive(Clone, Debug)]
pub struct Manifest {
    origin: PathBuf,
    entries: Vec<Entry>,
    includes: Vec<Manifest>,
}

impl Manifest {
    /// Parses manifest text. Includes are recorded but not followed.
    pub fn parse(text: &str, origin: impl Into<PathBuf>) -> Self {
        let mut entries = Vec::new();
        let mut section: Option<String> = None;
        let mut in_comment_block = false;
        let mut block_titled = false;

        for (line_no, raw) in logical_lines(text) {
            let line = parse_line(&raw);

            match &line {
                Ok(Line::Comment(text)) => {
                    if !in_comment_block {
                        in_comment_block = true;
                        block_titled = false;
                    }
                    if !block_titled && text.chars().any(char::is_alphanumeric) {
                        section = Some(text.clone());
                        block_titled = true;
                    }
                }
                _ => in_comment_block = false,
            }

            entries.push(Entry {
                line_no,
                raw,
                line,
                section: section.clone(),
            });
        }

        Self {
            origin: origin.into(),
            entries,
            includes: Vec::new(),
        }
    }

    /// Reads `path` and recursively loads every `-r` include.
    ///
    /// A file reached through several include paths is loaded only once.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let mut stack = Vec::new();
        let mut loaded = HashSet::new();
        Self::load_nested(path.as_ref(), &mut stack, &mut loaded)
    }

    fn load_nested(
        path: &Path,
        stack: &mut Vec<PathBuf>,
        loaded: &mut HashSet<PathBuf>,
    ) -> Result<Self, ManifestError> {
        let canonical = canonical_path(path);

        if stack.contains(&canonical) {
            return Err(ManifestError::IncludeCycle(path.to_path_buf()));
        }
        if stack.len() >= MAX_INCLUDE_DEPTH {
            return Err(ManifestError::IncludeTooDeep {
                path: path.to_path_buf(),
                limit: MAX_INCLUDE_DEPTH,
            });
        }

        let text = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut manifest = Self::parse(&text, path);
        debug!(
            "Loaded {} with {} entries",
            path.display(),
            manifest.entries.len()
        );

        loaded.insert(canonical.clone());
        stack.push(canonical);
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        for target in manifest.include_targets() {
            if target.contains("://") {
                warn!("Skipping remote include '{target}' in {}", path.display());
                continue;
            }

            let target_path = base.join(&target);
            let key = canonical_path(&target_path);
            if loaded.contains(&key) && !stack.contains(&key) {
                debug!("{} is already loaded", target_path.display());
                continue;
            }

            let included = Self::load_nested(&target_path, stack, loaded)?;
            manifest.includes.push(included);
        }
        stack.pop();

        Ok(manifest)
    }

    fn include_targets(&self) -> Vec<String> {
        self.directives()
            .filter_map(|directive| match directive {
                Directive::Include(target) => Some(target.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn includes(&self) -> &[Manifest] {
        &self.includes
    }

    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.entries.iter().filter_map(|entry| match &entry.line {
            Ok(Line::Directive(directive)) => Some(directive),
            _ => None,
        })
    }

    /// Requirements declared in this file only.
    pub fn own_requirements(&self) -> impl Iterator<Item = Located<'_>> {
        self.entries.iter().filter_map(|entry| match &entry.line {
            Ok(Line::Requirement(requirement)) => Some(Located {
                origin: &self.origin,
                line_no: entry.line_no,
                section: entry.section.as_deref(),
                requirement,
            }),
            _ => None,
        })
    }

    /// Every requirement: this file first, then each include in order.
    pub fn requirements(&self) -> Vec<Located<'_>> {
        let mut out: Vec<Located<'_>> = self.own_requirements().collect();
        for include in &self.includes {
            out.extend(include.requirements());
        }
        out
    }

    /// Every line that failed to parse, including those of includes.
    pub fn issues(&self) -> Vec<ParseIssue<'_>> {
        let mut out: Vec<ParseIssue<'_>> = self
            .entries
            .iter()
            .filter_map(|entry| match &entry.line {
                Err(error) => Some(ParseIssue {
                    origin: &self.origin,
                    line_no: entry.line_no,
                    raw: &entry.raw,
                    error,
                }),
                Ok(_) => None,
            })
            .collect();

        for include in &self.includes {
            out.extend(include.issues());
        }
        out
    }

    /// Requirements of this file grouped by the comment section they follow.
    pub fn sections(&self) -> Vec<Section<'_>> {
        let mut sections: Vec<Section<'_>> = Vec::new();

        for located in self.own_requirements() {
            match sections.last_mut() {
                Some(last) if last.title == located.section => last.requirements.push(located),
                _ => sections.push(Section {
                    title: located.section,
                    requirements: vec![located],
                }),
            }
        }
        sections
    }

    /// Looks up a requirement by any spelling of its name.
    pub fn find(&self, name: &str) -> Option<Located<'_>> {
        let wanted = name::normalize(name);
        self.requirements()
            .into_iter()
            .find(|located| located.requirement.name.normalized() == wanted)
    }

    /// Normalized names of every declared requirement.
    pub fn package_names(&self) -> HashSet<String> {
        self.requirements()
            .iter()
            .map(|located| located.requirement.name.normalized().to_string())
            .collect()
    }
}

fn canonical_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Joins `\` continuations, yielding each logical line with its first line number.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, physical) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = physical.trim_end();

        let (start, mut buffer) = pending.take().unwrap_or((line_no, String::new()));

        match trimmed.strip_suffix('\\') {
            Some(head) => {
                buffer.push_str(head);
                pending = Some((start, buffer));
            }
            None => {
                buffer.push_str(trimmed);
                out.push((start, buffer));
            }
        }
    }

    if let Some(rest) = pending {
        out.push(rest);
    }
    out
}
