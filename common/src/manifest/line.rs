//! Single-line grammar of a requirements manifest.
//!
//! A logical line is one of:
//! * blank,
//! * a comment (`# Core Django`),
//! * an option directive (`-r base.txt`, `--index-url ...`),
//! * a requirement (`Django==5.1.5`, `celery[redis]>=5.3; python_version>"3.9"`).

use serde::Serialize;

use crate::manifest::error::ParseError;
use crate::manifest::name::PackageName;
use crate::manifest::specifier::SpecifierSet;
use crate::manifest::version::Version;

#[derive(Clone, Debug, Serialize)]
pub struct Requirement {
    pub name: PackageName,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
    pub specifiers: SpecifierSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub editable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_comment: Option<String>,
}

impl Requirement {
    /// The exact version for a `name==version` line.
    pub fn pinned(&self) -> Option<&Version> {
        self.specifiers.pinned()
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned().is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "option", content = "value", rename_all = "kebab-case")]
pub enum Directive {
    Include(String),
    Constraint(String),
    IndexUrl(String),
    ExtraIndexUrl(String),
    Editable(String),
    Other(String),
}

#[derive(Clone, Debug)]
pub enum Line {
    Blank,
    Comment(String),
    Directive(Directive),
    Requirement(Requirement),
}

/// Parses one logical line (continuations already joined).
pub fn parse_line(text: &str) -> Result<Line, ParseError> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Ok(Line::Blank);
    }
    if let Some(comment) = trimmed.strip_prefix('#') {
        return Ok(Line::Comment(comment.trim().to_string()));
    }

    let (body, inline_comment) = split_inline_comment(trimmed);

    if body.starts_with('-') {
        return parse_directive(body).map(|directive| match directive {
            Directive::Editable(target) => match editable_name(&target) {
                Some(name) => Line::Requirement(Requirement {
                    name,
                    extras: Vec::new(),
                    specifiers: SpecifierSet::default(),
                    url: Some(target),
                    marker: None,
                    editable: true,
                    inline_comment,
                }),
                None => Line::Directive(Directive::Editable(target)),
            },
            other => Line::Directive(other),
        });
    }

    let mut requirement = parse_requirement(body)?;
    requirement.inline_comment = inline_comment;
    Ok(Line::Requirement(requirement))
}

/// An inline comment starts at a `#` preceded by whitespace.
pub fn split_inline_comment(line: &str) -> (&str, Option<String>) {
    let bytes = line.as_bytes();
    let position = (1..bytes.len()).find(|&i| bytes[i] == b'#' && bytes[i - 1].is_ascii_whitespace());

    match position {
        Some(i) => (
            line[..i].trim_end(),
            Some(line[i + 1..].trim().to_string()),
        ),
        None => (line, None),
    }
}

fn parse_directive(body: &str) -> Result<Directive, ParseError> {
    let (flag, value) = if body.starts_with("--") {
        match body.char_indices().find(|&(_, c)| c == '=' || c.is_whitespace()) {
            Some((i, sep)) => (&body[..i], body[i + sep.len_utf8()..].trim()),
            None => (body, ""),
        }
    } else {
        let split = body.char_indices().nth(2).map_or(body.len(), |(i, _)| i);
        (&body[..split], body[split..].trim())
    };

    let constructor: fn(String) -> Directive = match flag {
        "-r" | "--requirement" => Directive::Include,
        "-c" | "--constraint" => Directive::Constraint,
        "-i" | "--index-url" => Directive::IndexUrl,
        "--extra-index-url" => Directive::ExtraIndexUrl,
        "-e" | "--editable" => Directive::Editable,
        _ => return Ok(Directive::Other(body.to_string())),
    };

    if value.is_empty() {
        return Err(ParseError::MissingDirectiveValue(flag.to_string()));
    }
    Ok(constructor(value.to_string()))
}

/// Extracts the project name from `...#egg=name` on editable installs.
fn editable_name(target: &str) -> Option<PackageName> {
    let (_, fragment) = target.split_once("#egg=")?;
    let name = fragment.split('&').next()?;
    PackageName::new(name).ok()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

fn looks_like_path_or_url(token: &str) -> bool {
    if let Some((before_at, _)) = token.split_once('@') {
        if !before_at.is_empty() && before_at.chars().all(is_name_char) {
            return false;
        }
    }

    token.contains('/')
        || token.contains('\\')
        || token.starts_with('.')
        || [".whl", ".zip", ".tar.gz"].iter().any(|ext| token.ends_with(ext))
}

fn parse_requirement(body: &str) -> Result<Requirement, ParseError> {
    let first_token = body.split_whitespace().next().unwrap_or(body);
    if looks_like_path_or_url(first_token) {
        return Err(ParseError::UnnamedRequirement(body.to_string()));
    }

    let name_end = body.find(|c: char| !is_name_char(c)).unwrap_or(body.len());
    if name_end == 0 {
        return Err(ParseError::MissingName);
    }
    let name = PackageName::new(&body[..name_end])?;
    let mut rest = body[name_end..].trim_start();

    let mut extras = Vec::new();
    if let Some(after_bracket) = rest.strip_prefix('[') {
        let close = after_bracket.find(']').ok_or(ParseError::UnclosedExtras)?;
        for extra in after_bracket[..close].split(',').map(str::trim) {
            if extra.is_empty() {
                continue;
            }
            PackageName::new(extra).map_err(|_| ParseError::InvalidExtra(extra.to_string()))?;
            extras.push(extra.to_string());
        }
        rest = after_bracket[close + 1..].trim_start();
    }

    if let Some(after_at) = rest.strip_prefix('@') {
        let after_at = after_at.trim_start();
        let (url, tail) = match after_at.find(char::is_whitespace) {
            Some(i) => (&after_at[..i], after_at[i..].trim()),
            None => (after_at, ""),
        };
        if url.is_empty() {
            return Err(ParseError::EmptySpecifier);
        }

        let marker = match tail {
            "" => None,
            t => match t.strip_prefix(';') {
                Some(marker) => non_empty(marker),
                None => return Err(ParseError::MissingOperator(t.to_string())),
            },
        };

        return Ok(Requirement {
            name,
            extras,
            specifiers: SpecifierSet::default(),
            url: Some(url.to_string()),
            marker,
            editable: false,
            inline_comment: None,
        });
    }

    let (spec_text, marker) = match rest.split_once(';') {
        Some((spec, marker)) => (spec.trim(), non_empty(marker)),
        None => (rest.trim(), None),
    };

    let spec_text = spec_text
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(spec_text);

    Ok(Requirement {
        name,
        extras,
        specifiers: SpecifierSet::parse(spec_text)?,
        url: None,
        marker,
        editable: false,
        inline_comment: None,
    })
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
