use std::path::PathBuf;

use thiserror::Error;

/// Why a single manifest line could not be understood.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("requirement has no package name")]
    MissingName,

    #[error("invalid package name '{0}'")]
    InvalidName(String),

    #[error("extras list is not closed with ']'")]
    UnclosedExtras,

    #[error("invalid extra name '{0}'")]
    InvalidExtra(String),

    #[error("expected a version operator in '{0}'")]
    MissingOperator(String),

    #[error("invalid version '{version}'")]
    InvalidVersion { version: String },

    #[error("empty version specifier")]
    EmptySpecifier,

    #[error("wildcard versions are only allowed with '==' and '!=', not '{op}'")]
    WildcardNotAllowed { op: String },

    #[error("'~=' needs at least two release segments, got '{0}'")]
    CompatibleTooShort(String),

    #[error("requirement '{0}' has no package name (use 'name @ url')")]
    UnnamedRequirement(String),

    #[error("option '{0}' expects a value")]
    MissingDirectiveValue(String),
}

/// Failures loading a manifest file and its includes.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("include cycle detected at '{0}'")]
    IncludeCycle(PathBuf),

    #[error("includes nested deeper than {limit} levels at '{path}'")]
    IncludeTooDeep { path: PathBuf, limit: usize },
}
