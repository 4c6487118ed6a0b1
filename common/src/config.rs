//! Runtime configuration.
//!
//! Settings come from a TOML file (`--config FILE`, or `./pinlist.toml` when
//! present) and are then overridden by command-line flags.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_CONFIG_FILE: &str = "pinlist.toml";
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org";
pub const MAX_CONCURRENCY: usize = 64;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid setting: {0}")]
    Invalid(String),
}

pub struct Config {
    /// Hides the banner printed before every command.
    pub no_banner: bool,
    /// Quiet level. 1 drops headers, 2 prints only summaries.
    pub quiet: u8,
    /// Writes a single JSON document to stdout instead of terminal output.
    pub json: bool,
    pub settings: Settings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub lint: LintSettings,
    pub index: IndexSettings,
    pub imports: ImportSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LintSettings {
    /// Packages that may use ranges instead of an exact pin.
    pub allow_unpinned: Vec<String>,
    pub require_sorted: bool,
    /// Treat warnings as failures.
    pub deny_warnings: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexSettings {
    pub url: String,
    pub timeout_secs: u64,
    pub concurrency: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_INDEX_URL.to_string(),
            timeout_secs: 15,
            concurrency: 8,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportSettings {
    /// Module names that belong to the project itself.
    pub first_party: Vec<String>,
    /// Import name to distribution name, e.g. `yaml = "PyYAML"`.
    pub aliases: BTreeMap<String, String>,
}

impl Settings {
    /// Loads `explicit` if given, otherwise `./pinlist.toml` if it exists,
    /// otherwise the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        let settings: Settings =
            toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.clone(), source })?;

        debug!("Loaded settings from {}", path.display());
        settings.validated()
    }

    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.index.url.trim().is_empty() {
            return Err(ConfigError::Invalid("index.url must not be empty".into()));
        }
        if self.index.timeout_secs == 0 {
            return Err(ConfigError::Invalid("index.timeout_secs must be positive".into()));
        }

        let clamped = self.index.concurrency.clamp(1, MAX_CONCURRENCY);
        if clamped != self.index.concurrency {
            warn!(
                "index.concurrency {} out of range, using {clamped}",
                self.index.concurrency
            );
            self.index.concurrency = clamped;
        }

        self.index.url = self.index.url.trim_end_matches('/').to_string();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.index.url, DEFAULT_INDEX_URL);
        assert_eq!(settings.index.concurrency, 8);
        assert!(!settings.lint.require_sorted);
    }

    #[test]
    fn reads_every_section() {
        let settings: Settings = toml::from_str(
            r#"
            [lint]
            allow_unpinned = ["pip"]
            require_sorted = true

            [index]
            url = "http://localhost:8080/"
            concurrency = 200

            [imports]
            first_party = ["notes"]
            [imports.aliases]
            yaml = "PyYAML"
            "#,
        )
        .unwrap();
        let settings = settings.validated().unwrap();

        assert_eq!(settings.lint.allow_unpinned, vec!["pip"]);
        assert!(settings.lint.require_sorted);
        assert_eq!(settings.index.url, "http://localhost:8080");
        assert_eq!(settings.index.concurrency, MAX_CONCURRENCY);
        assert_eq!(settings.index.timeout_secs, 15);
        assert_eq!(settings.imports.aliases["yaml"], "PyYAML");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Settings>("[lint]\nstrict = true\n").is_err());
    }

    #[test]
    fn explicit_missing_file_errors() {
        let err = Settings::load(Some(Path::new("/no/such/pinlist.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pinlist.toml");
        fs::write(&path, "[index]\ntimeout_secs = 3\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.index.timeout_secs, 3);
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let settings: Settings = toml::from_str("[index]\ntimeout_secs = 0\n").unwrap();
        assert!(matches!(settings.validated(), Err(ConfigError::Invalid(_))));
    }
}
