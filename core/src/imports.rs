//! # Import Audit
//!
//! Cross-checks a Python source tree against a manifest:
//! every third-party module the code imports should be provided by a
//! declared distribution. Declared distributions that are never imported are
//! reported too, though many of them (servers, database drivers, plugins)
//! are legitimately runtime-only.

mod known;
pub mod parse;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use pinlist_common::config::ImportSettings;
use pinlist_common::manifest::{Manifest, name};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

pub use parse::{ImportedModule, parse_imports};

const SKIPPED_DIRS: &[&str] = &[
    "__pycache__",
    "venv",
    "env",
    "node_modules",
    "build",
    "dist",
    "site-packages",
];

#[derive(Error, Debug)]
pub enum ImportScanError {
    #[error("'{0}' is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    StandardLibrary,
    FirstParty,
    ThirdParty,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ImportSite {
    pub file: PathBuf,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Undeclared {
    pub distribution: String,
    pub modules: BTreeSet<String>,
    pub sites: Vec<ImportSite>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub files_scanned: usize,
    pub first_party: BTreeSet<String>,
    pub stdlib: BTreeSet<String>,
    /// Declared distributions that some import resolves to.
    pub used: BTreeSet<String>,
    pub undeclared: Vec<Undeclared>,
    pub unused: Vec<String>,
}

/// Classifies modules and maps third-party ones to distributions.
pub struct ModuleResolver {
    first_party: BTreeSet<String>,
    aliases: BTreeMap<String, String>,
}

impl ModuleResolver {
    pub fn new(first_party: BTreeSet<String>, aliases: BTreeMap<String, String>) -> Self {
        Self {
            first_party,
            aliases,
        }
    }

    pub fn kind(&self, module: &str) -> ModuleKind {
        if self.first_party.contains(module) {
            ModuleKind::FirstParty
        } else if known::is_stdlib(module) {
            ModuleKind::StandardLibrary
        } else {
            ModuleKind::ThirdParty
        }
    }

    /// Candidate distributions for a third-party module, most likely first.
    pub fn distributions(&self, module: &str) -> Vec<String> {
        if let Some(dist) = self.aliases.get(module) {
            return vec![dist.clone()];
        }
        match known::builtin_distributions(module) {
            Some(dists) => dists.iter().map(ToString::to_string).collect(),
            None => vec![module.to_string()],
        }
    }
}

/// Runs the full audit of `root` against `manifest`.
pub fn audit(
    manifest: &Manifest,
    root: &Path,
    settings: &ImportSettings,
) -> Result<ImportReport, ImportScanError> {
    if !root.is_dir() {
        return Err(ImportScanError::NotADirectory(root.to_path_buf()));
    }

    let mut first_party = first_party_modules(root)?;
    first_party.extend(settings.first_party.iter().cloned());

    let resolver = ModuleResolver::new(first_party.clone(), settings.aliases.clone());
    let files = collect_sources(root)?;
    let imports = scan_files(root, &files)?;

    info!("Scanned {} Python files under {}", files.len(), root.display());

    let declared: HashSet<String> = manifest.package_names();
    let mut report = ImportReport {
        files_scanned: files.len(),
        first_party,
        ..Default::default()
    };
    let mut undeclared: BTreeMap<String, Undeclared> = BTreeMap::new();

    for (site, module) in imports {
        match resolver.kind(&module) {
            ModuleKind::StandardLibrary => {
                report.stdlib.insert(module);
            }
            ModuleKind::FirstParty => {}
            ModuleKind::ThirdParty => {
                let candidates = resolver.distributions(&module);
                let provided = candidates
                    .iter()
                    .map(|dist| name::normalize(dist))
                    .find(|dist| declared.contains(dist));

                match provided {
                    Some(dist) => {
                        report.used.insert(dist);
                    }
                    None => {
                        let primary = candidates[0].clone();
                        let entry = undeclared
                            .entry(name::normalize(&primary))
                            .or_insert_with(|| Undeclared {
                                distribution: primary,
                                modules: BTreeSet::new(),
                                sites: Vec::new(),
                            });
                        entry.modules.insert(module);
                        entry.sites.push(site);
                    }
                }
            }
        }
    }

    for entry in undeclared.values_mut() {
        entry.sites.sort();
        entry.sites.dedup();
    }
    report.undeclared = undeclared.into_values().collect();

    let mut unused: Vec<String> = manifest
        .requirements()
        .iter()
        .filter(|located| !report.used.contains(located.requirement.name.normalized()))
        .map(|located| located.requirement.name.to_string())
        .collect();
    unused.sort_by_key(|n| name::normalize(n));
    unused.dedup_by_key(|n| name::normalize(n));
    report.unused = unused;

    debug!(
        "{} undeclared distributions, {} unused requirements",
        report.undeclared.len(),
        report.unused.len()
    );
    Ok(report)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

/// Every `.py` file under `root`, sorted.
pub fn collect_sources(root: &Path) -> Result<Vec<PathBuf>, ImportScanError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_entry(|e| !is_skipped_dir(e)) {
        let entry = entry?;
        let is_python = entry.path().extension().is_some_and(|ext| ext == "py");
        if entry.file_type().is_file() && is_python {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Top-level packages and modules directly under `root`.
pub fn first_party_modules(root: &Path) -> Result<BTreeSet<String>, ImportScanError> {
    let io_err = |source| ImportScanError::Io {
        path: root.to_path_buf(),
        source,
    };
    let mut modules = BTreeSet::new();

    for entry in fs::read_dir(root).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.starts_with('.') {
            continue;
        }

        if path.is_dir() {
            if contains_python(&path) {
                modules.insert(stem.to_string());
            }
        } else if path.extension().is_some_and(|ext| ext == "py") {
            modules.insert(stem.to_string());
        }
    }
    Ok(modules)
}

fn contains_python(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .any(|e| e.path().extension().is_some_and(|ext| ext == "py"))
        })
        .unwrap_or(false)
}

/// Parses every file in parallel. Sites are reported relative to `root`.
fn scan_files(root: &Path, files: &[PathBuf]) -> Result<Vec<(ImportSite, String)>, ImportScanError> {
    let per_file: Vec<Vec<(ImportSite, String)>> = files
        .par_iter()
        .map(|path| -> Result<Vec<(ImportSite, String)>, ImportScanError> {
            let bytes = fs::read(path).map_err(|source| ImportScanError::Io {
                path: path.clone(),
                source,
            })?;
            let source = String::from_utf8_lossy(&bytes);
            let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();

            Ok(parse_imports(&source)
                .into_iter()
                .map(|found| {
                    let site = ImportSite {
                        file: relative.clone(),
                        line: found.line,
                    };
                    (site, found.module)
                })
                .collect())
        })
        .collect::<Result<_, _>>()?;

    Ok(per_file.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn classification_prefers_first_party() {
        let resolver = ModuleResolver::new(
            ["notes".to_string(), "email".to_string()].into(),
            BTreeMap::new(),
        );
        assert_eq!(resolver.kind("notes"), ModuleKind::FirstParty);
        assert_eq!(resolver.kind("email"), ModuleKind::FirstParty);
        assert_eq!(resolver.kind("json"), ModuleKind::StandardLibrary);
        assert_eq!(resolver.kind("django"), ModuleKind::ThirdParty);
    }

    #[test]
    fn configured_aliases_override_builtins() {
        let aliases = [("rest_framework".to_string(), "my-drf-fork".to_string())].into();
        let resolver = ModuleResolver::new(BTreeSet::new(), aliases);
        assert_eq!(resolver.distributions("rest_framework"), vec!["my-drf-fork"]);
        assert_eq!(resolver.distributions("django_filters"), vec!["django-filter"]);
        assert_eq!(resolver.distributions("celery"), vec!["celery"]);
    }

    #[test]
    fn skips_hidden_and_virtualenv_dirs() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "notes/models.py", "import django\n");
        write(dir.path(), ".venv/lib/x.py", "import hidden\n");
        write(dir.path(), "venv/y.py", "import hidden\n");
        write(dir.path(), "notes/__pycache__/z.py", "import hidden\n");
        write(dir.path(), "README.md", "import nothing\n");

        let files = collect_sources(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("notes/models.py")]);
    }

    #[test]
    fn audits_a_django_tree() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "notes/views.py",
            "from rest_framework import viewsets\nfrom django_filters.rest_framework import DjangoFilterBackend\nfrom audit.models import AuditLog\nimport uuid\n",
        );
        write(dir.path(), "notes/signals.py", "from channels.layers import get_channel_layer\nfrom asgiref.sync import async_to_sync\n");
        write(dir.path(), "audit/models.py", "from django.db import models\n");
        write(dir.path(), "manage.py", "import os\nimport sys\n");

        let manifest = Manifest::parse(
            "Django==5.1.5\ndjangorestframework==3.15.2\nchannels==4.2.0\ncelery==5.4.0\n",
            "requirements.txt",
        );
        let report = audit(&manifest, dir.path(), &ImportSettings::default()).unwrap();

        assert_eq!(report.files_scanned, 4);
        assert!(report.first_party.contains("notes"));
        assert!(report.first_party.contains("manage"));
        assert!(report.stdlib.contains("uuid"));

        let undeclared: Vec<&str> = report.undeclared.iter().map(|u| u.distribution.as_str()).collect();
        assert_eq!(undeclared, vec!["asgiref", "django-filter"]);
        assert_eq!(
            report.undeclared[1].sites,
            vec![ImportSite { file: PathBuf::from("notes/views.py"), line: 2 }]
        );

        assert_eq!(report.unused, vec!["celery"]);
    }

    #[test]
    fn missing_root_is_rejected() {
        let manifest = Manifest::parse("", "r.txt");
        let err = audit(&manifest, Path::new("/no/such/tree"), &ImportSettings::default()).unwrap_err();
        assert!(matches!(err, ImportScanError::NotADirectory(_)));
    }
}
