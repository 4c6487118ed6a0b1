//! Checks every requirement of a manifest against a [`PackageIndex`].
//!
//! Each distinct package is queried once, with a bounded number of requests
//! in flight. A failure for one package never aborts the others.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::stream::{self, StreamExt};
use pinlist_common::manifest::{Located, Manifest, PackageName, Version};
use serde::Serialize;
use tracing::{debug, warn};

use crate::diff::describe;
use crate::index::PackageIndex;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Resolution {
    /// The pinned version exists on the index.
    Pinned {
        version: Version,
        latest: Option<Version>,
    },
    /// The package exists but the pinned version does not.
    MissingVersion {
        version: Version,
        latest: Option<Version>,
    },
    Satisfiable {
        best: Version,
    },
    Unsatisfiable,
    UnknownPackage,
    /// URL and editable requirements are not looked up.
    Unchecked,
    Failed {
        reason: String,
    },
}

impl Resolution {
    pub fn is_problem(&self) -> bool {
        matches!(
            self,
            Resolution::MissingVersion { .. }
                | Resolution::Unsatisfiable
                | Resolution::UnknownPackage
                | Resolution::Failed { .. }
        )
    }

    /// A pin that exists but has a newer final release.
    pub fn is_outdated(&self) -> bool {
        match self {
            Resolution::Pinned {
                version,
                latest: Some(latest),
            } => latest > version,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Resolved {
    pub name: String,
    pub origin: PathBuf,
    pub line: usize,
    pub spec: String,
    pub resolution: Resolution,
}

type Releases = Result<Option<Vec<Version>>, String>;

/// Number of index lookups [`resolve`] will make for `manifest`.
pub fn lookup_count(manifest: &Manifest) -> usize {
    unique_packages(&manifest.requirements()).len()
}

fn unique_packages<'a>(requirements: &[Located<'a>]) -> BTreeMap<String, &'a PackageName> {
    let mut unique = BTreeMap::new();
    for located in requirements.iter().filter(|l| l.requirement.url.is_none()) {
        unique
            .entry(located.requirement.name.normalized().to_string())
            .or_insert(&located.requirement.name);
    }
    unique
}

/// Resolves every requirement in `manifest`, in declaration order.
///
/// `on_progress` receives the number of packages fetched so far.
pub async fn resolve<I>(
    manifest: &Manifest,
    index: &I,
    concurrency: usize,
    on_progress: Option<Box<dyn Fn(usize) + Send + Sync>>,
) -> Vec<Resolved>
where
    I: PackageIndex + ?Sized,
{
    let requirements = manifest.requirements();
    let unique = unique_packages(&requirements);

    debug!(
        "Querying {} packages with concurrency {}",
        unique.len(),
        concurrency
    );

    let fetched_count = AtomicUsize::new(0);
    let fetched: HashMap<String, Releases> = stream::iter(unique)
        .map(|(key, name)| async move {
            let releases = index.releases(name).await.map_err(|e| {
                warn!("Lookup of {} failed: {}", name, e);
                e.to_string()
            });
            (key, releases)
        })
        .buffer_unordered(concurrency.max(1))
        .inspect(|_| {
            let done = fetched_count.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(callback) = &on_progress {
                callback(done);
            }
        })
        .collect()
        .await;

    requirements
        .iter()
        .map(|located| Resolved {
            name: located.requirement.name.to_string(),
            origin: located.origin.to_path_buf(),
            line: located.line_no,
            spec: describe(located.requirement),
            resolution: classify(located, fetched.get(located.requirement.name.normalized())),
        })
        .collect()
}

fn classify(located: &Located<'_>, releases: Option<&Releases>) -> Resolution {
    let requirement = located.requirement;

    let versions = match releases {
        _ if requirement.url.is_some() => return Resolution::Unchecked,
        None => return Resolution::Unchecked,
        Some(Err(reason)) => {
            return Resolution::Failed {
                reason: reason.clone(),
            };
        }
        Some(Ok(None)) => return Resolution::UnknownPackage,
        Some(Ok(Some(versions))) => versions,
    };

    let latest = versions
        .iter()
        .filter(|v| !v.is_prerelease())
        .max()
        .or_else(|| versions.iter().max())
        .cloned();

    let specifiers = &requirement.specifiers;

    if let Some(pinned) = requirement.pinned() {
        let exists = versions.iter().any(|v| specifiers.contains(v, true));
        let version = pinned.clone();
        return if exists {
            Resolution::Pinned { version, latest }
        } else {
            Resolution::MissingVersion { version, latest }
        };
    }

    let best = versions
        .iter()
        .filter(|v| specifiers.contains(v, false))
        .max()
        .or_else(|| versions.iter().filter(|v| specifiers.contains(v, true)).max());

    match best {
        Some(best) => Resolution::Satisfiable { best: best.clone() },
        None => Resolution::Unsatisfiable,
    }
}
