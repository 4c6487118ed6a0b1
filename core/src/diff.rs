//! Differences between two manifests, keyed by normalized package name.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use pinlist_common::manifest::{Manifest, Requirement, Version};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "change", rename_all = "kebab-case")]
pub enum Change {
    Added { name: String, spec: String },
    Removed { name: String, spec: String },
    Upgraded { name: String, from: Version, to: Version },
    Downgraded { name: String, from: Version, to: Version },
    Respecified { name: String, from: String, to: String },
}

impl Change {
    pub fn name(&self) -> &str {
        match self {
            Change::Added { name, .. }
            | Change::Removed { name, .. }
            | Change::Upgraded { name, .. }
            | Change::Downgraded { name, .. }
            | Change::Respecified { name, .. } => name,
        }
    }
}

/// Describes everything after the name: extras, specifiers or URL, marker.
pub fn describe(requirement: &Requirement) -> String {
    let mut out = String::new();

    if !requirement.extras.is_empty() {
        out.push_str(&format!("[{}]", requirement.extras.join(",")));
    }
    match &requirement.url {
        Some(url) => out.push_str(&format!(" @ {url}")),
        None => out.push_str(&requirement.specifiers.to_string()),
    }
    if let Some(marker) = &requirement.marker {
        out.push_str(&format!("; {marker}"));
    }

    if out.is_empty() { "*".to_string() } else { out }
}

fn index(manifest: &Manifest) -> BTreeMap<String, &Requirement> {
    let mut map = BTreeMap::new();
    for located in manifest.requirements() {
        map.entry(located.requirement.name.normalized().to_string())
            .or_insert(located.requirement);
    }
    map
}

fn same_extras_and_marker(a: &Requirement, b: &Requirement) -> bool {
    let extras = |r: &Requirement| -> BTreeSet<String> {
        r.extras.iter().map(|e| e.to_ascii_lowercase()).collect()
    };
    extras(a) == extras(b) && a.marker == b.marker && a.url == b.url
}

/// Lists what changed going from `old` to `new`, sorted by normalized name.
pub fn diff(old: &Manifest, new: &Manifest) -> Vec<Change> {
    let before = index(old);
    let after = index(new);

    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    let mut changes = Vec::new();

    for key in keys {
        let change = match (before.get(key), after.get(key)) {
            (None, Some(added)) => Some(Change::Added {
                name: added.name.to_string(),
                spec: describe(added),
            }),
            (Some(removed), None) => Some(Change::Removed {
                name: removed.name.to_string(),
                spec: describe(removed),
            }),
            (Some(from), Some(to)) => compare(from, to),
            (None, None) => None,
        };
        changes.extend(change);
    }

    changes
}

fn compare(from: &Requirement, to: &Requirement) -> Option<Change> {
    let name = to.name.to_string();

    if let (Some(old), Some(new)) = (from.pinned(), to.pinned()) {
        if same_extras_and_marker(from, to) {
            return match old.cmp(new) {
                Ordering::Less => Some(Change::Upgraded {
                    name,
                    from: old.clone(),
                    to: new.clone(),
                }),
                Ordering::Greater => Some(Change::Downgraded {
                    name,
                    from: old.clone(),
                    to: new.clone(),
                }),
                Ordering::Equal => None,
            };
        }
    }

    let (old, new) = (describe(from), describe(to));
    (old != new).then_some(Change::Respecified {
        name,
        from: old,
        to: new,
    })
}
