#![cfg(test)]
use crate::fixture;
use async_trait::async_trait;
use pinlist_common::manifest::{Manifest, PackageName, Version};
use pinlist_core::index::{IndexError, PackageIndex};
use pinlist_core::resolver::{self, Resolution};
use std::collections::HashMap;

/// Serves every pin of the fixture plus one newer Django release.
struct FixtureIndex {
    releases: HashMap<String, Vec<Version>>,
}

impl FixtureIndex {
    fn from_manifest(manifest: &Manifest) -> Self {
        let mut releases: HashMap<String, Vec<Version>> = HashMap::new();
        for located in manifest.requirements() {
            if let Some(version) = located.requirement.pinned() {
                releases
                    .entry(located.requirement.name.normalized().to_string())
                    .or_default()
                    .push(version.clone());
            }
        }
        releases
            .entry("django".into())
            .or_default()
            .push(Version::parse("5.2").unwrap());
        Self { releases }
    }
}

#[async_trait]
impl PackageIndex for FixtureIndex {
    async fn releases(&self, name: &PackageName) -> Result<Option<Vec<Version>>, IndexError> {
        Ok(self.releases.get(name.normalized()).cloned())
    }
}

#[tokio::test]
async fn every_fixture_pin_resolves() -> anyhow::Result<()> {
    let manifest = Manifest::load(fixture("requirements.txt"))?;
    let index = FixtureIndex::from_manifest(&manifest);

    let results = resolver::resolve(&manifest, &index, 4, None).await;

    assert_eq!(results.len(), 17);
    assert!(results.iter().all(|r| !r.resolution.is_problem()));

    let outdated: Vec<_> = results
        .iter()
        .filter(|r| r.resolution.is_outdated())
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(outdated, ["Django"]);
    Ok(())
}

#[tokio::test]
async fn missing_pin_is_reported() -> anyhow::Result<()> {
    let base = Manifest::load(fixture("requirements.txt"))?;
    let index = FixtureIndex::from_manifest(&base);

    let manifest = Manifest::parse("celery==9.9.9\nleftpad==1.0\n", "requirements.txt");
    let results = resolver::resolve(&manifest, &index, 2, None).await;

    assert!(matches!(results[0].resolution, Resolution::MissingVersion { .. }));
    assert!(matches!(results[1].resolution, Resolution::UnknownPackage));

    let json = serde_json::to_value(&results)?;
    assert_eq!(json[0]["resolution"]["status"], "missing-version");
    assert_eq!(json[1]["resolution"]["status"], "unknown-package");
    Ok(())
}
