use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use pinlist_common::config::IndexSettings;
use pinlist_common::manifest::{PackageName, Version};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::{IndexError, PackageIndex};

/// Client for the PyPI JSON API (`GET /pypi/<name>/json`).
pub struct PypiIndex {
    base_url: String,
    client: Client,
}

#[derive(Deserialize)]
struct ProjectResponse {
    #[serde(default)]
    releases: HashMap<String, Vec<ReleaseFile>>,
}

#[derive(Deserialize)]
struct ReleaseFile {
    #[serde(default)]
    yanked: bool,
}

impl PypiIndex {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, IndexError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pinlist/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_settings(settings: &IndexSettings) -> Result<Self, IndexError> {
        Self::new(&settings.url, Duration::from_secs(settings.timeout_secs))
    }

    fn project_url(&self, name: &PackageName) -> String {
        format!("{}/pypi/{}/json", self.base_url, name.normalized())
    }
}

#[async_trait]
impl PackageIndex for PypiIndex {
    async fn releases(&self, name: &PackageName) -> Result<Option<Vec<Version>>, IndexError> {
        let url = self.project_url(name);
        debug!("Fetching releases for {} from {}", name, url);

        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(IndexError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let versions = parse_project(&body)?;

        debug!("{} has {} installable releases", name, versions.len());
        Ok(Some(versions))
    }
}

/// Extracts installable versions, ascending. A release counts when at least
/// one of its files is not yanked. Non PEP 440 keys are skipped.
fn parse_project(body: &str) -> Result<Vec<Version>, IndexError> {
    let project: ProjectResponse =
        serde_json::from_str(body).map_err(|e| IndexError::DeserializeFailed(e.to_string()))?;

    let mut versions: Vec<Version> = project
        .releases
        .into_iter()
        .filter(|(_, files)| files.iter().any(|file| !file.yanked))
        .filter_map(|(key, _)| match Version::parse(&key) {
            Ok(version) => Some(version),
            Err(_) => {
                debug!("Skipping legacy version key '{key}'");
                None
            }
        })
        .collect();

    versions.sort();
    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DJANGO_JSON: &str = r#"{
        "info": {"name": "Django", "version": "5.1.5"},
        "releases": {
            "5.1.4": [{"filename": "Django-5.1.4.tar.gz", "yanked": false}],
            "5.1.5": [{"filename": "Django-5.1.5.tar.gz"}, {"filename": "Django-5.1.5-py3-none-any.whl"}],
            "5.2a1": [{"filename": "Django-5.2a1.tar.gz", "yanked": false}],
            "5.0.99": [{"filename": "Django-5.0.99.tar.gz", "yanked": true}],
            "4.0.0": [],
            "0.91-legacy-build": [{"filename": "old.tar.gz"}]
        }
    }"#;

    #[test]
    fn keeps_installable_pep440_releases_sorted() {
        let versions: Vec<String> = parse_project(DJANGO_JSON)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(versions, vec!["5.1.4", "5.1.5", "5.2a1"]);
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        assert!(matches!(
            parse_project("<html>oops</html>"),
            Err(IndexError::DeserializeFailed(_))
        ));
    }

    #[test]
    fn url_uses_normalized_name() {
        let index = PypiIndex::new("https://pypi.org/", Duration::from_secs(1)).unwrap();
        let name = PackageName::new("Django_Filter").unwrap();
        assert_eq!(index.project_url(&name), "https://pypi.org/pypi/django-filter/json");
    }
}
