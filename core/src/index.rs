//! The package-index abstraction.
//!
//! Resolution only needs one question answered per package: which versions
//! exist? Implementations range from the live PyPI JSON API ([`pypi`]) to
//! in-memory fakes in tests.

use async_trait::async_trait;
use pinlist_common::manifest::{PackageName, Version};
use thiserror::Error;

pub mod pypi;

pub use pypi::PypiIndex;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("index returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("failed to decode index response: {0}")]
    DeserializeFailed(String),
}

#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// All installable versions of `name`, or `None` when the index does not
    /// know the package.
    async fn releases(&self, name: &PackageName) -> Result<Option<Vec<Version>>, IndexError>;
}
