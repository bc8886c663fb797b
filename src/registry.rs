//! Package Registry Client
//!
//! Resolves package names to their latest published version. The concrete
//! client talks to a NuGet v3 flat-container endpoint; the trait seam lets
//! tests and callers inject their own resolution.

use crate::error::RegistryError;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default public NuGet v3 flat-container base URL
pub const DEFAULT_REGISTRY_URL: &str = "https://api.nuget.org/v3-flatcontainer";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolves a package name to its latest published version.
///
/// Cancellation is cooperative: dropping the returned future abandons the
/// request, and the client enforces a per-request timeout.
#[async_trait]
pub trait PackageRegistryClient: Send + Sync {
    async fn get_latest_version(&self, package: &str) -> Result<String, RegistryError>;
}

#[derive(Debug, Deserialize)]
struct FlatContainerIndex {
    versions: Vec<String>,
}

/// NuGet flat-container client with an in-process version memo.
///
/// `GET {base}/{lowercase-id}/index.json` returns every published version in
/// ascending order; the last entry is the latest. 404 means the package does
/// not exist.
pub struct NuGetClient {
    http: reqwest::Client,
    base_url: String,
    cache: RwLock<HashMap<String, String>>,
}

impl NuGetClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::Transport {
                package: String::new(),
                source: e,
            })?;
        Ok(NuGetClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn with_defaults() -> Result<Self, RegistryError> {
        NuGetClient::new(
            DEFAULT_REGISTRY_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    fn index_url(&self, package: &str) -> String {
        format!("{}/{}/index.json", self.base_url, package.to_lowercase())
    }
}

#[async_trait]
impl PackageRegistryClient for NuGetClient {
    #[instrument(skip(self))]
    async fn get_latest_version(&self, package: &str) -> Result<String, RegistryError> {
        if let Some(version) = self.cache.read().get(package) {
            return Ok(version.clone());
        }

        let response = self
            .http
            .get(self.index_url(package))
            .send()
            .await
            .map_err(|e| RegistryError::Transport {
                package: package.to_string(),
                source: e,
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::PackageNotFound {
                package: package.to_string(),
            });
        }
        let response = response
            .error_for_status()
            .map_err(|e| RegistryError::Transport {
                package: package.to_string(),
                source: e,
            })?;

        let index: FlatContainerIndex =
            response
                .json()
                .await
                .map_err(|e| RegistryError::Transport {
                    package: package.to_string(),
                    source: e,
                })?;

        let latest = index
            .versions
            .last()
            .cloned()
            .ok_or_else(|| RegistryError::MalformedResponse {
                package: package.to_string(),
                reason: "empty versions list".to_string(),
            })?;

        debug!(package, version = %latest, "resolved latest version");
        self.cache
            .write()
            .insert(package.to_string(), latest.clone());
        Ok(latest)
    }
}
