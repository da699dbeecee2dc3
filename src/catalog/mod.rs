//! Upstream release catalog.
//!
//! Fetches the latest release of the fixed `estkme-group/lpac` repository
//! from the GitHub Releases API and memoizes it for the rest of the build
//! invocation. The catalog is an explicit value owned by the pipeline and
//! handed to whoever needs release data; there is no global state.

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::error::{Result, SetupError};

/// Production GitHub API base URL.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// The fixed upstream repository the artifact bundles are released from.
pub const UPSTREAM_REPO: &str = "estkme-group/lpac";

/// User-Agent header sent with release API requests.
const USER_AGENT: &str = "lpac-provisioner";

/// Request timeout for catalog queries.
const CATALOG_TIMEOUT: Duration = Duration::from_secs(30);

/// Metadata of an upstream release.
///
/// Non-critical fields use `#[serde(default)]` so schema expansion on the
/// API side does not break deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// The git tag of the release (e.g. "v2.1.0").
    #[serde(default)]
    pub tag_name: String,

    /// When the release was created.
    pub created_at: chrono::DateTime<chrono::Utc>,

    /// Downloadable assets, in the order the API lists them.
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Release {
    /// Release creation time in milliseconds since the Unix epoch.
    ///
    /// This is the value persisted by the build cache.
    pub fn created_at_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}

/// A single downloadable asset attached to a release.
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    /// Asset filename (e.g. "lpac-linux-x86_64.zip").
    pub name: String,

    /// Direct download URL for the asset.
    pub browser_download_url: String,
}

/// Lazily-fetched, per-invocation view of the latest upstream release.
///
/// The release is fetched at most once; repeated calls to
/// [`ReleaseCatalog::latest_release`] return the memoized value.
pub struct ReleaseCatalog {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    release: OnceCell<Release>,
}

impl ReleaseCatalog {
    /// Creates a catalog against the production GitHub API.
    ///
    /// `token` is an optional bearer credential; anonymous access is used
    /// when it is absent.
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_base_url(GITHUB_API_BASE, token)
    }

    /// Creates a catalog against an arbitrary API base URL.
    ///
    /// This is the injectable entry point used by tests, which point it at a
    /// local HTTP server instead of the real GitHub API.
    pub fn with_base_url(api_base: &str, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(CATALOG_TIMEOUT)
            .build()
            .map_err(|e| SetupError::CatalogUnavailable {
                reason: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/repos/{}/releases/latest",
                api_base.trim_end_matches('/'),
                UPSTREAM_REPO
            ),
            token,
            release: OnceCell::new(),
        })
    }

    /// Returns the latest release, fetching it on first use.
    ///
    /// # Errors
    ///
    /// `CatalogUnavailable` when the API call cannot be completed, returns a
    /// non-success status, or yields a body that does not deserialize.
    pub async fn latest_release(&self) -> Result<&Release> {
        self.release
            .get_or_try_init(|| self.fetch_latest())
            .await
    }

    /// Returns the ordered asset list of the latest release.
    pub async fn assets(&self) -> Result<&[Asset]> {
        Ok(&self.latest_release().await?.assets)
    }

    async fn fetch_latest(&self) -> Result<Release> {
        log::info!("Fetching latest release of {UPSTREAM_REPO}");

        let mut request = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SetupError::CatalogUnavailable {
                reason: format!("Request to {} failed: {e}", self.endpoint),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SetupError::CatalogUnavailable {
                reason: format!("HTTP {status} from {}", self.endpoint),
            });
        }

        let release: Release =
            response
                .json()
                .await
                .map_err(|e| SetupError::CatalogUnavailable {
                    reason: format!("Failed to decode release metadata: {e}"),
                })?;

        log::info!(
            "Latest release {} created at {} ({} assets)",
            release.tag_name,
            release.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            release.assets.len()
        );

        Ok(release)
    }
}
