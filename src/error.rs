//! Error types for the provisioning pipeline.
//!
//! All failure modes abort the current build invocation; nothing is retried
//! or swallowed. The build cache is protected separately by committing only
//! after a fully successful provisioning batch.

use thiserror::Error;

/// Result type alias for provisioning operations
pub type Result<T> = std::result::Result<T, SetupError>;

/// Main error type for all provisioning operations
#[derive(Error, Debug)]
pub enum SetupError {
    /// Host OS/architecture could not be classified
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform {
        /// Host operating system as reported by the toolchain
        os: String,
        /// Host processor architecture as reported by the toolchain
        arch: String,
    },

    /// Explicit target not present in the platform mapping
    #[error("Unknown target {target}\nValid values are: [{valid}]")]
    UnknownTarget {
        /// The rejected target key
        target: String,
        /// Comma-separated list of valid platform keys
        valid: String,
    },

    /// Upstream release API unreachable or returned an error
    #[error("Release catalog unavailable: {reason}")]
    CatalogUnavailable {
        /// What went wrong talking to the release API
        reason: String,
    },

    /// Mapped asset name absent from the release's asset list
    #[error("Asset {asset} not found in release {release}")]
    AssetNotFound {
        /// The exact asset name that was looked up
        asset: String,
        /// The release the lookup ran against
        release: String,
    },

    /// Download failed with a non-success status or a transport error
    #[error("Download of {url} failed: {reason}")]
    Network {
        /// URL of the failed request
        url: String,
        /// HTTP status or transport failure description
        reason: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}
