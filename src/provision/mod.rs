//! Artifact provisioning.
//!
//! This module owns the staleness-gated download pipeline: validating the
//! requested target, fanning out one download task per platform, fanning in,
//! and committing the build cache only after every task succeeded.

mod cache;
mod checksum;
mod download;
mod orchestrator;
mod staging;

pub use cache::{BuildCache, CACHE_FILE};
pub use checksum::file_sha256;
pub use orchestrator::Provisioner;
pub use staging::StagingArea;

use std::path::PathBuf;

use crate::error::{Result, SetupError};
use crate::platform::{ALL_PLATFORMS, Platform, valid_keys};

/// A validated provisioning target: one platform, or every platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionTarget {
    /// Every platform in the fixed mapping.
    All,
    /// A single known platform.
    Single(Platform),
}

impl ProvisionTarget {
    /// The sentinel target key selecting every platform.
    pub const ALL_KEY: &'static str = "all";

    /// Parses a target string into a validated target.
    ///
    /// # Errors
    ///
    /// `UnknownTarget` (listing the valid keys) when the string is neither
    /// `all` nor a known platform key. Nothing is written and no network
    /// I/O happens on this path.
    pub fn parse(target: &str) -> Result<Self> {
        if target == Self::ALL_KEY {
            return Ok(Self::All);
        }
        Platform::from_key(target)
            .map(Self::Single)
            .ok_or_else(|| SetupError::UnknownTarget {
                target: target.to_string(),
                valid: valid_keys(),
            })
    }

    /// The platforms selected by this target, in mapping order.
    pub fn platforms(&self) -> Vec<Platform> {
        match self {
            Self::All => ALL_PLATFORMS.to_vec(),
            Self::Single(platform) => vec![*platform],
        }
    }
}

/// A per-platform artifact bundle staged on local disk.
#[derive(Debug, Clone)]
pub struct StagedArtifact {
    /// The platform the bundle was staged for.
    pub platform: Platform,

    /// Location of the staged bundle file.
    pub path: PathBuf,

    /// Lowercase hex SHA-256 of the staged file.
    pub sha256: String,
}
