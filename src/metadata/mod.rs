//! Build metadata consumed by the packaging step.
//!
//! After provisioning and resource bundling (or when the skip switch reuses
//! cached state), a single JSON record is written under the build directory
//! so the downstream packaging pipeline can read the provisioned release
//! timestamp, the resource archive update time, the eUICC info update time,
//! and per-platform artifact checksums without re-deriving any of them.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Filename of the metadata record under the build directory.
pub const METADATA_FILE: &str = "setup-metadata.json";

/// Filename of the externally maintained eUICC info timestamp.
pub const EUICC_INFO_FILE: &str = "euicc_info_update_time";

/// The record handed to the packaging step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMetadata {
    /// Creation time (ms) of the last fully-provisioned release.
    pub lpac_build_time: i64,

    /// Modification time (ms) of the language resource archive.
    pub language_pack_update_time: i64,

    /// eUICC info update time (ms), maintained outside this tool.
    pub euicc_info_update_time: i64,

    /// SHA-256 of each staged artifact bundle, keyed by platform.
    #[serde(default)]
    pub artifact_checksums: BTreeMap<String, String>,
}

impl BuildMetadata {
    /// Path of the metadata record under `build_dir`.
    pub fn path(build_dir: &Path) -> PathBuf {
        build_dir.join(METADATA_FILE)
    }

    /// Loads a previously written record.
    pub async fn load(build_dir: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(Self::path(build_dir)).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes the record as pretty-printed JSON. Returns the path written.
    pub async fn store(&self, build_dir: &Path) -> Result<PathBuf> {
        let path = Self::path(build_dir);
        tokio::fs::create_dir_all(build_dir).await?;
        tokio::fs::write(&path, serde_json::to_string_pretty(self)?).await?;
        Ok(path)
    }
}

/// Modification time of `path` in milliseconds, `None` when absent.
pub async fn file_mtime_millis(path: &Path) -> Result<Option<i64>> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => Ok(metadata
            .modified()
            .ok()
            .map(|t| chrono::DateTime::<chrono::Utc>::from(t).timestamp_millis())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Reads the eUICC info update timestamp from the build directory.
///
/// The file is produced by a separate refresh job. A missing or unparseable
/// file is logged and reported as 0 rather than failing the build.
pub async fn euicc_info_update_time(build_dir: &Path) -> Result<i64> {
    let path = build_dir.join(EUICC_INFO_FILE);
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => match content.trim().parse::<i64>() {
            Ok(millis) => Ok(millis),
            Err(_) => {
                log::warn!("Ignoring corrupt timestamp at {}: {content:?}", path.display());
                Ok(0)
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("No eUICC info timestamp at {}", path.display());
            Ok(0)
        }
        Err(e) => Err(e.into()),
    }
}
