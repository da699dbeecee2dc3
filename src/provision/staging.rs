//! Staging layout for downloaded artifact bundles.

use std::path::{Path, PathBuf};

use crate::platform::Platform;

/// Directory under the build directory holding staged bundles.
const STAGING_DIR: &str = "lpac";

/// The on-disk staging area for per-platform artifact bundles.
///
/// One file per platform, named `<platform-key>.zip`. Files never collide
/// across platforms, so concurrent download tasks need no coordination.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    /// Creates the staging layout rooted under `build_dir`.
    pub fn new(build_dir: &Path) -> Self {
        Self {
            dir: build_dir.join(STAGING_DIR),
        }
    }

    /// The staging directory itself.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the staged bundle for `platform`.
    pub fn artifact_path(&self, platform: Platform) -> PathBuf {
        self.dir.join(format!("{}.zip", platform.key()))
    }

    /// Whether a staged bundle exists for `platform`.
    pub fn is_staged(&self, platform: Platform) -> bool {
        self.artifact_path(platform).is_file()
    }
}
