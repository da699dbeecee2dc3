//! Build cache bookkeeping for provisioned releases.
//!
//! The cache record is a single plain-text integer: the creation time, in
//! milliseconds, of the most recently fully-provisioned release. It is read
//! at the start of a build and rewritten only after every download task of
//! the current invocation has succeeded, so a failed batch can never mark a
//! partially-fetched set as fresh.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::provision::{ProvisionTarget, StagingArea};

/// Filename of the cache record under the build directory.
pub const CACHE_FILE: &str = "lpac_build_time";

/// Persisted timestamp of the last fully-provisioned release.
#[derive(Debug, Clone)]
pub struct BuildCache {
    path: PathBuf,
}

impl BuildCache {
    /// Creates the cache rooted under `build_dir`.
    pub fn new(build_dir: &Path) -> Self {
        Self {
            path: build_dir.join(CACHE_FILE),
        }
    }

    /// Path of the cache record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cached release timestamp, if any.
    ///
    /// A missing record yields `None`. An unparseable record is logged and
    /// also treated as `None`, which invalidates the cache rather than
    /// aborting the build.
    pub async fn last_provisioned_millis(&self) -> Result<Option<i64>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => match content.trim().parse::<i64>() {
                Ok(millis) => Ok(Some(millis)),
                Err(_) => {
                    log::warn!(
                        "Ignoring corrupt cache record at {}: {content:?}",
                        self.path.display()
                    );
                    Ok(None)
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Decides whether staged artifacts are stale for `target`.
    ///
    /// Staleness holds when any of: no cached timestamp exists, the target
    /// is `all`, the staged bundle for the target is missing, or the release
    /// timestamp is newer than the cached one.
    pub fn is_stale(
        &self,
        target: &ProvisionTarget,
        cached: Option<i64>,
        release_millis: i64,
        staging: &StagingArea,
    ) -> bool {
        let Some(cached) = cached else {
            return true;
        };
        match target {
            ProvisionTarget::All => true,
            ProvisionTarget::Single(platform) => {
                !staging.is_staged(*platform) || release_millis > cached
            }
        }
    }

    /// Persists `millis` as the new cache record.
    ///
    /// Must only be called after the whole provisioning batch succeeded.
    /// Writing the same value twice is a no-op in effect.
    pub async fn commit(&self, millis: i64) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, millis.to_string()).await?;
        log::info!("Committed release timestamp {millis} to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    fn stage(staging: &StagingArea, platform: Platform) {
        std::fs::create_dir_all(staging.dir()).unwrap();
        std::fs::write(staging.artifact_path(platform), b"bundle").unwrap();
    }

    #[tokio::test]
    async fn missing_record_reads_as_none() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = BuildCache::new(tmp.path());
        assert_eq!(cache.last_provisioned_millis().await.unwrap(), None);
    }

    #[tokio::test]
    async fn commit_then_read_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = BuildCache::new(tmp.path());
        cache.commit(1_717_236_000_000).await.unwrap();
        assert_eq!(
            cache.last_provisioned_millis().await.unwrap(),
            Some(1_717_236_000_000)
        );
    }

    #[tokio::test]
    async fn record_is_plain_text() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = BuildCache::new(tmp.path());
        cache.commit(42).await.unwrap();
        let content = std::fs::read_to_string(cache.path()).unwrap();
        assert_eq!(content, "42");
    }

    #[tokio::test]
    async fn committing_same_value_twice_is_a_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = BuildCache::new(tmp.path());
        cache.commit(42).await.unwrap();
        let before = std::fs::read_to_string(cache.path()).unwrap();
        cache.commit(42).await.unwrap();
        let after = std::fs::read_to_string(cache.path()).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn corrupt_record_reads_as_none() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = BuildCache::new(tmp.path());
        std::fs::write(cache.path(), "not-a-number").unwrap();
        assert_eq!(cache.last_provisioned_millis().await.unwrap(), None);
    }

    #[test]
    fn stale_without_cached_timestamp() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = BuildCache::new(tmp.path());
        let staging = StagingArea::new(tmp.path());
        let target = ProvisionTarget::Single(Platform::LinuxX86);
        stage(&staging, Platform::LinuxX86);
        assert!(cache.is_stale(&target, None, 0, &staging));
    }

    #[test]
    fn all_target_is_always_stale() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = BuildCache::new(tmp.path());
        let staging = StagingArea::new(tmp.path());
        for platform in crate::platform::ALL_PLATFORMS {
            stage(&staging, platform);
        }
        assert!(cache.is_stale(&ProvisionTarget::All, Some(100), 50, &staging));
    }

    #[test]
    fn stale_when_staged_bundle_is_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = BuildCache::new(tmp.path());
        let staging = StagingArea::new(tmp.path());
        let target = ProvisionTarget::Single(Platform::LinuxX86);
        assert!(cache.is_stale(&target, Some(100), 50, &staging));
    }

    #[test]
    fn stale_when_release_is_newer() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = BuildCache::new(tmp.path());
        let staging = StagingArea::new(tmp.path());
        let target = ProvisionTarget::Single(Platform::LinuxX86);
        stage(&staging, Platform::LinuxX86);
        assert!(cache.is_stale(&target, Some(100), 101, &staging));
    }

    #[test]
    fn fresh_when_cached_matches_release_and_bundle_exists() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = BuildCache::new(tmp.path());
        let staging = StagingArea::new(tmp.path());
        let target = ProvisionTarget::Single(Platform::LinuxX86);
        stage(&staging, Platform::LinuxX86);
        assert!(!cache.is_stale(&target, Some(100), 100, &staging));
        assert!(!cache.is_stale(&target, Some(100), 99, &staging));
    }
}
