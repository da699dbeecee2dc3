//! Provisioning orchestration.
//!
//! Coordinates target validation, the staleness gate, the per-platform
//! download fan-out, and the cache commit. The commit happens strictly after
//! every download task of the batch has reported success; the first task
//! failure aborts the remaining tasks and leaves the cache untouched.

use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::catalog::{Asset, ReleaseCatalog};
use crate::error::{Result, SetupError};
use crate::platform::Platform;
use crate::provision::{
    BuildCache, ProvisionTarget, StagedArtifact, StagingArea, checksum, download,
};

/// Orchestrates staleness-gated, concurrent artifact provisioning.
pub struct Provisioner {
    catalog: ReleaseCatalog,
    cache: BuildCache,
    staging: StagingArea,
    client: reqwest::Client,
}

impl Provisioner {
    /// Creates a provisioner writing under `build_dir`, reading release data
    /// from `catalog`.
    pub fn new(catalog: ReleaseCatalog, build_dir: &Path) -> Result<Self> {
        Ok(Self {
            catalog,
            cache: BuildCache::new(build_dir),
            staging: StagingArea::new(build_dir),
            client: download::download_client()?,
        })
    }

    /// The build cache backing the staleness decision.
    pub fn cache(&self) -> &BuildCache {
        &self.cache
    }

    /// The staging area downloads land in.
    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Provisions artifact bundles for `target`.
    ///
    /// `target` is a platform key or `all`. When the cache is fresh the
    /// existing staged bundles are returned without any download request.
    /// When stale, one download task per selected platform runs concurrently;
    /// all are awaited before the release timestamp is committed.
    ///
    /// # Errors
    ///
    /// * `UnknownTarget` - target is neither `all` nor a known platform key;
    ///   nothing is written and no network I/O happens
    /// * `CatalogUnavailable` - the release query failed
    /// * `AssetNotFound` - a mapped asset is absent from the release
    /// * `Network` - a download response was not a success, or transport
    ///   failed mid-stream
    /// * `Io` - staging the bundle on disk failed
    pub async fn provision(&self, target: &str) -> Result<Vec<StagedArtifact>> {
        let target = ProvisionTarget::parse(target)?;
        let platforms = target.platforms();

        let cached = self.cache.last_provisioned_millis().await?;
        let release = self.catalog.latest_release().await?;
        let release_millis = release.created_at_millis();

        if !self
            .cache
            .is_stale(&target, cached, release_millis, &self.staging)
        {
            log::info!("Staged bundles are up to date, skipping downloads");
            return self.collect_existing(&platforms).await;
        }

        let assets: Arc<[Asset]> = release.assets.clone().into();
        let release_label = if release.tag_name.is_empty() {
            release.created_at.to_rfc3339()
        } else {
            release.tag_name.clone()
        };

        let mut tasks = JoinSet::new();
        for platform in platforms.iter().copied() {
            let client = self.client.clone();
            let assets = Arc::clone(&assets);
            let release_label = release_label.clone();
            let dest = self.staging.artifact_path(platform);
            tasks.spawn(async move {
                stage_one(client, assets, release_label, platform, dest).await
            });
        }

        let mut staged = Vec::with_capacity(platforms.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(artifact)) => staged.push(artifact),
                Ok(Err(e)) => {
                    // First failure wins: cancel the remaining tasks and
                    // leave already-staged files of this batch in place. The
                    // cache stays at its previous value, so the next run
                    // re-provisions.
                    tasks.abort_all();
                    return Err(e);
                }
                Err(join_error) => {
                    tasks.abort_all();
                    return Err(
                        anyhow::anyhow!("download task panicked: {join_error}").into()
                    );
                }
            }
        }

        staged.sort_by_key(|artifact| artifact.platform);
        self.cache.commit(release_millis).await?;
        log::info!(
            "Provisioned {} bundle(s) from release {release_label}",
            staged.len()
        );
        Ok(staged)
    }

    /// Collects the already-staged bundles for `platforms`, local I/O only.
    async fn collect_existing(&self, platforms: &[Platform]) -> Result<Vec<StagedArtifact>> {
        let mut staged = Vec::with_capacity(platforms.len());
        for platform in platforms.iter().copied() {
            let path = self.staging.artifact_path(platform);
            let sha256 = checksum::file_sha256(&path).await?;
            staged.push(StagedArtifact {
                platform,
                path,
                sha256,
            });
        }
        Ok(staged)
    }
}

/// One fan-out task: asset lookup, download, checksum.
async fn stage_one(
    client: reqwest::Client,
    assets: Arc<[Asset]>,
    release_label: String,
    platform: Platform,
    dest: std::path::PathBuf,
) -> Result<StagedArtifact> {
    let wanted = platform.artifact_name();
    let asset = assets
        .iter()
        .find(|asset| asset.name == wanted)
        .ok_or_else(|| SetupError::AssetNotFound {
            asset: wanted.clone(),
            release: release_label,
        })?;

    download::download_artifact(&client, &asset.browser_download_url, &dest).await?;
    let sha256 = checksum::file_sha256(&dest).await?;

    Ok(StagedArtifact {
        platform,
        path: dest,
        sha256,
    })
}
