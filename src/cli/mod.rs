//! Command line interface and pipeline driver.
//!
//! `run` is the whole build step: resolve the target, provision artifact
//! bundles, assemble the resource archive, and write the build metadata
//! record. With the skip switch set, provisioning and bundling are skipped
//! and the metadata is recomputed from whatever is already on disk.

mod args;

pub use args::Args;

use std::collections::BTreeMap;
use std::path::Path;

use crate::catalog::ReleaseCatalog;
use crate::error::Result;
use crate::metadata::{self, BuildMetadata};
use crate::platform::{self, ALL_PLATFORMS};
use crate::provision::{BuildCache, Provisioner, StagingArea, file_sha256};
use crate::resources;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    run_with_args(Args::parse_args()).await
}

/// Runs the pipeline with already-parsed arguments (testing entry point).
pub async fn run_with_args(args: Args) -> Result<i32> {
    tokio::fs::create_dir_all(&args.build_dir).await?;

    if args.skip() {
        log::info!("Skip switch set, reusing cached provisioning outputs");
    } else {
        let target = platform::resolve(args.target.as_deref())?;
        log::info!("Provisioning target: {target}");

        let catalog = ReleaseCatalog::new(args.github_token.clone())?;
        let provisioner = Provisioner::new(catalog, &args.build_dir)?;
        let staged = provisioner.provision(&target).await?;
        for artifact in &staged {
            log::info!(
                "Staged {} at {} (sha256 {})",
                artifact.platform,
                artifact.path.display(),
                artifact.sha256
            );
        }

        resources::bundle(
            &args.languages_dir,
            &args.build_dir.join(resources::ARCHIVE_FILE),
        )
        .await?;
    }

    let build_metadata = collect_metadata(&args.build_dir).await?;
    let path = build_metadata.store(&args.build_dir).await?;
    log::info!("Wrote build metadata to {}", path.display());

    Ok(0)
}

/// Recomputes the metadata record from on-disk state.
///
/// Works for both the normal and the skipped path: every field derives from
/// the cache record, the resource archive, the eUICC timestamp file, and
/// whichever staged bundles exist.
async fn collect_metadata(build_dir: &Path) -> Result<BuildMetadata> {
    let cache = BuildCache::new(build_dir);
    let staging = StagingArea::new(build_dir);

    let lpac_build_time = cache.last_provisioned_millis().await?.unwrap_or(0);

    let archive = build_dir.join(resources::ARCHIVE_FILE);
    let language_pack_update_time = match metadata::file_mtime_millis(&archive).await? {
        Some(millis) => millis,
        None => {
            log::warn!("No resource archive at {}", archive.display());
            0
        }
    };

    let euicc_info_update_time = metadata::euicc_info_update_time(build_dir).await?;

    let mut artifact_checksums = BTreeMap::new();
    for platform in ALL_PLATFORMS {
        if staging.is_staged(platform) {
            let sha256 = file_sha256(&staging.artifact_path(platform)).await?;
            artifact_checksums.insert(platform.key().to_string(), sha256);
        }
    }

    Ok(BuildMetadata {
        lpac_build_time,
        language_pack_update_time,
        euicc_info_update_time,
        artifact_checksums,
    })
}
