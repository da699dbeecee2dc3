//! Language resource pack assembly.
//!
//! Rebuilds the resource archive from a flat source directory on every run:
//! each regular file becomes an entry named after its base name, carrying the
//! source file's modification time and (on Unix) permission bits. Entries are
//! written in sorted name order, so repeated runs over unchanged inputs yield
//! archives with identical entry names and byte content. The bundler is not
//! gated by the build cache.

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

/// Filename of the resource archive under the build directory.
pub const ARCHIVE_FILE: &str = "languages.zip";

/// Assembles every file of `source_dir` into the archive at `archive_path`.
///
/// Subdirectories are skipped; entry names are file base names. Any existing
/// archive is replaced. Runs on the blocking thread pool since the zip
/// writer is synchronous.
///
/// # Errors
///
/// `Io` on an unreadable source file or an unwritable destination.
pub async fn bundle(source_dir: &Path, archive_path: &Path) -> Result<()> {
    let source_dir = source_dir.to_path_buf();
    let archive_path = archive_path.to_path_buf();

    tokio::task::spawn_blocking(move || bundle_blocking(&source_dir, &archive_path))
        .await
        .map_err(|e| anyhow::anyhow!("resource bundling task panicked: {e}"))?
}

fn bundle_blocking(source_dir: &Path, archive_path: &Path) -> Result<()> {
    let mut sources: Vec<(String, PathBuf, Metadata)> = Vec::new();
    for entry in std::fs::read_dir(source_dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        sources.push((name, entry.path(), metadata));
    }
    // Directory iteration order is platform-dependent; sorting keeps the
    // archive byte-stable across runs
    sources.sort_by(|a, b| a.0.cmp(&b.0));

    if let Some(parent) = archive_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = ZipWriter::new(std::fs::File::create(archive_path)?);

    for (name, path, metadata) in &sources {
        writer
            .start_file(name.as_str(), entry_options(metadata))
            .map_err(io::Error::other)?;
        let mut source = std::fs::File::open(path)?;
        io::copy(&mut source, &mut writer)?;
    }
    writer.finish().map_err(io::Error::other)?;

    log::info!(
        "Bundled {} resource file(s) into {}",
        sources.len(),
        archive_path.display()
    );
    Ok(())
}

/// Entry options preserving the source file's attributes.
fn entry_options(metadata: &Metadata) -> SimpleFileOptions {
    let mut options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    if let Ok(modified) = metadata.modified() {
        use chrono::{Datelike, Timelike};
        let local: chrono::DateTime<chrono::Local> = modified.into();
        if let Ok(mtime) = zip::DateTime::from_date_and_time(
            local.year() as u16,
            local.month() as u8,
            local.day() as u8,
            local.hour() as u8,
            local.minute() as u8,
            local.second() as u8,
        ) {
            options = options.last_modified_time(mtime);
        }
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options = options.unix_permissions(metadata.permissions().mode() & 0o777);
    }

    options
}
