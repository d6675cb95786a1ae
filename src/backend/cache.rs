//! On-disk texture cache.
//!
//! Each texture set lives in `<root>/<name>_<resolution>/`. A directory that
//! exists under that name is a cache hit and is reused without touching the
//! network. Archives are extracted into `<key>.partial` first and renamed into
//! place once every entry has been written, so a failed fetch never leaves a
//! directory behind that a later call would mistake for a hit.

use crate::backend::config::FetchConfig;
use crate::backend::downloader::{ArchiveDownloader, HttpDownloader};
use crate::backend::models::{CacheManifest, FetchOutcome, MaterialRequest};
use crate::utils::{FetchError, Result, extract_zip};
use chrono::Utc;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

const STAGING_SUFFIX: &str = ".partial";
pub const MANIFEST_FILE: &str = ".ambientcg.json";

pub struct TextureCache<D = HttpDownloader> {
    root: PathBuf,
    base_url: String,
    downloader: D,
}

impl TextureCache<HttpDownloader> {
    pub fn from_config(config: &FetchConfig) -> anyhow::Result<Self> {
        let downloader = HttpDownloader::new(config)?;
        Ok(Self::new(config.cache_root()?, &config.base_url, downloader))
    }
}

impl<D: ArchiveDownloader> TextureCache<D> {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>, downloader: D) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
            downloader,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_dir(&self, request: &MaterialRequest) -> PathBuf {
        self.root.join(request.cache_key())
    }

    /// Make sure the texture set for `request` is extracted locally and return its directory.
    pub async fn ensure_material(&self, request: &MaterialRequest) -> Result<FetchOutcome> {
        let key = request.cache_key();
        let directory = self.entry_dir(request);

        if tokio::fs::try_exists(&directory).await? {
            info!("Using cached material: {key}");
            return Ok(FetchOutcome {
                key,
                directory,
                cached: true,
            });
        }

        tokio::fs::create_dir_all(&self.root).await?;

        let url = request.download_url(&self.base_url);
        let archive = self.root.join(format!("{key}.zip"));
        let staging = self.root.join(format!("{key}{STAGING_SUFFIX}"));

        info!("Fetching {key} from {url}");

        let report = match self.downloader.download(&url, &archive).await {
            Ok(report) => report,
            Err(err) => {
                discard(&archive, &staging).await;
                return Err(err);
            }
        };
        debug!("{key}: {} bytes, sha256 {}", report.bytes, report.sha256);

        let manifest = CacheManifest {
            key: key.clone(),
            source_url: url,
            fetched_at: Utc::now(),
            archive_sha256: report.sha256,
            files: Vec::new(),
        };
        if let Err(err) = install(&archive, &staging, &directory, manifest).await {
            discard(&archive, &staging).await;
            return Err(err);
        }
        info!("Material '{key}' is ready in {directory:?}");

        Ok(FetchOutcome {
            key,
            directory,
            cached: false,
        })
    }

    /// Manifest of an extracted entry, if it has a readable one.
    pub async fn manifest(&self, request: &MaterialRequest) -> Option<CacheManifest> {
        let path = self.entry_dir(request).join(MANIFEST_FILE);
        let content = tokio::fs::read(&path).await.ok()?;
        match serde_json::from_slice(&content) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!("Ignoring unreadable manifest {path:?}: {e}");
                None
            }
        }
    }

    /// Names of the extracted entries, sorted.
    pub async fn list_entries(&self) -> Result<Vec<String>> {
        if !tokio::fs::try_exists(&self.root).await? {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(STAGING_SUFFIX) {
                continue;
            }
            entries.push(name);
        }

        entries.sort();
        Ok(entries)
    }
}

/// Extract `archive` into `staging`, drop the archive and move the result to `directory`.
async fn install(
    archive: &Path,
    staging: &Path,
    directory: &Path,
    mut manifest: CacheManifest,
) -> Result<()> {
    // Leftovers from an interrupted run
    if tokio::fs::try_exists(staging).await? {
        tokio::fs::remove_dir_all(staging).await?;
    }

    manifest.files = extract_blocking(archive, staging).await?;
    if manifest.files.is_empty() {
        return Err(FetchError::extraction("archive contained no files"));
    }

    tokio::fs::remove_file(archive).await?;
    write_manifest(staging, &manifest).await;
    tokio::fs::rename(staging, directory).await?;
    Ok(())
}

async fn extract_blocking(archive: &Path, target: &Path) -> Result<Vec<PathBuf>> {
    let archive = archive.to_path_buf();
    let target = target.to_path_buf();
    tokio::task::spawn_blocking(move || extract_zip(&archive, &target))
        .await
        .map_err(|e| FetchError::extraction(format!("extraction task failed: {e}")))?
}

async fn write_manifest(directory: &Path, manifest: &CacheManifest) {
    let path = directory.join(MANIFEST_FILE);
    let content = match serde_json::to_vec_pretty(manifest) {
        Ok(content) => content,
        Err(e) => {
            warn!("Could not serialize manifest for {}: {e}", manifest.key);
            return;
        }
    };
    if let Err(e) = tokio::fs::write(&path, content).await {
        warn!("Could not write {path:?}: {e}");
    }
}

/// Best-effort removal of a failed fetch's archive and staging directory.
async fn discard(archive: &Path, staging: &Path) {
    if let Err(e) = tokio::fs::remove_file(archive).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!("Could not remove {archive:?}: {e}");
    }
    if let Err(e) = tokio::fs::remove_dir_all(staging).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!("Could not remove {staging:?}: {e}");
    }
}
