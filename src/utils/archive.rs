//! ZIP extraction.

use crate::utils::{FetchError, Result};
use log::{debug, info, warn};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Extract every entry of a ZIP archive into `extract_path`.
///
/// Entries whose names would escape `extract_path` are skipped. Returns the
/// extracted file paths, relative to `extract_path`.
pub fn extract_zip(archive_path: &Path, extract_path: &Path) -> Result<Vec<PathBuf>> {
    info!("Extracting {archive_path:?} to {extract_path:?}");

    let file = File::open(archive_path).map_err(|e| {
        FetchError::extraction(format!("failed to open archive {archive_path:?}: {e}"))
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| {
        FetchError::extraction(format!("failed to read ZIP archive {archive_path:?}: {e}"))
    })?;

    std::fs::create_dir_all(extract_path).map_err(|e| {
        FetchError::extraction(format!("failed to create directory {extract_path:?}: {e}"))
    })?;

    let mut extracted = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| {
            FetchError::extraction(format!("failed to read entry {i} from {archive_path:?}: {e}"))
        })?;

        let Some(relative) = entry.enclosed_name() else {
            warn!("Skipping unsafe entry name: {}", entry.name());
            continue;
        };
        let out_path = extract_path.join(&relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|e| {
                FetchError::extraction(format!("failed to create directory {out_path:?}: {e}"))
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FetchError::extraction(format!("failed to create directory {parent:?}: {e}"))
            })?;
        }

        let mut output = File::create(&out_path).map_err(|e| {
            FetchError::extraction(format!("failed to create file {out_path:?}: {e}"))
        })?;
        std::io::copy(&mut entry, &mut output).map_err(|e| {
            FetchError::extraction(format!("failed to write {}: {e}", relative.display()))
        })?;

        debug!("Extracted: {out_path:?}");
        extracted.push(relative);
    }

    info!("Extraction complete: {} files from {archive_path:?}", extracted.len());
    Ok(extracted)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Build an in-memory ZIP from `(name, contents)` pairs.
    pub(crate) fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, contents) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn extracts_nested_entries() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("set.zip");
        std::fs::write(
            &archive,
            zip_bytes(&[
                ("Rock035_1K_Color.png", b"color"),
                ("previews/sphere.png", b"preview"),
            ]),
        )
        .unwrap();

        let out = dir.path().join("out");
        let files = extract_zip(&archive, &out).unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(
            std::fs::read(out.join("Rock035_1K_Color.png")).unwrap(),
            b"color"
        );
        assert_eq!(
            std::fs::read(out.join("previews").join("sphere.png")).unwrap(),
            b"preview"
        );
    }

    #[test]
    fn skips_entries_that_escape_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("evil.zip");
        std::fs::write(
            &archive,
            zip_bytes(&[("../escaped.png", b"x"), ("ok.png", b"y")]),
        )
        .unwrap();

        let out = dir.path().join("out");
        let files = extract_zip(&archive, &out).unwrap();

        assert_eq!(files, vec![PathBuf::from("ok.png")]);
        assert!(!dir.path().join("escaped.png").exists());
    }

    #[test]
    fn garbage_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        std::fs::write(&archive, b"<html>rate limited</html>").unwrap();

        let err = extract_zip(&archive, &dir.path().join("out")).unwrap_err();
        assert!(err.is_extraction());
    }
}
