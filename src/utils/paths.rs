//! Path utilities.

use std::path::PathBuf;

use anyhow::Result;

/// Name of the texture cache directory.
const CACHE_DIR: &str = "ambientcg";

/// Get the default cache root (`~/.cache/ambientcg`, or `%LOCALAPPDATA%\ambientcg` on Windows).
#[inline]
pub fn default_cache_dir() -> Result<PathBuf> {
    let base_dir = match std::env::consts::OS {
        "windows" => std::env::var("LOCALAPPDATA")
            .or_else(|_| std::env::var("APPDATA"))
            .ok()
            .map(PathBuf::from)
            .ok_or_else(|| anyhow::anyhow!("Could not determine AppData directory"))?,
        _ => std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".cache"))
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?,
    };
    Ok(base_dir.join(CACHE_DIR))
}

/// Config file looked up inside the cache root when `--config` is not given.
pub fn default_config_path(cache_dir: &std::path::Path) -> PathBuf {
    cache_dir.join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_dir_ends_with_ambientcg() {
        if let Ok(dir) = default_cache_dir() {
            assert_eq!(dir.file_name().and_then(|n| n.to_str()), Some(CACHE_DIR));
        }
    }

    #[test]
    fn config_lives_in_cache_root() {
        let root = PathBuf::from("cache");
        assert_eq!(default_config_path(&root), root.join("config.json"));
    }
}
