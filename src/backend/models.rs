use crate::utils::{FetchError, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

pub const DEFAULT_MATERIAL: &str = "Rock035";

/// Texture resolution offered by ambientCG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "1K")]
    OneK,
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
    #[serde(rename = "8K")]
    EightK,
}

impl Resolution {
    pub const ALL: [Self; 4] = [Self::OneK, Self::TwoK, Self::FourK, Self::EightK];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneK => "1K",
            Self::TwoK => "2K",
            Self::FourK => "4K",
            Self::EightK => "8K",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                FetchError::InvalidRequest(format!(
                    "unknown resolution '{s}', expected one of 1K, 2K, 4K, 8K"
                ))
            })
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-][A-Za-z0-9_.-]*$").expect("valid regex"))
}

/// One user request for a texture set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialRequest {
    name: String,
    resolution: Resolution,
}

impl MaterialRequest {
    pub fn new(name: impl Into<String>, resolution: Resolution) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(FetchError::InvalidRequest(
                "material name must not be empty".to_string(),
            ));
        }
        if !name_pattern().is_match(&name) {
            return Err(FetchError::InvalidRequest(format!(
                "material name '{name}' may only contain letters, digits, '_', '-' and '.'"
            )));
        }
        Ok(Self { name, resolution })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// `{name}_{resolution}`, used both as the cache directory name and in the download URL.
    pub fn cache_key(&self) -> String {
        format!("{}_{}", self.name, self.resolution)
    }

    /// `<base>?file=<name>_<resolution>-PNG.zip`
    pub fn download_url(&self, base_url: &str) -> String {
        format!("{base_url}?file={}-PNG.zip", self.cache_key())
    }
}

impl Default for MaterialRequest {
    fn default() -> Self {
        Self {
            name: DEFAULT_MATERIAL.to_string(),
            resolution: Resolution::default(),
        }
    }
}

/// Result of [`TextureCache::ensure_material`](crate::backend::cache::TextureCache::ensure_material).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub key: String,
    pub directory: PathBuf,
    /// `true` when the entry already existed and nothing was downloaded.
    pub cached: bool,
}

/// Bookkeeping written next to the extracted textures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheManifest {
    pub key: String,
    pub source_url: String,
    pub fetched_at: DateTime<Utc>,
    pub archive_sha256: String,
    pub files: Vec<PathBuf>,
}
