//! Error handling.

use std::fmt;

/// Errors surfaced by a fetch.
#[derive(Debug)]
pub enum FetchError {
    /// The request was rejected before touching the cache or the network.
    InvalidRequest(String),
    /// The archive could not be downloaded.
    Download(String),
    /// The archive could not be opened or extracted.
    Extraction(String),
    /// Cache root bookkeeping failed.
    Io(std::io::Error),
}

impl FetchError {
    pub fn download(message: impl Into<String>) -> Self {
        Self::Download(message.into())
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction(message.into())
    }

    pub const fn is_download(&self) -> bool {
        matches!(self, Self::Download(_))
    }

    pub const fn is_extraction(&self) -> bool {
        matches!(self, Self::Extraction(_))
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequest(message) => write!(f, "Invalid material request: {message}"),
            Self::Download(message) => write!(f, "Failed to download file: {message}"),
            Self::Extraction(message) => write!(f, "Failed to extract zip file: {message}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Download(err.to_string())
    }
}

impl From<zip::result::ZipError> for FetchError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Extraction(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
