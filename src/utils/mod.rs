//! Custom utilities.

pub mod archive;
pub mod error;
pub mod paths;

pub use archive::extract_zip;
pub use error::{FetchError, Result};
