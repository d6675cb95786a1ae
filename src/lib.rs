//! Fetch ambientCG texture sets into a local cache.

pub mod backend;
pub mod utils;

pub use backend::cache::TextureCache;
pub use backend::config::FetchConfig;
pub use backend::models::{FetchOutcome, MaterialRequest, Resolution};
pub use backend::texture_set::{TextureKind, TextureMap, TextureSet};
pub use utils::{FetchError, Result};
