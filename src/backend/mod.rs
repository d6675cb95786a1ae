pub mod cache;
pub mod config;
pub mod downloader;
pub mod models;
pub mod texture_set;
