pub mod http;
pub mod progress;
pub use http::{ArchiveDownloader, DownloadReport, HttpDownloader};
pub use progress::ProgressTracker;
