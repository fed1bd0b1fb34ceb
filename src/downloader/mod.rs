// Downloader module - wraps yt-dlp behind a small, typed surface

pub mod diagnostics;
pub mod errors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod tools;
pub mod traits;
pub mod utils;
pub mod ytdlp;

pub use errors::{BackendError, DownloadError};
pub use format_selector::FormatSelector;
pub use models::{
    AudioExtraction, DownloadOptions, DownloadRequest, NetworkConfig, ProgressEvent,
    ProgressStatus, VideoMetadata,
};
pub use orchestrator::Downloader;
pub use traits::{MediaBackend, ProgressCallback};
pub use ytdlp::YtDlpBackend;
