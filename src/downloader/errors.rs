// Error types for the downloader and its backends

use std::fmt;

/// Failure of a Downloader operation. Messages are complete, user-facing lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadError {
    /// Malformed input, rejected before the backend runs
    InvalidInput(String),

    /// Metadata extraction failed in the backend
    ExtractionFailed(String),

    /// Media download failed in the backend
    DownloadFailed(String),

    /// Output directory could not be created
    OutputDirectory(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg)
            | Self::ExtractionFailed(msg)
            | Self::DownloadFailed(msg) => write!(f, "{}", msg),
            Self::OutputDirectory(msg) => write!(f, "Cannot prepare output directory: {}", msg),
        }
    }
}

impl std::error::Error for DownloadError {}

/// Failure reported by a media backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// yt-dlp (or python) could not be started
    ToolNotFound(String),

    /// The tool ran longer than allowed
    Timeout(u64),

    /// The tool ran and reported a failure
    Execution(String),

    /// The tool's output could not be understood
    Parse(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToolNotFound(tool) => write!(f, "Tool not found: {}", tool),
            Self::Timeout(secs) => write!(f, "Timed out after {}s", secs),
            Self::Execution(msg) => write!(f, "{}", msg),
            Self::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(format!("Invalid JSON: {}", err))
    }
}
