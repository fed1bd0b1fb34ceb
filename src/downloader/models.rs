// Common data models for downloader

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config;

/// Video metadata as reported by yt-dlp. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Seconds; yt-dlp reports fractional values for some sites
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub extractor: Option<String>,
    /// Everything else yt-dlp returned
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl VideoMetadata {
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("Unknown")
    }

    pub fn uploader_or_default(&self) -> &str {
        self.uploader.as_deref().unwrap_or("Unknown")
    }

    /// Whole seconds; negative or missing durations count as zero
    pub fn duration_secs(&self) -> u64 {
        self.duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| d as u64)
            .unwrap_or(0)
    }

    pub fn view_count_or_default(&self) -> u64 {
        self.view_count.unwrap_or(0)
    }
}

/// One user action: what to fetch and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub quality: String,
    pub audio_only: bool,
}

impl DownloadRequest {
    pub fn video(url: impl Into<String>, quality: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            quality: quality.into(),
            audio_only: false,
        }
    }

    pub fn audio(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            quality: config::DEFAULT_FORMAT.to_string(),
            audio_only: true,
        }
    }
}

/// Audio extraction post-processing step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioExtraction {
    pub codec: String,
    pub quality: String,
}

impl Default for AudioExtraction {
    fn default() -> Self {
        Self {
            codec: config::AUDIO_CODEC.to_string(),
            quality: config::AUDIO_QUALITY.to_string(),
        }
    }
}

/// Network configuration for backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Proxy URL (e.g., "socks5://127.0.0.1:1080")
    pub proxy: Option<String>,

    /// Socket timeout in seconds
    pub timeout: Option<u32>,

    /// Retry count for failed requests
    pub retries: Option<u32>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: Some(config::TIMEOUT),
            retries: Some(config::RETRIES),
        }
    }
}

/// Fully resolved options for one backend download call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// yt-dlp format selector
    pub format: String,
    pub output_dir: PathBuf,
    /// Output template, relative to `output_dir`
    pub output_template: String,
    /// Download every entry of a collection instead of a single item
    pub playlist: bool,
    pub network: NetworkConfig,
    pub skip_certificate_check: bool,
    pub audio_extraction: Option<AudioExtraction>,
}

/// Status reported by the progress feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressStatus {
    Downloading,
    Finished,
    Other(String),
}

impl From<&str> for ProgressStatus {
    fn from(s: &str) -> Self {
        match s {
            "downloading" => Self::Downloading,
            "finished" => Self::Finished,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One progress update during a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    pub percent: Option<String>,
    pub speed: Option<String>,
    pub eta: Option<String>,
}
