// Downloader - validates requests, resolves options, wraps backend failures

use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use super::errors::DownloadError;
use super::format_selector::FormatSelector;
use super::models::{
    AudioExtraction, DownloadOptions, DownloadRequest, NetworkConfig, VideoMetadata,
};
use super::traits::{MediaBackend, ProgressCallback};
use super::ytdlp::YtDlpBackend;
use crate::config;
use crate::utils::{create_output_directory, validate_url};

pub struct Downloader {
    backend: Box<dyn MediaBackend>,
    output_path: PathBuf,
    network: NetworkConfig,
}

impl Downloader {
    /// Create a downloader backed by yt-dlp. The output directory is
    /// created if it does not exist yet.
    pub fn new(output_path: impl AsRef<Path>) -> Result<Self, DownloadError> {
        Self::with_backend(output_path, Box::new(YtDlpBackend::new()))
    }

    pub fn with_backend(
        output_path: impl AsRef<Path>,
        backend: Box<dyn MediaBackend>,
    ) -> Result<Self, DownloadError> {
        let output_path = create_output_directory(output_path.as_ref()).map_err(|e| {
            DownloadError::OutputDirectory(format!("{}: {}", output_path.as_ref().display(), e))
        })?;
        info!(
            "[Downloader] Saving to {} via {}",
            output_path.display(),
            backend.name()
        );

        Ok(Self {
            backend,
            output_path,
            network: NetworkConfig {
                proxy: config::settings().proxy.clone(),
                ..NetworkConfig::default()
            },
        })
    }

    /// Replace the network settings passed to the backend
    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        self.network = network;
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    fn ensure_valid_url(url: &str) -> Result<(), DownloadError> {
        if validate_url(url) {
            Ok(())
        } else {
            Err(DownloadError::InvalidInput("Invalid URL provided".to_string()))
        }
    }

    fn base_options(&self, format: &str) -> DownloadOptions {
        DownloadOptions {
            format: format.to_string(),
            output_dir: self.output_path.clone(),
            output_template: config::OUTPUT_TEMPLATE.to_string(),
            playlist: false,
            network: self.network.clone(),
            skip_certificate_check: true,
            audio_extraction: None,
        }
    }

    /// Options for a single-item download
    pub fn resolve_options(&self, request: &DownloadRequest) -> DownloadOptions {
        if !FormatSelector::is_known(&request.quality) {
            debug!(
                "[Downloader] Unknown quality '{}', using default selector",
                request.quality
            );
        }

        let mut options = self.base_options(FormatSelector::get_format_spec(&request.quality));
        if request.audio_only {
            options.format = FormatSelector::audio_format_spec().to_string();
            options.audio_extraction = Some(AudioExtraction::default());
        }
        options
    }

    /// Options for a collection download
    pub fn playlist_options(&self, quality: &str) -> DownloadOptions {
        let mut options = self.base_options(FormatSelector::get_format_spec(quality));
        options.output_template = config::PLAYLIST_OUTPUT_TEMPLATE.to_string();
        options.playlist = true;
        options
    }

    /// Get video information without downloading
    pub async fn get_video_info(&self, url: &str) -> Result<VideoMetadata, DownloadError> {
        Self::ensure_valid_url(url)?;

        self.backend
            .extract_info(url, &self.network)
            .await
            .map_err(|e| {
                warn!("[Downloader] {} info failed: {}", self.backend.name(), e);
                DownloadError::ExtractionFailed(format!("Failed to get video info: {}", e))
            })
    }

    /// Download one item; returns the path of the saved file
    pub async fn download_video(
        &self,
        request: &DownloadRequest,
        progress: ProgressCallback<'_>,
    ) -> Result<PathBuf, DownloadError> {
        Self::ensure_valid_url(&request.url)?;

        let options = self.resolve_options(request);
        info!(
            "[Downloader] Downloading {} (format: {}, audio only: {})",
            request.url, options.format, request.audio_only
        );

        self.backend
            .download(&request.url, &options, progress)
            .await
            .map_err(|e| {
                warn!("[Downloader] {} download failed: {}", self.backend.name(), e);
                DownloadError::DownloadFailed(format!("Download failed: {}", e))
            })
    }

    /// Download an entire playlist into a subdirectory named after it
    pub async fn download_playlist(
        &self,
        url: &str,
        quality: &str,
        progress: ProgressCallback<'_>,
    ) -> Result<(), DownloadError> {
        Self::ensure_valid_url(url)?;

        let options = self.playlist_options(quality);
        info!(
            "[Downloader] Downloading playlist {} (format: {})",
            url, options.format
        );

        self.backend
            .download_collection(url, &options, progress)
            .await
            .map_err(|e| {
                warn!("[Downloader] {} playlist failed: {}", self.backend.name(), e);
                DownloadError::DownloadFailed(format!("Playlist download failed: {}", e))
            })
    }
}
