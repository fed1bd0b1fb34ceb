// Media backend trait definition

use async_trait::async_trait;
use std::path::PathBuf;

use super::errors::BackendError;
use super::models::{DownloadOptions, NetworkConfig, ProgressEvent, VideoMetadata};

/// Progress sink handed to a running transfer; called once per update
pub type ProgressCallback<'a> = &'a mut (dyn for<'e> FnMut(&'e ProgressEvent) + Send);

/// Contract of the external extraction/download tool
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    /// Fetch metadata only; no media bytes are downloaded
    async fn extract_info(
        &self,
        url: &str,
        network: &NetworkConfig,
    ) -> Result<VideoMetadata, BackendError>;

    /// Download a single item and return the path of the saved file.
    /// `progress` is called for every update of the running transfer.
    async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        progress: ProgressCallback<'_>,
    ) -> Result<PathBuf, BackendError>;

    /// Download every entry of a collection
    async fn download_collection(
        &self,
        url: &str,
        options: &DownloadOptions,
        progress: ProgressCallback<'_>,
    ) -> Result<(), BackendError>;
}
