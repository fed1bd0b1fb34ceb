// FormatSelector - maps quality labels to yt-dlp format selectors
//
// The table lives in config::VIDEO_QUALITIES. Labels outside the table are
// not an error: they resolve to the default selector.

use crate::config::{self, VIDEO_QUALITIES};

/// Format selector resolution
pub struct FormatSelector;

impl FormatSelector {
    /// Get format spec for yt-dlp based on quality label
    pub fn get_format_spec(quality: &str) -> &'static str {
        VIDEO_QUALITIES
            .iter()
            .find(|(label, _)| *label == quality)
            .map(|(_, spec)| *spec)
            .unwrap_or(config::DEFAULT_FORMAT)
    }

    /// Format spec for audio-only downloads, regardless of quality
    pub fn audio_format_spec() -> &'static str {
        config::AUDIO_FORMAT
    }

    /// Label at a 1-based menu position
    pub fn label_at(position: usize) -> Option<&'static str> {
        position
            .checked_sub(1)
            .and_then(|idx| VIDEO_QUALITIES.get(idx))
            .map(|(label, _)| *label)
    }

    /// Whether the label is present in the table
    pub fn is_known(quality: &str) -> bool {
        VIDEO_QUALITIES.iter().any(|(label, _)| *label == quality)
    }
}
