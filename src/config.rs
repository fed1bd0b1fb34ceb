// Static configuration and process-wide settings

use std::path::PathBuf;

use lazy_static::lazy_static;

/// Directory downloads land in when nothing overrides it
pub const DEFAULT_OUTPUT_PATH: &str = "downloads";

/// Selector used for any quality label missing from the table
pub const DEFAULT_FORMAT: &str = "best";

/// Quality picked when the quality prompt gets unusable input
pub const DEFAULT_QUALITY: &str = "best";

/// Quality label -> yt-dlp format selector. Order is menu order.
pub const VIDEO_QUALITIES: &[(&str, &str)] = &[
    ("144p", "worst"),
    ("240p", "worstvideo+worstaudio"),
    ("360p", "18"),
    ("480p", "135+140"),
    ("720p", "136+140"),
    ("1080p", "137+140"),
    ("best", "bestvideo+bestaudio/best"),
];

/// Selector for audio-only downloads
pub const AUDIO_FORMAT: &str = "bestaudio/best";
pub const AUDIO_CODEC: &str = "mp3";
pub const AUDIO_QUALITY: &str = "192";

/// File naming template (yt-dlp output template syntax)
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Playlist entries are nested under a directory named after the playlist
pub const PLAYLIST_OUTPUT_TEMPLATE: &str = "%(playlist)s/%(title)s.%(ext)s";

/// Socket timeout in seconds, passed through to yt-dlp
pub const TIMEOUT: u32 = 30;

/// Retry count, passed through to yt-dlp
pub const RETRIES: u32 = 3;

/// Upper bound for a metadata-only yt-dlp run
pub const INFO_TIMEOUT_SECS: u64 = 120;

/// Display-only list; yt-dlp supports far more sites
pub const SUPPORTED_PLATFORMS: &[&str] = &[
    "YouTube",
    "Vimeo",
    "Dailymotion",
    "Facebook",
    "Instagram",
    "Twitter",
    "TikTok",
];

const ENV_OUTPUT: &str = "VIDEO_DOWNLOADER_OUTPUT";
const ENV_PROXY: &str = "VIDEO_DOWNLOADER_PROXY";
const ENV_YTDLP_PATH: &str = "YTDLP_PATH";
const ENV_YTDLP_PYTHON: &str = "YTDLP_PYTHON";

/// Runtime settings, resolved once from the environment
#[derive(Debug, Clone)]
pub struct Settings {
    pub output_path: PathBuf,
    pub proxy: Option<String>,
    pub ytdlp_path: Option<String>,
    pub python: String,
}

impl Settings {
    fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            output_path: non_empty(ENV_OUTPUT)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
            proxy: non_empty(ENV_PROXY),
            ytdlp_path: non_empty(ENV_YTDLP_PATH),
            python: non_empty(ENV_YTDLP_PYTHON).unwrap_or_else(|| "python3".to_string()),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

lazy_static! {
    static ref SETTINGS: Settings = Settings::from_env();
}

/// Process-wide settings. First call reads the environment.
pub fn settings() -> &'static Settings {
    &SETTINGS
}

/// Quality labels in display order
pub fn quality_labels() -> impl Iterator<Item = &'static str> {
    VIDEO_QUALITIES.iter().map(|(label, _)| *label)
}
