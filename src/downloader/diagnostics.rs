// Failure diagnostics - turns yt-dlp stderr into a short, readable reason
//
// yt-dlp prints warnings, debug noise and the actual `ERROR:` line all on
// stderr. The shell prints one line per failure, so only the useful part is
// kept and a hint is attached when the cause is recognisable.

/// Recognisable failure causes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// No extractor matches the URL
    UnsupportedUrl,
    /// Requested format selector matched nothing
    FormatUnavailable,
    /// ffmpeg/ffprobe missing (merge or audio extraction)
    FfmpegMissing,
    /// DRM-protected content
    DrmProtected,
    /// Sign-in or age gate
    AuthRequired,
    /// Private video
    PrivateVideo,
    /// Deleted or otherwise unavailable
    VideoUnavailable,
    /// Geographic restriction
    GeoBlocked,
    /// HTTP 429 / throttling
    RateLimited,
    /// HTTP 403
    Forbidden,
    /// Socket timeout or unreachable network
    NetworkTimeout,
}

impl FailureReason {
    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnsupportedUrl => "URL not supported by yt-dlp",
            Self::FormatUnavailable => "requested quality is not available, try another one",
            Self::FfmpegMissing => "ffmpeg is required for this download",
            Self::DrmProtected => "content is DRM-protected",
            Self::AuthRequired => "content requires sign-in",
            Self::PrivateVideo => "video is private",
            Self::VideoUnavailable => "video is unavailable",
            Self::GeoBlocked => "not available in your country",
            Self::RateLimited => "rate limited, try again later",
            Self::Forbidden => "access denied (HTTP 403)",
            Self::NetworkTimeout => "network timeout",
        }
    }

    /// Whether running the same request later might succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Forbidden | Self::NetworkTimeout
        )
    }
}

/// Analyze error output and return the failure reason, if recognisable
pub fn diagnose_error(error: &str) -> Option<FailureReason> {
    let lower = error.to_lowercase();

    // Most specific patterns first
    if lower.contains("unsupported url") {
        return Some(FailureReason::UnsupportedUrl);
    }

    if lower.contains("requested format is not available") {
        return Some(FailureReason::FormatUnavailable);
    }

    if lower.contains("ffmpeg not found")
        || lower.contains("ffprobe and ffmpeg not found")
        || lower.contains("ffmpeg is not installed")
    {
        return Some(FailureReason::FfmpegMissing);
    }

    if lower.contains("drm") || lower.contains("widevine") {
        return Some(FailureReason::DrmProtected);
    }

    if lower.contains("private video") || lower.contains("video is private") {
        return Some(FailureReason::PrivateVideo);
    }

    if lower.contains("sign in to confirm")
        || lower.contains("age-restricted")
        || lower.contains("login required")
        || lower.contains("requires authentication")
    {
        return Some(FailureReason::AuthRequired);
    }

    if lower.contains("video unavailable")
        || lower.contains("video is unavailable")
        || lower.contains("has been removed")
        || lower.contains("no longer available")
    {
        return Some(FailureReason::VideoUnavailable);
    }

    if lower.contains("not available in your country") || lower.contains("geo restrict") {
        return Some(FailureReason::GeoBlocked);
    }

    if lower.contains("http error 429") || lower.contains("too many requests") {
        return Some(FailureReason::RateLimited);
    }

    if lower.contains("http error 403") || lower.contains("forbidden") {
        return Some(FailureReason::Forbidden);
    }

    if lower.contains("timed out")
        || lower.contains("timeout")
        || lower.contains("network is unreachable")
        || lower.contains("connection refused")
    {
        return Some(FailureReason::NetworkTimeout);
    }

    None
}

/// The `ERROR:` lines of yt-dlp stderr, or the last non-empty line
pub fn summarize_stderr(stderr: &str) -> String {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("ERROR:"))
        .take(2)
        .collect();

    if !errors.is_empty() {
        return errors.join(" | ");
    }

    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("yt-dlp exited with an error")
        .to_string()
}

/// One-line failure description with the diagnosed hint appended
pub fn describe_failure(stderr: &str) -> String {
    let summary = summarize_stderr(stderr);
    match diagnose_error(stderr) {
        Some(reason) => format!("{} ({})", summary, reason.description()),
        None => summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_url_detection() {
        let error = "ERROR: Unsupported URL: https://example.com/page";
        assert_eq!(diagnose_error(error), Some(FailureReason::UnsupportedUrl));
    }

    #[test]
    fn test_403_detection() {
        let error = "ERROR: unable to download video data: HTTP Error 403: Forbidden";
        assert_eq!(diagnose_error(error), Some(FailureReason::Forbidden));
        assert!(FailureReason::Forbidden.is_transient());
    }

    #[test]
    fn test_format_detection() {
        let error = "ERROR: [youtube] abc: Requested format is not available";
        assert_eq!(diagnose_error(error), Some(FailureReason::FormatUnavailable));
    }

    #[test]
    fn test_ffmpeg_detection() {
        let error = "ERROR: Postprocessing: ffprobe and ffmpeg not found. Please install or provide the path";
        assert_eq!(diagnose_error(error), Some(FailureReason::FfmpegMissing));
    }

    #[test]
    fn test_geo_detection() {
        let error = "ERROR: This video is not available in your country";
        assert_eq!(diagnose_error(error), Some(FailureReason::GeoBlocked));
    }

    #[test]
    fn test_unrecognised_error() {
        assert_eq!(diagnose_error("ERROR: something odd"), None);
        assert_eq!(diagnose_error(""), None);
    }

    #[test]
    fn test_summary_keeps_error_lines_only() {
        let stderr = "WARNING: [youtube] falling back\n\
                      ERROR: [youtube] abc: Video unavailable\n";
        assert_eq!(
            summarize_stderr(stderr),
            "ERROR: [youtube] abc: Video unavailable"
        );
    }

    #[test]
    fn test_summary_falls_back_to_last_line() {
        assert_eq!(summarize_stderr("first\nlast line\n\n"), "last line");
        assert_eq!(summarize_stderr(""), "yt-dlp exited with an error");
    }

    #[test]
    fn test_describe_failure_appends_hint() {
        let stderr = "ERROR: [generic] Unsupported URL: https://example.com";
        assert_eq!(
            describe_failure(stderr),
            "ERROR: [generic] Unsupported URL: https://example.com (URL not supported by yt-dlp)"
        );
    }
}
