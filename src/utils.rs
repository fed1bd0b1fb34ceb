// Stateless helpers shared by the downloader and the shell

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::downloader::{ProgressEvent, ProgressStatus, VideoMetadata};

const MAX_FILENAME_CHARS: usize = 200;
const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

lazy_static! {
    static ref INVALID_FILENAME_CHARS: Regex = Regex::new(r#"[<>:"/\\|?*]"#).unwrap();
}

/// True if the URL has both a scheme and a host
pub fn validate_url(url: &str) -> bool {
    match Url::parse(url.trim()) {
        Ok(parsed) => parsed.host_str().map_or(false, |h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Remove characters not allowed in file names and cap the length
pub fn sanitize_filename(name: &str) -> String {
    INVALID_FILENAME_CHARS
        .replace_all(name, "")
        .chars()
        .take(MAX_FILENAME_CHARS)
        .collect()
}

/// Human-readable byte count, e.g. "1.50 KB"
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in &SIZE_UNITS[..SIZE_UNITS.len() - 1] {
        if value < 1024.0 {
            return format!("{:.2} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.2} {}", value, SIZE_UNITS[SIZE_UNITS.len() - 1])
}

/// Create the directory tree if missing and return its absolute path
pub fn create_output_directory(path: impl AsRef<Path>) -> io::Result<PathBuf> {
    let path = path.as_ref();
    std::fs::create_dir_all(path)?;
    path.canonicalize()
}

/// Group digits in threes: 1234567 -> "1,234,567"
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format video information for display
pub fn format_video_info(info: &VideoMetadata) -> String {
    let duration = info.duration_secs();
    format!(
        "\n    Title: {}\n    Duration: {}m {}s\n    Uploader: {}\n    Views: {}\n",
        info.title_or_default(),
        duration / 60,
        duration % 60,
        info.uploader_or_default(),
        format_thousands(info.view_count_or_default()),
    )
}

/// Render one progress update. `Downloading` rewrites the current line,
/// `Finished` ends it; other statuses are ignored.
pub fn progress_callback(event: &ProgressEvent, out: &mut impl Write) -> io::Result<()> {
    match event.status {
        ProgressStatus::Downloading => {
            write!(
                out,
                "\rDownloading: {} | Speed: {} | ETA: {}",
                event.percent.as_deref().unwrap_or("N/A"),
                event.speed.as_deref().unwrap_or("N/A"),
                event.eta.as_deref().unwrap_or("N/A"),
            )?;
            out.flush()
        }
        ProgressStatus::Finished => writeln!(out, "\n✓ Download completed! Now processing..."),
        ProgressStatus::Other(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://www.youtube.com/watch?v=abc"));
        assert!(validate_url("http://example.com"));
        assert!(validate_url("ftp://host/path"));

        assert!(!validate_url(""));
        assert!(!validate_url("not a url"));
        assert!(!validate_url("example.com/video"));
        assert!(!validate_url("www.youtube.com"));
        assert!(!validate_url("mailto:someone@example.com"));
        assert!(!validate_url("https://"));
        assert!(!validate_url("file:///tmp/video.mp4"));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename(r#"a<b>c:d"e/f\g|h?i*j"#), "abcdefghij");
        assert_eq!(sanitize_filename("plain name.mp4"), "plain name.mp4");

        let long = "x".repeat(500);
        assert_eq!(sanitize_filename(&long).chars().count(), 200);

        // Multi-byte characters count as one
        let wide = "é".repeat(300);
        assert_eq!(sanitize_filename(&wide).chars().count(), 200);
    }

    #[test]
    fn test_sanitize_filename_is_idempotent() {
        let inputs = [
            "Video: Part 1/2 <final>?",
            "***",
            "",
            "ünïcödé | title",
        ];
        for input in inputs {
            let once = sanitize_filename(input);
            assert_eq!(sanitize_filename(&once), once);
            assert!(!once.chars().any(|c| "<>:\"/\\|?*".contains(c)));
        }

        let long = format!("{}{}", "?".repeat(50), "y".repeat(400));
        let once = sanitize_filename(&long);
        assert!(once.chars().count() <= 200);
        assert_eq!(sanitize_filename(&once), once);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0.00 B");
        assert_eq!(format_size(1023), "1023.00 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1_048_576), "1.00 MB");
        assert_eq!(format_size(1_073_741_824), "1.00 GB");
        assert_eq!(format_size(1_099_511_627_776), "1.00 TB");
        assert_eq!(format_size(2048 * 1_099_511_627_776), "2048.00 TB");
    }

    #[test]
    fn test_create_output_directory_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b");

        let first = create_output_directory(&target).unwrap();
        let second = create_output_directory(&target).unwrap();

        assert!(first.is_absolute());
        assert!(first.is_dir());
        assert_eq!(first, second);
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_video_info() {
        let info = VideoMetadata {
            title: Some("Clip".to_string()),
            duration: Some(125.0),
            uploader: Some("Someone".to_string()),
            view_count: Some(1_234_567),
            ..VideoMetadata::default()
        };
        let text = format_video_info(&info);
        assert!(text.contains("Title: Clip"));
        assert!(text.contains("Duration: 2m 5s"));
        assert!(text.contains("Uploader: Someone"));
        assert!(text.contains("Views: 1,234,567"));
    }

    #[test]
    fn test_format_video_info_defaults() {
        let text = format_video_info(&VideoMetadata::default());
        assert!(text.contains("Title: Unknown"));
        assert!(text.contains("Duration: 0m 0s"));
        assert!(text.contains("Uploader: Unknown"));
        assert!(text.contains("Views: 0"));
    }

    fn event(status: ProgressStatus) -> ProgressEvent {
        ProgressEvent {
            status,
            percent: Some("42.0%".to_string()),
            speed: None,
            eta: Some("00:10".to_string()),
        }
    }

    #[test]
    fn test_progress_callback_rendering() {
        let mut out = Vec::new();
        progress_callback(&event(ProgressStatus::Downloading), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\rDownloading: 42.0% | Speed: N/A | ETA: 00:10"
        );

        let mut out = Vec::new();
        progress_callback(&event(ProgressStatus::Finished), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\n✓ Download completed! Now processing...\n"
        );

        let mut out = Vec::new();
        progress_callback(&event(ProgressStatus::Other("error".into())), &mut out).unwrap();
        assert!(out.is_empty());
    }
}
