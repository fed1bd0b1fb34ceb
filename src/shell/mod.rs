// Interactive menu loop driving the Downloader

pub mod menu;

use std::future::Future;
use std::io::{self, Write};
use std::pin::Pin;

use log::{debug, error, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::config;
use crate::downloader::{DownloadError, DownloadRequest, Downloader, ProgressEvent};
use crate::utils::{format_video_info, progress_callback};
use menu::MenuChoice;

type Interrupt = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Unexpected errors in a row before the session gives up
const MAX_CONSECUTIVE_FAILURES: usize = 3;

/// What the loop should do after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// One read from the user
enum Input {
    Line(String),
    /// Ctrl-C or end of input
    Interrupted,
}

pub struct Shell<R, W> {
    downloader: Downloader,
    input: R,
    out: W,
    interrupt: Interrupt,
}

impl<R, W> Shell<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    pub fn new(downloader: Downloader, input: R, out: W) -> Self {
        Self {
            downloader,
            input,
            out,
            interrupt: Box::pin(std::future::pending::<()>()),
        }
    }

    /// Future that ends the session when it completes while waiting for input
    pub fn with_interrupt(mut self, interrupt: impl Future<Output = ()> + Send + 'static) -> Self {
        self.interrupt = Box::pin(interrupt);
        self
    }

    /// Run until the user exits or interrupts
    pub async fn run(&mut self) -> io::Result<()> {
        menu::write_banner(&mut self.out)?;

        let mut failures = 0;
        loop {
            let flow = match self.step().await {
                Ok(flow) => {
                    failures = 0;
                    flow
                }
                Err(e) => {
                    error!("[Shell] Unexpected error: {}", e);
                    failures += 1;
                    // Unwritable output ends the session
                    if writeln!(self.out, "\n❌ Unexpected error: {}", e).is_err()
                        || failures >= MAX_CONSECUTIVE_FAILURES
                    {
                        return Err(e);
                    }
                    Flow::Continue
                }
            };
            if flow == Flow::Exit {
                break;
            }
        }

        info!("[Shell] Session ended");
        self.out.flush()
    }

    async fn step(&mut self) -> io::Result<Flow> {
        menu::write_menu(&mut self.out)?;
        let line = match self.prompt("\nEnter your choice (1-6): ").await? {
            Input::Line(line) => line,
            Input::Interrupted => return self.interrupted(),
        };

        match MenuChoice::parse(&line) {
            Some(choice) => {
                debug!("[Shell] Selected {:?}", choice);
                self.dispatch(choice).await
            }
            None => {
                writeln!(self.out, "\n❌ Invalid choice! Please enter 1-6.")?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn dispatch(&mut self, choice: MenuChoice) -> io::Result<Flow> {
        match choice {
            MenuChoice::DownloadVideo => self.download_single(false).await,
            MenuChoice::DownloadAudio => self.download_single(true).await,
            MenuChoice::DownloadPlaylist => self.download_playlist().await,
            MenuChoice::VideoInfo => self.show_info().await,
            MenuChoice::SupportedPlatforms => {
                menu::write_platforms(&mut self.out)?;
                Ok(Flow::Continue)
            }
            MenuChoice::Exit => {
                writeln!(self.out, "\n👋 Thank you for using Video Downloader!")?;
                writeln!(self.out, "{}", menu::separator())?;
                Ok(Flow::Exit)
            }
        }
    }

    async fn download_single(&mut self, audio_only: bool) -> io::Result<Flow> {
        let url = match self.prompt("\nEnter video URL: ").await? {
            Input::Line(line) => line.trim().to_string(),
            Input::Interrupted => return self.interrupted(),
        };

        let request = if audio_only {
            DownloadRequest::audio(url)
        } else {
            let quality = match self.prompt_quality().await? {
                Some(quality) => quality,
                None => return self.interrupted(),
            };
            DownloadRequest::video(url, quality)
        };

        if audio_only {
            writeln!(self.out, "\n🎵 Extracting audio from: {}", request.url)?;
        } else {
            writeln!(self.out, "\n📥 Starting download from: {}", request.url)?;
        }

        let out = &mut self.out;
        let mut on_progress = |event: &ProgressEvent| {
            if let Err(e) = progress_callback(event, out) {
                debug!("[Shell] Progress output failed: {}", e);
            }
        };
        let result = self
            .downloader
            .download_video(&request, &mut on_progress)
            .await;

        match result {
            Ok(path) => {
                // Saved under the title template, so the stem is the title
                let title = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                writeln!(self.out, "\n✅ Successfully downloaded: {}", title)?;
                writeln!(self.out, "📁 Saved to: {}", path.display())?;
            }
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    async fn download_playlist(&mut self) -> io::Result<Flow> {
        let url = match self.prompt("\nEnter playlist URL: ").await? {
            Input::Line(line) => line.trim().to_string(),
            Input::Interrupted => return self.interrupted(),
        };
        let quality = match self.prompt_quality().await? {
            Some(quality) => quality,
            None => return self.interrupted(),
        };

        writeln!(self.out, "\n📥 Downloading playlist from: {}", url)?;

        let out = &mut self.out;
        let mut on_progress = |event: &ProgressEvent| {
            if let Err(e) = progress_callback(event, out) {
                debug!("[Shell] Progress output failed: {}", e);
            }
        };
        let result = self
            .downloader
            .download_playlist(&url, quality, &mut on_progress)
            .await;

        match result {
            Ok(()) => writeln!(self.out, "\n✅ Playlist download completed!")?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    async fn show_info(&mut self) -> io::Result<Flow> {
        let url = match self.prompt("\nEnter video URL: ").await? {
            Input::Line(line) => line.trim().to_string(),
            Input::Interrupted => return self.interrupted(),
        };

        writeln!(self.out, "\n🔍 Fetching video information...")?;
        match self.downloader.get_video_info(&url).await {
            Ok(info) => {
                menu::write_header(&mut self.out, "VIDEO INFORMATION")?;
                write!(self.out, "{}", format_video_info(&info))?;
                writeln!(self.out, "{}", menu::separator())?;
            }
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    /// Ask for a quality; anything unusable falls back to the default.
    /// None means the user interrupted.
    async fn prompt_quality(&mut self) -> io::Result<Option<&'static str>> {
        menu::write_quality_options(&mut self.out)?;
        let count = config::VIDEO_QUALITIES.len();
        let text = format!("\nSelect quality (1-{0}, default: {0}): ", count);
        let line = match self.prompt(&text).await? {
            Input::Line(line) => line,
            Input::Interrupted => return Ok(None),
        };

        match menu::parse_quality_choice(&line) {
            Some(quality) => Ok(Some(quality)),
            None => {
                writeln!(
                    self.out,
                    "Invalid choice. Using '{}' quality.",
                    config::DEFAULT_QUALITY
                )?;
                Ok(Some(config::DEFAULT_QUALITY))
            }
        }
    }

    async fn prompt(&mut self, text: &str) -> io::Result<Input> {
        write!(self.out, "{}", text)?;
        self.out.flush()?;

        let mut line = String::new();
        let read = tokio::select! {
            read = self.input.read_line(&mut line) => Some(read),
            _ = self.interrupt.as_mut() => None,
        };

        match read {
            None => {
                debug!("[Shell] Interrupted at prompt");
                Ok(Input::Interrupted)
            }
            Some(read) => match read? {
                0 => {
                    debug!("[Shell] End of input");
                    Ok(Input::Interrupted)
                }
                _ => Ok(Input::Line(line)),
            },
        }
    }

    fn interrupted(&mut self) -> io::Result<Flow> {
        writeln!(self.out, "\n\n👋 Exiting...")?;
        Ok(Flow::Exit)
    }

    fn report(&mut self, e: &DownloadError) -> io::Result<()> {
        error!("[Shell] {}", e);
        writeln!(self.out, "\n❌ Error: {}", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::orchestrator::tests::FakeBackend;
    use crate::downloader::{NetworkConfig, VideoMetadata};

    struct Session {
        _dir: tempfile::TempDir,
        output: String,
    }

    async fn run_session(backend: FakeBackend, input: &str) -> Session {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::with_backend(dir.path().join("out"), Box::new(backend))
            .unwrap()
            .with_network(NetworkConfig::default());

        let mut out = Vec::new();
        Shell::new(downloader, input.as_bytes(), &mut out)
            .run()
            .await
            .unwrap();

        Session {
            _dir: dir,
            output: String::from_utf8(out).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_exit_choice_says_goodbye() {
        let session = run_session(FakeBackend::default(), "6\n").await;
        assert!(session.output.contains("VIDEO DOWNLOADER v"));
        assert!(session.output.contains("Thank you for using Video Downloader!"));
        assert!(!session.output.contains("Exiting..."));
    }

    #[tokio::test]
    async fn test_invalid_choice_shows_menu_again() {
        let session = run_session(FakeBackend::default(), "9\n6\n").await;
        assert!(session.output.contains("❌ Invalid choice! Please enter 1-6."));
        assert_eq!(session.output.matches("1. Download Single Video").count(), 2);
    }

    #[tokio::test]
    async fn test_end_of_input_exits() {
        let session = run_session(FakeBackend::default(), "").await;
        assert!(session.output.contains("👋 Exiting..."));

        // Also mid-action
        let session = run_session(FakeBackend::default(), "1\n").await;
        assert!(session.output.contains("👋 Exiting..."));
    }

    #[tokio::test]
    async fn test_interrupt_at_prompt_exits() {
        let dir = tempfile::tempdir().unwrap();
        let downloader =
            Downloader::with_backend(dir.path().join("out"), Box::new(FakeBackend::default()))
                .unwrap();

        let mut out = Vec::new();
        // Input would block forever; the interrupt wins
        let (_tx, rx) = tokio::io::duplex(64);
        Shell::new(downloader, tokio::io::BufReader::new(rx), &mut out)
            .with_interrupt(async {})
            .run()
            .await
            .unwrap();

        assert!(String::from_utf8(out).unwrap().contains("👋 Exiting..."));
    }

    #[tokio::test]
    async fn test_video_download_reports_saved_path() {
        let backend = FakeBackend::default();
        let last_options = backend.last_options.clone();
        let session = run_session(backend, "1\nhttps://example.com/v\n3\n6\n").await;

        assert!(session.output.contains("Starting download from: https://example.com/v"));
        assert!(session.output.contains("✓ Download completed! Now processing..."));
        assert!(session.output.contains("✅ Successfully downloaded: Clip\n"));
        assert!(session.output.contains("Clip.mp4"));

        let options = last_options.lock().unwrap().clone().unwrap();
        assert_eq!(options.format, "18");
    }

    #[tokio::test]
    async fn test_bad_quality_falls_back_to_best() {
        let backend = FakeBackend::default();
        let last_options = backend.last_options.clone();
        let session = run_session(backend, "1\nhttps://example.com/v\nabc\n6\n").await;

        assert!(session.output.contains("Invalid choice. Using 'best' quality."));
        let options = last_options.lock().unwrap().clone().unwrap();
        assert_eq!(options.format, "bestvideo+bestaudio/best");
    }

    #[tokio::test]
    async fn test_audio_download_skips_quality_prompt() {
        let backend = FakeBackend::default();
        let last_options = backend.last_options.clone();
        let session = run_session(backend, "2\nhttps://example.com/v\n6\n").await;

        assert!(!session.output.contains("Available Qualities:"));
        assert!(session.output.contains("Extracting audio from"));
        let options = last_options.lock().unwrap().clone().unwrap();
        assert!(options.audio_extraction.is_some());
    }

    #[tokio::test]
    async fn test_playlist_download() {
        let backend = FakeBackend::default();
        let calls = backend.calls.clone();
        let session = run_session(backend, "3\nhttps://example.com/list\n7\n6\n").await;

        assert!(session.output.contains("✅ Playlist download completed!"));
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["playlist https://example.com/list".to_string()]
        );
    }

    #[tokio::test]
    async fn test_video_info_display() {
        let backend = FakeBackend {
            metadata: VideoMetadata {
                title: Some("Clip".to_string()),
                duration: Some(61.0),
                uploader: Some("Someone".to_string()),
                view_count: Some(1500),
                ..VideoMetadata::default()
            },
            ..FakeBackend::default()
        };
        let session = run_session(backend, "4\nhttps://example.com/v\n6\n").await;

        assert!(session.output.contains("VIDEO INFORMATION"));
        assert!(session.output.contains("Title: Clip"));
        assert!(session.output.contains("Duration: 1m 1s"));
        assert!(session.output.contains("Views: 1,500"));
    }

    #[tokio::test]
    async fn test_errors_are_reported_and_loop_continues() {
        let session = run_session(FakeBackend::default(), "4\nnot a url\n6\n").await;
        assert!(session.output.contains("❌ Error: Invalid URL provided"));
        assert!(session.output.contains("Thank you for using Video Downloader!"));

        let session = run_session(
            FakeBackend::failing("ERROR: boom"),
            "1\nhttps://example.com/v\n7\n6\n",
        )
        .await;
        assert!(session.output.contains("❌ Error: Download failed: ERROR: boom"));
        assert!(session.output.contains("Thank you for using Video Downloader!"));
    }

    /// Writer refusing any write that contains `marker`
    struct FailingWriter {
        marker: &'static str,
        written: Vec<u8>,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if String::from_utf8_lossy(buf).contains(self.marker) {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    async fn run_with_writer(writer: &mut FailingWriter) -> io::Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let downloader =
            Downloader::with_backend(dir.path().join("out"), Box::new(FakeBackend::default()))
                .unwrap();
        Shell::new(downloader, "6\n".as_bytes(), writer).run().await
    }

    #[tokio::test]
    async fn test_output_failure_surfaces_io_error() {
        let mut writer = FailingWriter {
            marker: "VIDEO DOWNLOADER",
            written: Vec::new(),
        };
        let err = run_with_writer(&mut writer).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn test_repeated_output_failures_end_session() {
        let mut writer = FailingWriter {
            marker: "Enter your choice",
            written: Vec::new(),
        };
        let err = run_with_writer(&mut writer).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

        let text = String::from_utf8(writer.written).unwrap();
        assert_eq!(
            text.matches("❌ Unexpected error: closed").count(),
            MAX_CONSECUTIVE_FAILURES
        );
    }

    #[tokio::test]
    async fn test_platforms_action() {
        let session = run_session(FakeBackend::default(), "5\n6\n").await;
        assert!(session.output.contains("SUPPORTED PLATFORMS"));
        assert!(session.output.contains("1000+ websites"));
    }
}
