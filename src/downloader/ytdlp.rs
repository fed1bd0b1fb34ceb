// yt-dlp backend - drives the yt-dlp process
//
// Metadata comes from `--dump-single-json`. Downloads run with a progress
// template so every progress update arrives on stdout as one marker line,
// and `--print after_move:filepath` reports where the file ended up.

use async_trait::async_trait;
use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::sync::mpsc;

use super::diagnostics::{describe_failure, diagnose_error};
use super::errors::BackendError;
use super::models::{
    DownloadOptions, NetworkConfig, ProgressEvent, ProgressStatus, VideoMetadata,
};
use super::tools::{find_binary, python_has_module};
use super::traits::{MediaBackend, ProgressCallback};
use super::utils::{get_network_args, join_pipe, run_output_with_timeout, spawn_error};
use crate::config::{self, Settings};

const PROGRESS_MARKER: &str = "[vdl-progress]";

lazy_static! {
    static ref PROGRESS_TEMPLATE: String = format!(
        "download:{} %(progress.status)s|%(progress._percent_str)s|%(progress._speed_str)s|%(progress._eta_str)s",
        PROGRESS_MARKER
    );
    static ref ANSI_RE: Regex = Regex::new(r"\x1b\[[0-9;]*m").unwrap();
}

/// How yt-dlp gets started: a native binary or the python module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launcher {
    pub program: String,
    pub prefix_args: Vec<String>,
}

impl Launcher {
    pub fn binary(path: impl Into<String>) -> Self {
        Self {
            program: path.into(),
            prefix_args: Vec::new(),
        }
    }

    pub fn python_module(python: impl Into<String>) -> Self {
        Self {
            program: python.into(),
            prefix_args: vec!["-m".to_string(), "yt_dlp".to_string()],
        }
    }

    /// Explicit path, then installed binary, then python module
    pub fn resolve(settings: &Settings) -> Self {
        Self::resolve_with(settings, || find_binary("yt-dlp"))
    }

    /// Same order as `resolve`, with the binary lookup supplied by the
    /// caller. `locate` is not called when a path is configured.
    pub fn resolve_with(settings: &Settings, locate: impl FnOnce() -> Option<String>) -> Self {
        if let Some(path) = &settings.ytdlp_path {
            info!("[yt-dlp] Using configured binary: {}", path);
            return Self::binary(path.clone());
        }

        if let Some(path) = locate() {
            info!("[yt-dlp] Found binary: {}", path);
            return Self::binary(path);
        }

        if python_has_module(&settings.python, "yt_dlp") {
            info!("[yt-dlp] Using python module via {}", settings.python);
            return Self::python_module(settings.python.clone());
        }

        // Last resort: hope it's in PATH
        Self::binary("yt-dlp")
    }

    pub fn is_python_module(&self) -> bool {
        !self.prefix_args.is_empty()
    }

    fn full_args(&self, args: Vec<String>) -> Vec<String> {
        let mut full = self.prefix_args.clone();
        full.extend(args);
        full
    }
}

/// Parse one progress-template line into an event
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let rest = line.trim().strip_prefix(PROGRESS_MARKER)?;
    let clean = ANSI_RE.replace_all(rest, "");
    let mut fields = clean.trim().split('|').map(str::trim);

    let status = fields.next().filter(|s| !s.is_empty())?;
    // yt-dlp renders missing template fields as "NA"
    let mut field = || {
        fields
            .next()
            .filter(|v| !v.is_empty() && *v != "NA" && *v != "Unknown")
            .map(str::to_string)
    };

    Some(ProgressEvent {
        status: ProgressStatus::from(status),
        percent: field(),
        speed: field(),
        eta: field(),
    })
}

/// Arguments for a metadata-only run
pub fn build_info_args(url: &str, network: &NetworkConfig) -> Vec<String> {
    let mut args = vec![
        "--dump-single-json".to_string(),
        "--no-playlist".to_string(),
        "--skip-download".to_string(),
        "--no-warnings".to_string(),
    ];
    args.extend(get_network_args(network));
    args.push(url.to_string());
    args
}

/// Arguments for a download run (single item or collection)
pub fn build_download_args(url: &str, options: &DownloadOptions) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        options.format.clone(),
        if options.playlist {
            "--yes-playlist".to_string()
        } else {
            "--no-playlist".to_string()
        },
        "-P".to_string(),
        options.output_dir.to_string_lossy().to_string(),
        "-o".to_string(),
        options.output_template.clone(),
        "--newline".to_string(),
        "--no-colors".to_string(),
        "--progress".to_string(),
        "--progress-template".to_string(),
        PROGRESS_TEMPLATE.clone(),
        "--print".to_string(),
        "after_move:filepath".to_string(),
    ];

    args.extend(get_network_args(&options.network));

    if options.skip_certificate_check {
        args.push("--no-check-certificates".to_string());
    }

    if let Some(audio) = &options.audio_extraction {
        args.extend(vec![
            "-x".to_string(),
            "--audio-format".to_string(),
            audio.codec.clone(),
            "--audio-quality".to_string(),
            audio.quality.clone(),
        ]);
    }

    args.push(url.to_string());
    args
}

/// Parse `--dump-single-json` output
pub fn parse_metadata(stdout: &[u8]) -> Result<VideoMetadata, BackendError> {
    let json_str = String::from_utf8_lossy(stdout);
    let trimmed = json_str.trim();
    if trimmed.is_empty() {
        return Err(BackendError::Parse("yt-dlp printed no metadata".to_string()));
    }
    Ok(serde_json::from_str(trimmed)?)
}

/// Error for a yt-dlp run that exited unsuccessfully
fn execution_failure(stderr: &[u8]) -> BackendError {
    let stderr = String::from_utf8_lossy(stderr);
    debug!("[yt-dlp] stderr: {}", stderr);
    if let Some(reason) = diagnose_error(&stderr) {
        if reason.is_transient() {
            warn!("[yt-dlp] {:?} may clear up if retried later", reason);
        }
    }
    BackendError::Execution(describe_failure(&stderr))
}

/// yt-dlp based backend
pub struct YtDlpBackend {
    launcher: Launcher,
}

impl YtDlpBackend {
    pub fn new() -> Self {
        Self::with_launcher(Launcher::resolve(config::settings()))
    }

    pub fn with_launcher(launcher: Launcher) -> Self {
        Self { launcher }
    }

    /// Run yt-dlp, feeding progress lines to the callback.
    /// Returns the non-progress, non-empty stdout lines.
    ///
    /// `--print` puts yt-dlp in quiet mode, which moves the progress
    /// template output to stderr, so both streams are scanned.
    async fn run_streaming(
        &self,
        args: Vec<String>,
        progress: ProgressCallback<'_>,
    ) -> Result<Vec<String>, BackendError> {
        let program = &self.launcher.program;
        let args = self.launcher.full_args(args);
        debug!("[yt-dlp] Running: {} {}", program, args.join(" "));

        let mut child = TokioCommand::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BackendError::Execution("Failed to capture stdout".to_string()))?;
        let stderr_pipe = child
            .stderr
            .take()
            .ok_or_else(|| BackendError::Execution("Failed to capture stderr".to_string()))?;

        // Drain stderr concurrently so yt-dlp never blocks on a full pipe.
        // Progress lines are forwarded, everything else is kept for diagnostics.
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let stderr_task = tokio::spawn(async move {
            let mut kept = Vec::new();
            let mut segments = BufReader::new(stderr_pipe).split(b'\n');
            while let Some(segment) = segments.next_segment().await? {
                match parse_progress_line(&String::from_utf8_lossy(&segment)) {
                    Some(event) => {
                        // Receiver only goes away on an early error return
                        let _ = events_tx.send(event);
                    }
                    None => {
                        kept.extend_from_slice(&segment);
                        kept.push(b'\n');
                    }
                }
            }
            Ok::<_, std::io::Error>(kept)
        });

        let mut printed = Vec::new();
        let mut segments = BufReader::new(stdout).split(b'\n');
        let mut stdout_open = true;
        let mut stderr_open = true;
        while stdout_open || stderr_open {
            let feed = tokio::select! {
                segment = segments.next_segment(), if stdout_open => Feed::Stdout(
                    segment.map_err(|e| {
                        BackendError::Execution(format!("Failed to read stdout: {}", e))
                    })?,
                ),
                event = events_rx.recv(), if stderr_open => Feed::Progress(event),
            };

            match feed {
                Feed::Stdout(Some(segment)) => {
                    let line = String::from_utf8_lossy(&segment);
                    if let Some(event) = parse_progress_line(&line) {
                        progress(&event);
                        continue;
                    }
                    let line = line.trim();
                    if !line.is_empty() {
                        debug!("[yt-dlp] {}", line);
                        printed.push(line.to_string());
                    }
                }
                Feed::Stdout(None) => stdout_open = false,
                Feed::Progress(Some(event)) => progress(&event),
                Feed::Progress(None) => stderr_open = false,
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| BackendError::Execution(format!("Process error: {}", e)))?;
        let stderr = join_pipe(stderr_task, "stderr").await?;

        if !status.success() {
            return Err(execution_failure(&stderr));
        }

        Ok(printed)
    }
}

/// One item read from a running yt-dlp
enum Feed {
    Stdout(Option<Vec<u8>>),
    Progress(Option<ProgressEvent>),
}

impl Default for YtDlpBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaBackend for YtDlpBackend {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn extract_info(
        &self,
        url: &str,
        network: &NetworkConfig,
    ) -> Result<VideoMetadata, BackendError> {
        let args = self.launcher.full_args(build_info_args(url, network));
        debug!("[yt-dlp] Fetching info: {}", url);

        let output =
            run_output_with_timeout(&self.launcher.program, args, config::INFO_TIMEOUT_SECS)
                .await?;

        if !output.status.success() {
            return Err(execution_failure(&output.stderr));
        }

        parse_metadata(&output.stdout)
    }

    async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        progress: ProgressCallback<'_>,
    ) -> Result<PathBuf, BackendError> {
        let printed = self
            .run_streaming(build_download_args(url, options), progress)
            .await?;

        printed
            .last()
            .map(PathBuf::from)
            .ok_or_else(|| BackendError::Parse("yt-dlp did not report the saved file".to_string()))
    }

    async fn download_collection(
        &self,
        url: &str,
        options: &DownloadOptions,
        progress: ProgressCallback<'_>,
    ) -> Result<(), BackendError> {
        let printed = self
            .run_streaming(build_download_args(url, options), progress)
            .await?;
        info!("[yt-dlp] Collection finished: {} file(s)", printed.len());
        Ok(())
    }
}
