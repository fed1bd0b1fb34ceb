pub mod config;
pub mod downloader;
pub mod shell;
pub mod utils;

use std::error::Error;

use log::{info, warn};
use tokio::io::BufReader;

use config::Settings;
use downloader::tools::{ToolInfo, ToolManager, ToolType};
use downloader::ytdlp::Launcher;
use downloader::{Downloader, YtDlpBackend};
use shell::Shell;

/// Logging goes to stderr; RUST_LOG overrides the default `warn` filter
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();
}

fn log_found(tool: &ToolInfo) {
    info!(
        "[Tools] {} {} at {}",
        tool.tool_type.as_str(),
        tool.version.as_deref().unwrap_or("?"),
        tool.path.as_deref().unwrap_or("?")
    );
}

/// Probe external tools once and decide how yt-dlp is launched.
/// Missing tools only warn: yt-dlp is needed once an action runs,
/// ffmpeg only for merges and mp3.
pub fn check_tools(settings: &Settings) -> Launcher {
    let manager = ToolManager::new();

    let ytdlp = manager.get_tool_info(ToolType::YtDlp);
    let launcher = Launcher::resolve_with(settings, || ytdlp.path.clone());
    if launcher.is_python_module() {
        info!("[Tools] yt-dlp available as a Python module");
    } else if ytdlp.path.is_some() {
        log_found(&ytdlp);
    } else if settings.ytdlp_path.is_none() {
        warn!("[Tools] yt-dlp not found. Install it with: pip install yt-dlp");
    }

    let ffmpeg = manager.get_tool_info(ToolType::Ffmpeg);
    if ffmpeg.is_available {
        log_found(&ffmpeg);
    } else {
        warn!("[Tools] ffmpeg not found. Merging formats and mp3 extraction will fail");
    }

    launcher
}

/// Start the interactive session on stdin/stdout
pub async fn run() -> Result<(), Box<dyn Error>> {
    init_logging();

    let settings = config::settings();
    let launcher = check_tools(settings);
    let downloader = Downloader::with_backend(
        &settings.output_path,
        Box::new(YtDlpBackend::with_launcher(launcher)),
    )?;
    info!("[Main] Output directory: {}", downloader.output_path().display());

    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            warn!("[Main] Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let mut shell = Shell::new(downloader, BufReader::new(tokio::io::stdin()), std::io::stdout())
        .with_interrupt(interrupt);
    shell.run().await?;
    Ok(())
}
