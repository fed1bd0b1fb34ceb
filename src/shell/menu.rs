// Menu and quality prompt rendering/parsing

use std::io::{self, Write};

use crate::config::{self, SUPPORTED_PLATFORMS};
use crate::downloader::FormatSelector;

pub const SEPARATOR_WIDTH: usize = 50;

/// Actions offered by the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    DownloadVideo,
    DownloadAudio,
    DownloadPlaylist,
    VideoInfo,
    SupportedPlatforms,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 6] = [
        MenuChoice::DownloadVideo,
        MenuChoice::DownloadAudio,
        MenuChoice::DownloadPlaylist,
        MenuChoice::VideoInfo,
        MenuChoice::SupportedPlatforms,
        MenuChoice::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuChoice::DownloadVideo => "Download Single Video",
            MenuChoice::DownloadAudio => "Download Audio Only",
            MenuChoice::DownloadPlaylist => "Download Playlist",
            MenuChoice::VideoInfo => "Get Video Information",
            MenuChoice::SupportedPlatforms => "View Supported Platforms",
            MenuChoice::Exit => "Exit",
        }
    }

    /// Parse the number typed at the menu prompt
    pub fn parse(input: &str) -> Option<MenuChoice> {
        match input.trim() {
            "1" => Some(MenuChoice::DownloadVideo),
            "2" => Some(MenuChoice::DownloadAudio),
            "3" => Some(MenuChoice::DownloadPlaylist),
            "4" => Some(MenuChoice::VideoInfo),
            "5" => Some(MenuChoice::SupportedPlatforms),
            "6" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

pub fn separator() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

/// Section header framed by separators
pub fn write_header(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "\n{}", separator())?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", separator())
}

pub fn write_banner(out: &mut impl Write) -> io::Result<()> {
    let title = format!("VIDEO DOWNLOADER v{}", env!("CARGO_PKG_VERSION"));
    writeln!(out)?;
    writeln!(out, "    ╔════════════════════════════════════════╗")?;
    writeln!(out, "    ║     {:<35}║", title)?;
    writeln!(out, "    ║     {:<35}║", "Download videos from any platform")?;
    writeln!(out, "    ╚════════════════════════════════════════╝")
}

pub fn write_menu(out: &mut impl Write) -> io::Result<()> {
    write_header(out, "MENU")?;
    for (idx, choice) in MenuChoice::ALL.iter().enumerate() {
        writeln!(out, "{}. {}", idx + 1, choice.label())?;
    }
    writeln!(out, "{}", separator())
}

pub fn write_quality_options(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\nAvailable Qualities:")?;
    for (idx, quality) in config::quality_labels().enumerate() {
        writeln!(out, "{}. {}", idx + 1, quality)?;
    }
    Ok(())
}

/// Quality label for a typed menu number; None for anything unusable
pub fn parse_quality_choice(input: &str) -> Option<&'static str> {
    input
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(FormatSelector::label_at)
}

pub fn write_platforms(out: &mut impl Write) -> io::Result<()> {
    write_header(out, "SUPPORTED PLATFORMS")?;
    for platform in SUPPORTED_PLATFORMS {
        writeln!(out, "✓ {}", platform)?;
    }
    writeln!(out, "{}", separator())?;
    writeln!(out, "\nNote: Works with 1000+ websites!")
}
