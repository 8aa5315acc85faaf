use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tubescript",
    about = "tubescript - Download YouTube transcripts as timestamped text, optionally translated",
    version,
    long_about = "Fetches transcripts for YouTube videos (or local JSON transcript files), falling back to another caption track when the requested language is missing. Transcripts can be translated while keeping their timing, and several videos are bundled into a transcripts.zip archive."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to ./config.yaml or the user config directory)
    #[arg(short, long, global = true, value_name = "FILE", env = "TUBESCRIPT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download transcripts for one or more videos
    Transcribe {
        /// YouTube URLs, video ids, or local JSON transcript files
        #[arg(value_name = "URL_OR_FILE", required = true)]
        inputs: Vec<String>,

        /// Preferred transcript language (falls back to another track if missing)
        #[arg(short, long, value_name = "LANG")]
        source_lang: Option<String>,

        /// Translate the transcript into this language
        #[arg(short, long, value_name = "LANG")]
        target_lang: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Directory to save files into (defaults to the configured output directory)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Bundle the transcripts into transcripts.zip, even for a single video
        #[arg(long, conflicts_with = "stdout")]
        archive: bool,

        /// Print transcripts instead of saving them
        #[arg(long)]
        stdout: bool,
    },

    /// List the transcript tracks available for a video
    Tracks {
        /// YouTube URL, video id, or local JSON transcript file
        #[arg(value_name = "URL_OR_FILE")]
        input: String,
    },

    /// Show or initialize the configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text with [HH:MM:SS → HH:MM:SS] timestamps
    Text,
    /// Plain text with second-precision timestamps, for quick previews
    Compact,
    /// JSON with metadata and segments
    Json,
}

impl OutputFormat {
    /// File extension for saved transcripts
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text | OutputFormat::Compact => "txt",
            OutputFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Compact => write!(f, "compact"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
