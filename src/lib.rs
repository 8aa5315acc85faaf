//! tubescript - A Rust CLI tool for downloading YouTube transcripts
//!
//! This library fetches time-aligned transcripts for YouTube videos (or local transcript
//! files), falls back across the available caption tracks when the requested language is
//! missing, optionally translates the text while keeping the timing intact, and renders the
//! result as timestamped text files or a `transcripts.zip` archive.

pub mod cli;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod providers;
pub mod transcript;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use output::{NamedTranscriptFile, ARCHIVE_NAME};
pub use pipeline::{TranscriptPipeline, VideoOutcome};
pub use providers::{RawEntry, TrackInfo, TrackKind, VideoMetadata};
pub use transcript::{RetryPolicy, Transcript, TranscriptFetcher, TranscriptSegment};

/// Result type used by the transcript core
pub type Result<T> = std::result::Result<T, TranscriptError>;

/// Error types specific to transcript acquisition and rendering
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    #[error("No transcript available for video {video_id}")]
    NoTranscriptAvailable { video_id: String },

    #[error("Failed to fetch transcript for video {video_id} after {attempts} attempt(s): {reason}")]
    FetchFailed {
        video_id: String,
        attempts: u32,
        reason: String,
    },

    #[error("Malformed transcript entry #{index}: {reason}")]
    SegmentFormat { index: usize, reason: String },

    #[error("Translation to '{target_lang}' failed on batch {batch}: {reason}")]
    TranslationFailed {
        target_lang: String,
        batch: usize,
        reason: String,
    },

    #[error("Could not fetch metadata for video {video_id}: {reason}")]
    MetadataUnavailable { video_id: String, reason: String },

    #[error("Archive creation failed: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),
}
