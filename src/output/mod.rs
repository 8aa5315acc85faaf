use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::providers::VideoMetadata;
use crate::transcript::Transcript;
use crate::utils::sanitize_filename;

pub mod archive;
pub mod formatters;

pub use archive::{dedupe_filenames, render_archive, ARCHIVE_NAME};
pub use formatters::*;

/// Stem used when a title sanitizes to nothing
const FALLBACK_STEM: &str = "transcript";

/// A rendered transcript ready to be written or archived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedTranscriptFile {
    pub filename: String,
    pub content: String,
}

impl NamedTranscriptFile {
    /// Name the file after the video title (or its id if the title has no usable characters)
    pub fn for_video(metadata: &VideoMetadata, extension: &str, max_length: usize, content: String) -> Self {
        let mut stem = sanitize_filename(&metadata.title, max_length);
        if stem.trim().is_empty() {
            stem = sanitize_filename(&metadata.id, max_length);
        }
        if stem.trim().is_empty() {
            stem = FALLBACK_STEM.to_string();
        }

        Self {
            filename: format!("{}.{}", stem, extension),
            content,
        }
    }
}

/// Render a transcript in the requested format
pub fn render(format: &OutputFormat, transcript: &Transcript, metadata: &VideoMetadata) -> crate::Result<String> {
    let content = match format {
        OutputFormat::Text => render_timestamped(&transcript.segments),
        OutputFormat::Compact => render_compact(&transcript.segments),
        OutputFormat::Json => render_json(transcript, metadata)?,
    };
    Ok(content)
}

/// Save rendered transcript files into a directory
pub fn save_files(files: &[NamedTranscriptFile], dir: &Path) -> Result<Vec<PathBuf>> {
    let files = dedupe_filenames(files.to_vec());
    let mut written = Vec::with_capacity(files.len());

    for file in &files {
        let path = dir.join(&file.filename);
        fs_err::write(&path, &file.content).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

/// Build `transcripts.zip` from the files and save it into a directory
pub fn save_archive(files: &[NamedTranscriptFile], dir: &Path) -> Result<PathBuf> {
    let (bytes, name) = render_archive(files)?;
    let path = dir.join(name);
    fs_err::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Print transcript files to console
pub fn print_to_console(files: &[NamedTranscriptFile]) {
    let multiple = files.len() > 1;
    for file in files {
        if multiple {
            println!("==> {} <==", file.filename);
        }
        print!("{}", file.content);
    }
}
