use anyhow::{Context, Result};
use std::path::Path;
use url::Url;

/// Characters that are not allowed in file names on common filesystems
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Default maximum file name length in characters
pub const DEFAULT_MAX_FILENAME_LENGTH: usize = 100;

const VIDEO_ID_LENGTH: usize = 11;

/// Remove characters that are invalid in file names, then cut to `max_length` characters.
///
/// Characters are dropped, not replaced, so the result may be empty. Distinct titles can
/// map to the same name.
pub fn sanitize_filename(title: &str, max_length: usize) -> String {
    title
        .chars()
        .filter(|c| !INVALID_FILENAME_CHARS.contains(c))
        .take(max_length)
        .collect()
}

/// Format a video duration as `MM:SS` under an hour, `H:MM:SS` above
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

fn is_youtube_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "youtube.com" || host == "youtu.be" || host.ends_with(".youtube.com")
}

fn looks_like_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LENGTH
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn looks_like_playlist_id(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Parse a YouTube URL, allowing the scheme to be left out (`youtu.be/<id>`)
fn parse_youtube_url(input: &str) -> Option<Url> {
    let url = match Url::parse(input) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{}", input)).ok()?,
        Err(_) => return None,
    };

    url.host_str().filter(|host| is_youtube_host(host))?;
    Some(url)
}

/// Extract the video id from a YouTube URL, or accept a bare video id
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if looks_like_video_id(input) {
        return Some(input.to_string());
    }

    let url = parse_youtube_url(input)?;
    let host = url.host_str()?;

    // youtu.be/<id>
    if host.eq_ignore_ascii_case("youtu.be") {
        let id = url.path_segments()?.next()?;
        return looks_like_video_id(id).then(|| id.to_string());
    }

    // youtube.com/watch?v=<id>
    if let Some((_, id)) = url.query_pairs().find(|(key, _)| key == "v") {
        return looks_like_video_id(&id).then(|| id.to_string());
    }

    // youtube.com/shorts/<id>, /embed/<id>, /live/<id>, /v/<id>
    let mut segments = url.path_segments()?;
    match (segments.next(), segments.next()) {
        (Some("shorts" | "embed" | "live" | "v"), Some(id)) if looks_like_video_id(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Extract the list id from a YouTube playlist URL (`youtube.com/playlist?list=<id>`).
///
/// Watch URLs that merely carry a `list` parameter stay single videos.
pub fn extract_playlist_id(input: &str) -> Option<String> {
    let url = parse_youtube_url(input.trim())?;
    if url.path().trim_end_matches('/') != "/playlist" {
        return None;
    }

    url.query_pairs()
        .find(|(key, _)| key == "list")
        .map(|(_, id)| id.into_owned())
        .filter(|id| looks_like_playlist_id(id))
}

/// Check that a directory exists and is writable
pub fn validate_save_location(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Output directory does not exist: {}", path.display());
    }

    if !path.is_dir() {
        anyhow::bail!("Output path is not a directory: {}", path.display());
    }

    // Permission bits don't tell whether this user may write, so try it
    tempfile::NamedTempFile::new_in(path)
        .with_context(|| format!("Output directory is not writable: {}", path.display()))?;

    Ok(())
}

/// Check if the current environment has required tools
pub async fn check_dependencies(yt_dlp_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(yt_dlp_path).await {
        missing.push(format!("{} - required for YouTube metadata and captions", yt_dlp_path));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
