use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{
    PlaylistIndex, RawEntry, RawSnippet, TrackInfo, TrackKind, TranscriptIndex, VideoInfoProvider, VideoMetadata,
};

const CAPTION_FORMAT: &str = "json3";
const ORIGINAL_SUFFIX: &str = "-orig";

/// YouTube metadata and caption provider using yt-dlp
pub struct YoutubeProvider {
    yt_dlp_path: String,
    client: reqwest::Client,
}

impl YoutubeProvider {
    pub fn new(yt_dlp_path: impl Into<String>, request_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            yt_dlp_path: yt_dlp_path.into(),
            client,
        })
    }

    /// Run yt-dlp and return its stdout
    async fn run_yt_dlp(&self, args: &[&str]) -> anyhow::Result<Vec<u8>> {
        let output = Command::new(&self.yt_dlp_path)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.yt_dlp_path))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error.trim());
        }

        Ok(output.stdout)
    }

    /// Get video information (including caption listings) using yt-dlp
    async fn get_video_info(&self, video_id: &str) -> anyhow::Result<Value> {
        let url = watch_url(video_id);
        tracing::debug!("Extracting video info for: {}", url);

        let stdout = self
            .run_yt_dlp(&["--dump-json", "--skip-download", "--no-playlist", "--no-warnings", &url])
            .await?;

        let info: Value = serde_json::from_slice(&stdout).context("yt-dlp returned invalid JSON")?;
        Ok(info)
    }
}

#[async_trait]
impl PlaylistIndex for YoutubeProvider {
    async fn playlist_video_ids(&self, playlist_id: &str) -> anyhow::Result<Vec<String>> {
        let url = playlist_url(playlist_id);
        tracing::debug!("Listing playlist: {}", url);

        let stdout = self
            .run_yt_dlp(&["--flat-playlist", "--dump-json", "--no-warnings", &url])
            .await?;

        video_ids_from_flat_playlist(&String::from_utf8_lossy(&stdout))
    }
}

#[async_trait]
impl VideoInfoProvider for YoutubeProvider {
    async fn metadata(&self, video_id: &str) -> anyhow::Result<VideoMetadata> {
        let info = self.get_video_info(video_id).await?;
        Ok(metadata_from_info(video_id, &info))
    }
}

#[async_trait]
impl TranscriptIndex for YoutubeProvider {
    async fn list_tracks(&self, video_id: &str) -> anyhow::Result<Vec<TrackInfo>> {
        let info = self.get_video_info(video_id).await?;
        Ok(tracks_from_info(&info))
    }

    async fn fetch_track(&self, _video_id: &str, track: &TrackInfo) -> anyhow::Result<Vec<RawEntry>> {
        tracing::debug!("Downloading {} captions ({})", track.language_code, track.kind.as_str());

        let response = self
            .client
            .get(&track.locator)
            .send()
            .await
            .context("Failed to download captions")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to download captions: HTTP {}", response.status());
        }

        let body: Value = response.json().await.context("Failed to parse caption JSON")?;
        entries_from_json3(&body)
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

pub fn playlist_url(playlist_id: &str) -> String {
    format!("https://www.youtube.com/playlist?list={}", playlist_id)
}

/// Video ids from `--flat-playlist --dump-json` output, one JSON object per line.
/// Entries without an id (deleted or private videos) are skipped.
fn video_ids_from_flat_playlist(output: &str) -> anyhow::Result<Vec<String>> {
    let mut ids = Vec::new();

    for (line_number, line) in output.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let entry: Value = serde_json::from_str(line)
            .with_context(|| format!("yt-dlp returned invalid JSON on line {}", line_number + 1))?;
        match entry["id"].as_str() {
            Some(id) if !id.is_empty() => ids.push(id.to_string()),
            _ => tracing::debug!("Skipping playlist entry without an id: {}", line),
        }
    }

    Ok(ids)
}

fn metadata_from_info(video_id: &str, info: &Value) -> VideoMetadata {
    VideoMetadata {
        id: video_id.to_string(),
        title: info["title"].as_str().unwrap_or(video_id).to_string(),
        duration: info["duration"].as_f64().map(|d| d.max(0.0) as u64).unwrap_or(0),
        thumbnail_url: info["thumbnail"].as_str().unwrap_or_default().to_string(),
        url: info["webpage_url"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| watch_url(video_id)),
    }
}

/// Build the track list from yt-dlp's `subtitles` and `automatic_captions` maps
fn tracks_from_info(info: &Value) -> Vec<TrackInfo> {
    let mut tracks = Vec::new();

    if let Some(subtitles) = info["subtitles"].as_object() {
        for (lang, formats) in subtitles {
            if lang == "live_chat" {
                continue;
            }
            if let Some(locator) = caption_url(formats) {
                tracks.push(TrackInfo {
                    language_code: lang.clone(),
                    language_name: caption_name(formats),
                    kind: TrackKind::Manual,
                    locator,
                });
            }
        }
    }

    if let Some(automatic) = info["automatic_captions"].as_object() {
        // Auto captions also list machine translations; "-orig" marks the spoken language.
        let has_original = automatic.keys().any(|lang| lang.ends_with(ORIGINAL_SUFFIX));

        for (lang, formats) in automatic {
            let language_code = match lang.strip_suffix(ORIGINAL_SUFFIX) {
                Some(code) => code,
                None if has_original => continue,
                None => lang.as_str(),
            };
            if let Some(locator) = caption_url(formats) {
                tracks.push(TrackInfo {
                    language_code: language_code.to_string(),
                    language_name: caption_name(formats),
                    kind: TrackKind::Generated,
                    locator,
                });
            }
        }
    }

    tracks
}

fn caption_url(formats: &Value) -> Option<String> {
    formats
        .as_array()?
        .iter()
        .find(|format| format["ext"].as_str() == Some(CAPTION_FORMAT))
        .and_then(|format| format["url"].as_str())
        .map(str::to_string)
}

fn caption_name(formats: &Value) -> Option<String> {
    formats
        .as_array()?
        .iter()
        .find_map(|format| format["name"].as_str())
        .map(str::to_string)
}

/// Convert a YouTube `json3` caption document into raw entries
fn entries_from_json3(body: &Value) -> anyhow::Result<Vec<RawEntry>> {
    let events = body["events"]
        .as_array()
        .context("Caption document has no events")?;

    let mut entries = Vec::with_capacity(events.len());
    for event in events {
        let Some(segs) = event["segs"].as_array() else {
            continue;
        };

        let text: String = segs.iter().filter_map(|seg| seg["utf8"].as_str()).collect();
        let text = text.replace('\n', " ");
        if text.trim().is_empty() {
            continue;
        }

        let start_ms = event["tStartMs"].as_f64().unwrap_or(0.0);
        let duration_ms = event["dDurationMs"].as_f64().unwrap_or(0.0);

        entries.push(RawEntry::Snippet(RawSnippet {
            text: text.trim().to_string(),
            start: start_ms / 1000.0,
            duration: duration_ms / 1000.0,
        }));
    }

    Ok(entries)
}
