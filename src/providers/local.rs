use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use tokio::fs;

use super::{RawEntry, TrackInfo, TrackKind, TranscriptIndex, VideoInfoProvider, VideoMetadata};

/// Language tag used for files that don't declare one
pub const UNDETERMINED_LANGUAGE: &str = "und";

/// Transcript file exported from another tool, either a bare list of
/// `{text, start, duration}` objects or a document with several tracks.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LocalDocument {
    Document(LocalTranscriptFile),
    Entries(Vec<Map<String, Value>>),
}

#[derive(Debug, Deserialize)]
struct LocalTranscriptFile {
    title: Option<String>,
    duration: Option<u64>,
    thumbnail_url: Option<String>,
    url: Option<String>,
    tracks: Vec<LocalTrack>,
}

#[derive(Debug, Deserialize)]
struct LocalTrack {
    language_code: String,
    language_name: Option<String>,
    #[serde(default)]
    generated: bool,
    #[serde(default)]
    entries: Vec<Map<String, Value>>,
}

/// Reads transcripts from JSON files on disk
pub struct LocalTranscriptProvider;

impl LocalTranscriptProvider {
    pub fn new() -> Self {
        Self
    }

    /// Check if the file exists and is accessible
    async fn validate_file(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            anyhow::bail!("File does not exist: {}", path.display());
        }

        if !path.is_file() {
            anyhow::bail!("Path is not a file: {}", path.display());
        }

        Ok(())
    }

    async fn load(&self, path: &Path) -> Result<LocalDocument> {
        self.validate_file(path).await?;

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        serde_json::from_str(&content).with_context(|| format!("Invalid transcript file {}", path.display()))
    }
}

impl Default for LocalTranscriptProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoInfoProvider for LocalTranscriptProvider {
    async fn metadata(&self, video_id: &str) -> Result<VideoMetadata> {
        let path = Path::new(video_id);
        let document = self.load(path).await?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Local Transcript")
            .to_string();
        let file_url = fs_err::canonicalize(path)
            .ok()
            .and_then(|absolute| url::Url::from_file_path(absolute).ok())
            .map(|url| url.to_string())
            .unwrap_or_else(|| video_id.to_string());

        let metadata = match document {
            LocalDocument::Document(file) => {
                let duration = file
                    .duration
                    .unwrap_or_else(|| file.tracks.first().map(|t| span_seconds(&t.entries)).unwrap_or(0));
                VideoMetadata {
                    id: video_id.to_string(),
                    title: file.title.unwrap_or(stem),
                    duration,
                    thumbnail_url: file.thumbnail_url.unwrap_or_default(),
                    url: file.url.unwrap_or(file_url),
                }
            }
            LocalDocument::Entries(entries) => VideoMetadata {
                id: video_id.to_string(),
                title: stem,
                duration: span_seconds(&entries),
                thumbnail_url: String::new(),
                url: file_url,
            },
        };

        Ok(metadata)
    }
}

#[async_trait]
impl TranscriptIndex for LocalTranscriptProvider {
    async fn list_tracks(&self, video_id: &str) -> Result<Vec<TrackInfo>> {
        let document = self.load(Path::new(video_id)).await?;

        let tracks = match document {
            LocalDocument::Document(file) => file
                .tracks
                .into_iter()
                .enumerate()
                .map(|(index, track)| TrackInfo {
                    language_code: track.language_code,
                    language_name: track.language_name,
                    kind: if track.generated { TrackKind::Generated } else { TrackKind::Manual },
                    locator: index.to_string(),
                })
                .collect(),
            LocalDocument::Entries(_) => vec![TrackInfo {
                language_code: UNDETERMINED_LANGUAGE.to_string(),
                language_name: None,
                kind: TrackKind::Manual,
                locator: "0".to_string(),
            }],
        };

        Ok(tracks)
    }

    async fn fetch_track(&self, video_id: &str, track: &TrackInfo) -> Result<Vec<RawEntry>> {
        let index: usize = track
            .locator
            .parse()
            .with_context(|| format!("Invalid local track locator: {}", track.locator))?;

        let entries = match self.load(Path::new(video_id)).await? {
            LocalDocument::Document(mut file) => {
                if index >= file.tracks.len() {
                    anyhow::bail!("Track {} not found in {}", index, video_id);
                }
                file.tracks.swap_remove(index).entries
            }
            LocalDocument::Entries(entries) => entries,
        };

        Ok(entries.into_iter().map(RawEntry::Mapping).collect())
    }
}

/// Whole seconds covered by the entries, ignoring anything non-numeric
fn span_seconds(entries: &[Map<String, Value>]) -> u64 {
    entries
        .iter()
        .filter_map(|entry| {
            let start = entry.get("start")?.as_f64()?;
            let duration = entry.get("duration").and_then(Value::as_f64).unwrap_or(0.0);
            Some(start + duration)
        })
        .fold(0.0_f64, f64::max) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_bare_entry_list() {
        let file = write_temp(r#"[{"text": "hi", "start": 0, "duration": 1.5}, {"text": "there", "start": 1.5, "duration": 2}]"#);
        let id = file.path().to_str().unwrap();
        let provider = LocalTranscriptProvider::new();

        let tracks = provider.list_tracks(id).await.unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].language_code, UNDETERMINED_LANGUAGE);

        let entries = provider.fetch_track(id, &tracks[0]).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(matches!(&entries[0], RawEntry::Mapping(map) if map["text"] == "hi"));

        let metadata = provider.metadata(id).await.unwrap();
        assert_eq!(metadata.duration, 3);
        assert!(metadata.url.starts_with("file://"));
    }

    #[tokio::test]
    async fn test_document_with_tracks() {
        let file = write_temp(
            r#"{
                "title": "Weekly sync",
                "tracks": [
                    {"language_code": "en", "generated": true, "entries": [{"text": "a", "start": 1, "duration": 1}]},
                    {"language_code": "de", "entries": [{"text": "b", "start": "2.5"}]}
                ]
            }"#,
        );
        let id = file.path().to_str().unwrap();
        let provider = LocalTranscriptProvider::new();

        let tracks = provider.list_tracks(id).await.unwrap();
        assert_eq!(tracks[0].kind, TrackKind::Generated);
        assert_eq!(tracks[1].kind, TrackKind::Manual);

        let entries = provider.fetch_track(id, &tracks[1]).await.unwrap();
        assert!(matches!(&entries[0], RawEntry::Mapping(map) if map["text"] == "b"));

        let metadata = provider.metadata(id).await.unwrap();
        assert_eq!(metadata.title, "Weekly sync");
        assert_eq!(metadata.duration, 2);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let provider = LocalTranscriptProvider::new();
        assert!(provider.list_tracks("does/not/exist.json").await.is_err());
    }
}
