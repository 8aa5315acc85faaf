use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod google;
pub mod local;
pub mod youtube;

/// Metadata about a video, used for naming and display only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Video identifier (YouTube id or local file path)
    pub id: String,

    /// Human readable title
    pub title: String,

    /// Duration in whole seconds
    pub duration: u64,

    /// Thumbnail image URL (empty when unknown)
    pub thumbnail_url: String,

    /// Canonical watch URL
    pub url: String,
}

/// How a caption track was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Manual,
    Generated,
}

impl TrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Manual => "manual",
            TrackKind::Generated => "auto-generated",
        }
    }
}

/// One transcript track available for a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Language tag, e.g. `en` or `pt-BR`
    pub language_code: String,

    /// Display name of the language, if the provider knows it
    pub language_name: Option<String>,

    pub kind: TrackKind,

    /// Provider-owned handle used to fetch the track's entries
    pub locator: String,
}

/// A field-bearing transcript entry as produced by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSnippet {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Upstream transcript entry of either supported shape
#[derive(Debug, Clone, PartialEq)]
pub enum RawEntry {
    /// Entry exposing its fields directly
    Snippet(RawSnippet),

    /// Entry exposing its fields through string keys
    Mapping(serde_json::Map<String, serde_json::Value>),
}

/// Looks up video metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoInfoProvider: Send + Sync {
    async fn metadata(&self, video_id: &str) -> anyhow::Result<VideoMetadata>;
}

/// Lists and fetches the transcript tracks of a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptIndex: Send + Sync {
    /// List every track available for the video, manual tracks first
    async fn list_tracks(&self, video_id: &str) -> anyhow::Result<Vec<TrackInfo>>;

    /// Materialize the raw entries of one track, in upstream order
    async fn fetch_track(&self, video_id: &str, track: &TrackInfo) -> anyhow::Result<Vec<RawEntry>>;
}

/// Translates batches of text, auto-detecting the source language
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Returns one translation per input text, in the same order
    async fn translate_batch(&self, texts: &[String], target_lang: &str) -> anyhow::Result<Vec<String>>;
}

/// Enumerates the videos of a playlist
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaylistIndex: Send + Sync {
    /// Video ids in playlist order
    async fn playlist_video_ids(&self, playlist_id: &str) -> anyhow::Result<Vec<String>>;
}

/// Routes video inputs to the YouTube or local-file provider
pub struct SourceRegistry {
    youtube: youtube::YoutubeProvider,
    local: local::LocalTranscriptProvider,
}

impl SourceRegistry {
    pub fn new(youtube: youtube::YoutubeProvider) -> Self {
        Self {
            youtube,
            local: local::LocalTranscriptProvider::new(),
        }
    }

    /// Check if input is a local transcript file rather than a YouTube URL or id
    pub fn is_local_file(input: &str) -> bool {
        if input.starts_with("http://") || input.starts_with("https://") {
            return false;
        }

        let path = std::path::Path::new(input);
        if path.is_file() {
            return true;
        }

        // youtu.be/<id>, www.youtube.com/playlist?list=<id> and friends
        if crate::utils::extract_video_id(input).is_some() || crate::utils::extract_playlist_id(input).is_some() {
            return false;
        }

        let has_json_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let has_path_separators = input.contains('/') || input.contains('\\');

        has_json_extension || has_path_separators
    }

    /// Resolve a raw CLI input to the id the providers expect
    pub fn resolve_input(input: &str) -> crate::Result<String> {
        if Self::is_local_file(input) {
            return Ok(input.to_string());
        }

        crate::utils::extract_video_id(input).ok_or_else(|| crate::TranscriptError::MetadataUnavailable {
            video_id: input.to_string(),
            reason: "not a YouTube URL, video id, or transcript file".to_string(),
        })
    }
}

#[async_trait]
impl VideoInfoProvider for SourceRegistry {
    async fn metadata(&self, video_id: &str) -> anyhow::Result<VideoMetadata> {
        if Self::is_local_file(video_id) {
            self.local.metadata(video_id).await
        } else {
            self.youtube.metadata(video_id).await
        }
    }
}

#[async_trait]
impl TranscriptIndex for SourceRegistry {
    async fn list_tracks(&self, video_id: &str) -> anyhow::Result<Vec<TrackInfo>> {
        if Self::is_local_file(video_id) {
            self.local.list_tracks(video_id).await
        } else {
            self.youtube.list_tracks(video_id).await
        }
    }

    async fn fetch_track(&self, video_id: &str, track: &TrackInfo) -> anyhow::Result<Vec<RawEntry>> {
        if Self::is_local_file(video_id) {
            self.local.fetch_track(video_id, track).await
        } else {
            self.youtube.fetch_track(video_id, track).await
        }
    }
}

#[async_trait]
impl PlaylistIndex for SourceRegistry {
    async fn playlist_video_ids(&self, playlist_id: &str) -> anyhow::Result<Vec<String>> {
        self.youtube.playlist_video_ids(playlist_id).await
    }
}
