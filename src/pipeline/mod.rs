use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::output::{self, NamedTranscriptFile};
use crate::providers::google::GoogleTranslateBackend;
use crate::providers::youtube::YoutubeProvider;
use crate::providers::{
    PlaylistIndex, SourceRegistry, TranscriptIndex, TranslationBackend, VideoInfoProvider, VideoMetadata,
};
use crate::transcript::retry::{AttemptError, RetryError};
use crate::transcript::{RetryPolicy, Transcript, TranscriptFetcher, TranslationSettings};
use crate::utils::extract_playlist_id;
use crate::{Result, TranscriptError};

/// Knobs for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub retry: RetryPolicy,
    pub translation: TranslationSettings,
    pub format: OutputFormat,
    pub max_filename_length: usize,
    pub show_progress: bool,
}

impl PipelineSettings {
    pub fn from_config(config: &Config, format: OutputFormat) -> Self {
        Self {
            retry: config.retry_policy(),
            translation: config.translation_settings(),
            format,
            max_filename_length: config.app.max_filename_length,
            show_progress: config.app.show_progress,
        }
    }
}

/// A video that went through the whole pipeline
#[derive(Debug, Clone)]
pub struct ProcessedVideo {
    pub metadata: VideoMetadata,
    pub transcript: Transcript,
    pub file: NamedTranscriptFile,
}

/// Result for one video of a batch
#[derive(Debug)]
pub struct VideoOutcome {
    pub video_id: String,
    pub result: Result<ProcessedVideo>,
}

/// A raw input after playlist expansion and id extraction
#[derive(Debug)]
pub enum ResolvedInput {
    Video(String),
    Unresolved { input: String, error: TranscriptError },
}

/// Metadata lookup, transcript fetch, translation and rendering for videos
pub struct TranscriptPipeline {
    info: Arc<dyn VideoInfoProvider>,
    playlists: Option<Arc<dyn PlaylistIndex>>,
    fetcher: TranscriptFetcher,
    settings: PipelineSettings,
}

impl TranscriptPipeline {
    pub fn new(
        info: Arc<dyn VideoInfoProvider>,
        index: Arc<dyn TranscriptIndex>,
        translator: Arc<dyn TranslationBackend>,
        settings: PipelineSettings,
    ) -> Self {
        let fetcher = TranscriptFetcher::new(index, translator, settings.retry, settings.translation);
        Self {
            info,
            playlists: None,
            fetcher,
            settings,
        }
    }

    /// Expand playlist URLs through `playlists`
    pub fn with_playlists(mut self, playlists: Arc<dyn PlaylistIndex>) -> Self {
        self.playlists = Some(playlists);
        self
    }

    /// Create a pipeline backed by yt-dlp, local transcript files and Google Translate
    pub fn from_config(config: &Config, format: OutputFormat) -> anyhow::Result<Self> {
        let youtube = YoutubeProvider::new(&config.fetch.yt_dlp_path, config.request_timeout())?;
        let registry = Arc::new(SourceRegistry::new(youtube));
        let translator = Arc::new(GoogleTranslateBackend::new(
            &config.translation.endpoint,
            config.request_timeout(),
        )?);

        Ok(Self::new(
            registry.clone(),
            registry.clone(),
            translator,
            PipelineSettings::from_config(config, format),
        )
        .with_playlists(registry))
    }

    pub fn fetcher(&self) -> &TranscriptFetcher {
        &self.fetcher
    }

    /// Look up video metadata, retrying transient failures
    pub async fn metadata(&self, video_id: &str) -> Result<VideoMetadata> {
        self.settings
            .retry
            .run(&format!("Metadata lookup for {}", video_id), |_| async move {
                self.info.metadata(video_id).await.map_err(AttemptError::Transient)
            })
            .await
            .map_err(|err| match err {
                RetryError::Permanent(err) => err,
                RetryError::Exhausted { last, .. } => TranscriptError::MetadataUnavailable {
                    video_id: video_id.to_string(),
                    reason: format!("{:#}", last),
                },
            })
    }

    /// Run one video through metadata lookup, fetch, translation and rendering
    pub async fn process_video(
        &self,
        video_id: &str,
        source_lang: &str,
        target_lang: Option<&str>,
    ) -> Result<ProcessedVideo> {
        let metadata = self.metadata(video_id).await?;
        tracing::info!("Processing video: {}", metadata.title);

        let transcript = self.fetcher.fetch(video_id, source_lang, target_lang).await?;

        let content = output::render(&self.settings.format, &transcript, &metadata)?;
        let file = NamedTranscriptFile::for_video(
            &metadata,
            self.settings.format.extension(),
            self.settings.max_filename_length,
            content,
        );

        Ok(ProcessedVideo {
            metadata,
            transcript,
            file,
        })
    }

    /// List the videos of a playlist, retrying transient failures
    pub async fn playlist_video_ids(&self, playlist_id: &str) -> Result<Vec<String>> {
        let unavailable = |reason: String| TranscriptError::MetadataUnavailable {
            video_id: playlist_id.to_string(),
            reason,
        };
        let playlists = self
            .playlists
            .as_ref()
            .ok_or_else(|| unavailable("playlists are not supported here".to_string()))?;

        let ids = self
            .settings
            .retry
            .run(&format!("Playlist lookup for {}", playlist_id), |_| async move {
                playlists
                    .playlist_video_ids(playlist_id)
                    .await
                    .map_err(AttemptError::Transient)
            })
            .await
            .map_err(|err| match err {
                RetryError::Permanent(err) => err,
                RetryError::Exhausted { last, .. } => unavailable(format!("{:#}", last)),
            })?;

        if ids.is_empty() {
            return Err(unavailable("playlist has no videos".to_string()));
        }
        tracing::info!("Playlist {} has {} video(s)", playlist_id, ids.len());
        Ok(ids)
    }

    /// Turn raw inputs into video ids, expanding playlists in place.
    /// Inputs that can't be resolved keep their position as failures.
    pub async fn resolve_inputs(&self, inputs: &[String]) -> Vec<ResolvedInput> {
        let mut resolved = Vec::with_capacity(inputs.len());

        for input in inputs {
            if let Some(playlist_id) = extract_playlist_id(input) {
                match self.playlist_video_ids(&playlist_id).await {
                    Ok(ids) => resolved.extend(ids.into_iter().map(ResolvedInput::Video)),
                    Err(error) => resolved.push(ResolvedInput::Unresolved {
                        input: input.clone(),
                        error,
                    }),
                }
                continue;
            }

            match SourceRegistry::resolve_input(input) {
                Ok(video_id) => resolved.push(ResolvedInput::Video(video_id)),
                Err(error) => resolved.push(ResolvedInput::Unresolved {
                    input: input.clone(),
                    error,
                }),
            }
        }

        resolved
    }

    /// Resolve raw inputs (URLs, ids, playlists, local files) and process them.
    /// Outcomes follow input order, playlists expanded where they appeared.
    pub async fn process_inputs(
        &self,
        inputs: &[String],
        source_lang: &str,
        target_lang: Option<&str>,
    ) -> Vec<VideoOutcome> {
        let resolved = self.resolve_inputs(inputs).await;
        self.run_batch(resolved, source_lang, target_lang).await
    }

    /// Process videos one after another. A failing video is reported in its own
    /// outcome and doesn't stop the rest of the batch.
    pub async fn process_batch(
        &self,
        video_ids: &[String],
        source_lang: &str,
        target_lang: Option<&str>,
    ) -> Vec<VideoOutcome> {
        let items = video_ids.iter().cloned().map(ResolvedInput::Video).collect();
        self.run_batch(items, source_lang, target_lang).await
    }

    async fn run_batch(
        &self,
        items: Vec<ResolvedInput>,
        source_lang: &str,
        target_lang: Option<&str>,
    ) -> Vec<VideoOutcome> {
        let progress = if self.settings.show_progress && items.len() > 1 {
            let progress = ProgressBar::new(items.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}") {
                progress.set_style(style);
            }
            progress
        } else {
            ProgressBar::hidden()
        };

        let mut outcomes = Vec::with_capacity(items.len());
        for item in items {
            let outcome = match item {
                ResolvedInput::Video(video_id) => {
                    progress.set_message(video_id.clone());

                    let result = self.process_video(&video_id, source_lang, target_lang).await;
                    if let Err(err) = &result {
                        tracing::warn!("Failed to process video {}: {}", video_id, err);
                    }
                    VideoOutcome { video_id, result }
                }
                ResolvedInput::Unresolved { input, error } => {
                    tracing::warn!("Skipping input {}: {}", input, error);
                    VideoOutcome {
                        video_id: input,
                        result: Err(error),
                    }
                }
            };

            outcomes.push(outcome);
            progress.inc(1);
        }

        progress.finish_and_clear();
        outcomes
    }
}

/// Files of the videos that succeeded, in batch order
pub fn successful_files(outcomes: &[VideoOutcome]) -> Vec<NamedTranscriptFile> {
    outcomes
        .iter()
        .filter_map(|outcome| outcome.result.as_ref().ok())
        .map(|processed| processed.file.clone())
        .collect()
}
