use std::sync::Arc;

use super::retry::{AttemptError, RetryError, RetryPolicy};
use super::translate::{translate, TranslationSettings};
use super::{normalize_all, Transcript, TranscriptSegment};
use crate::providers::{TrackInfo, TrackKind, TranscriptIndex, TranslationBackend};
use crate::{Result, TranscriptError};

/// Fetches transcripts with language fallback, retry and optional translation.
///
/// Holds no per-request state: every call to [`TranscriptFetcher::fetch`] works on its
/// own data, so one fetcher can serve any number of videos.
pub struct TranscriptFetcher {
    index: Arc<dyn TranscriptIndex>,
    translator: Arc<dyn TranslationBackend>,
    retry: RetryPolicy,
    translation: TranslationSettings,
}

impl TranscriptFetcher {
    pub fn new(
        index: Arc<dyn TranscriptIndex>,
        translator: Arc<dyn TranslationBackend>,
        retry: RetryPolicy,
        translation: TranslationSettings,
    ) -> Self {
        Self {
            index,
            translator,
            retry,
            translation,
        }
    }

    /// Fetch the transcript of `video_id`, preferring a `source_lang` track, and translate
    /// it when `target_lang` is set and differs from the language obtained.
    pub async fn fetch(&self, video_id: &str, source_lang: &str, target_lang: Option<&str>) -> Result<Transcript> {
        let (track, segments) = self.fetch_original(video_id, source_lang).await?;
        tracing::info!("Fetched {} transcript segments for {}", segments.len(), video_id);

        let target_lang = target_lang.map(str::trim).filter(|lang| !lang.is_empty());
        match target_lang {
            Some(target) if target != track.language_code => {
                let translated = translate(self.translator.as_ref(), &segments, target, &self.translation).await?;
                tracing::info!("Translated transcript for {} from {} to {}", video_id, track.language_code, target);

                Ok(Transcript {
                    video_id: video_id.to_string(),
                    language: target.to_string(),
                    translated_from: Some(track.language_code),
                    segments: translated,
                })
            }
            _ => Ok(Transcript {
                video_id: video_id.to_string(),
                language: track.language_code,
                translated_from: None,
                segments,
            }),
        }
    }

    /// List tracks for the video without fetching any of them
    pub async fn list_tracks(&self, video_id: &str) -> Result<Vec<TrackInfo>> {
        self.retry
            .run(&format!("Track listing for {}", video_id), |_| async move {
                self.index.list_tracks(video_id).await.map_err(AttemptError::Transient)
            })
            .await
            .map_err(|err| into_fetch_error(video_id, err))
    }

    async fn fetch_original(&self, video_id: &str, source_lang: &str) -> Result<(TrackInfo, Vec<TranscriptSegment>)> {
        let what = format!("Transcript fetch for {}", video_id);

        self.retry
            .run(&what, |attempt| async move {
                tracing::info!(
                    "Fetching transcript for video {} (attempt {}/{})",
                    video_id,
                    attempt,
                    self.retry.max_attempts
                );
                self.fetch_attempt(video_id, source_lang).await
            })
            .await
            .map_err(|err| into_fetch_error(video_id, err))
    }

    async fn fetch_attempt(
        &self,
        video_id: &str,
        source_lang: &str,
    ) -> std::result::Result<(TrackInfo, Vec<TranscriptSegment>), AttemptError> {
        let tracks = self
            .index
            .list_tracks(video_id)
            .await
            .map_err(AttemptError::Transient)?;

        let track = select_track(&tracks, source_lang)
            .ok_or_else(|| TranscriptError::NoTranscriptAvailable {
                video_id: video_id.to_string(),
            })?
            .clone();

        if track.language_code == source_lang {
            tracing::info!("Found transcript in requested language: {}", source_lang);
        } else {
            tracing::warn!(
                "Could not find {} transcript for {}, using {} ({})",
                source_lang,
                video_id,
                track.language_code,
                track.kind.as_str()
            );
        }

        let entries = self
            .index
            .fetch_track(video_id, &track)
            .await
            .map_err(AttemptError::Transient)?;
        let segments = normalize_all(&entries)?;

        if segments.windows(2).any(|pair| pair[1].start < pair[0].start) {
            tracing::warn!("Transcript for {} is not in chronological order", video_id);
        }

        Ok((track, segments))
    }
}

fn into_fetch_error(video_id: &str, err: RetryError) -> TranscriptError {
    match err {
        RetryError::Permanent(err) => err,
        RetryError::Exhausted { attempts, last } => TranscriptError::FetchFailed {
            video_id: video_id.to_string(),
            attempts,
            reason: format!("{:#}", last),
        },
    }
}

/// Pick the track to use for `source_lang`.
///
/// An exact language match wins (manual before auto-generated). Otherwise the first
/// manual track, then the first auto-generated track, then whatever comes first.
pub fn select_track<'a>(tracks: &'a [TrackInfo], source_lang: &str) -> Option<&'a TrackInfo> {
    let first_of = |kind: TrackKind, lang: Option<&str>| {
        tracks
            .iter()
            .find(|track| track.kind == kind && lang.map_or(true, |lang| track.language_code == lang))
    };

    first_of(TrackKind::Manual, Some(source_lang))
        .or_else(|| first_of(TrackKind::Generated, Some(source_lang)))
        .or_else(|| first_of(TrackKind::Manual, None))
        .or_else(|| first_of(TrackKind::Generated, None))
        .or_else(|| tracks.first())
}
