use std::time::Duration;
use tokio::time::sleep;

use super::TranscriptSegment;
use crate::providers::TranslationBackend;
use crate::{Result, TranscriptError};

/// Batching and pacing for translation requests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslationSettings {
    /// Segments sent to the backend per call
    pub batch_size: usize,

    /// Pause between consecutive batches
    pub batch_pause: Duration,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_pause: Duration::from_secs(1),
        }
    }
}

/// Translate segment text into `target_lang`, keeping every segment's timing.
///
/// Batches run one after another with `batch_pause` in between. The first failing
/// batch aborts the whole translation; nothing partially translated is returned.
pub async fn translate(
    backend: &dyn TranslationBackend,
    segments: &[TranscriptSegment],
    target_lang: &str,
    settings: &TranslationSettings,
) -> Result<Vec<TranscriptSegment>> {
    let batch_size = settings.batch_size.max(1);
    let batch_count = segments.len().div_ceil(batch_size);
    let mut translated = Vec::with_capacity(segments.len());

    for (index, batch) in segments.chunks(batch_size).enumerate() {
        let batch_number = index + 1;
        if index > 0 {
            sleep(settings.batch_pause).await;
        }

        tracing::debug!("Translating batch {}/{} to {}", batch_number, batch_count, target_lang);

        let texts: Vec<String> = batch.iter().map(|segment| segment.text.clone()).collect();
        let translations = backend
            .translate_batch(&texts, target_lang)
            .await
            .map_err(|err| TranscriptError::TranslationFailed {
                target_lang: target_lang.to_string(),
                batch: batch_number,
                reason: format!("{:#}", err),
            })?;

        if translations.len() != batch.len() {
            return Err(TranscriptError::TranslationFailed {
                target_lang: target_lang.to_string(),
                batch: batch_number,
                reason: format!("expected {} translations, got {}", batch.len(), translations.len()),
            });
        }

        translated.extend(
            batch
                .iter()
                .zip(translations)
                .map(|(segment, text)| segment.with_text(text)),
        );
    }

    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockTranslationBackend;
    use tokio::time::Instant;

    fn segments(count: usize) -> Vec<TranscriptSegment> {
        (0..count)
            .map(|i| TranscriptSegment::new(format!("line {}", i), i as f64 * 2.5, 2.5))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_preserves_length_and_timing() {
        let mut backend = MockTranslationBackend::new();
        backend
            .expect_translate_batch()
            .withf(|texts, lang| texts.len() <= 10 && lang.to_string() == "fr")
            .times(3)
            .returning(|texts, _| Ok(texts.iter().map(|t| format!("[fr] {}", t)).collect()));

        let input = segments(23);
        let output = translate(&backend, &input, "fr", &TranslationSettings::default())
            .await
            .unwrap();

        assert_eq!(output.len(), input.len());
        for (before, after) in input.iter().zip(&output) {
            assert_eq!(before.start, after.start);
            assert_eq!(before.duration, after.duration);
            assert_eq!(after.text, format!("[fr] {}", before.text));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pauses_only_between_batches() {
        let mut backend = MockTranslationBackend::new();
        backend
            .expect_translate_batch()
            .times(3)
            .returning(|texts, _| Ok(texts.to_vec()));

        let started = Instant::now();
        translate(&backend, &segments(30), "de", &TranslationSettings::default())
            .await
            .unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_failure_aborts() {
        let mut backend = MockTranslationBackend::new();
        let mut call = 0;
        backend.expect_translate_batch().times(2).returning(move |texts, _| {
            call += 1;
            if call == 2 {
                Err(anyhow::anyhow!("429 Too Many Requests"))
            } else {
                Ok(texts.to_vec())
            }
        });

        let err = translate(&backend, &segments(25), "es", &TranslationSettings::default())
            .await
            .unwrap_err();

        match err {
            TranscriptError::TranslationFailed { batch, reason, .. } => {
                assert_eq!(batch, 2);
                assert!(reason.contains("429"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_short_backend_response_fails() {
        let mut backend = MockTranslationBackend::new();
        backend
            .expect_translate_batch()
            .returning(|texts, _| Ok(texts[1..].to_vec()));

        let result = translate(&backend, &segments(3), "it", &TranslationSettings::default()).await;
        assert!(matches!(result, Err(TranscriptError::TranslationFailed { batch: 1, .. })));
    }

    #[tokio::test]
    async fn test_empty_input_skips_backend() {
        let mut backend = MockTranslationBackend::new();
        backend.expect_translate_batch().never();

        let output = translate(&backend, &[], "fr", &TranslationSettings::default()).await;
        assert!(tokio_test::assert_ok!(output).is_empty());
    }
}
