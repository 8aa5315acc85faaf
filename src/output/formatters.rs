use serde::Serialize;

use crate::providers::VideoMetadata;
use crate::transcript::{Transcript, TranscriptSegment};
use crate::Result;

/// Format seconds as HH:MM:SS, dropping the fractional part
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// One `[HH:MM:SS → HH:MM:SS] text` line per segment. Used for saved files.
pub fn render_timestamped(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|segment| {
            format!(
                "[{} → {}] {}\n",
                format_clock(segment.start),
                format_clock(segment.end()),
                segment.text
            )
        })
        .collect()
}

/// One `[start → end] text` line per segment with seconds to two decimals, for previews
pub fn render_compact(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|segment| format!("[{:.2} → {:.2}] {}\n", segment.start, segment.end(), segment.text))
        .collect()
}

#[derive(Serialize)]
struct TranscriptDocument<'a> {
    video: &'a VideoMetadata,
    language: &'a str,
    translated_from: Option<&'a str>,
    generated_at: chrono::DateTime<chrono::Utc>,
    segments: &'a [TranscriptSegment],
}

/// JSON export with metadata and segments
pub fn render_json(transcript: &Transcript, metadata: &VideoMetadata) -> Result<String> {
    let document = TranscriptDocument {
        video: metadata,
        language: &transcript.language,
        translated_from: transcript.translated_from.as_deref(),
        generated_at: chrono::Utc::now(),
        segments: &transcript.segments,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}
