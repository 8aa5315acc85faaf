use serde::{Deserialize, Serialize};

pub mod fetch;
pub mod normalize;
pub mod retry;
pub mod translate;

pub use fetch::TranscriptFetcher;
pub use normalize::{normalize, normalize_all};
pub use retry::RetryPolicy;
pub use translate::{translate, TranslationSettings};

/// Individual transcript segment with timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Segment text
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    /// End time in seconds
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Same timing, different text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: self.start,
            duration: self.duration,
        }
    }
}

/// Transcript of one video in one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: String,

    /// Language the segment text is currently in
    pub language: String,

    /// Language of the track the text was translated from, if any
    pub translated_from: Option<String>,

    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }
}
