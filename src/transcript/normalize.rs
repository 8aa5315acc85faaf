//! Conversion of provider entries into [`TranscriptSegment`]s.
//!
//! Mapping entries are coerced leniently: numbers and numeric strings are accepted for
//! `start`/`duration`, absent fields default to `0.0` (or `""` for `text`). A field that is
//! present but cannot be coerced is an error, as is a negative or non-finite time.

use serde_json::{Map, Value};

use super::TranscriptSegment;
use crate::providers::{RawEntry, RawSnippet};
use crate::{Result, TranscriptError};

/// Normalize a single entry
pub fn normalize(entry: &RawEntry) -> Result<TranscriptSegment> {
    normalize_at(0, entry)
}

/// Normalize every entry, keeping upstream order
pub fn normalize_all(entries: &[RawEntry]) -> Result<Vec<TranscriptSegment>> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| normalize_at(index, entry))
        .collect()
}

fn normalize_at(index: usize, entry: &RawEntry) -> Result<TranscriptSegment> {
    let (text, start, duration) = match entry {
        RawEntry::Snippet(snippet) => from_snippet(snippet),
        RawEntry::Mapping(map) => from_mapping(map),
    }
    .map_err(|reason| TranscriptError::SegmentFormat { index, reason })?;

    let start = check_time("start", start).map_err(|reason| TranscriptError::SegmentFormat { index, reason })?;
    let duration =
        check_time("duration", duration).map_err(|reason| TranscriptError::SegmentFormat { index, reason })?;

    Ok(TranscriptSegment { text, start, duration })
}

fn from_snippet(snippet: &RawSnippet) -> std::result::Result<(String, f64, f64), String> {
    Ok((snippet.text.clone(), snippet.start, snippet.duration))
}

fn from_mapping(map: &Map<String, Value>) -> std::result::Result<(String, f64, f64), String> {
    let text = match map.get("text") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => return Err(format!("field 'text' is not text: {}", other)),
    };

    Ok((text, number_field(map, "start")?, number_field(map, "duration")?))
}

fn number_field(map: &Map<String, Value>, name: &str) -> std::result::Result<f64, String> {
    match map.get(name) {
        None => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| format!("field '{}' is out of range: {}", name, n)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("field '{}' is not numeric: {:?}", name, s)),
        Some(other) => Err(format!("field '{}' is not numeric: {}", name, other)),
    }
}

fn check_time(name: &str, value: f64) -> std::result::Result<f64, String> {
    if !value.is_finite() {
        return Err(format!("{} must be finite, got {}", name, value));
    }
    if value < 0.0 {
        return Err(format!("{} must not be negative, got {}", name, value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(value: Value) -> RawEntry {
        match value {
            Value::Object(map) => RawEntry::Mapping(map),
            other => panic!("not an object: {}", other),
        }
    }

    fn snippet(text: &str, start: f64, duration: f64) -> RawEntry {
        RawEntry::Snippet(RawSnippet {
            text: text.to_string(),
            start,
            duration,
        })
    }

    #[test]
    fn test_both_shapes_normalize_identically() {
        let from_snippet = normalize(&snippet("hello", 1.25, 3.0)).unwrap();
        let from_mapping = normalize(&mapping(json!({"text": "hello", "start": 1.25, "duration": 3}))).unwrap();

        assert_eq!(from_snippet, from_mapping);
        assert_eq!(from_snippet, TranscriptSegment::new("hello", 1.25, 3.0));
    }

    #[test]
    fn test_mapping_defaults() {
        let segment = normalize(&mapping(json!({}))).unwrap();
        assert_eq!(segment, TranscriptSegment::new("", 0.0, 0.0));

        let segment = normalize(&mapping(json!({"text": null, "start": 4}))).unwrap();
        assert_eq!(segment, TranscriptSegment::new("", 4.0, 0.0));
    }

    #[test]
    fn test_mapping_coercion() {
        let segment = normalize(&mapping(json!({"text": 42, "start": " 2.5 ", "duration": "1"}))).unwrap();
        assert_eq!(segment, TranscriptSegment::new("42", 2.5, 1.0));
    }

    #[test]
    fn test_non_numeric_start_fails() {
        let err = normalize(&mapping(json!({"text": "x", "start": "soon"}))).unwrap_err();
        assert!(matches!(err, TranscriptError::SegmentFormat { .. }));

        assert!(normalize(&mapping(json!({"start": null}))).is_err());
        assert!(normalize(&mapping(json!({"duration": [1]}))).is_err());
        assert!(normalize(&mapping(json!({"text": {"nested": true}}))).is_err());
    }

    #[test]
    fn test_invalid_times_fail() {
        assert!(normalize(&snippet("x", -1.0, 1.0)).is_err());
        assert!(normalize(&snippet("x", 0.0, f64::NAN)).is_err());
        assert!(normalize(&mapping(json!({"start": "inf"}))).is_err());
    }

    #[test]
    fn test_normalize_all_reports_index() {
        let entries = vec![
            snippet("ok", 0.0, 1.0),
            mapping(json!({"text": "bad", "duration": "long"})),
        ];

        match normalize_all(&entries) {
            Err(TranscriptError::SegmentFormat { index, .. }) => assert_eq!(index, 1),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_normalize_all_keeps_order() {
        let entries = vec![snippet("b", 5.0, 1.0), snippet("a", 1.0, 1.0)];
        let segments = normalize_all(&entries).unwrap();
        assert_eq!(segments[0].text, "b");
        assert_eq!(segments[1].text, "a");
    }
}
