//! Field decoders for registry payloads.
//!
//! The primary API flattens registry fields into plain JSON values, while the
//! table-backed secondary registry sends rich text as segment arrays, URLs as
//! `{ link, text }` objects and dates as millisecond epochs. These helpers
//! accept every shape and collapse it to the plain value.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
struct TextSegment {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Plain(String),
    Number(serde_json::Number),
    Bool(bool),
    Link {
        link: Option<String>,
        text: Option<String>,
    },
    Segments(Vec<TextSegment>),
}

impl RawText {
    fn into_string(self) -> String {
        match self {
            RawText::Plain(s) => s,
            RawText::Number(n) => n.to_string(),
            RawText::Bool(b) => b.to_string(),
            RawText::Link { link, text } => link.or(text).unwrap_or_default(),
            RawText::Segments(segments) => segments
                .into_iter()
                .filter_map(|segment| segment.text)
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

/// Decode an optional text field; empty strings become `None`.
pub(crate) fn text_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawText>::deserialize(deserializer)?;
    Ok(raw
        .map(RawText::into_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Decode a text field, defaulting to an empty string.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_opt(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Float(f64),
    Text(String),
}

/// Decode a timestamp given as epoch millis (number or digit string) or RFC 3339.
///
/// Unparseable values decode as `None` rather than failing the whole record.
pub(crate) fn timestamp_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
    Ok(match raw {
        None => None,
        Some(RawTimestamp::Millis(ms)) => Utc.timestamp_millis_opt(ms).single(),
        Some(RawTimestamp::Float(ms)) => Utc.timestamp_millis_opt(ms as i64).single(),
        Some(RawTimestamp::Text(s)) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(ms) => Utc.timestamp_millis_opt(ms).single(),
                Err(_) => DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc)),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "text_opt")]
        value: Option<String>,
        #[serde(default, deserialize_with = "timestamp_opt")]
        at: Option<DateTime<Utc>>,
    }

    fn probe(value: serde_json::Value) -> Probe {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_plain_and_segmented_text() {
        assert_eq!(probe(json!({"value": "SMA"})).value.as_deref(), Some("SMA"));
        assert_eq!(
            probe(json!({"value": [{"text": "5145", "type": "text"}, {"text": "0742F1", "type": "text"}]}))
                .value
                .as_deref(),
            Some("51450742F1")
        );
    }

    #[test]
    fn test_link_prefers_url() {
        let p = probe(json!({"value": {"link": "https://food.gov.uk/a", "text": "FSA"}}));
        assert_eq!(p.value.as_deref(), Some("https://food.gov.uk/a"));
    }

    #[test]
    fn test_blank_and_null_text_is_none() {
        assert!(probe(json!({"value": "   "})).value.is_none());
        assert!(probe(json!({"value": null})).value.is_none());
        assert!(probe(json!({})).value.is_none());
    }

    #[test]
    fn test_timestamps() {
        let expected = Utc.timestamp_millis_opt(1_800_556_800_000).single();
        assert_eq!(probe(json!({"at": 1_800_556_800_000_i64})).at, expected);
        assert_eq!(probe(json!({"at": "1800556800000"})).at, expected);
        assert_eq!(probe(json!({"at": "2027-01-01T00:00:00Z"})).at.map(|d| d.timestamp()), Some(1_798_761_600));
        assert!(probe(json!({"at": "soon"})).at.is_none());
    }
}
