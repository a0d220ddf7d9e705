use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::lenient;

/// Recall status of a registry entry.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Recalled,
    NotRecalled,
    Expired,
    #[default]
    Unknown,
}

impl RecordStatus {
    /// Parse a registry status label.
    ///
    /// Accepts the API's snake_case values and the table registry's localized
    /// option labels. Anything else is `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "recalled" | "召回中" => Self::Recalled,
            "not_recalled" => Self::NotRecalled,
            "expired" | "已结束" => Self::Expired,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recalled => "recalled",
            Self::NotRecalled => "not_recalled",
            Self::Expired => "expired",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = lenient::text_opt(deserializer)?;
        Ok(raw.map(|s| Self::parse(&s)).unwrap_or_default())
    }
}

/// Risk level assigned by the registry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "high" | "高" => Some(Self::High),
            "medium" | "中" => Some(Self::Medium),
            "low" | "低" => Some(Self::Low),
            _ => None,
        }
    }
}

fn risk_level_opt<'de, D>(deserializer: D) -> Result<Option<RiskLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::text_opt(deserializer)?.and_then(|s| RiskLevel::parse(&s)))
}

/// One registry entry.
///
/// Owned by the backend; the client never mutates a record after decoding it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecallRecord {
    /// Registry row id (secondary registry only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,

    /// Raw batch codes, separated by commas or whitespace
    #[serde(default, deserialize_with = "lenient::text")]
    pub batch_codes: String,

    #[serde(default)]
    pub status: RecordStatus,

    #[serde(default, deserialize_with = "lenient::text_opt", skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    #[serde(default, deserialize_with = "lenient::text_opt", skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, deserialize_with = "risk_level_opt", skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,

    #[serde(default, deserialize_with = "lenient::text_opt", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, deserialize_with = "lenient::text_opt", skip_serializing_if = "Option::is_none")]
    pub recall_reason: Option<String>,

    #[serde(default, deserialize_with = "lenient::text_opt", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    /// Best-before date, serialized as epoch milliseconds
    #[serde(
        default,
        deserialize_with = "lenient::timestamp_opt",
        serialize_with = "chrono::serde::ts_milliseconds_option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub best_before: Option<DateTime<Utc>>,
}

impl RecallRecord {
    /// Convenience constructor used by tests and mock backends.
    pub fn with_codes(batch_codes: impl Into<String>) -> Self {
        Self {
            batch_codes: batch_codes.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_labels() {
        assert_eq!(RecordStatus::parse("recalled"), RecordStatus::Recalled);
        assert_eq!(RecordStatus::parse("召回中"), RecordStatus::Recalled);
        assert_eq!(RecordStatus::parse("NOT_RECALLED"), RecordStatus::NotRecalled);
        assert_eq!(RecordStatus::parse("已结束"), RecordStatus::Expired);
        assert_eq!(RecordStatus::parse("待确认"), RecordStatus::Unknown);
        assert_eq!(RecordStatus::parse("not_found"), RecordStatus::Unknown);
    }

    #[test]
    fn test_risk_levels() {
        assert_eq!(RiskLevel::parse("高"), Some(RiskLevel::High));
        assert_eq!(RiskLevel::parse("Medium"), Some(RiskLevel::Medium));
        assert_eq!(RiskLevel::parse("低"), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::parse("severe"), None);
    }

    #[test]
    fn test_decode_primary_shape() {
        let record: RecallRecord = serde_json::from_value(json!({
            "batch_codes": "51450742F1,52319722BA",
            "status": "recalled",
            "product_name": "SMA Advanced First Infant Milk",
            "brand": "Nestlé",
            "risk_level": "high",
            "region": "UK",
            "best_before": 1_800_556_800_000_i64
        }))
        .unwrap();

        assert_eq!(record.batch_codes, "51450742F1,52319722BA");
        assert_eq!(record.status, RecordStatus::Recalled);
        assert_eq!(record.risk_level, Some(RiskLevel::High));
        assert_eq!(record.best_before.map(|d| d.timestamp_millis()), Some(1_800_556_800_000));
        assert!(record.record_id.is_none());
    }

    #[test]
    fn test_decode_localized_table_fields() {
        let record: RecallRecord = serde_json::from_value(json!({
            "batch_codes": [{"text": "51450742F1", "type": "text"}],
            "status": "召回中",
            "risk_level": "高",
            "source_url": {"link": "https://www.food.gov.uk/news-alerts", "text": "FSA"},
            "unrelated_field": 42
        }))
        .unwrap();

        assert_eq!(record.batch_codes, "51450742F1");
        assert_eq!(record.status, RecordStatus::Recalled);
        assert_eq!(record.risk_level, Some(RiskLevel::High));
        assert_eq!(
            record.source_url.as_deref(),
            Some("https://www.food.gov.uk/news-alerts")
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let record: RecallRecord = serde_json::from_value(json!({})).unwrap();
        assert_eq!(record.batch_codes, "");
        assert_eq!(record.status, RecordStatus::Unknown);
        assert!(record.risk_level.is_none());
    }

    #[test]
    fn test_serialize_round_trips_status() {
        let record = RecallRecord {
            status: RecordStatus::NotRecalled,
            ..RecallRecord::with_codes("AB12")
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["status"], "not_recalled");
        assert!(value.get("brand").is_none());
    }
}
