//! Data model for the daily wellness snapshot scraped from Garmin Connect.

use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

/// One timestamped reading from a wellness series.
///
/// The wellness endpoints encode samples as JSON arrays rather than objects,
/// and the element layout differs per series: stress and heart rate use
/// `[timestamp, value]`, body battery uses `[timestamp, status, level, ...]`.
/// The timestamp is always first; the value is the first numeric element
/// after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSample {
    pub timestamp_ms: i64,
    pub value: Option<f64>,
}

impl<'de> Deserialize<'de> for MetricSample {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<Value>::deserialize(deserializer)?;
        let timestamp_ms = raw
            .first()
            .and_then(Value::as_i64)
            .ok_or_else(|| D::Error::custom("sample array must start with a timestamp"))?;
        let value = raw.iter().skip(1).find_map(Value::as_f64);

        Ok(Self {
            timestamp_ms,
            value,
        })
    }
}

/// Ordered series of samples for one metric over the current day.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MetricSeries(pub Vec<MetricSample>);

impl MetricSeries {
    /// Value of the most recent sample that carries one. The endpoints pad
    /// the tail of the day with null readings, which are skipped.
    pub fn latest(&self) -> Option<f64> {
        self.0.iter().rev().find_map(|sample| sample.value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Full snapshot for "today". Rebuilt from scratch on every fetch; a series
/// left empty means its payload was absent or unparseable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyValues {
    pub stress: MetricSeries,
    pub body_battery: MetricSeries,
    pub heart_rate: MetricSeries,
}

/// Body of the daily-stress wellness resource. Carries both the stress and
/// the body battery series.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStress {
    #[serde(default)]
    pub stress_values_array: Option<MetricSeries>,
    #[serde(default)]
    pub body_battery_values_array: Option<MetricSeries>,
}

/// Body of the daily-heart-rate wellness resource.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyHeartRate {
    #[serde(default)]
    pub heart_rate_values: Option<MetricSeries>,
}

#[cfg(test)]
mod tests {
    use super::{DailyHeartRate, DailyStress, MetricSample, MetricSeries};

    #[test]
    fn test_parse_stress_payload() {
        let body = r#"{
            "calendarDate": "2026-08-30",
            "stressValuesArray": [[1756500000000, 42], [1756503600000, -1], [1756507200000, null]],
            "bodyBatteryValuesArray": [[1756500000000, "CHARGED", 81, 1.0], [1756503600000, "DRAINED", 76, 1.0]]
        }"#;

        let parsed: DailyStress = serde_json::from_str(body).unwrap();
        let stress = parsed.stress_values_array.unwrap();
        let battery = parsed.body_battery_values_array.unwrap();

        assert_eq!(stress.0.len(), 3);
        assert_eq!(stress.0[0].value, Some(42.0));
        assert_eq!(stress.0[2].value, None);
        assert_eq!(stress.latest(), Some(-1.0));
        assert_eq!(battery.latest(), Some(76.0));
    }

    #[test]
    fn test_parse_heart_rate_payload() {
        let body = r#"{"heartRateValues": [[1756500000000, 58], [1756503600000, 72]]}"#;
        let parsed: DailyHeartRate = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.heart_rate_values.unwrap().latest(), Some(72.0));
    }

    #[test]
    fn test_null_series_is_absent() {
        let body = r#"{"heartRateValues": null}"#;
        let parsed: DailyHeartRate = serde_json::from_str(body).unwrap();
        assert!(parsed.heart_rate_values.is_none());
    }

    #[test]
    fn test_latest_skips_trailing_nulls() {
        let series = MetricSeries(vec![
            MetricSample {
                timestamp_ms: 1,
                value: Some(50.0),
            },
            MetricSample {
                timestamp_ms: 2,
                value: None,
            },
        ]);
        assert_eq!(series.latest(), Some(50.0));
        assert_eq!(MetricSeries::default().latest(), None);
    }

    #[test]
    fn test_sample_without_timestamp_is_rejected() {
        assert!(serde_json::from_str::<MetricSample>("[null, 10]").is_err());
    }
}
