//! Record types flowing through the cleaning and prediction pipeline.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Incoming telemetry payload from drivers or clients. Untrusted: every
/// field may be missing, malformed, or out of range.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    /// Route identifier e.g. "R1" or "Route-1".
    #[serde(default)]
    pub route_id: String,
    /// Scheduled timestamp in flexible formats.
    #[serde(default)]
    pub scheduled_time: Option<String>,
    /// Actual timestamp in flexible formats, or null if unknown.
    #[serde(default)]
    pub actual_time: Option<String>,
    /// Free-form weather description.
    #[serde(default)]
    pub weather: String,
    /// Passenger count; null or out-of-range values are imputed.
    #[serde(default)]
    pub passenger_count: Option<i64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Canonical weather condition after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Sunny,
    Cloudy,
    Rainy,
    Snow,
    Clear,
    Fog,
    Unknown,
}

impl Weather {
    /// Ordinal severity tier: dry conditions lowest, precipitation highest.
    /// Unknown conditions sit in the middle rather than at either extreme.
    pub fn severity(self) -> u8 {
        match self {
            Weather::Sunny | Weather::Clear => 0,
            Weather::Cloudy | Weather::Fog | Weather::Unknown => 1,
            Weather::Rainy | Weather::Snow => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Weather::Sunny => "sunny",
            Weather::Cloudy => "cloudy",
            Weather::Rainy => "rainy",
            Weather::Snow => "snow",
            Weather::Clear => "clear",
            Weather::Fog => "fog",
            Weather::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Weather {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully-typed record produced by the cleaning pipeline.
///
/// Invariants: `route_id` is in `R<n>` form, `passenger_count` is within
/// the configured bounds, coordinates are in range or absent, and
/// `delay_minutes` is present only when both timestamps resolved. A record
/// is immutable once produced; an update re-runs the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub route_id: String,
    pub scheduled_time: Option<NaiveDateTime>,
    pub actual_time: Option<NaiveDateTime>,
    pub weather: Weather,
    pub passenger_count: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub cleaned: bool,
    pub delay_minutes: Option<f64>,
}

/// A canonical record as persisted in the store, with its assigned id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: u64,
    pub route_id: String,
    pub scheduled_time: Option<NaiveDateTime>,
    pub actual_time: Option<NaiveDateTime>,
    pub weather: Weather,
    pub passenger_count: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub cleaned: bool,
    pub delay_minutes: Option<f64>,
    pub created_at: NaiveDateTime,
}

impl StoredRecord {
    pub fn from_canonical(id: u64, record: &CanonicalRecord, created_at: NaiveDateTime) -> Self {
        StoredRecord {
            id,
            route_id: record.route_id.clone(),
            scheduled_time: record.scheduled_time,
            actual_time: record.actual_time,
            weather: record.weather,
            passenger_count: record.passenger_count,
            latitude: record.latitude,
            longitude: record.longitude,
            cleaned: record.cleaned,
            delay_minutes: record.delay_minutes,
            created_at,
        }
    }
}

/// Outcome of a single prediction request. Never mutated after creation.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    /// Id of the stored record, when the caller asked to persist.
    pub record_id: Option<u64>,
    pub predicted_delay: f64,
    pub model_version: String,
}
