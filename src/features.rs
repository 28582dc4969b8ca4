//! Feature derivation matching the trained artifact's column schema.
//!
//! The artifact indexes features by position, not name, so the column
//! order in [`COLUMNS`] is a contract: reordering silently corrupts every
//! prediction. The one-hot time-of-day columns are alphabetical, matching
//! the encoding the artifact was trained with.

use chrono::{Datelike, Timelike};
use tracing::warn;

use crate::record::CanonicalRecord;

/// Number of columns the trained artifact expects.
pub const FEATURE_COUNT: usize = 13;

/// Positional column schema of the trained artifact.
pub const COLUMNS: [&str; FEATURE_COUNT] = [
    "hour",
    "day_of_week",
    "is_weekend",
    "weather_severity",
    "route_frequency",
    "passenger_count",
    "latitude",
    "longitude",
    "route_num",
    "time_of_day_afternoon",
    "time_of_day_evening",
    "time_of_day_morning",
    "time_of_day_night",
];

/// Route numbers outside this range were never seen in training and are
/// clamped before inference.
const TRAINED_ROUTE_RANGE: (i64, i64) = (0, 20);

/// Training-set median coordinates, substituted for missing or (0,0)
/// coordinates so the artifact never sees values outside its distribution.
const TRAIN_MEDIAN_LAT: f64 = 26.82;
const TRAIN_MEDIAN_LON: f64 = 30.80;

/// Coarse time-of-day bucket derived from the scheduled hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            18..=22 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }
}

/// Trips-per-hour proxy keyed on route number alone: low-numbered trunk
/// routes run frequently, high-numbered feeders taper off. A fixed lookup,
/// not a live statistic.
fn route_frequency(route_num: i64) -> f64 {
    match route_num {
        0..=3 => 12.0,
        4..=8 => 8.0,
        9..=15 => 4.0,
        _ => 2.0,
    }
}

/// The typed feature row for one canonical record.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub hour: u32,
    pub day_of_week: u32,
    pub is_weekend: bool,
    pub weather_severity: u8,
    pub route_frequency: f64,
    pub passenger_count: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub route_num: i64,
    pub time_of_day: TimeOfDay,
}

impl FeatureVector {
    /// Expands the row into the artifact's positional encoding, one value
    /// per [`COLUMNS`] entry.
    pub fn as_row(&self) -> [f64; FEATURE_COUNT] {
        let one_hot = |bucket| if self.time_of_day == bucket { 1.0 } else { 0.0 };
        [
            self.hour as f64,
            self.day_of_week as f64,
            if self.is_weekend { 1.0 } else { 0.0 },
            self.weather_severity as f64,
            self.route_frequency,
            self.passenger_count as f64,
            self.latitude,
            self.longitude,
            self.route_num as f64,
            one_hot(TimeOfDay::Afternoon),
            one_hot(TimeOfDay::Evening),
            one_hot(TimeOfDay::Morning),
            one_hot(TimeOfDay::Night),
        ]
    }
}

/// Parses the numeric part of a canonical `R<n>` route id.
fn route_number(route_id: &str) -> i64 {
    route_id
        .strip_prefix('R')
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

/// Derives the model feature row from a canonical record.
///
/// Missing scheduled time defaults hour and day-of-week to 0. Route numbers
/// and coordinates outside the training distribution are substituted with
/// in-distribution values; both substitutions are logged when they fire.
pub fn derive_features(record: &CanonicalRecord) -> FeatureVector {
    let (hour, day_of_week) = match record.scheduled_time {
        Some(dt) => (dt.hour(), dt.weekday().num_days_from_monday()),
        None => (0, 0),
    };
    let is_weekend = day_of_week >= 5;

    let raw_route_num = route_number(&record.route_id);
    let route_num = raw_route_num.clamp(TRAINED_ROUTE_RANGE.0, TRAINED_ROUTE_RANGE.1);
    if route_num != raw_route_num {
        warn!(
            route_id = %record.route_id,
            raw_route_num,
            clamped = route_num,
            "Route number outside trained range, clamping"
        );
    }

    let (latitude, longitude) = match (record.latitude, record.longitude) {
        (Some(lat), Some(lon)) if !(lat == 0.0 && lon == 0.0) => (lat, lon),
        _ => {
            warn!(
                latitude = ?record.latitude,
                longitude = ?record.longitude,
                "Missing or degenerate coordinates, substituting training medians"
            );
            (TRAIN_MEDIAN_LAT, TRAIN_MEDIAN_LON)
        }
    };

    FeatureVector {
        hour,
        day_of_week,
        is_weekend,
        weather_severity: record.weather.severity(),
        route_frequency: route_frequency(route_num),
        passenger_count: record.passenger_count,
        latitude,
        longitude,
        route_num,
        time_of_day: TimeOfDay::from_hour(hour),
    }
}
