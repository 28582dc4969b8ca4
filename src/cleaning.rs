//! Deterministic cleaning pipeline assembling a canonical record.

use anyhow::Result;
use chrono::NaiveDateTime;
use tracing::info;

use crate::impute::{PassengerHistory, impute_passenger_count, validate_gps};
use crate::normalize::{normalize_route, normalize_weather, parse_datetime};
use crate::record::{CanonicalRecord, RawRecord};

/// Delay in minutes between scheduled and actual, when both are known.
fn compute_delay(
    scheduled: Option<NaiveDateTime>,
    actual: Option<NaiveDateTime>,
) -> Option<f64> {
    match (scheduled, actual) {
        (Some(s), Some(a)) => Some((a - s).num_seconds() as f64 / 60.0),
        _ => None,
    }
}

/// Cleans and imputes a raw record according to deterministic rules.
///
/// Each timestamp is parsed independently so one unparseable field never
/// blocks the other. Malformed fields degrade to `None`/`unknown`/`R0`
/// rather than failing; the only fallible step is the passenger-history
/// read backing imputation. Given identical raw input and identical
/// historical state the output is identical.
pub fn clean_record(
    raw: &RawRecord,
    history: &impl PassengerHistory,
) -> Result<CanonicalRecord> {
    let scheduled_time = parse_datetime(raw.scheduled_time.as_deref());
    let actual_time = parse_datetime(raw.actual_time.as_deref());
    let weather = normalize_weather(&raw.weather);
    let passenger_count = impute_passenger_count(raw.passenger_count, history)?;
    let (latitude, longitude) = validate_gps(raw.latitude, raw.longitude);
    let route_id = normalize_route(&raw.route_id);
    let delay_minutes = compute_delay(scheduled_time, actual_time);

    let record = CanonicalRecord {
        route_id,
        scheduled_time,
        actual_time,
        weather,
        passenger_count,
        latitude,
        longitude,
        cleaned: true,
        delay_minutes,
    };
    info!(
        route_id = %record.route_id,
        delay_minutes = ?record.delay_minutes,
        "Cleaned record"
    );
    Ok(record)
}
