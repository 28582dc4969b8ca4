//! Pure normalization of raw timestamp, weather, and route strings.
//!
//! Unparseable input never produces an error here: timestamps degrade to
//! `None`, weather to [`Weather::Unknown`], and routes to `"R0"`, so a
//! single bad field cannot fail the whole cleaning pipeline.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

use crate::record::Weather;

static TIME_COLON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").unwrap());
static TIME_COMPACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})(\d{2})$").unwrap());
static TIME_AMPM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)(\d{1,2})[.:](\d{2})(am|pm)$").unwrap());
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Full date-time formats tried after the time-only patterns. RFC 3339 is
/// handled separately so its offset can be stripped.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M",
    "%Y/%m/%d %H:%M",
];

/// Recognizes bare time-of-day strings: `HH:MM`, `HHMM`, and `H.MM[AM|PM]`
/// (a `:` separator before the meridiem is also accepted).
fn parse_time_only(value: &str) -> Option<NaiveTime> {
    if let Some(caps) = TIME_COLON.captures(value) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }
    if let Some(caps) = TIME_COMPACT.captures(value) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }
    if let Some(caps) = TIME_AMPM.captures(value) {
        let mut hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        let meridiem = caps[3].to_ascii_lowercase();
        if meridiem == "pm" && hour != 12 {
            hour += 12;
        }
        if meridiem == "am" && hour == 12 {
            hour = 0;
        }
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }
    None
}

/// Parses heterogeneous timestamp strings into a timezone-naive datetime.
///
/// Time-only inputs are anchored to the current UTC calendar date. Inputs
/// carrying an offset keep their wall-clock value with the offset stripped.
/// Anything unrecognizable yields `None` with a warning, never an error.
pub fn parse_datetime(value: Option<&str>) -> Option<NaiveDateTime> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(time) = parse_time_only(value) {
        let today = Utc::now().date_naive();
        return Some(today.and_time(time));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    warn!(value, "Failed to parse datetime string");
    None
}

/// Normalizes free-form weather descriptions to the canonical set.
///
/// Lowercases, trims, and corrects a fixed map of known typos before
/// matching. Anything outside the set becomes [`Weather::Unknown`].
pub fn normalize_weather(raw: &str) -> Weather {
    let normalized = raw.trim().to_lowercase();
    let corrected = match normalized.as_str() {
        "clody" | "coudy" => "cloudy",
        "sun" => "sunny",
        other => other,
    };
    match corrected {
        "sunny" => Weather::Sunny,
        "cloudy" => Weather::Cloudy,
        "rainy" => Weather::Rainy,
        "snow" => Weather::Snow,
        "clear" => Weather::Clear,
        "fog" => Weather::Fog,
        _ => Weather::Unknown,
    }
}

/// Normalizes route identifiers to `R<int>` form.
///
/// Takes the first run of digits in the raw string; no digits means route 0.
pub fn normalize_route(raw: &str) -> String {
    let number: u64 = DIGIT_RUN
        .find(raw)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    format!("R{}", number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_time_colon_anchors_to_today() {
        let parsed = parse_datetime(Some("08:30")).unwrap();
        assert_eq!(parsed.date(), Utc::now().date_naive());
        assert_eq!(parsed.time().hour(), 8);
        assert_eq!(parsed.time().minute(), 30);
    }

    #[test]
    fn test_parse_time_compact() {
        let parsed = parse_datetime(Some("0830")).unwrap();
        assert_eq!(parsed.time().hour(), 8);
        assert_eq!(parsed.time().minute(), 30);
    }

    #[test]
    fn test_parse_time_ampm() {
        let parsed = parse_datetime(Some("8.45AM")).unwrap();
        assert_eq!(parsed.date(), Utc::now().date_naive());
        assert_eq!(parsed.time().hour(), 8);
        assert_eq!(parsed.time().minute(), 45);

        let evening = parse_datetime(Some("8.45pm")).unwrap();
        assert_eq!(evening.time().hour(), 20);
    }

    #[test]
    fn test_parse_time_ampm_noon_and_midnight() {
        assert_eq!(parse_datetime(Some("12.00PM")).unwrap().time().hour(), 12);
        assert_eq!(parse_datetime(Some("12.00AM")).unwrap().time().hour(), 0);
    }

    #[test]
    fn test_parse_full_datetime() {
        let parsed = parse_datetime(Some("2025-12-07 08:30")).unwrap();
        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2025, 12, 7)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_parse_rfc3339_strips_offset() {
        let parsed = parse_datetime(Some("2025-12-07T08:30:00+02:00")).unwrap();
        assert_eq!(parsed.time().hour(), 8);
        assert_eq!(parsed.time().minute(), 30);
    }

    #[test]
    fn test_parse_date_only_is_midnight() {
        let parsed = parse_datetime(Some("2025-12-07")).unwrap();
        assert_eq!(parsed.time(), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_garbage_returns_none() {
        assert!(parse_datetime(Some("not-a-time")).is_none());
        assert!(parse_datetime(Some("")).is_none());
        assert!(parse_datetime(Some("   ")).is_none());
        assert!(parse_datetime(None).is_none());
        // Looks like a compact time but the hour is out of range.
        assert!(parse_datetime(Some("9999")).is_none());
    }

    #[test]
    fn test_normalize_weather_typo_map() {
        assert_eq!(normalize_weather("Clody"), Weather::Cloudy);
        assert_eq!(normalize_weather("coudy"), Weather::Cloudy);
        assert_eq!(normalize_weather("SUN"), Weather::Sunny);
        assert_eq!(normalize_weather("sunny "), Weather::Sunny);
    }

    #[test]
    fn test_normalize_weather_allowed_set() {
        assert_eq!(normalize_weather("rainy"), Weather::Rainy);
        assert_eq!(normalize_weather("Fog"), Weather::Fog);
        assert_eq!(normalize_weather("snow"), Weather::Snow);
        assert_eq!(normalize_weather("clear"), Weather::Clear);
    }

    #[test]
    fn test_normalize_weather_unknown() {
        assert_eq!(normalize_weather("hailstorm"), Weather::Unknown);
        assert_eq!(normalize_weather(""), Weather::Unknown);
    }

    #[test]
    fn test_normalize_route() {
        assert_eq!(normalize_route("Route-04"), "R4");
        assert_eq!(normalize_route("R1"), "R1");
        assert_eq!(normalize_route("bus 12 north"), "R12");
        assert_eq!(normalize_route("no digits"), "R0");
        assert_eq!(normalize_route(""), "R0");
    }
}
