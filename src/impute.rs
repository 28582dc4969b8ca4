//! Statistical imputation for out-of-range or missing fields.

use anyhow::Result;
use tracing::info;

use crate::config::{DEFAULT_PASSENGER_COUNT, LAT_RANGE, LON_RANGE, MAX_PASSENGER, MIN_PASSENGER};

/// Read access to previously stored valid passenger counts.
///
/// Implementations must query the underlying store fresh on every call so
/// imputation reflects the latest ingested data, and must tolerate
/// concurrent readers without locking.
pub trait PassengerHistory {
    fn valid_passenger_counts(&self) -> Result<Vec<i64>>;
}

/// History backed by a fixed in-memory list. Used when no store is
/// configured, and by tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory(pub Vec<i64>);

impl PassengerHistory for InMemoryHistory {
    fn valid_passenger_counts(&self) -> Result<Vec<i64>> {
        Ok(self.0.clone())
    }
}

/// Median of the historical counts, truncated toward zero for even-length
/// history. Falls back to the fixed default when no history exists.
fn median_passenger(counts: &[i64]) -> i64 {
    if counts.is_empty() {
        return DEFAULT_PASSENGER_COUNT;
    }
    let mut sorted = counts.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        ((sorted[mid - 1] + sorted[mid]) as f64 / 2.0) as i64
    }
}

/// Validates and imputes a passenger count.
///
/// In-range values pass through unchanged; missing or out-of-range values
/// are replaced with the median of stored valid counts (or the default when
/// history is empty). The only failure mode is the history read itself.
pub fn impute_passenger_count(
    raw: Option<i64>,
    history: &impl PassengerHistory,
) -> Result<i64> {
    match raw {
        Some(count) if (MIN_PASSENGER..=MAX_PASSENGER).contains(&count) => Ok(count),
        _ => {
            let counts = history.valid_passenger_counts()?;
            let imputed = median_passenger(&counts);
            info!(raw = ?raw, imputed, "Imputing passenger_count with median/default");
            Ok(imputed)
        }
    }
}

/// Validates latitude and longitude independently, nulling whichever
/// coordinate is out of range. Invalid input degrades, never errors.
pub fn validate_gps(lat: Option<f64>, lon: Option<f64>) -> (Option<f64>, Option<f64>) {
    let valid_lat = lat.filter(|v| (LAT_RANGE.0..=LAT_RANGE.1).contains(v));
    let valid_lon = lon.filter(|v| (LON_RANGE.0..=LON_RANGE.1).contains(v));
    if lat.is_some() && valid_lat.is_none() {
        info!(latitude = ?lat, "Invalid latitude set to None");
    }
    if lon.is_some() && valid_lon.is_none() {
        info!(longitude = ?lon, "Invalid longitude set to None");
    }
    (valid_lat, valid_lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_count_passes_through() {
        let history = InMemoryHistory(vec![50, 60, 70]);
        assert_eq!(impute_passenger_count(Some(12), &history).unwrap(), 12);
        assert_eq!(impute_passenger_count(Some(0), &history).unwrap(), 0);
        assert_eq!(impute_passenger_count(Some(200), &history).unwrap(), 200);
    }

    #[test]
    fn test_out_of_range_count_imputes_median() {
        let history = InMemoryHistory(vec![50, 60, 70]);
        assert_eq!(impute_passenger_count(Some(-5), &history).unwrap(), 60);
        assert_eq!(impute_passenger_count(Some(250), &history).unwrap(), 60);
        assert_eq!(impute_passenger_count(None, &history).unwrap(), 60);
    }

    #[test]
    fn test_even_history_truncates_median() {
        let history = InMemoryHistory(vec![10, 20, 30, 41]);
        // (20 + 30) / 2 = 25
        assert_eq!(impute_passenger_count(None, &history).unwrap(), 25);
        let odd_midpoint = InMemoryHistory(vec![10, 21]);
        assert_eq!(impute_passenger_count(None, &odd_midpoint).unwrap(), 15);
    }

    #[test]
    fn test_empty_history_uses_default() {
        let history = InMemoryHistory(Vec::new());
        assert_eq!(impute_passenger_count(Some(999), &history).unwrap(), 10);
        assert_eq!(impute_passenger_count(None, &history).unwrap(), 10);
    }

    #[test]
    fn test_gps_out_of_range_is_nulled() {
        let (lat, lon) = validate_gps(Some(999.0), Some(30.0));
        assert!(lat.is_none());
        assert_eq!(lon, Some(30.0));
    }

    #[test]
    fn test_gps_independent_validation() {
        let (lat, lon) = validate_gps(Some(45.0), Some(-200.0));
        assert_eq!(lat, Some(45.0));
        assert!(lon.is_none());

        let (lat, lon) = validate_gps(None, None);
        assert!(lat.is_none());
        assert!(lon.is_none());
    }

    #[test]
    fn test_gps_boundaries_are_valid() {
        let (lat, lon) = validate_gps(Some(-90.0), Some(180.0));
        assert_eq!(lat, Some(-90.0));
        assert_eq!(lon, Some(180.0));
    }
}
