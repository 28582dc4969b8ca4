//! Rule-based baseline delay predictor.
//!
//! The trained regression explains very little of the delay variance, so
//! this parameter-free estimate is the intentional default prediction
//! path, not a debug shim. It starts from the training set's median delay
//! and applies fixed adjustments for weather severity, time-of-day bucket,
//! and weekends.

use crate::features::{FeatureVector, TimeOfDay};

/// Median delay in minutes over the cleaned training set.
pub const TRAINING_DELAY_MEDIAN: f64 = 61.0;

/// Baseline output is clamped to this window.
const BASELINE_RANGE: (f64, f64) = (0.0, 180.0);

/// Deterministic delay estimate from the feature row alone.
///
/// Severity 2 (rain/snow) adds 20 minutes, severity 1 (cloud/fog) adds 10;
/// evening adds 15 for the rush hour, afternoon 5; weekends subtract 10.
pub fn baseline_delay(features: &FeatureVector) -> f64 {
    let mut delay = TRAINING_DELAY_MEDIAN;

    match features.weather_severity {
        2 => delay += 20.0,
        1 => delay += 10.0,
        _ => {}
    }

    match features.time_of_day {
        TimeOfDay::Evening => delay += 15.0,
        TimeOfDay::Afternoon => delay += 5.0,
        _ => {}
    }

    if features.is_weekend {
        delay -= 10.0;
    }

    delay.clamp(BASELINE_RANGE.0, BASELINE_RANGE.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(severity: u8, time_of_day: TimeOfDay, weekend: bool) -> FeatureVector {
        FeatureVector {
            hour: 9,
            day_of_week: if weekend { 6 } else { 2 },
            is_weekend: weekend,
            weather_severity: severity,
            route_frequency: 12.0,
            passenger_count: 30,
            latitude: 26.82,
            longitude: 30.80,
            route_num: 1,
            time_of_day,
        }
    }

    #[test]
    fn test_rainy_evening_weekday() {
        // 61 + 20 + 15 = 96
        assert_eq!(baseline_delay(&features(2, TimeOfDay::Evening, false)), 96.0);
    }

    #[test]
    fn test_clear_morning_weekday_stays_at_median() {
        assert_eq!(
            baseline_delay(&features(0, TimeOfDay::Morning, false)),
            TRAINING_DELAY_MEDIAN
        );
    }

    #[test]
    fn test_cloudy_afternoon_weekend() {
        // 61 + 10 + 5 - 10 = 66
        assert_eq!(
            baseline_delay(&features(1, TimeOfDay::Afternoon, true)),
            66.0
        );
    }

    #[test]
    fn test_night_bucket_adds_nothing() {
        assert_eq!(baseline_delay(&features(0, TimeOfDay::Night, true)), 51.0);
    }

    #[test]
    fn test_output_stays_in_range() {
        let estimate = baseline_delay(&features(2, TimeOfDay::Evening, false));
        assert!((BASELINE_RANGE.0..=BASELINE_RANGE.1).contains(&estimate));
    }

    #[test]
    fn test_pure_function_of_features() {
        let input = features(2, TimeOfDay::Evening, false);
        assert_eq!(baseline_delay(&input), baseline_delay(&input));
    }
}
