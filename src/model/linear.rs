//! JSON linear-regression artifact.
//!
//! Stored on disk as a plain JSON object:
//! ```json
//! {
//!   "columns": ["hour", "day_of_week", ...],
//!   "coefficients": [0.4, -1.2, ...],
//!   "intercept": 17.3
//! }
//! ```
//! The column list is checked against the canonical feature schema at load
//! time, so an artifact trained on a different column order is rejected
//! instead of silently corrupting predictions.

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::features::{COLUMNS, FEATURE_COUNT};
use crate::model::Predictor;

#[derive(Debug, Deserialize)]
pub struct LinearModel {
    columns: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    /// Reads and validates an artifact from a JSON file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model artifact at {}", path))?;
        let model: LinearModel = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse model artifact at {}", path))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.columns != COLUMNS {
            bail!(
                "artifact column schema mismatch: expected {:?}, got {:?}",
                COLUMNS,
                self.columns
            );
        }
        if self.coefficients.len() != FEATURE_COUNT {
            bail!(
                "artifact coefficient count mismatch: expected {}, got {}",
                FEATURE_COUNT,
                self.coefficients.len()
            );
        }
        Ok(())
    }
}

impl Predictor for LinearModel {
    fn predict(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        let weighted: f64 = row
            .iter()
            .zip(&self.coefficients)
            .map(|(value, coef)| value * coef)
            .sum();
        self.intercept + weighted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn artifact_json(columns: &[&str]) -> String {
        serde_json::json!({
            "columns": columns,
            "coefficients": vec![0.0; columns.len()],
            "intercept": 7.5,
        })
        .to_string()
    }

    #[test]
    fn test_load_valid_artifact() {
        let path = temp_path("delay_predictor_test_valid_model.json");
        fs::write(&path, artifact_json(&COLUMNS)).unwrap();

        let model = LinearModel::load(&path).unwrap();
        assert_eq!(model.predict(&[1.0; FEATURE_COUNT]), 7.5);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_rejects_wrong_columns() {
        let path = temp_path("delay_predictor_test_wrong_columns.json");
        let mut reordered: Vec<&str> = COLUMNS.to_vec();
        reordered.swap(0, 1);
        fs::write(&path, artifact_json(&reordered)).unwrap();

        assert!(LinearModel::load(&path).is_err());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let path = temp_path("delay_predictor_test_bad_json.json");
        fs::write(&path, "not json").unwrap();

        assert!(LinearModel::load(&path).is_err());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_predict_is_dot_product_plus_intercept() {
        let model = LinearModel {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            coefficients: {
                let mut c = vec![0.0; FEATURE_COUNT];
                c[0] = 2.0; // hour
                c[5] = 0.5; // passenger_count
                c
            },
            intercept: 10.0,
        };
        let mut row = [0.0; FEATURE_COUNT];
        row[0] = 8.0;
        row[5] = 40.0;
        assert_eq!(model.predict(&row), 10.0 + 16.0 + 20.0);
    }
}
