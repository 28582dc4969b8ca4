//! Domain bounds and environment-backed settings.

/// Inclusive passenger-count bounds; anything outside is imputed.
pub const MIN_PASSENGER: i64 = 0;
pub const MAX_PASSENGER: i64 = 200;

/// Fallback passenger count when no history exists to take a median of.
pub const DEFAULT_PASSENGER_COUNT: i64 = 10;

/// Valid coordinate ranges in decimal degrees.
pub const LAT_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LON_RANGE: (f64, f64) = (-180.0, 180.0);

pub const DEFAULT_MODEL_PATH: &str = "model/model.json";
pub const DEFAULT_STORE_PATH: &str = "data/records.csv";

/// Runtime settings resolved from environment variables with defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub model_path: String,
    pub store_path: String,
}

impl Settings {
    /// Reads `MODEL_PATH` and `STORE_PATH` from the environment.
    pub fn from_env() -> Self {
        Settings {
            model_path: std::env::var("MODEL_PATH")
                .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string()),
            store_path: std::env::var("STORE_PATH")
                .unwrap_or_else(|_| DEFAULT_STORE_PATH.to_string()),
        }
    }
}
