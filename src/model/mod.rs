//! Model lifecycle and prediction dispatch.
//!
//! [`ModelServer`] owns the loaded artifact slot. Readers take an `Arc`
//! snapshot, so a concurrent reload swaps the model and its version as one
//! unit. [`ModelNotLoaded`] is the only hard error the prediction path
//! surfaces; everything upstream degrades instead of failing.

pub mod baseline;
pub mod linear;

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::features::{FEATURE_COUNT, FeatureVector};
use crate::model::linear::LinearModel;

/// Version string used when the artifact's modification time is unavailable.
const FALLBACK_VERSION: &str = "v1";

/// Raw model outputs are clamped to this window to suppress extrapolation
/// blow-ups from the weak regression.
const MODEL_OUTPUT_RANGE: (f64, f64) = (-60.0, 300.0);

/// Prediction requested while no artifact is loaded.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("model not loaded")]
pub struct ModelNotLoaded;

/// An inference artifact: one feature row in, one delay estimate out.
pub trait Predictor: Send + Sync {
    fn predict(&self, row: &[f64; FEATURE_COUNT]) -> f64;
}

/// A loaded artifact paired with its version string.
pub struct LoadedModel {
    predictor: Box<dyn Predictor>,
    version: String,
}

impl LoadedModel {
    pub fn new(predictor: Box<dyn Predictor>, version: String) -> Self {
        LoadedModel { predictor, version }
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Owned prediction service: holds the model slot and dispatches between
/// artifact inference and the rule-based baseline.
#[derive(Default)]
pub struct ModelServer {
    loaded: RwLock<Option<Arc<LoadedModel>>>,
}

impl ModelServer {
    pub fn new() -> Self {
        ModelServer {
            loaded: RwLock::new(None),
        }
    }

    /// Loads a linear-regression artifact from `path`.
    ///
    /// A missing file leaves the server unloaded and only logs a warning;
    /// an unreadable or schema-mismatched artifact is an error. On success
    /// the version is the file's modification time in ISO-8601.
    pub fn load_model(&self, path: &str) -> Result<()> {
        if !Path::new(path).exists() {
            warn!(path, "Model file missing, server stays unloaded");
            *self.loaded.write() = None;
            return Ok(());
        }

        let model = LinearModel::load(path)?;
        let version = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map(|mtime| {
                DateTime::<Utc>::from(mtime)
                    .format("%Y-%m-%dT%H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|_| FALLBACK_VERSION.to_string());

        info!(path, version = %version, "Model loaded");
        *self.loaded.write() = Some(Arc::new(LoadedModel::new(Box::new(model), version)));
        Ok(())
    }

    /// Installs an already-constructed predictor. Used by tests and callers
    /// that build artifacts in memory.
    pub fn install(&self, predictor: Box<dyn Predictor>, version: String) {
        *self.loaded.write() = Some(Arc::new(LoadedModel::new(predictor, version)));
    }

    pub fn unload(&self) {
        *self.loaded.write() = None;
    }

    pub fn loaded(&self) -> bool {
        self.loaded.read().is_some()
    }

    pub fn version(&self) -> Option<String> {
        self.loaded.read().as_ref().map(|m| m.version.clone())
    }

    fn snapshot(&self) -> Option<Arc<LoadedModel>> {
        self.loaded.read().clone()
    }

    /// Predicts a delay in minutes for one feature row.
    ///
    /// With `use_baseline` the deterministic rule-based estimate replaces
    /// artifact inference; that path is the documented default given the
    /// artifact's weak fit. Artifact output is clamped to a sanity window.
    pub fn predict(
        &self,
        features: &FeatureVector,
        use_baseline: bool,
    ) -> Result<f64, ModelNotLoaded> {
        let model = self.snapshot().ok_or(ModelNotLoaded)?;

        if use_baseline {
            let predicted = baseline::baseline_delay(features);
            info!(predicted, "Using baseline predictor");
            return Ok(predicted);
        }

        let raw = model.predictor.predict(&features.as_row());
        Ok(raw.clamp(MODEL_OUTPUT_RANGE.0, MODEL_OUTPUT_RANGE.1))
    }
}
