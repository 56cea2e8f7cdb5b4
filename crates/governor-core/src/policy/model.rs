//! Offline-trained regressor policy.
//!
//! The regressor itself is out of scope for this crate (it is produced by
//! an external training pipeline); what this module owns is the on-disk
//! bundle format and the feature-vector contract in [`super::Features`].
//! The bundled format is a small linear model (weights + bias) so the
//! policy can be exercised in tests without an external ML runtime —
//! loading any other format is an extension point, not something this
//! crate implements.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Features, Policy};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    /// Weights in the same order as [`Features::vector`].
    pub weights: [f64; 7],
    pub bias: f64,
}

impl LinearModel {
    fn predict(&self, vector: [f64; 7]) -> f64 {
        self.weights
            .iter()
            .zip(vector.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, bytes)
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let bytes = std::fs::read(path)?;
        bincode::deserialize(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// A policy backed by a [`LinearModel`] loaded once at startup.
#[derive(Debug, Clone)]
pub struct ModelPolicy {
    model: LinearModel,
}

impl ModelPolicy {
    /// Loads the model from disk. Returns an error (not a fallback — the
    /// caller decides whether to fall back to [`super::HeuristicPolicy`])
    /// if the file is missing or malformed.
    pub fn load(path: &Path) -> io::Result<Self> {
        Ok(Self {
            model: LinearModel::load(path)?,
        })
    }

    pub fn from_model(model: LinearModel) -> Self {
        Self { model }
    }
}

impl Policy for ModelPolicy {
    fn suggest(&self, features: Features, hard_cap: i64, current_soft: i64) -> Option<i64> {
        let vector = features.vector(current_soft, hard_cap);
        let predicted = self.model.predict(vector);
        if predicted <= current_soft as f64 {
            return None;
        }
        Some((predicted.min(hard_cap as f64)) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_always_raises_by(delta: f64) -> ModelPolicy {
        // predicted = current_soft + delta, regardless of other features:
        // weight 1.0 on current_soft (index 5), 0 elsewhere, bias = delta.
        let mut weights = [0.0; 7];
        weights[5] = 1.0;
        ModelPolicy::from_model(LinearModel { weights, bias: delta })
    }

    #[test]
    fn suggests_value_between_current_and_hard_cap() {
        let policy = model_always_raises_by(7_000.0);
        let suggestion = policy
            .suggest(Features::default(), 50_000, 15_000)
            .unwrap();
        assert!(suggestion > 15_000);
        assert!(suggestion <= 50_000);
        assert_eq!(suggestion, 22_000);
    }

    #[test]
    fn clamps_prediction_to_hard_cap() {
        let policy = model_always_raises_by(100_000.0);
        let suggestion = policy.suggest(Features::default(), 50_000, 15_000).unwrap();
        assert_eq!(suggestion, 50_000);
    }

    #[test]
    fn returns_none_when_prediction_does_not_raise() {
        let policy = model_always_raises_by(0.0);
        assert_eq!(policy.suggest(Features::default(), 50_000, 15_000), None);
    }

    #[test]
    fn save_and_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        let mut weights = [0.0; 7];
        weights[5] = 1.0;
        let model = LinearModel { weights, bias: 500.0 };
        model.save(&path).unwrap();

        let loaded = ModelPolicy::load(&path).unwrap();
        assert_eq!(
            loaded.suggest(Features::default(), 50_000, 10_000),
            Some(10_500)
        );
    }

    #[test]
    fn missing_model_file_is_an_error() {
        let result = ModelPolicy::load(Path::new("/nonexistent/model.bin"));
        assert!(result.is_err());
    }
}
