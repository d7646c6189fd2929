//! Fitted logistic model
//!
//! Plain-data weights produced by `LogisticTrainer`, usable without a burn
//! backend and saved as JSON.

use crate::data::sample::Observation;
use crate::predict::fitted::{load_json, save_json};
use crate::predict::{MinMaxScaler, ProbabilityModel};
use crate::{MadnessError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Logistic regression on min-max scaled features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub scaler: MinMaxScaler,
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LogisticModel {
    /// Probability that the vision's first team wins
    pub fn win_probability(&self, features: &[f64]) -> f64 {
        let scaled = self.scaler.transform(features);
        let z: f64 = scaled
            .iter()
            .zip(&self.weights)
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.bias;
        1.0 / (1.0 + (-z).exp())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path.as_ref())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_json(path.as_ref())
    }
}

impl ProbabilityModel for LogisticModel {
    fn predict_proba(&self, batch: &[Observation]) -> Result<Vec<[f64; 2]>> {
        batch
            .iter()
            .map(|o| {
                if o.features().len() != self.scaler.dimension() {
                    return Err(MadnessError::ModelOutput(format!(
                        "model expects {} features, observation has {}",
                        self.scaler.dimension(),
                        o.features().len()
                    )));
                }
                let p_win = self.win_probability(o.features());
                Ok([1.0 - p_win, p_win])
            })
            .collect()
    }

    fn name(&self) -> &str {
        "logistic"
    }
}
