//! Fitted multi-layer perceptron
//!
//! ReLU hidden layers and a sigmoid output over min-max scaled features. The
//! weights are copied out of burn after training so that inference needs no
//! backend.

use crate::data::sample::Observation;
use crate::predict::fitted::{load_json, save_json};
use crate::predict::{MinMaxScaler, ProbabilityModel};
use crate::{MadnessError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fully connected layer, weights stored input-major (`inputs x outputs`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub inputs: usize,
    pub outputs: usize,
    pub weights: Vec<f64>,
    pub bias: Vec<f64>,
}

impl DenseLayer {
    pub fn forward(&self, x: &[f64]) -> Vec<f64> {
        (0..self.outputs)
            .map(|j| {
                self.bias[j]
                    + x.iter()
                        .enumerate()
                        .map(|(i, v)| v * self.weights[i * self.outputs + j])
                        .sum::<f64>()
            })
            .collect()
    }

    fn check_shape(&self) -> Result<()> {
        if self.weights.len() != self.inputs * self.outputs || self.bias.len() != self.outputs {
            return Err(MadnessError::ModelOutput(format!(
                "layer {}x{} has {} weights and {} biases",
                self.inputs,
                self.outputs,
                self.weights.len(),
                self.bias.len()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpModel {
    pub scaler: MinMaxScaler,
    pub hidden: Vec<DenseLayer>,
    /// Single logit
    pub output: DenseLayer,
}

impl MlpModel {
    /// Check that consecutive layers fit together and end in one logit
    pub fn validate(&self) -> Result<()> {
        let mut width = self.scaler.dimension();
        for layer in self.hidden.iter().chain(std::iter::once(&self.output)) {
            layer.check_shape()?;
            if layer.inputs != width {
                return Err(MadnessError::ModelOutput(format!(
                    "layer expects {} inputs, previous layer yields {}",
                    layer.inputs, width
                )));
            }
            width = layer.outputs;
        }
        if width != 1 {
            return Err(MadnessError::ModelOutput(format!(
                "output layer yields {} values, expected 1",
                width
            )));
        }
        Ok(())
    }

    /// Probability that the vision's first team wins
    pub fn win_probability(&self, features: &[f64]) -> f64 {
        let mut x = self.scaler.transform(features);
        for layer in &self.hidden {
            x = layer.forward(&x).into_iter().map(|v| v.max(0.0)).collect();
        }
        let z = self.output.forward(&x)[0];
        1.0 / (1.0 + (-z).exp())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path.as_ref())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let model: MlpModel = load_json(path.as_ref())?;
        model.validate()?;
        Ok(model)
    }
}

impl ProbabilityModel for MlpModel {
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
        "mlp"
    }
}
