//! Full-batch tensors and loss shared by the trainers

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::data::sample::TrainingCorpus;
use crate::predict::MinMaxScaler;
use crate::{MadnessError, Result};

/// A whole training corpus as scaled tensors
pub struct ScaledBatch<B: Backend> {
    pub scaler: MinMaxScaler,
    /// [rows, dim]
    pub inputs: Tensor<B, 2>,
    /// [rows, 1]
    pub targets: Tensor<B, 2>,
    pub rows: usize,
    pub dim: usize,
}

impl<B: Backend> ScaledBatch<B> {
    /// Fit a min-max scaler on the corpus and build the input/target tensors
    pub fn from_corpus(corpus: &TrainingCorpus, device: &B::Device) -> Result<Self> {
        if corpus.is_empty() {
            return Err(MadnessError::Training("training corpus is empty".to_string()));
        }
        let rows = corpus.len();
        let dim = corpus.dimension();
        if dim == 0 {
            return Err(MadnessError::Training("training samples have no features".to_string()));
        }
        if let Some(bad) = corpus.features.iter().position(|f| f.len() != dim) {
            return Err(MadnessError::Training(format!(
                "sample {} has {} features, expected {}",
                bad,
                corpus.features[bad].len(),
                dim
            )));
        }

        let scaler = MinMaxScaler::fit(&corpus.features);

        let x_data: Vec<f32> = corpus
            .features
            .iter()
            .flat_map(|row| scaler.transform(row))
            .map(|v| v as f32)
            .collect();
        let y_data: Vec<f32> = corpus.labels.iter().map(|&l| l as f32).collect();

        let inputs = Tensor::<B, 1>::from_floats(x_data.as_slice(), device).reshape([rows, dim]);
        let targets = Tensor::<B, 1>::from_floats(y_data.as_slice(), device).reshape([rows, 1]);

        Ok(ScaledBatch {
            scaler,
            inputs,
            targets,
            rows,
            dim,
        })
    }
}

/// Mean binary cross entropy of probabilities against 0/1 targets
pub fn binary_cross_entropy<B: Backend>(probs: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
    let eps = 1e-7;
    let probs_clamped = probs.clamp(eps, 1.0 - eps);
    let loss = targets.clone().neg() * probs_clamped.clone().log()
        - (targets.neg() + 1.0) * (probs_clamped.neg() + 1.0).log();
    loss.mean()
}

/// Tensor values in row-major order
pub fn tensor_values<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Vec<f64> {
    tensor
        .into_data()
        .iter::<f32>()
        .map(|v| v as f64)
        .collect()
}
