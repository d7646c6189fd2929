//! Logistic regression trainer
//!
//! A single Linear layer with a sigmoid, trained full-batch with SGD on binary
//! cross entropy over min-max scaled features.

use burn::nn::{Linear, LinearConfig};
use burn::optim::{GradientsParams, Optimizer, SgdConfig};
use burn::tensor::activation::sigmoid;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::ElementConversion;

use crate::data::sample::TrainingCorpus;
use crate::predict::LogisticModel;
use crate::training::batch::{binary_cross_entropy, tensor_values, ScaledBatch};
use crate::Result;

/// Trainer producing a `LogisticModel`
pub struct LogisticTrainer<B: AutodiffBackend> {
    learning_rate: f64,
    epochs: usize,
    device: B::Device,
}

impl<B: AutodiffBackend> LogisticTrainer<B> {
    pub fn new(device: B::Device, learning_rate: f64, epochs: usize) -> Self {
        LogisticTrainer {
            learning_rate,
            epochs,
            device,
        }
    }

    /// Fit on the corpus and return plain-data weights
    pub fn train(&self, corpus: &TrainingCorpus) -> Result<LogisticModel> {
        let batch = ScaledBatch::<B>::from_corpus(corpus, &self.device)?;

        let mut model: Linear<B> = LinearConfig::new(batch.dim, 1).init(&self.device);
        let mut optimizer = SgdConfig::new().init::<B, Linear<B>>();

        log::info!(
            "Starting logistic training on {} samples x {} features for {} epochs",
            batch.rows,
            batch.dim,
            self.epochs
        );

        for epoch in 0..self.epochs {
            let probs = sigmoid(model.forward(batch.inputs.clone()));
            let loss = binary_cross_entropy(probs, batch.targets.clone());
            let loss_val: f32 = loss.clone().into_scalar().elem();

            let grads = loss.backward();
            let grads_params = GradientsParams::from_grads(grads, &model);
            model = optimizer.step(self.learning_rate, model, grads_params);

            if epoch % 100 == 0 || epoch + 1 == self.epochs {
                log::debug!("Epoch {}/{}: loss={:.4}", epoch + 1, self.epochs, loss_val);
            }
        }

        let weights = tensor_values(model.weight.val());
        let bias = model
            .bias
            .as_ref()
            .and_then(|b| tensor_values(b.val()).first().copied())
            .unwrap_or(0.0);

        log::info!("Trained weights: {:?}, bias: {:.4}", weights, bias);

        Ok(LogisticModel {
            scaler: batch.scaler,
            weights,
            bias,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MadnessError;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_learns_separable_corpus() {
        let mut corpus = TrainingCorpus::new();
        for i in 0..20 {
            let gap = 1.0 + i as f64;
            corpus.push(vec![gap], 1);
            corpus.push(vec![-gap], 0);
        }

        let trainer = LogisticTrainer::<TestBackend>::new(Default::default(), 0.5, 300);
        let model = trainer.train(&corpus).unwrap();

        assert_eq!(model.weights.len(), 1);
        assert!(model.weights[0] > 0.0);
        assert!(model.win_probability(&[20.0]) > 0.5);
        assert!(model.win_probability(&[-20.0]) < 0.5);
    }

    #[test]
    fn test_empty_corpus_fails() {
        let trainer = LogisticTrainer::<TestBackend>::new(Default::default(), 0.1, 10);
        assert!(matches!(
            trainer.train(&TrainingCorpus::new()),
            Err(MadnessError::Training(_))
        ));
    }
}
