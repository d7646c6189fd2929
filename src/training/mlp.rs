//! Multi-layer perceptron trainer
//!
//! Architecture: Input(d) → Hidden1(w) → ReLU → Hidden2(w) → ReLU → logit(1)
//!
//! The hidden width defaults to the input dimension. Trained full-batch with
//! Adam on binary cross entropy over min-max scaled features.

use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::optim::decay::WeightDecayConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::activation::{relu, sigmoid};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{ElementConversion, Tensor};

use crate::data::sample::TrainingCorpus;
use crate::predict::{DenseLayer, MlpModel};
use crate::training::batch::{binary_cross_entropy, tensor_values, ScaledBatch};
use crate::Result;

/// Two ReLU hidden layers and a single logit
#[derive(Module, Debug)]
pub struct WinNet<B: Backend> {
    hidden_1: Linear<B>,
    hidden_2: Linear<B>,
    output: Linear<B>,
}

impl<B: Backend> WinNet<B> {
    pub fn new(device: &B::Device, input_dim: usize, hidden_width: usize) -> Self {
        WinNet {
            hidden_1: LinearConfig::new(input_dim, hidden_width).init(device),
            hidden_2: LinearConfig::new(hidden_width, hidden_width).init(device),
            output: LinearConfig::new(hidden_width, 1).init(device),
        }
    }

    /// Win logits [batch, 1]
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.hidden_1.forward(x));
        let x = relu(self.hidden_2.forward(x));
        self.output.forward(x)
    }
}

fn dense_layer<B: Backend>(linear: &Linear<B>) -> DenseLayer {
    let weight = linear.weight.val();
    let [inputs, outputs] = weight.dims();
    let bias = linear
        .bias
        .as_ref()
        .map(|b| tensor_values(b.val()))
        .unwrap_or_else(|| vec![0.0; outputs]);
    DenseLayer {
        inputs,
        outputs,
        weights: tensor_values(weight),
        bias,
    }
}

/// Trainer producing an `MlpModel`
pub struct MlpTrainer<B: AutodiffBackend> {
    learning_rate: f64,
    weight_decay: f64,
    epochs: usize,
    hidden_width: Option<usize>,
    device: B::Device,
}

impl<B: AutodiffBackend> MlpTrainer<B> {
    pub fn new(device: B::Device, learning_rate: f64, weight_decay: f64, epochs: usize) -> Self {
        MlpTrainer {
            learning_rate,
            weight_decay,
            epochs,
            hidden_width: None,
            device,
        }
    }

    /// Override the hidden width (input dimension by default)
    pub fn with_hidden_width(mut self, width: usize) -> Self {
        self.hidden_width = Some(width);
        self
    }

    pub fn train(&self, corpus: &TrainingCorpus) -> Result<MlpModel> {
        let batch = ScaledBatch::<B>::from_corpus(corpus, &self.device)?;
        let hidden_width = self.hidden_width.unwrap_or(batch.dim).max(1);

        let mut model = WinNet::<B>::new(&self.device, batch.dim, hidden_width);
        let mut optimizer = AdamConfig::new()
            .with_weight_decay(Some(WeightDecayConfig::new(self.weight_decay as f32)))
            .init::<B, WinNet<B>>();

        log::info!(
            "Starting MLP training on {} samples x {} features, hidden width {}, {} epochs",
            batch.rows,
            batch.dim,
            hidden_width,
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

        let fitted = MlpModel {
            scaler: batch.scaler,
            hidden: vec![dense_layer(&model.hidden_1), dense_layer(&model.hidden_2)],
            output: dense_layer(&model.output),
        };
        fitted.validate()?;
        Ok(fitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MadnessError;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let net = WinNet::<NdArray<f32>>::new(&device, 5, 5);
        let x = Tensor::<NdArray<f32>, 2>::zeros([3, 5], &device);
        assert_eq!(net.forward(x).dims(), [3, 1]);
    }

    #[test]
    fn test_extracted_weights_match_network() {
        let device = Default::default();
        let net = WinNet::<NdArray<f32>>::new(&device, 2, 3);
        let layer = dense_layer(&net.hidden_1);
        assert_eq!((layer.inputs, layer.outputs), (2, 3));
        assert_eq!(layer.weights.len(), 6);
        assert_eq!(layer.bias.len(), 3);

        let x = Tensor::<NdArray<f32>, 1>::from_floats([0.25f32, 0.75], &device).reshape([1, 2]);
        let expected = tensor_values(net.hidden_1.forward(x));
        let actual = layer.forward(&[0.25, 0.75]);
        for (e, a) in expected.iter().zip(&actual) {
            assert!((e - a).abs() < 1e-5);
        }
    }

    #[test]
    fn test_learns_separable_corpus() {
        let mut corpus = TrainingCorpus::new();
        for i in 0..20 {
            let gap = 1.0 + i as f64;
            corpus.push(vec![gap, -gap], 1);
            corpus.push(vec![-gap, gap], 0);
        }

        let trainer = MlpTrainer::<TestBackend>::new(Default::default(), 0.05, 1e-4, 300)
            .with_hidden_width(8);
        let model = trainer.train(&corpus).unwrap();

        assert_eq!(model.hidden.len(), 2);
        assert_eq!(model.hidden[0].outputs, 8);
        assert!(model.win_probability(&[20.0, -20.0]) > 0.5);
        assert!(model.win_probability(&[-20.0, 20.0]) < 0.5);
    }

    #[test]
    fn test_default_width_is_input_dimension() {
        let mut corpus = TrainingCorpus::new();
        corpus.push(vec![1.0, 2.0, 3.0], 1);
        corpus.push(vec![3.0, 2.0, 1.0], 0);

        let model = MlpTrainer::<TestBackend>::new(Default::default(), 0.01, 0.0, 2)
            .train(&corpus)
            .unwrap();
        assert_eq!(model.hidden[0].outputs, 3);
        assert_eq!(model.hidden[1].inputs, 3);
        assert_eq!(model.output.outputs, 1);
    }

    #[test]
    fn test_empty_corpus_fails() {
        let trainer = MlpTrainer::<TestBackend>::new(Default::default(), 0.01, 0.0, 10);
        assert!(matches!(
            trainer.train(&TrainingCorpus::new()),
            Err(MadnessError::Training(_))
        ));
    }
}
