//! Prediction
//!
//! Probability models consumed by the span harness.

pub mod classifier;
pub mod fitted;
pub mod logistic;
pub mod mlp;

pub use classifier::{FiftyFiftyModel, ProbabilityModel, SeedsBasedModel};
pub use fitted::MinMaxScaler;
pub use logistic::LogisticModel;
pub use mlp::{DenseLayer, MlpModel};
