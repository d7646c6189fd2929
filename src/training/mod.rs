//! Model training and evaluation metrics

pub mod batch;
pub mod logistic;
pub mod metrics;
pub mod mlp;

pub use logistic::LogisticTrainer;
pub use metrics::{SeasonScore, SpanScores};
pub use mlp::MlpTrainer;
