//! Seasons, samples and spans
//!
//! CSV ingestion, per-season match-up enumeration and the span
//! train/predict/score harness.

pub mod loader;
pub mod sample;
pub mod season;
pub mod span;

pub use loader::Loader;
pub use sample::{Label, Observation, ScoredPrediction, TrainingCorpus};
pub use season::{Season, SeasonInput, TeamRegistry};
pub use span::{SeasonModels, Span, SpanPredictions};
