//! Feature extraction
//!
//! Converts a season's games and seeds into symmetric match-up features.

pub mod composition;
pub mod feature;
pub mod regular_season;
pub mod tournament;

pub use composition::{FeatureKind, FeatureSet, MatchUpFeatures};
pub use feature::Feature;
pub use regular_season::{RegularSeason, TeamMetric, TeamTotals};
pub use tournament::Tournament;
