//! Feature set composition
//!
//! A feature set is a fixed, versioned list of features. Every model input is
//! built from one set; changing a list changes the input dimension, so a
//! changed list gets a new version.

use crate::features::{Feature, RegularSeason, Tournament};
use crate::{MadnessError, MatchUp, Result};
use std::fmt;

/// One feature of a set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    SeedPositions,
    SeedsDiff,
    RankingDiff,
    BracketPositions,
    PointsScored,
    PointsAllowed,
    WinRatio,
    ScoreGap,
    AdjustedWinPercentage,
    NetEfficiencyDiff,
}

impl FeatureKind {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureKind::SeedPositions => "seed_positions",
            FeatureKind::SeedsDiff => "seeds_diff",
            FeatureKind::RankingDiff => "ranking_diff",
            FeatureKind::BracketPositions => "bracket_positions",
            FeatureKind::PointsScored => "points_scored",
            FeatureKind::PointsAllowed => "points_allowed",
            FeatureKind::WinRatio => "win_ratio",
            FeatureKind::ScoreGap => "score_gap",
            FeatureKind::AdjustedWinPercentage => "adjusted_win_percentage",
            FeatureKind::NetEfficiencyDiff => "net_efficiency_diff",
        }
    }

    /// Values contributed to one vision
    pub fn width(&self) -> usize {
        match self {
            FeatureKind::SeedsDiff
            | FeatureKind::RankingDiff
            | FeatureKind::BracketPositions
            | FeatureKind::NetEfficiencyDiff => 1,
            _ => 2,
        }
    }

    pub fn evaluate(
        &self,
        regular_season: &RegularSeason,
        tournament: &Tournament,
        match_up: &MatchUp,
        ranking_system: &str,
    ) -> Result<Feature> {
        match self {
            FeatureKind::SeedPositions => tournament.get_seeds_positions(match_up),
            FeatureKind::SeedsDiff => tournament.get_seeds_diff(match_up),
            FeatureKind::RankingDiff => tournament.get_ranking_diff(match_up, ranking_system),
            FeatureKind::BracketPositions => tournament.get_bracket_positions(match_up),
            FeatureKind::PointsScored => Ok(regular_season.get_points_scored(match_up)),
            FeatureKind::PointsAllowed => Ok(regular_season.get_points_allowed(match_up)),
            FeatureKind::WinRatio => Ok(regular_season.get_win_ratio(match_up)),
            FeatureKind::ScoreGap => Ok(regular_season.get_score_gap(match_up)),
            FeatureKind::AdjustedWinPercentage => {
                Ok(regular_season.get_adjusted_win_percentage(match_up))
            }
            FeatureKind::NetEfficiencyDiff => Ok(regular_season.get_net_efficiency_diff(match_up)),
        }
    }
}

/// Named, versioned list of features
#[derive(Debug, Clone)]
pub struct FeatureSet {
    name: &'static str,
    version: u32,
    kinds: Vec<FeatureKind>,
    ranking_system: String,
}

impl FeatureSet {
    /// Seed position, adjusted win percentage, score gap and seed difference
    pub fn standard() -> Self {
        FeatureSet {
            name: "standard",
            version: 1,
            kinds: vec![
                FeatureKind::SeedPositions,
                FeatureKind::AdjustedWinPercentage,
                FeatureKind::ScoreGap,
                FeatureKind::SeedsDiff,
            ],
            ranking_system: "POM".to_string(),
        }
    }

    /// Standard features plus rankings, bracket and scoring statistics
    pub fn extended() -> Self {
        FeatureSet {
            name: "extended",
            version: 1,
            kinds: vec![
                FeatureKind::SeedPositions,
                FeatureKind::AdjustedWinPercentage,
                FeatureKind::ScoreGap,
                FeatureKind::SeedsDiff,
                FeatureKind::RankingDiff,
                FeatureKind::BracketPositions,
                FeatureKind::PointsScored,
                FeatureKind::PointsAllowed,
                FeatureKind::WinRatio,
                FeatureKind::NetEfficiencyDiff,
            ],
            ranking_system: "POM".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "standard" => Ok(Self::standard()),
            "extended" => Ok(Self::extended()),
            _ => Err(MadnessError::Config(format!(
                "Unknown feature set: {}. Use standard or extended.",
                name
            ))),
        }
    }

    pub fn with_ranking_system(mut self, system: &str) -> Self {
        self.ranking_system = system.to_string();
        self
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn kinds(&self) -> &[FeatureKind] {
        &self.kinds
    }

    pub fn ranking_system(&self) -> &str {
        &self.ranking_system
    }

    /// Length of one feature vector
    pub fn dimension(&self) -> usize {
        self.kinds.iter().map(FeatureKind::width).sum()
    }

    /// Evaluate every feature once for `match_up` and project both visions
    pub fn compose(
        &self,
        regular_season: &RegularSeason,
        tournament: &Tournament,
        match_up: &MatchUp,
    ) -> Result<MatchUpFeatures> {
        let features = self
            .kinds
            .iter()
            .map(|kind| kind.evaluate(regular_season, tournament, match_up, &self.ranking_system))
            .collect::<Result<Vec<_>>>()?;
        Ok(MatchUpFeatures::from_features(&features))
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{} ({} values)", self.name, self.version, self.dimension())
    }
}

/// Both orientations of a match-up's feature vector
#[derive(Debug, Clone, PartialEq)]
pub struct MatchUpFeatures {
    /// team_1 vs. team_2
    pub vision_1: Vec<f64>,
    /// team_2 vs. team_1
    pub vision_2: Vec<f64>,
}

impl MatchUpFeatures {
    pub fn from_features(features: &[Feature]) -> Self {
        let width = features.iter().map(Feature::width).sum();
        let mut vision_1 = Vec::with_capacity(width);
        let mut vision_2 = Vec::with_capacity(width);
        for feature in features {
            feature.extend_vision_1(&mut vision_1);
            feature.extend_vision_2(&mut vision_2);
        }
        MatchUpFeatures { vision_1, vision_2 }
    }
}
