//! Match-up observations and scored predictions
//!
//! An `Observation` is what enumeration produces: two team ids in ascending
//! order, the team_1 vs. team_2 features and the known outcome. Applying a
//! probability turns it into a `ScoredPrediction`.

use crate::training::metrics::log_loss;
use crate::{MadnessError, Result, TeamId};
use serde::{Deserialize, Serialize};

/// Outcome of a match-up from team_1's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Won,
    Lost,
    /// Never played in the tournament
    Unknown,
}

impl Label {
    /// 1, 0 or -1
    pub fn value(&self) -> i8 {
        match self {
            Label::Won => 1,
            Label::Lost => 0,
            Label::Unknown => -1,
        }
    }
}

/// Features and label of one match-up team_1 vs. team_2, with team_1 < team_2
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    season: u16,
    team_1: TeamId,
    team_2: TeamId,
    features: Vec<f64>,
    label: Label,
}

impl Observation {
    pub fn new(
        season: u16,
        team_1: TeamId,
        team_2: TeamId,
        features: Vec<f64>,
        label: Label,
    ) -> Result<Self> {
        if team_1 >= team_2 {
            return Err(MadnessError::Precondition(format!(
                "cannot create a sample for {} vs. {}: team_1 must have the smaller id",
                team_1, team_2
            )));
        }
        Ok(Observation {
            season,
            team_1,
            team_2,
            features,
            label,
        })
    }

    pub fn season(&self) -> u16 {
        self.season
    }

    pub fn team_1(&self) -> TeamId {
        self.team_1
    }

    pub fn team_2(&self) -> TeamId {
        self.team_2
    }

    pub fn features(&self) -> &[f64] {
        &self.features
    }

    pub fn label(&self) -> Label {
        self.label
    }

    /// Attach the probability of team_1 winning and derive the loss
    pub fn score(self, probability: f64) -> ScoredPrediction {
        let score = log_loss(self.label, probability);
        ScoredPrediction {
            observation: self,
            probability,
            score,
        }
    }
}

/// An observation with its predicted probability and log loss
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPrediction {
    observation: Observation,
    probability: f64,
    score: f64,
}

impl ScoredPrediction {
    pub fn observation(&self) -> &Observation {
        &self.observation
    }

    pub fn team_1(&self) -> TeamId {
        self.observation.team_1
    }

    pub fn team_2(&self) -> TeamId {
        self.observation.team_2
    }

    pub fn label(&self) -> Label {
        self.observation.label
    }

    /// Probability of team_1 winning
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Log loss, 0 for match-ups that were never played
    pub fn score(&self) -> f64 {
        self.score
    }
}

/// Labelled feature vectors for model fitting
#[derive(Debug, Clone, Default)]
pub struct TrainingCorpus {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
}

impl TrainingCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, features: Vec<f64>, label: u8) {
        self.features.push(features);
        self.labels.push(label);
    }

    pub fn append(&mut self, other: TrainingCorpus) {
        self.features.extend(other.features);
        self.labels.extend(other.labels);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature vector length, 0 for an empty corpus
    pub fn dimension(&self) -> usize {
        self.features.first().map(Vec::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_ascending_ids() {
        assert!(Observation::new(2021, TeamId(1), TeamId(2), vec![], Label::Won).is_ok());
        assert!(matches!(
            Observation::new(2021, TeamId(2), TeamId(1), vec![], Label::Won),
            Err(MadnessError::Precondition(_))
        ));
        assert!(Observation::new(2021, TeamId(3), TeamId(3), vec![], Label::Unknown).is_err());
    }

    #[test]
    fn test_score() {
        let won = Observation::new(2021, TeamId(1), TeamId(2), vec![1.0], Label::Won).unwrap();
        assert_eq!(won.clone().score(1.0).score(), 0.0);
        assert_eq!(won.score(0.0).score(), f64::INFINITY);

        let lost = Observation::new(2021, TeamId(1), TeamId(2), vec![1.0], Label::Lost).unwrap();
        let scored = lost.score(0.25);
        assert!((scored.score() - -(0.75f64).ln()).abs() < 1e-12);
        assert_eq!(scored.probability(), 0.25);

        let unknown =
            Observation::new(2021, TeamId(1), TeamId(2), vec![1.0], Label::Unknown).unwrap();
        assert_eq!(unknown.score(0.01).score(), 0.0);
    }

    #[test]
    fn test_label_values() {
        assert_eq!(Label::Won.value(), 1);
        assert_eq!(Label::Lost.value(), 0);
        assert_eq!(Label::Unknown.value(), -1);
    }
}
