//! Scoring metrics
//!
//! Log loss per prediction, averaged per season, then across seasons.

use crate::data::sample::{Label, ScoredPrediction};
use std::collections::BTreeMap;
use std::fmt;

/// Cross-entropy loss of `probability` (of team_1 winning) against `label`.
///
/// Not clamped: a confident wrong prediction scores +inf. Unknown labels score 0.
pub fn log_loss(label: Label, probability: f64) -> f64 {
    match label {
        Label::Won => -probability.ln(),
        Label::Lost => -(1.0 - probability).ln(),
        Label::Unknown => 0.0,
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Metrics of one season's predictions on games actually played
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonScore {
    /// Mean log loss
    pub log_loss: f64,
    /// Share of games whose winner got more than 50%
    pub accuracy: f64,
    /// Number of scored games
    pub games: usize,
}

impl SeasonScore {
    /// `None` when no prediction has a known label
    pub fn from_predictions(predictions: &[ScoredPrediction]) -> Option<Self> {
        let played: Vec<&ScoredPrediction> = predictions
            .iter()
            .filter(|p| p.label() != Label::Unknown)
            .collect();

        let losses: Vec<f64> = played.iter().map(|p| p.score()).collect();
        let log_loss = mean(&losses)?;

        let correct = played
            .iter()
            .filter(|p| (p.probability() > 0.5) == (p.label() == Label::Won))
            .count();

        Some(SeasonScore {
            log_loss,
            accuracy: correct as f64 / played.len() as f64,
            games: played.len(),
        })
    }
}

/// Per-season scores and their unweighted average
#[derive(Debug, Clone)]
pub struct SpanScores {
    pub seasons: BTreeMap<u16, SeasonScore>,
    /// Mean of the seasons' mean log losses
    pub average: f64,
}

impl SpanScores {
    /// `None` when no season has a scored game
    pub fn from_seasons(seasons: BTreeMap<u16, SeasonScore>) -> Option<Self> {
        let losses: Vec<f64> = seasons.values().map(|s| s.log_loss).collect();
        let average = mean(&losses)?;
        Some(SpanScores { seasons, average })
    }

    pub fn get(&self, season: u16) -> Option<f64> {
        self.seasons.get(&season).map(|s| s.log_loss)
    }
}

impl fmt::Display for SpanScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (season, score) in &self.seasons {
            writeln!(
                f,
                "{} | Log loss: {:.5} | Acc: {:.2}% | Games: {}",
                season,
                score.log_loss,
                score.accuracy * 100.0,
                score.games
            )?;
        }
        write!(f, "Average | Log loss: {:.5}", self.average)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_loss_boundaries() {
        assert_eq!(log_loss(Label::Won, 1.0), 0.0);
        assert_eq!(log_loss(Label::Lost, 0.0), 0.0);
        assert_eq!(log_loss(Label::Won, 0.0), f64::INFINITY);
        assert_eq!(log_loss(Label::Lost, 1.0), f64::INFINITY);
        assert_eq!(log_loss(Label::Unknown, 0.0), 0.0);
        assert!((log_loss(Label::Won, 0.5) - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn test_log_loss_grows_towards_zero_probability() {
        let near = log_loss(Label::Won, 1e-3);
        let nearer = log_loss(Label::Won, 1e-12);
        assert!(nearer > near);
        assert!(nearer.is_finite());
    }

    #[test]
    fn test_mean_of_means() {
        let mut seasons = BTreeMap::new();
        seasons.insert(
            2015,
            SeasonScore {
                log_loss: 0.2,
                accuracy: 1.0,
                games: 63,
            },
        );
        seasons.insert(
            2016,
            SeasonScore {
                log_loss: 0.8,
                accuracy: 0.5,
                games: 2,
            },
        );
        let scores = SpanScores::from_seasons(seasons).unwrap();
        assert!((scores.average - 0.5).abs() < 1e-12);
        assert_eq!(scores.get(2016), Some(0.8));
    }

    #[test]
    fn test_empty_span() {
        assert!(SpanScores::from_seasons(BTreeMap::new()).is_none());
        assert!(mean(&[]).is_none());
    }
}
