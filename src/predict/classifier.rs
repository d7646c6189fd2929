//! Probability models
//!
//! Any model that answers a batch of observations with `[p_loss, p_win]`
//! rows, in input order, can be scored.

use crate::data::sample::Observation;
use crate::{MadnessError, Result, Seed, TeamId};
use std::collections::HashMap;

/// Tolerance on `p_loss + p_win == 1`
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Batch win-probability model
pub trait ProbabilityModel: Send + Sync {
    /// One `[p_loss, p_win]` row per observation, from team_1's side
    fn predict_proba(&self, batch: &[Observation]) -> Result<Vec<[f64; 2]>>;

    fn name(&self) -> &str;
}

/// Check a model answer against its batch and return the win probabilities
pub fn win_probabilities(rows: &[[f64; 2]], batch_len: usize) -> Result<Vec<f64>> {
    if rows.len() != batch_len {
        return Err(MadnessError::ModelOutput(format!(
            "expected {} rows, got {}",
            batch_len,
            rows.len()
        )));
    }

    rows.iter()
        .enumerate()
        .map(|(i, &[p_loss, p_win])| {
            let in_range = (0.0..=1.0).contains(&p_loss) && (0.0..=1.0).contains(&p_win);
            if !in_range || (p_loss + p_win - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
                return Err(MadnessError::ModelOutput(format!(
                    "row {} is not a probability pair: [{}, {}]",
                    i, p_loss, p_win
                )));
            }
            Ok(p_win)
        })
        .collect()
}

/// Trivial model: 50/50 for every match-up
#[derive(Debug, Clone, Copy, Default)]
pub struct FiftyFiftyModel;

impl ProbabilityModel for FiftyFiftyModel {
    fn predict_proba(&self, batch: &[Observation]) -> Result<Vec<[f64; 2]>> {
        Ok(vec![[0.5, 0.5]; batch.len()])
    }

    fn name(&self) -> &str {
        "fifty-fifty"
    }
}

/// Heuristic on seed positions: each seed line is worth `spread / 15`.
///
/// Seeds must all come from the same season.
#[derive(Debug, Clone)]
pub struct SeedsBasedModel {
    positions: HashMap<TeamId, u8>,
    spread: f64,
}

impl SeedsBasedModel {
    pub fn new<'a>(seeds: impl IntoIterator<Item = &'a Seed>, spread: f64) -> Self {
        SeedsBasedModel {
            positions: seeds.into_iter().map(|s| (s.team, s.position)).collect(),
            spread,
        }
    }

    fn position(&self, season: u16, team: TeamId) -> Result<f64> {
        self.positions
            .get(&team)
            .map(|&p| p as f64)
            .ok_or(MadnessError::UnknownTeam { season, team })
    }
}

impl ProbabilityModel for SeedsBasedModel {
    fn predict_proba(&self, batch: &[Observation]) -> Result<Vec<[f64; 2]>> {
        batch
            .iter()
            .map(|o| {
                let seed_1 = self.position(o.season(), o.team_1())?;
                let seed_2 = self.position(o.season(), o.team_2())?;
                let p_win = 0.5 + (seed_2 - seed_1) * (self.spread / 15.0);
                Ok([1.0 - p_win, p_win])
            })
            .collect()
    }

    fn name(&self) -> &str {
        "seeds"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::Label;
    use crate::Region;

    fn observation(a: u32, b: u32) -> Observation {
        Observation::new(2021, TeamId(a), TeamId(b), vec![], Label::Unknown).unwrap()
    }

    fn seed(team: u32, position: u8) -> Seed {
        Seed {
            season: 2021,
            region: Region::W,
            position,
            team: TeamId(team),
        }
    }

    #[test]
    fn test_fifty_fifty() {
        let batch = vec![observation(1, 2), observation(1, 3)];
        let rows = FiftyFiftyModel.predict_proba(&batch).unwrap();
        assert_eq!(rows, vec![[0.5, 0.5], [0.5, 0.5]]);
    }

    #[test]
    fn test_seeds_based() {
        let seeds = vec![seed(1, 1), seed(2, 16), seed(3, 1)];
        let model = SeedsBasedModel::new(&seeds, 0.4);
        let rows = model
            .predict_proba(&[observation(1, 2), observation(1, 3)])
            .unwrap();

        assert!((rows[0][1] - 0.9).abs() < 1e-12);
        assert!((rows[0][0] - 0.1).abs() < 1e-12);
        assert_eq!(rows[1], [0.5, 0.5]);

        assert!(model.predict_proba(&[observation(1, 9)]).is_err());
    }

    #[test]
    fn test_win_probabilities_checks_contract() {
        assert_eq!(win_probabilities(&[[0.3, 0.7]], 1).unwrap(), vec![0.7]);
        assert!(win_probabilities(&[[0.3, 0.7]], 2).is_err());
        assert!(win_probabilities(&[[0.3, 0.3]], 1).is_err());
        assert!(win_probabilities(&[[-0.5, 1.5]], 1).is_err());
    }
}
