//! Spans of seasons
//!
//! A span wraps a range of seasons, usually consecutive. The common use is two
//! spans: one to learn how regular-season statistics relate to tournament
//! outcomes, and a second one, over other years, to score those predictions.
//!
//! Training and testing spans must not overlap: a model fitted on a season and
//! scored on it again is biased. `check_disjoint` reports overlaps but nothing
//! here enforces it.

use crate::data::sample::{ScoredPrediction, TrainingCorpus};
use crate::data::season::Season;
use crate::features::FeatureSet;
use crate::predict::classifier::win_probabilities;
use crate::predict::{FiftyFiftyModel, ProbabilityModel, SeedsBasedModel};
use crate::training::metrics::{SeasonScore, SpanScores};
use crate::{MadnessError, Result};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Predictions of each season, by year
pub type SpanPredictions = BTreeMap<u16, Vec<ScoredPrediction>>;

/// Per-season models, by year
pub type SeasonModels = HashMap<u16, Box<dyn ProbabilityModel>>;

static FIFTY_FIFTY: FiftyFiftyModel = FiftyFiftyModel;

#[derive(Debug, Clone)]
pub struct Span {
    seasons: Vec<Arc<Season>>,
}

impl Span {
    pub fn new(seasons: Vec<Arc<Season>>) -> Self {
        Span { seasons }
    }

    /// Seasons `start..=end`, skipping `excluded` years
    pub fn from_years(
        seasons: &BTreeMap<u16, Arc<Season>>,
        start: u16,
        end: u16,
        excluded: &[u16],
    ) -> Result<Self> {
        let mut selected = Vec::new();
        for year in start..=end {
            if excluded.contains(&year) {
                continue;
            }
            let season = seasons.get(&year).ok_or(MadnessError::MissingSeason(year))?;
            selected.push(Arc::clone(season));
        }
        Ok(Span::new(selected))
    }

    pub fn seasons(&self) -> &[Arc<Season>] {
        &self.seasons
    }

    pub fn years(&self) -> Vec<u16> {
        self.seasons.iter().map(|s| s.year()).collect()
    }

    pub fn len(&self) -> usize {
        self.seasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seasons.is_empty()
    }

    /// Fails when both spans contain a same year
    pub fn check_disjoint(&self, other: &Span) -> Result<()> {
        let other_years = other.years();
        let shared: Vec<u16> = self
            .years()
            .into_iter()
            .filter(|y| other_years.contains(y))
            .collect();
        if shared.is_empty() {
            Ok(())
        } else {
            Err(MadnessError::Config(format!(
                "training and testing spans overlap on {:?}",
                shared
            )))
        }
    }

    /// Every season's labelled examples, concatenated in season order
    pub fn training_corpus(&self, set: &FeatureSet) -> Result<TrainingCorpus> {
        let mut corpus = TrainingCorpus::new();
        for season in &self.seasons {
            corpus.append(season.training_corpus(set)?);
        }
        log::info!(
            "Training corpus: {} samples from {} seasons, features {}",
            corpus.len(),
            self.seasons.len(),
            set
        );
        Ok(corpus)
    }

    /// Predict every match-up of every season with the same model
    pub fn predict(&self, model: &dyn ProbabilityModel, set: &FeatureSet) -> Result<SpanPredictions> {
        self.seasons
            .par_iter()
            .map(|season| -> Result<(u16, Vec<ScoredPrediction>)> {
                Ok((season.year(), predict_season(season, model, set)?))
            })
            .collect()
    }

    /// Predict each season with its own model; seasons without one get 50/50
    pub fn predict_per_season(
        &self,
        models: &SeasonModels,
        set: &FeatureSet,
    ) -> Result<SpanPredictions> {
        self.seasons
            .par_iter()
            .map(|season| -> Result<(u16, Vec<ScoredPrediction>)> {
                let model: &dyn ProbabilityModel = match models.get(&season.year()) {
                    Some(model) => model.as_ref(),
                    None => &FIFTY_FIFTY,
                };
                Ok((season.year(), predict_season(season, model, set)?))
            })
            .collect()
    }

    /// A seeds based model per season
    pub fn seeds_based_models(&self, spread: f64) -> SeasonModels {
        self.seasons
            .iter()
            .map(|season| {
                let model = SeedsBasedModel::new(season.tournament().seeds().values(), spread);
                (season.year(), Box::new(model) as Box<dyn ProbabilityModel>)
            })
            .collect()
    }

    /// Mean log loss per season over played games, and the mean of those means
    pub fn score(predictions: &SpanPredictions) -> Result<SpanScores> {
        let mut seasons = BTreeMap::new();
        for (&year, season_predictions) in predictions {
            match SeasonScore::from_predictions(season_predictions) {
                Some(score) => {
                    log::info!("Season {} log loss: {:.5}", year, score.log_loss);
                    seasons.insert(year, score);
                }
                None => log::warn!("Season {} has no played tournament game, skipped", year),
            }
        }
        let scores = SpanScores::from_seasons(seasons).ok_or(MadnessError::NothingToScore)?;
        log::info!("Span log loss: {:.5}", scores.average);
        Ok(scores)
    }
}

/// One batched model call over all of a season's match-ups
fn predict_season(
    season: &Season,
    model: &dyn ProbabilityModel,
    set: &FeatureSet,
) -> Result<Vec<ScoredPrediction>> {
    let observations = season.observations(set)?;
    let rows = model.predict_proba(&observations)?;
    let probabilities = win_probabilities(&rows, observations.len())?;

    log::debug!(
        "Season {}: {} match-ups predicted with {}",
        season.year(),
        observations.len(),
        model.name()
    );

    Ok(observations
        .into_iter()
        .zip(probabilities)
        .map(|(observation, p)| observation.score(p))
        .collect())
}
