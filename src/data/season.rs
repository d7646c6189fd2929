//! One season: regular-season statistics, tournament and team registry
//!
//! The unit at which features, labelled training data and match-up
//! observations are produced.

use crate::data::sample::{Label, Observation, TrainingCorpus};
use crate::features::{FeatureSet, MatchUpFeatures, RegularSeason, Tournament};
use crate::{
    FeatureConfig, Game, MatchUp, MatchUpKey, Ranking, Region, Result, Seed, Team, TeamId,
};
use chrono::{Days, NaiveDate};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Teams shared by every season
pub type TeamRegistry = HashMap<TeamId, Team>;

/// Raw records of one season, as handed over by ingestion
#[derive(Debug, Clone, Default)]
pub struct SeasonInput {
    pub year: u16,
    pub day_zero: Option<NaiveDate>,
    pub regions: HashMap<Region, String>,
    pub regular_season_games: Vec<Game>,
    pub tournament_games: Vec<Game>,
    pub seeds: Vec<Seed>,
    pub rankings: Vec<Ranking>,
}

#[derive(Debug, Clone)]
pub struct Season {
    year: u16,
    day_zero: Option<NaiveDate>,
    regions: HashMap<Region, String>,
    regular_season: RegularSeason,
    tournament: Tournament,
    teams: Arc<TeamRegistry>,
}

impl Season {
    pub fn new(input: SeasonInput, teams: Arc<TeamRegistry>, config: &FeatureConfig) -> Result<Self> {
        let qualified: HashSet<TeamId> = input.seeds.iter().map(|s| s.team).collect();

        let regular_season = RegularSeason::new(
            input.year,
            &input.regular_season_games,
            &qualified,
            &config.location_credits,
        )?;

        let tournament = Tournament::new(
            input.year,
            input.tournament_games,
            input.seeds,
            &input.rankings,
            config,
        );

        Ok(Season {
            year: input.year,
            day_zero: input.day_zero,
            regions: input.regions,
            regular_season,
            tournament,
            teams,
        })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn regular_season(&self) -> &RegularSeason {
        &self.regular_season
    }

    pub fn tournament(&self) -> &Tournament {
        &self.tournament
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(&id)
    }

    /// Team name, or its id when the registry doesn't know it
    pub fn team_name(&self, id: TeamId) -> String {
        self.team(id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn region_name(&self, region: Region) -> Option<&str> {
        self.regions.get(&region).map(String::as_str)
    }

    /// Calendar date of a day number
    pub fn date_of(&self, day_num: u16) -> Option<NaiveDate> {
        self.day_zero?.checked_add_days(Days::new(day_num as u64))
    }

    /// Tournament game between two teams, in either order
    pub fn tournament_game(&self, team_a: TeamId, team_b: TeamId) -> Option<&Game> {
        let key = MatchUpKey::new(team_a, team_b);
        self.tournament.games().iter().find(|g| g.key() == key)
    }

    /// Date the two teams met in the tournament, when they did and the season has a DayZero
    pub fn played_on(&self, team_a: TeamId, team_b: TeamId) -> Option<NaiveDate> {
        self.date_of(self.tournament_game(team_a, team_b)?.day_num)
    }

    /// Both visions of `match_up` for the given feature set
    pub fn features(&self, match_up: &MatchUp, set: &FeatureSet) -> Result<MatchUpFeatures> {
        set.compose(&self.regular_season, &self.tournament, match_up)
    }

    /// Every pairing of the field once, team_1 < team_2, with its tournament outcome
    pub fn observations(&self, set: &FeatureSet) -> Result<Vec<Observation>> {
        let field = self.tournament.field();
        let n = field.len();
        let mut observations = Vec::with_capacity(n * n.saturating_sub(1) / 2);

        for (i, &team_1) in field.iter().enumerate() {
            for &team_2 in &field[i + 1..] {
                let match_up = MatchUp::new(team_1, team_2);
                let features = self.features(&match_up, set)?;
                let label = self.tournament.get_expected_outcome(team_1, team_2)?;
                observations.push(Observation::new(
                    self.year,
                    team_1,
                    team_2,
                    features.vision_1,
                    label,
                )?);
            }
        }

        Ok(observations)
    }

    /// Two examples per tournament game played: the winner's vision labelled 1,
    /// the loser's labelled 0
    pub fn training_corpus(&self, set: &FeatureSet) -> Result<TrainingCorpus> {
        let mut corpus = TrainingCorpus::new();
        for game in self.tournament.games() {
            let match_up = MatchUp::new(game.w_team, game.l_team);
            let features = self.features(&match_up, set)?;
            corpus.push(features.vision_1, 1);
            corpus.push(features.vision_2, 0);
        }
        Ok(corpus)
    }

    pub fn label(&self, team_1: TeamId, team_2: TeamId) -> Result<Label> {
        self.tournament.get_expected_outcome(team_1, team_2)
    }
}
