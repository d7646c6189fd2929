//! Regular-season team statistics
//!
//! Per-team averages over the regular-season games played between two
//! tournament-qualified teams. Games against non-qualified opponents are
//! ignored.

use crate::features::Feature;
use crate::{Game, LocationCredits, MadnessError, MatchUp, Result, TeamId};
use std::collections::{HashMap, HashSet};

/// Running totals for one team
#[derive(Debug, Clone, Default)]
pub struct TeamTotals {
    /// Games played against qualified opponents
    pub games_played: usize,
    /// Games won
    pub games_won: usize,
    /// Total points scored
    pub points_scored: u32,
    /// Total points allowed
    pub points_allowed: u32,
    /// Sum of signed margins
    pub score_gap: i64,
    /// Sum of location-adjusted win credits
    pub adjusted_wins: f64,
    /// Sum of per-game net offensive efficiency
    pub net_efficiency: f64,
    /// Games that carried a box score on both sides
    pub efficiency_games: usize,
}

impl TeamTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update totals with a game this team took part in
    pub fn update(&mut self, game: &Game, team: TeamId, credits: &LocationCredits) {
        let won = game.w_team == team;
        let credit = credits.credit(game.w_loc);

        let (scored, allowed) = if won {
            (game.w_score, game.l_score)
        } else {
            (game.l_score, game.w_score)
        };
        let margin = game.margin() as i64;

        self.games_played += 1;
        self.points_scored += scored as u32;
        self.points_allowed += allowed as u32;
        self.score_gap += if won { margin } else { -margin };

        if won {
            self.games_won += 1;
            self.adjusted_wins += credit;
        } else {
            self.adjusted_wins -= credit;
        }

        if let Some(net) = game.net_efficiency() {
            self.net_efficiency += if won { net } else { -net };
            self.efficiency_games += 1;
        }
    }

    pub fn avg_points_scored(&self) -> f64 {
        self.points_scored as f64 / self.games_played as f64
    }

    pub fn avg_points_allowed(&self) -> f64 {
        self.points_allowed as f64 / self.games_played as f64
    }

    pub fn win_ratio(&self) -> f64 {
        self.games_won as f64 / self.games_played as f64
    }

    pub fn avg_score_gap(&self) -> f64 {
        self.score_gap as f64 / self.games_played as f64
    }

    pub fn adjusted_win_percentage(&self) -> f64 {
        self.adjusted_wins / self.games_played as f64
    }

    pub fn avg_net_efficiency(&self) -> Option<f64> {
        if self.efficiency_games == 0 {
            None
        } else {
            Some(self.net_efficiency / self.efficiency_games as f64)
        }
    }
}

/// One per-team metric with its cross-team fallback.
///
/// `fallback` is the mean of `values`, computed once when the metric is built.
/// Teams without a value read the fallback.
#[derive(Debug, Clone)]
pub struct TeamMetric {
    values: HashMap<TeamId, f64>,
    fallback: f64,
}

impl TeamMetric {
    /// Build from per-team values; `default` is used when no team has a value
    pub fn from_values(values: HashMap<TeamId, f64>, default: f64) -> Self {
        let fallback = if values.is_empty() {
            default
        } else {
            values.values().sum::<f64>() / values.len() as f64
        };
        TeamMetric { values, fallback }
    }

    pub fn get(&self, team: TeamId) -> f64 {
        self.values.get(&team).copied().unwrap_or(self.fallback)
    }

    /// Value given to teams without data
    pub fn fallback(&self) -> f64 {
        self.fallback
    }

    pub fn has_value(&self, team: TeamId) -> bool {
        self.values.contains_key(&team)
    }

    fn absolute(&self, match_up: &MatchUp) -> Feature {
        Feature::absolute(self.get(match_up.team_1), self.get(match_up.team_2))
    }

    fn between(&self, match_up: &MatchUp) -> Feature {
        Feature::between(self.get(match_up.team_1), self.get(match_up.team_2))
    }
}

/// Aggregated regular-season metrics for one season
#[derive(Debug, Clone)]
pub struct RegularSeason {
    season: u16,
    qualifying_games: usize,
    points_allowed: TeamMetric,
    points_scored: TeamMetric,
    win_ratio: TeamMetric,
    score_gap: TeamMetric,
    adjusted_win_percentage: TeamMetric,
    net_efficiency: TeamMetric,
}

impl RegularSeason {
    /// Aggregate every game between two qualified teams.
    ///
    /// Fails when no qualified team played a qualifying game.
    pub fn new(
        season: u16,
        games: &[Game],
        qualified: &HashSet<TeamId>,
        credits: &LocationCredits,
    ) -> Result<Self> {
        let mut totals: HashMap<TeamId, TeamTotals> = HashMap::new();
        let mut qualifying_games = 0;

        for game in games {
            if !qualified.contains(&game.w_team) || !qualified.contains(&game.l_team) {
                continue;
            }
            qualifying_games += 1;

            totals
                .entry(game.w_team)
                .or_default()
                .update(game, game.w_team, credits);
            totals
                .entry(game.l_team)
                .or_default()
                .update(game, game.l_team, credits);
        }

        if totals.is_empty() {
            return Err(MadnessError::DegenerateSeason(season));
        }

        let metric = |f: fn(&TeamTotals) -> f64| {
            let values = totals.iter().map(|(team, t)| (*team, f(t))).collect();
            TeamMetric::from_values(values, 0.0)
        };

        let efficiencies = totals
            .iter()
            .filter_map(|(team, t)| t.avg_net_efficiency().map(|e| (*team, e)))
            .collect();

        let regular_season = RegularSeason {
            season,
            qualifying_games,
            points_allowed: metric(TeamTotals::avg_points_allowed),
            points_scored: metric(TeamTotals::avg_points_scored),
            win_ratio: metric(TeamTotals::win_ratio),
            score_gap: metric(TeamTotals::avg_score_gap),
            adjusted_win_percentage: metric(TeamTotals::adjusted_win_percentage),
            net_efficiency: TeamMetric::from_values(efficiencies, 0.0),
        };

        log::debug!(
            "Season {}: {} qualifying regular-season games, {} of {} qualified teams with data",
            season,
            qualifying_games,
            totals.len(),
            qualified.len()
        );

        Ok(regular_season)
    }

    pub fn season(&self) -> u16 {
        self.season
    }

    /// Number of games where both teams were qualified
    pub fn qualifying_games(&self) -> usize {
        self.qualifying_games
    }

    pub fn points_allowed(&self) -> &TeamMetric {
        &self.points_allowed
    }

    pub fn points_scored(&self) -> &TeamMetric {
        &self.points_scored
    }

    pub fn win_ratio(&self) -> &TeamMetric {
        &self.win_ratio
    }

    pub fn score_gap(&self) -> &TeamMetric {
        &self.score_gap
    }

    pub fn adjusted_win_percentage(&self) -> &TeamMetric {
        &self.adjusted_win_percentage
    }

    pub fn net_efficiency(&self) -> &TeamMetric {
        &self.net_efficiency
    }

    pub fn get_points_allowed(&self, match_up: &MatchUp) -> Feature {
        self.points_allowed.absolute(match_up)
    }

    pub fn get_points_allowed_diff(&self, match_up: &MatchUp) -> Feature {
        self.points_allowed.between(match_up)
    }

    pub fn get_points_scored(&self, match_up: &MatchUp) -> Feature {
        self.points_scored.absolute(match_up)
    }

    pub fn get_points_scored_diff(&self, match_up: &MatchUp) -> Feature {
        self.points_scored.between(match_up)
    }

    pub fn get_win_ratio(&self, match_up: &MatchUp) -> Feature {
        self.win_ratio.absolute(match_up)
    }

    pub fn get_win_ratio_diff(&self, match_up: &MatchUp) -> Feature {
        self.win_ratio.between(match_up)
    }

    pub fn get_score_gap(&self, match_up: &MatchUp) -> Feature {
        self.score_gap.absolute(match_up)
    }

    pub fn get_score_gap_diff(&self, match_up: &MatchUp) -> Feature {
        self.score_gap.between(match_up)
    }

    pub fn get_adjusted_win_percentage(&self, match_up: &MatchUp) -> Feature {
        self.adjusted_win_percentage.absolute(match_up)
    }

    pub fn get_adjusted_win_percentage_diff(&self, match_up: &MatchUp) -> Feature {
        self.adjusted_win_percentage.between(match_up)
    }

    pub fn get_net_efficiency(&self, match_up: &MatchUp) -> Feature {
        self.net_efficiency.absolute(match_up)
    }

    pub fn get_net_efficiency_diff(&self, match_up: &MatchUp) -> Feature {
        self.net_efficiency.between(match_up)
    }
}
