//! Tournament field, seeds and outcomes
//!
//! Indexes one season's tournament for O(1) match-up queries.

use crate::data::sample::Label;
use crate::features::Feature;
use crate::{
    FeatureConfig, Game, MadnessError, MatchUp, MatchUpKey, Ranking, Result, Seed, TeamId,
};
use std::collections::HashMap;

/// Last day number of the regular season; rankings after it are ignored
pub const LAST_RANKING_DAY: u16 = 133;

/// One NCAA tournament: initial seeds, rankings and the games played
#[derive(Debug, Clone)]
pub struct Tournament {
    season: u16,
    games: Vec<Game>,
    /// Qualified team ids, sorted ascending
    field: Vec<TeamId>,
    seeds: HashMap<TeamId, Seed>,
    /// Rank by system name, then team; `None` before the ranking cutoff season
    rankings: Option<HashMap<String, HashMap<TeamId, u16>>>,
    outcomes: HashMap<MatchUpKey, u8>,
    ranking_proxy_scale: f64,
}

impl Tournament {
    pub fn new(
        season: u16,
        games: Vec<Game>,
        seeds: Vec<Seed>,
        rankings: &[Ranking],
        config: &FeatureConfig,
    ) -> Self {
        let mut field: Vec<TeamId> = seeds.iter().map(|s| s.team).collect();
        field.sort();
        field.dedup();

        let seeds: HashMap<TeamId, Seed> = seeds.into_iter().map(|s| (s.team, s)).collect();

        let outcomes = games.iter().map(|g| (g.key(), g.outcome())).collect();

        let rankings = if season < config.ranking_first_season {
            None
        } else {
            let indexed = Self::index_rankings(season, rankings);
            if indexed.is_empty() {
                log::warn!(
                    "Season {} has no ranking on or before day {}",
                    season,
                    LAST_RANKING_DAY
                );
            }
            Some(indexed)
        };

        Tournament {
            season,
            games,
            field,
            seeds,
            rankings,
            outcomes,
            ranking_proxy_scale: config.ranking_proxy_scale,
        }
    }

    /// Keep the latest pre-tournament rank of each team in each system
    fn index_rankings(
        season: u16,
        rankings: &[Ranking],
    ) -> HashMap<String, HashMap<TeamId, u16>> {
        let mut latest: HashMap<(&str, TeamId), (u16, u16)> = HashMap::new();
        for ranking in rankings {
            if ranking.season != season || ranking.day_num > LAST_RANKING_DAY {
                continue;
            }
            let entry = latest
                .entry((ranking.system.as_str(), ranking.team))
                .or_insert((ranking.day_num, ranking.rank));
            if ranking.day_num >= entry.0 {
                *entry = (ranking.day_num, ranking.rank);
            }
        }

        let mut by_system: HashMap<String, HashMap<TeamId, u16>> = HashMap::new();
        for ((system, team), (_, rank)) in latest {
            by_system
                .entry(system.to_string())
                .or_default()
                .insert(team, rank);
        }
        by_system
    }

    pub fn season(&self) -> u16 {
        self.season
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    /// Qualified teams in ascending id order
    pub fn field(&self) -> &[TeamId] {
        &self.field
    }

    pub fn seeds(&self) -> &HashMap<TeamId, Seed> {
        &self.seeds
    }

    /// Whether ranking features read real rankings rather than the seed proxy
    pub fn has_rankings(&self) -> bool {
        self.rankings.is_some()
    }

    pub fn seed(&self, team: TeamId) -> Result<&Seed> {
        self.seeds.get(&team).ok_or(MadnessError::UnknownTeam {
            season: self.season,
            team,
        })
    }

    fn seed_positions(&self, match_up: &MatchUp) -> Result<(f64, f64)> {
        Ok((
            self.seed(match_up.team_1)?.position as f64,
            self.seed(match_up.team_2)?.position as f64,
        ))
    }

    pub fn get_seeds_positions(&self, match_up: &MatchUp) -> Result<Feature> {
        let (seed_1, seed_2) = self.seed_positions(match_up)?;
        Ok(Feature::absolute(seed_1, seed_2))
    }

    pub fn get_seeds_diff(&self, match_up: &MatchUp) -> Result<Feature> {
        let (seed_1, seed_2) = self.seed_positions(match_up)?;
        Ok(Feature::between(seed_1, seed_2))
    }

    /// Rank difference in `system`.
    ///
    /// Seasons before the ranking cutoff use the seed difference scaled by
    /// `ranking_proxy_scale`. Later seasons need both teams ranked in `system`,
    /// even when no ranking was loaded at all.
    pub fn get_ranking_diff(&self, match_up: &MatchUp, system: &str) -> Result<Feature> {
        let Some(rankings) = &self.rankings else {
            let (seed_1, seed_2) = self.seed_positions(match_up)?;
            return Ok(Feature::Relative {
                value_1: (seed_1 - seed_2) * self.ranking_proxy_scale,
                value_2: (seed_2 - seed_1) * self.ranking_proxy_scale,
            });
        };

        let rank = |team: TeamId| -> Result<f64> {
            rankings
                .get(system)
                .and_then(|ranks| ranks.get(&team))
                .map(|&r| r as f64)
                .ok_or_else(|| MadnessError::MissingRanking {
                    season: self.season,
                    system: system.to_string(),
                    team,
                })
        };

        Ok(Feature::between(rank(match_up.team_1)?, rank(match_up.team_2)?))
    }

    /// How early two teams can meet: 2 same region, 1 same half, 0 only in the final.
    /// Ordinal, not a distance.
    pub fn get_bracket_positions(&self, match_up: &MatchUp) -> Result<Feature> {
        let region_1 = self.seed(match_up.team_1)?.region;
        let region_2 = self.seed(match_up.team_2)?.region;

        let proximity = if region_1 == region_2 {
            2.0
        } else if region_1.half() == region_2.half() {
            1.0
        } else {
            0.0
        };
        Ok(Feature::symmetric(proximity))
    }

    /// Outcome of team_1 vs. team_2 in this tournament.
    ///
    /// Requires `team_1 < team_2`; pairings that never happened are `Unknown`.
    pub fn get_expected_outcome(&self, team_1: TeamId, team_2: TeamId) -> Result<Label> {
        if team_1 >= team_2 {
            return Err(MadnessError::Precondition(format!(
                "expected outcome requires team_1 < team_2, got {} vs. {}",
                team_1, team_2
            )));
        }
        Ok(match self.outcomes.get(&MatchUpKey::new(team_1, team_2)) {
            Some(1) => Label::Won,
            Some(_) => Label::Lost,
            None => Label::Unknown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Location, Region};

    fn seed(team: u32, region: Region, position: u8) -> Seed {
        Seed {
            season: 2019,
            region,
            position,
            team: TeamId(team),
        }
    }

    fn final_game(w: u32, l: u32) -> Game {
        Game {
            season: 2019,
            day_num: 154,
            w_team: TeamId(w),
            w_score: 77,
            l_team: TeamId(l),
            l_score: 70,
            w_loc: Location::Neutral,
            num_ot: 0,
            w_box: None,
            l_box: None,
        }
    }

    fn ranking(team: u32, day_num: u16, rank: u16) -> Ranking {
        Ranking {
            season: 2019,
            day_num,
            system: "POM".to_string(),
            team: TeamId(team),
            rank,
        }
    }

    fn tournament(rankings: &[Ranking], season: u16) -> Tournament {
        Tournament::new(
            season,
            vec![final_game(30, 10)],
            vec![
                seed(30, Region::W, 1),
                seed(10, Region::Y, 3),
                seed(20, Region::W, 16),
                seed(40, Region::X, 8),
            ],
            rankings,
            &FeatureConfig::default(),
        )
    }

    #[test]
    fn test_field_is_sorted() {
        let t = tournament(&[], 2019);
        assert_eq!(t.field(), &[TeamId(10), TeamId(20), TeamId(30), TeamId(40)]);
    }

    #[test]
    fn test_expected_outcome() {
        let t = tournament(&[], 2019);
        assert_eq!(t.get_expected_outcome(TeamId(10), TeamId(30)).unwrap(), Label::Lost);
        assert_eq!(t.get_expected_outcome(TeamId(10), TeamId(20)).unwrap(), Label::Unknown);
        assert!(matches!(
            t.get_expected_outcome(TeamId(30), TeamId(10)),
            Err(MadnessError::Precondition(_))
        ));
    }

    #[test]
    fn test_seeds_features() {
        let t = tournament(&[], 2019);
        let match_up = MatchUp::new(TeamId(30), TeamId(20));
        assert_eq!(t.get_seeds_positions(&match_up).unwrap().vision_1(), vec![1.0, 16.0]);
        assert_eq!(t.get_seeds_diff(&match_up).unwrap().vision_1(), vec![-15.0]);
        assert_eq!(t.get_seeds_diff(&match_up).unwrap().vision_2(), vec![15.0]);

        let unknown = MatchUp::new(TeamId(30), TeamId(99));
        assert!(matches!(
            t.get_seeds_positions(&unknown),
            Err(MadnessError::UnknownTeam { .. })
        ));
    }

    #[test]
    fn test_ranking_proxy_before_cutoff() {
        let t = tournament(&[], 1999);
        assert!(!t.has_rankings());
        let match_up = MatchUp::new(TeamId(30), TeamId(10));
        let feature = t.get_ranking_diff(&match_up, "POM").unwrap();
        assert_eq!(feature.vision_1(), vec![-8.0]);
        assert_eq!(feature.vision_2(), vec![8.0]);
    }

    #[test]
    fn test_ranking_diff_uses_latest_pre_tournament_rank() {
        let rankings = vec![
            ranking(30, 100, 9),
            ranking(30, 133, 2),
            ranking(30, 140, 50),
            ranking(10, 128, 12),
        ];
        let t = tournament(&rankings, 2019);
        assert!(t.has_rankings());
        let match_up = MatchUp::new(TeamId(30), TeamId(10));
        assert_eq!(t.get_ranking_diff(&match_up, "POM").unwrap().vision_1(), vec![-10.0]);
    }

    #[test]
    fn test_ranking_diff_missing_team_fails() {
        let t = tournament(&[ranking(30, 133, 2)], 2019);
        let match_up = MatchUp::new(TeamId(30), TeamId(10));
        assert!(matches!(
            t.get_ranking_diff(&match_up, "POM"),
            Err(MadnessError::MissingRanking { team: TeamId(10), .. })
        ));
        assert!(t.get_ranking_diff(&match_up, "SAG").is_err());
    }

    #[test]
    fn test_no_rankings_after_cutoff_fails() {
        let t = tournament(&[], 2019);
        assert!(t.has_rankings());
        let match_up = MatchUp::new(TeamId(30), TeamId(10));
        assert!(matches!(
            t.get_ranking_diff(&match_up, "POM"),
            Err(MadnessError::MissingRanking { season: 2019, .. })
        ));
    }

    #[test]
    fn test_only_late_rankings_after_cutoff_fails() {
        let t = tournament(&[ranking(30, 140, 1), ranking(10, 150, 4)], 2019);
        let match_up = MatchUp::new(TeamId(30), TeamId(10));
        assert!(matches!(
            t.get_ranking_diff(&match_up, "POM"),
            Err(MadnessError::MissingRanking { .. })
        ));
    }

    #[test]
    fn test_bracket_positions() {
        let t = tournament(&[], 2019);
        let same_region = MatchUp::new(TeamId(30), TeamId(20));
        let same_half = MatchUp::new(TeamId(30), TeamId(40));
        let opposite = MatchUp::new(TeamId(30), TeamId(10));
        assert_eq!(t.get_bracket_positions(&same_region).unwrap().vision_1(), vec![2.0]);
        assert_eq!(t.get_bracket_positions(&same_half).unwrap().vision_1(), vec![1.0]);
        assert_eq!(t.get_bracket_positions(&opposite).unwrap().vision_2(), vec![0.0]);
    }
}
