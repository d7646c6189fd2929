//! CSV ingestion
//!
//! Reads the Kaggle "March Machine Learning Mania" files and builds one
//! `Season` per year. Box scores and rankings are optional files.

use crate::data::season::{Season, SeasonInput, TeamRegistry};
use crate::{
    BoxScore, FeatureConfig, Game, Location, MadnessError, Ranking, Region, Result, Seed, Team,
    TeamId,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const TEAMS_FILE: &str = "MTeams.csv";
pub const SEASONS_FILE: &str = "MSeasons.csv";
pub const REGULAR_SEASON_FILE: &str = "MRegularSeasonCompactResults.csv";
pub const REGULAR_SEASON_DETAILED_FILE: &str = "MRegularSeasonDetailedResults.csv";
pub const TOURNAMENT_FILE: &str = "MNCAATourneyCompactResults.csv";
pub const SEEDS_FILE: &str = "MNCAATourneySeeds.csv";
pub const RANKINGS_FILE: &str = "MMasseyOrdinals.csv";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TeamRow {
    #[serde(rename = "TeamID")]
    team_id: u32,
    team_name: String,
    #[serde(rename = "FirstD1Season")]
    first_d1_season: u16,
    #[serde(rename = "LastD1Season")]
    last_d1_season: u16,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SeasonRow {
    season: u16,
    day_zero: String,
    region_w: String,
    region_x: String,
    region_y: String,
    region_z: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CompactResultRow {
    season: u16,
    day_num: u16,
    #[serde(rename = "WTeamID")]
    w_team_id: u32,
    w_score: u16,
    #[serde(rename = "LTeamID")]
    l_team_id: u32,
    l_score: u16,
    #[serde(rename = "WLoc")]
    w_loc: String,
    #[serde(rename = "NumOT")]
    num_ot: u8,
}

/// Only the detailed columns the efficiency metric needs
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DetailedResultRow {
    season: u16,
    day_num: u16,
    #[serde(rename = "WTeamID")]
    w_team_id: u32,
    #[serde(rename = "LTeamID")]
    l_team_id: u32,
    #[serde(rename = "WFGA")]
    w_fga: u16,
    #[serde(rename = "WFTA")]
    w_fta: u16,
    #[serde(rename = "WOR")]
    w_or: u16,
    #[serde(rename = "WTO")]
    w_to: u16,
    #[serde(rename = "LFGA")]
    l_fga: u16,
    #[serde(rename = "LFTA")]
    l_fta: u16,
    #[serde(rename = "LOR")]
    l_or: u16,
    #[serde(rename = "LTO")]
    l_to: u16,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SeedRow {
    season: u16,
    seed: String,
    #[serde(rename = "TeamID")]
    team_id: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RankingRow {
    season: u16,
    ranking_day_num: u16,
    system_name: String,
    #[serde(rename = "TeamID")]
    team_id: u32,
    ordinal_rank: u16,
}

/// Identifies one game across the compact and detailed files
type GameKey = (u16, u16, u32, u32);

/// Loader over a directory of CSV files
pub struct Loader {
    dir: PathBuf,
    config: FeatureConfig,
}

impl Loader {
    pub fn new(dir: impl AsRef<Path>, config: &FeatureConfig) -> Self {
        Loader {
            dir: dir.as_ref().to_path_buf(),
            config: config.clone(),
        }
    }

    /// Load every season that has a tournament seed list
    pub fn load(&self) -> Result<BTreeMap<u16, Arc<Season>>> {
        let teams = Arc::new(self.load_teams()?);
        let box_scores = self.load_box_scores()?;
        let mut regular_games = group_by_season(self.load_games(REGULAR_SEASON_FILE)?);
        for game in regular_games.values_mut().flatten() {
            if let Some(&(w_box, l_box)) =
                box_scores.get(&(game.season, game.day_num, game.w_team.0, game.l_team.0))
            {
                game.w_box = Some(w_box);
                game.l_box = Some(l_box);
            }
        }
        let mut tournament_games = group_by_season(self.load_games(TOURNAMENT_FILE)?);
        let mut seeds = self.load_seeds()?;
        let mut rankings = self.load_rankings()?;

        let mut seasons = BTreeMap::new();
        for row in self.read_rows::<SeasonRow>(SEASONS_FILE)? {
            let year = row.season;
            let Some(season_seeds) = seeds.remove(&year) else {
                log::warn!("Season {} has no tournament seeds, skipped", year);
                continue;
            };

            let day_zero = NaiveDate::parse_from_str(&row.day_zero, "%m/%d/%Y").ok();
            if day_zero.is_none() {
                log::debug!("Season {}: unreadable DayZero '{}'", year, row.day_zero);
            }

            let regions = HashMap::from([
                (Region::W, row.region_w),
                (Region::X, row.region_x),
                (Region::Y, row.region_y),
                (Region::Z, row.region_z),
            ]);

            let input = SeasonInput {
                year,
                day_zero,
                regions,
                regular_season_games: regular_games.remove(&year).unwrap_or_default(),
                tournament_games: tournament_games.remove(&year).unwrap_or_default(),
                seeds: season_seeds,
                rankings: rankings.remove(&year).unwrap_or_default(),
            };

            let season = Season::new(input, Arc::clone(&teams), &self.config)?;
            seasons.insert(year, Arc::new(season));
        }

        log::info!(
            "Loaded {} seasons and {} teams from {}",
            seasons.len(),
            teams.len(),
            self.dir.display()
        );
        Ok(seasons)
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn read_rows<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let mut reader = csv::Reader::from_path(self.path(file))?;
        let rows = reader.deserialize().collect::<std::result::Result<Vec<T>, _>>()?;
        log::debug!("Processed {} rows from {}", rows.len(), file);
        Ok(rows)
    }

    fn load_teams(&self) -> Result<TeamRegistry> {
        Ok(self
            .read_rows::<TeamRow>(TEAMS_FILE)?
            .into_iter()
            .map(|row| {
                let team = Team {
                    id: TeamId(row.team_id),
                    name: row.team_name,
                    first_d1_season: row.first_d1_season,
                    last_d1_season: row.last_d1_season,
                };
                (team.id, team)
            })
            .collect())
    }

    fn load_games(&self, file: &str) -> Result<Vec<Game>> {
        self.read_rows::<CompactResultRow>(file)?
            .into_iter()
            .map(|row| {
                let w_loc = Location::from_code(&row.w_loc).ok_or_else(|| {
                    MadnessError::Parse(format!("Invalid location '{}' in {}", row.w_loc, file))
                })?;
                Ok(Game {
                    season: row.season,
                    day_num: row.day_num,
                    w_team: TeamId(row.w_team_id),
                    w_score: row.w_score,
                    l_team: TeamId(row.l_team_id),
                    l_score: row.l_score,
                    w_loc,
                    num_ot: row.num_ot,
                    w_box: None,
                    l_box: None,
                })
            })
            .collect()
    }

    fn load_box_scores(&self) -> Result<HashMap<GameKey, (BoxScore, BoxScore)>> {
        if !self.path(REGULAR_SEASON_DETAILED_FILE).exists() {
            log::info!("No {}, efficiency metrics disabled", REGULAR_SEASON_DETAILED_FILE);
            return Ok(HashMap::new());
        }
        Ok(self
            .read_rows::<DetailedResultRow>(REGULAR_SEASON_DETAILED_FILE)?
            .into_iter()
            .map(|row| {
                let w_box = BoxScore {
                    fga: row.w_fga,
                    fta: row.w_fta,
                    offensive_rebounds: row.w_or,
                    turnovers: row.w_to,
                };
                let l_box = BoxScore {
                    fga: row.l_fga,
                    fta: row.l_fta,
                    offensive_rebounds: row.l_or,
                    turnovers: row.l_to,
                };
                ((row.season, row.day_num, row.w_team_id, row.l_team_id), (w_box, l_box))
            })
            .collect())
    }

    fn load_seeds(&self) -> Result<HashMap<u16, Vec<Seed>>> {
        let mut seeds: HashMap<u16, Vec<Seed>> = HashMap::new();
        for row in self.read_rows::<SeedRow>(SEEDS_FILE)? {
            let seed = Seed::parse(row.season, &row.seed, TeamId(row.team_id))?;
            seeds.entry(row.season).or_default().push(seed);
        }
        Ok(seeds)
    }

    fn load_rankings(&self) -> Result<HashMap<u16, Vec<Ranking>>> {
        let mut rankings: HashMap<u16, Vec<Ranking>> = HashMap::new();
        if !self.path(RANKINGS_FILE).exists() {
            log::warn!(
                "No {}, ranking features only work before season {}",
                RANKINGS_FILE,
                self.config.ranking_first_season
            );
            return Ok(rankings);
        }
        for row in self.read_rows::<RankingRow>(RANKINGS_FILE)? {
            if row.season < self.config.ranking_first_season {
                continue;
            }
            rankings.entry(row.season).or_default().push(Ranking {
                season: row.season,
                day_num: row.ranking_day_num,
                system: row.system_name,
                team: TeamId(row.team_id),
                rank: row.ordinal_rank,
            });
        }
        Ok(rankings)
    }
}

fn group_by_season(games: Vec<Game>) -> HashMap<u16, Vec<Game>> {
    let mut grouped: HashMap<u16, Vec<Game>> = HashMap::new();
    for game in games {
        grouped.entry(game.season).or_default().push(game);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchUp;
    use std::fs;

    fn write(dir: &Path, file: &str, content: &str) {
        fs::write(dir.join(file), content).unwrap();
    }

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("madness_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        write(
            &dir,
            TEAMS_FILE,
            "TeamID,TeamName,FirstD1Season,LastD1Season\n\
             1101,Abilene Chr,2014,2024\n\
             1102,Air Force,1985,2024\n\
             1103,Akron,1985,2024\n\
             1104,Alabama,1985,2024\n",
        );
        write(
            &dir,
            SEASONS_FILE,
            "Season,DayZero,RegionW,RegionX,RegionY,RegionZ\n\
             2019,11/05/2018,East,West,Midwest,South\n\
             2020,11/04/2019,East,West,Midwest,South\n",
        );
        write(
            &dir,
            REGULAR_SEASON_FILE,
            "Season,DayNum,WTeamID,WScore,LTeamID,LScore,WLoc,NumOT\n\
             2019,10,1101,70,1102,60,H,0\n\
             2019,12,1103,80,1104,79,A,1\n\
             2020,10,1101,70,1102,60,N,0\n",
        );
        write(
            &dir,
            TOURNAMENT_FILE,
            "Season,DayNum,WTeamID,WScore,LTeamID,LScore,WLoc,NumOT\n\
             2019,136,1103,66,1101,60,N,0\n",
        );
        write(
            &dir,
            SEEDS_FILE,
            "Season,Seed,TeamID\n\
             2019,W01,1101\n\
             2019,X02,1102\n\
             2019,Y03,1103\n\
             2019,Z16a,1104\n",
        );
        dir
    }

    #[test]
    fn test_load_seasons() {
        let dir = fixture_dir("load");
        let seasons = Loader::new(&dir, &FeatureConfig::default()).load().unwrap();
        fs::remove_dir_all(&dir).unwrap();

        // 2020 has no seeds
        assert_eq!(seasons.keys().copied().collect::<Vec<_>>(), vec![2019]);

        let season = &seasons[&2019];
        assert_eq!(season.tournament().field().len(), 4);
        assert_eq!(season.tournament().games().len(), 1);
        assert_eq!(season.regular_season().qualifying_games(), 2);
        assert_eq!(season.team_name(TeamId(1104)), "Alabama");
        assert_eq!(season.region_name(Region::Y), Some("Midwest"));
        // No rankings file: later seasons must not fall back to seeds
        assert!(season.tournament().has_rankings());
        let match_up = MatchUp::new(TeamId(1101), TeamId(1103));
        assert!(matches!(
            season.tournament().get_ranking_diff(&match_up, "POM"),
            Err(MadnessError::MissingRanking { .. })
        ));
    }

    #[test]
    fn test_detailed_results_attach_box_scores() {
        let dir = fixture_dir("detailed");
        write(
            &dir,
            REGULAR_SEASON_DETAILED_FILE,
            "Season,DayNum,WTeamID,WScore,LTeamID,LScore,WLoc,NumOT,WFGM,WFGA,WFGM3,WFGA3,WFTM,WFTA,WOR,WDR,WAst,WTO,WStl,WBlk,WPF,LFGM,LFGA,LFGM3,LFGA3,LFTM,LFTA,LOR,LDR,LAst,LTO,LStl,LBlk,LPF\n\
             2019,10,1101,70,1102,60,H,0,25,50,5,15,15,20,10,25,12,12,5,3,18,22,55,4,14,12,16,8,22,10,14,6,2,20\n",
        );
        let seasons = Loader::new(&dir, &FeatureConfig::default()).load().unwrap();
        fs::remove_dir_all(&dir).unwrap();

        let efficiency = seasons[&2019].regular_season().net_efficiency().clone();
        assert!(efficiency.has_value(TeamId(1101)));
        assert!(efficiency.has_value(TeamId(1102)));
        assert!(!efficiency.has_value(TeamId(1103)));
        assert!(efficiency.get(TeamId(1101)) > 0.0);
    }
}
