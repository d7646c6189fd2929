//! College basketball tournament prediction
//!
//! Turns regular-season game logs and tournament seeds into symmetric match-up
//! feature vectors, and scores win-probability predictions with log loss.

pub mod data;
pub mod features;
pub mod predict;
pub mod training;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unique identifier for a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub u32);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A division 1 team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub first_d1_season: u16,
    pub last_d1_season: u16,
}

/// Where a game was played, from the winner's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    Home,
    Away,
    Neutral,
}

impl Location {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "H" => Some(Location::Home),
            "A" => Some(Location::Away),
            "N" => Some(Location::Neutral),
            _ => None,
        }
    }
}

/// Raw box-score counters for one side of a game
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxScore {
    /// Field goals attempted
    pub fga: u16,
    /// Free throws attempted
    pub fta: u16,
    /// Offensive rebounds
    pub offensive_rebounds: u16,
    /// Turnovers
    pub turnovers: u16,
}

impl BoxScore {
    /// Estimated possessions used by this side
    pub fn possessions(&self) -> f64 {
        self.fga as f64 - self.offensive_rebounds as f64 + self.turnovers as f64
            + 0.475 * self.fta as f64
    }

    /// Points per possession, 1.0 when the possession estimate is exactly zero
    pub fn offensive_efficiency(&self, score: u16) -> f64 {
        let possessions = self.possessions();
        if possessions == 0.0 {
            1.0
        } else {
            score as f64 / possessions
        }
    }
}

/// Canonical identifier of a pairing inside one season's tournament.
///
/// Always stores the smaller team id first, so both directions of a game map
/// to the same key. Not meaningful across seasons, nor between the regular
/// season and the tournament of a same season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchUpKey {
    low: TeamId,
    high: TeamId,
}

impl MatchUpKey {
    pub fn new(a: TeamId, b: TeamId) -> Self {
        if a <= b {
            MatchUpKey { low: a, high: b }
        } else {
            MatchUpKey { low: b, high: a }
        }
    }

    pub fn low(&self) -> TeamId {
        self.low
    }

    pub fn high(&self) -> TeamId {
        self.high
    }
}

impl fmt::Display for MatchUpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.low, self.high)
    }
}

/// One completed game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub season: u16,
    pub day_num: u16,
    pub w_team: TeamId,
    pub w_score: u16,
    pub l_team: TeamId,
    pub l_score: u16,
    pub w_loc: Location,
    pub num_ot: u8,
    pub w_box: Option<BoxScore>,
    pub l_box: Option<BoxScore>,
}

impl Game {
    pub fn is_team_with_smaller_id_winner(&self) -> bool {
        self.w_team < self.l_team
    }

    pub fn key(&self) -> MatchUpKey {
        MatchUpKey::new(self.w_team, self.l_team)
    }

    /// 1 if the team with the smaller id won, else 0
    pub fn outcome(&self) -> u8 {
        if self.is_team_with_smaller_id_winner() {
            1
        } else {
            0
        }
    }

    /// Winning margin, always positive
    pub fn margin(&self) -> i32 {
        self.w_score as i32 - self.l_score as i32
    }

    /// Winner's efficiency minus loser's, when both box scores are known
    pub fn net_efficiency(&self) -> Option<f64> {
        match (self.w_box, self.l_box) {
            (Some(w), Some(l)) => {
                Some(w.offensive_efficiency(self.w_score) - l.offensive_efficiency(self.l_score))
            }
            _ => None,
        }
    }
}

/// Bracket region, by its letter in the seed code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    W,
    X,
    Y,
    Z,
}

impl Region {
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'W' => Some(Region::W),
            'X' => Some(Region::X),
            'Y' => Some(Region::Y),
            'Z' => Some(Region::Z),
            _ => None,
        }
    }

    /// Region winners of the same half meet in the national semifinal
    pub fn half(&self) -> u8 {
        match self {
            Region::W | Region::X => 0,
            Region::Y | Region::Z => 1,
        }
    }
}

/// A team's tournament entry for one year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seed {
    pub season: u16,
    pub region: Region,
    pub position: u8,
    pub team: TeamId,
}

impl Seed {
    /// Parse a seed code such as `W01` or `X16a` (play-in suffix is dropped)
    pub fn parse(season: u16, code: &str, team: TeamId) -> Result<Self> {
        let mut chars = code.chars();
        let region = chars
            .next()
            .and_then(Region::from_letter)
            .ok_or_else(|| MadnessError::Parse(format!("Invalid seed region in '{}'", code)))?;
        let digits: String = chars.take_while(|c| c.is_ascii_digit()).collect();
        let position: u8 = digits
            .parse()
            .map_err(|_| MadnessError::Parse(format!("Invalid seed position in '{}'", code)))?;
        if !(1..=16).contains(&position) {
            return Err(MadnessError::Parse(format!(
                "Seed position out of range in '{}'",
                code
            )));
        }
        Ok(Seed {
            season,
            region,
            position,
            team,
        })
    }
}

/// One ranking-system ordinal for a team on a given day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ranking {
    pub season: u16,
    pub day_num: u16,
    pub system: String,
    pub team: TeamId,
    pub rank: u16,
}

/// A potential match-up of team_1 vs. team_2. No rule on the ids' order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchUp {
    pub team_1: TeamId,
    pub team_2: TeamId,
}

impl MatchUp {
    pub fn new(team_1: TeamId, team_2: TeamId) -> Self {
        MatchUp { team_1, team_2 }
    }

    /// Same pairing with the roles exchanged
    pub fn swapped(&self) -> Self {
        MatchUp {
            team_1: self.team_2,
            team_2: self.team_1,
        }
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum MadnessError {
    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Team {team} has no rank in system '{system}' for season {season}")]
    MissingRanking {
        season: u16,
        system: String,
        team: TeamId,
    },

    #[error("Team {team} is not part of the {season} tournament")]
    UnknownTeam { season: u16, team: TeamId },

    #[error("Season {0} has no regular-season games between qualified teams")]
    DegenerateSeason(u16),

    #[error("No season loaded for year {0}")]
    MissingSeason(u16),

    #[error("Invalid model output: {0}")]
    ModelOutput(String),

    #[error("No played tournament game to score in span")]
    NothingToScore,

    #[error("Training error: {0}")]
    Training(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, MadnessError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub features: FeatureConfig,
    pub scoring: ScoringConfig,
    pub training: TrainingConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Name of the feature set fed to models ("standard" or "extended")
    pub set: String,
    /// Ranking system used for the ranking difference feature
    pub ranking_system: String,
    /// First season with ranking data
    pub ranking_first_season: u16,
    /// Seed difference multiplier used when a season has no ranking data
    pub ranking_proxy_scale: f64,
    pub location_credits: LocationCredits,
}

/// Win credit by game location, used for adjusted win percentage
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocationCredits {
    pub home: f64,
    pub away: f64,
    pub neutral: f64,
}

impl LocationCredits {
    pub fn credit(&self, location: Location) -> f64 {
        match location {
            Location::Home => self.home,
            Location::Away => self.away,
            Location::Neutral => self.neutral,
        }
    }
}

impl Default for LocationCredits {
    fn default() -> Self {
        LocationCredits {
            home: 0.6,
            away: 1.4,
            neutral: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Spread of the seeds based heuristic
    pub seeds_spread: f64,
    /// Seasons never included in a span (cancelled tournaments)
    pub excluded_seasons: Vec<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub epochs: usize,
    /// SGD step of the logistic model
    pub learning_rate: f64,
    /// Adam step of the MLP
    pub mlp_learning_rate: f64,
    /// L2 penalty of the MLP
    pub weight_decay: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub data_dir: String,
    /// Fitted models are saved here as `<model>.json`
    pub model_dir: String,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        FeatureConfig {
            set: "standard".to_string(),
            ranking_system: "POM".to_string(),
            ranking_first_season: 2003,
            ranking_proxy_scale: 4.0,
            location_credits: LocationCredits::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            features: FeatureConfig::default(),
            scoring: ScoringConfig {
                seeds_spread: 0.4,
                excluded_seasons: vec![2020],
            },
            training: TrainingConfig {
                epochs: 1000,
                learning_rate: 0.1,
                mlp_learning_rate: 0.01,
                weight_decay: 1e-4,
            },
            data: DataConfig {
                data_dir: "resources".to_string(),
                model_dir: "model".to_string(),
            },
        }
    }
}

impl Config {
    /// Read a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MadnessError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| MadnessError::Config(format!("invalid {}: {}", path.display(), e)))
    }

    /// The file at `path` if it exists, otherwise defaults; `data_dir` wins over both
    pub fn resolve(path: impl AsRef<Path>, data_dir: Option<String>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Config::default()
        };
        if let Some(dir) = data_dir {
            config.data.data_dir = dir;
        }
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MadnessError::Config(format!("cannot serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Where a model named `name` is saved
    pub fn model_path(&self, name: &str) -> PathBuf {
        Path::new(&self.data.model_dir).join(format!("{}.json", name))
    }
}
