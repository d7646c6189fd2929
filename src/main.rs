//! NCAA tournament prediction CLI
//!
//! Builds match-up features from Kaggle season files and scores win
//! probabilities on a testing span of seasons.

use clap::{Parser, Subcommand};
use madness::{Config, Result};

#[derive(Parser)]
#[command(name = "madness")]
#[command(about = "NCAA tournament match-up features and log-loss scoring", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Directory holding the CSV files (overrides config)
    #[arg(long)]
    data_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on one span of seasons and score predictions on another
    Evaluate {
        /// Training seasons, e.g. 1985-2015
        #[arg(long, default_value = "1985-2015")]
        train: YearRange,
        /// Testing seasons, e.g. 2016-2021
        #[arg(long, default_value = "2016-2021")]
        test: YearRange,
        /// Probability model: fifty, seeds, logistic or mlp
        #[arg(long, default_value = "mlp")]
        model: ModelKind,
        /// Override number of training epochs
        #[arg(long)]
        epochs: Option<usize>,
        /// Save the fitted model under the configured model directory
        #[arg(long)]
        save: bool,
    },
    /// Print both feature visions of a match-up
    Features {
        /// Season year
        year: u16,
        /// First team id
        team_1: u32,
        /// Second team id
        team_2: u32,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Clone, Copy, Debug)]
struct YearRange {
    start: u16,
    end: u16,
}

impl std::str::FromStr for YearRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (start, end) = match s.split_once('-') {
            Some((start, end)) => (start.trim(), end.trim()),
            None => (s.trim(), s.trim()),
        };
        let start: u16 = start
            .parse()
            .map_err(|_| format!("Invalid start year in '{}'", s))?;
        let end: u16 = end.parse().map_err(|_| format!("Invalid end year in '{}'", s))?;
        if start > end {
            return Err(format!("Empty year range: {}", s));
        }
        Ok(YearRange { start, end })
    }
}

#[derive(Clone, Copy, Debug)]
enum ModelKind {
    FiftyFifty,
    Seeds,
    Logistic,
    Mlp,
}

impl std::str::FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fifty" | "fifty-fifty" => Ok(ModelKind::FiftyFifty),
            "seeds" => Ok(ModelKind::Seeds),
            "logistic" | "lr" => Ok(ModelKind::Logistic),
            "mlp" => Ok(ModelKind::Mlp),
            _ => Err(format!("Unknown model: {}. Use fifty, seeds, logistic or mlp.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = match Config::resolve(&cli.config, cli.data_dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Evaluate {
            train,
            test,
            model,
            epochs,
            save,
        } => commands::evaluate(&config, train, test, model, epochs, save),
        Commands::Features {
            year,
            team_1,
            team_2,
        } => commands::features(&config, year, team_1, team_2),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use madness::data::{Loader, Span};
    use madness::features::FeatureSet;
    use madness::predict::FiftyFiftyModel;
    use madness::training::{LogisticTrainer, MlpTrainer};
    use madness::{MadnessError, MatchUp, TeamId};

    type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray<f32>>;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        println!("\nNext steps:");
        println!(
            "  1. Copy the Kaggle CSV files into {}/",
            config.data.data_dir
        );
        println!("  2. Run 'madness evaluate --train 1985-2015 --test 2016-2021'");

        Ok(())
    }

    fn feature_set(config: &Config) -> Result<FeatureSet> {
        Ok(FeatureSet::by_name(&config.features.set)?
            .with_ranking_system(&config.features.ranking_system))
    }

    pub fn evaluate(
        config: &Config,
        train: YearRange,
        test: YearRange,
        model: ModelKind,
        epochs: Option<usize>,
        save: bool,
    ) -> Result<()> {
        let seasons = Loader::new(&config.data.data_dir, &config.features).load()?;
        let excluded = &config.scoring.excluded_seasons;
        let train_span = Span::from_years(&seasons, train.start, train.end, excluded)?;
        let test_span = Span::from_years(&seasons, test.start, test.end, excluded)?;
        train_span.check_disjoint(&test_span)?;

        let set = feature_set(config)?;
        println!(
            "Training on {:?}, testing on {:?} with features {}",
            train_span.years(),
            test_span.years(),
            set
        );

        let predictions = match model {
            ModelKind::FiftyFifty => test_span.predict(&FiftyFiftyModel, &set)?,
            ModelKind::Seeds => {
                let models = test_span.seeds_based_models(config.scoring.seeds_spread);
                test_span.predict_per_season(&models, &set)?
            }
            ModelKind::Logistic => {
                let corpus = train_span.training_corpus(&set)?;
                let trainer = LogisticTrainer::<TrainBackend>::new(
                    Default::default(),
                    config.training.learning_rate,
                    epochs.unwrap_or(config.training.epochs),
                );
                let fitted = trainer.train(&corpus)?;
                if save {
                    let path = config.model_path("logistic");
                    fitted.save(&path)?;
                    println!("Saved model to {}", path.display());
                }
                test_span.predict(&fitted, &set)?
            }
            ModelKind::Mlp => {
                let corpus = train_span.training_corpus(&set)?;
                let trainer = MlpTrainer::<TrainBackend>::new(
                    Default::default(),
                    config.training.mlp_learning_rate,
                    config.training.weight_decay,
                    epochs.unwrap_or(config.training.epochs),
                );
                let fitted = trainer.train(&corpus)?;
                if save {
                    let path = config.model_path("mlp");
                    fitted.save(&path)?;
                    println!("Saved model to {}", path.display());
                }
                test_span.predict(&fitted, &set)?
            }
        };

        let scores = Span::score(&predictions)?;
        println!("\n{}", scores);

        Ok(())
    }

    pub fn features(config: &Config, year: u16, team_1: u32, team_2: u32) -> Result<()> {
        let seasons = Loader::new(&config.data.data_dir, &config.features).load()?;
        let season = seasons.get(&year).ok_or(MadnessError::MissingSeason(year))?;
        let set = feature_set(config)?;

        let match_up = MatchUp::new(TeamId(team_1), TeamId(team_2));
        let features = season.features(&match_up, &set)?;

        println!(
            "{} {} vs. {} ({})",
            year,
            season.team_name(match_up.team_1),
            season.team_name(match_up.team_2),
            set
        );
        let names: Vec<&str> = set.kinds().iter().map(|k| k.name()).collect();
        println!("  features: {}", names.join(", "));
        println!("  vision 1: {:?}", features.vision_1);
        println!("  vision 2: {:?}", features.vision_2);

        if team_1 < team_2 {
            let label = season.label(match_up.team_1, match_up.team_2)?;
            println!("  outcome:  {}", label.value());
        }
        if let Some(date) = season.played_on(match_up.team_1, match_up.team_2) {
            println!("  played:   {}", date);
        }

        let win_ratio = season.regular_season().win_ratio();
        for team in [match_up.team_1, match_up.team_2] {
            if !win_ratio.has_value(team) {
                println!(
                    "  {} has no qualifying regular-season game, season means used (win ratio {:.3})",
                    season.team_name(team),
                    win_ratio.fallback()
                );
            }
        }

        Ok(())
    }
}
