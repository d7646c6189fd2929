//! Property-based tests for match-up features and scoring.

use proptest::prelude::*;

use madness::data::{Label, Observation, Season, SeasonInput, TeamRegistry};
use madness::features::FeatureSet;
use madness::training::metrics::log_loss;
use madness::{FeatureConfig, Game, Location, MatchUp, Seed, TeamId};
use std::sync::Arc;

/// Strategy: a regular-season game between two of `n` teams.
fn game_strategy(n: u32) -> impl Strategy<Value = (u32, u32, u16, u16, u8)> {
    (1..=n, 1..=n, 40..120u16, 0..40u16, 0..3u8)
}

/// Strategy: a seed (region index, position) per team.
fn seeds_strategy(n: usize) -> impl Strategy<Value = Vec<(u8, u8)>> {
    prop::collection::vec((0..4u8, 1..=16u8), n)
}

/// Strategy: a season with 2-8 qualified teams and random results.
fn season_strategy() -> impl Strategy<Value = Season> {
    (2..=8u32)
        .prop_flat_map(|n| {
            (
                Just(n),
                prop::collection::vec(game_strategy(n), 0..24),
                seeds_strategy(n as usize),
            )
        })
        .prop_map(|(n, games, seeds)| build_season(n, games, seeds))
}

fn build_season(n: u32, games: Vec<(u32, u32, u16, u16, u8)>, seeds: Vec<(u8, u8)>) -> Season {
    // Before rankings existed, so the extended set uses the seed proxy
    let year = 2001;
    let to_game = |w: u32, l: u32, w_score: u16, margin: u16, loc: u8| Game {
        season: year,
        day_num: 60,
        w_team: TeamId(w),
        w_score: w_score + margin,
        l_team: TeamId(l),
        l_score: w_score,
        w_loc: match loc {
            0 => Location::Home,
            1 => Location::Away,
            _ => Location::Neutral,
        },
        num_ot: 0,
        w_box: None,
        l_box: None,
    };

    // One guaranteed game so the season is never empty
    let mut regular_season_games = vec![to_game(1, 2, 70, 3, 2)];
    regular_season_games.extend(
        games
            .into_iter()
            .filter(|(w, l, ..)| w != l)
            .map(|(w, l, score, margin, loc)| to_game(w, l, score, margin, loc)),
    );

    let seeds = seeds
        .into_iter()
        .enumerate()
        .map(|(i, (region, position))| {
            let letter = ['W', 'X', 'Y', 'Z'][region as usize];
            let code = format!("{}{:02}", letter, position);
            Seed::parse(year, &code, TeamId(i as u32 + 1)).unwrap()
        })
        .collect();

    let tournament_games = (2..=n).map(|l| to_game(1, l, 65, 1, 2)).collect();

    let input = SeasonInput {
        year,
        regular_season_games,
        tournament_games,
        seeds,
        ..SeasonInput::default()
    };
    Season::new(input, Arc::new(TeamRegistry::new()), &FeatureConfig::default()).unwrap()
}

fn feature_set_strategy() -> impl Strategy<Value = FeatureSet> {
    prop_oneof![Just(FeatureSet::standard()), Just(FeatureSet::extended())]
}

proptest! {
    // 1. Second vision of (a, b) is exactly the first vision of (b, a)
    #[test]
    fn visions_are_mirrored(season in season_strategy(), set in feature_set_strategy()) {
        let field = season.tournament().field().to_vec();
        for &a in &field {
            for &b in &field {
                if a == b {
                    continue;
                }
                let ab = season.features(&MatchUp::new(a, b), &set).unwrap();
                let ba = season.features(&MatchUp::new(b, a), &set).unwrap();
                prop_assert_eq!(&ab.vision_2, &ba.vision_1);
                prop_assert_eq!(ab.vision_1.len(), set.dimension());
            }
        }
    }

    // 2. Enumeration yields every pairing once, in ascending id order
    #[test]
    fn observations_cover_each_pair_once(season in season_strategy()) {
        let n = season.tournament().field().len();
        let observations = season.observations(&FeatureSet::standard()).unwrap();
        prop_assert_eq!(observations.len(), n * (n - 1) / 2);
        prop_assert!(observations.iter().all(|o| o.team_1() < o.team_2()));
    }

    // 3. Team 1 has the smallest id and won every tournament game
    #[test]
    fn labels_follow_tournament(season in season_strategy()) {
        let observations = season.observations(&FeatureSet::standard()).unwrap();
        for o in &observations {
            let expected = if o.team_1() == TeamId(1) { Label::Won } else { Label::Unknown };
            prop_assert_eq!(o.label(), expected);
        }
    }

    // 4. Log loss is non-negative and zero for unplayed match-ups
    #[test]
    fn log_loss_bounds(p in 0.0..=1.0f64) {
        prop_assert!(log_loss(Label::Won, p) >= 0.0);
        prop_assert!(log_loss(Label::Lost, p) >= 0.0);
        prop_assert_eq!(log_loss(Label::Unknown, p), 0.0);
    }

    // 5. Swapping ids is always rejected
    #[test]
    fn descending_ids_rejected(a in 1..1000u32, b in 1..1000u32) {
        let result = Observation::new(2001, TeamId(a), TeamId(b), vec![], Label::Unknown);
        prop_assert_eq!(result.is_ok(), a < b);
    }
}
