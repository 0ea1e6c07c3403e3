use std::fs;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use parlay_terminal::calibration::Outcome;
use parlay_terminal::error::PredictError;
use parlay_terminal::features::{FeatureLookup, FeatureStore, TeamFeatures};
use parlay_terminal::head_to_head::{H2hAdjustment, HeadToHead};
use parlay_terminal::league_params::{LeagueCalibration, LeagueParams};
use parlay_terminal::score_grid::{MAX_GOALS, ScoreGrid};
use parlay_terminal::win_prob::{MatchInput, Predictor, predict_match};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn store() -> FeatureStore {
    FeatureStore::from_json_str(&read_fixture("team_features.json")).expect("fixture should parse")
}

fn random_features(rng: &mut StdRng) -> TeamFeatures {
    let mut field = |lo: f64, hi: f64| {
        if rng.gen_bool(0.2) {
            None
        } else {
            Some(rng.gen_range(lo..hi))
        }
    };
    TeamFeatures {
        attack: field(0.5, 2.6),
        defense: field(0.5, 2.6),
        home_goals_scored_avg: field(0.2, 3.2),
        home_goals_conceded_avg: field(0.2, 3.2),
        away_goals_scored_avg: field(0.2, 3.2),
        away_goals_conceded_avg: field(0.2, 3.2),
        recent_scoring_rate: field(0.2, 3.0),
        recent_conceding_rate: field(0.2, 3.0),
        form: field(0.0, 2.0),
        xg: field(0.2, 3.0),
        xga: field(0.2, 3.0),
    }
}

#[test]
fn probabilities_normalized_for_random_inputs() {
    let mut rng = StdRng::seed_from_u64(7);
    let cal = LeagueCalibration::default();
    let leagues = ["PL", "PD", "SA", "BL1", "FL1", "XX", ""];

    for i in 0..500 {
        let home = random_features(&mut rng);
        let away = random_features(&mut rng);
        let league = leagues[i % leagues.len()];
        let input = MatchInput::new(
            league,
            "Home",
            "Away",
            rng.gen_range(1.01..15.0),
            rng.gen_range(1.01..15.0),
            rng.gen_range(1.01..15.0),
        );
        let pred = predict_match(
            &input,
            Some(&home),
            Some(&away),
            cal.params(league),
            H2hAdjustment::NEUTRAL,
            3,
        )
        .expect("valid input should predict");

        let sum = pred.home_win_prob + pred.draw_prob + pred.away_win_prob;
        assert!((sum - 1.0).abs() < 1e-6, "sum={sum} at case {i}");
        for p in [pred.home_win_prob, pred.draw_prob, pred.away_win_prob] {
            assert!((0.0..=1.0).contains(&p));
        }

        assert_eq!(pred.bets.len(), 3);
        for w in pred.bets.windows(2) {
            assert!(w[0].expected_value >= w[1].expected_value);
        }
        for leg in &pred.bets {
            assert_eq!(leg.expected_value, leg.probability * leg.odds - 1.0);
        }
        assert!(pred.expected_goals.home >= 0.3);
        assert!(pred.expected_goals.away >= 0.2);

        let grid = ScoreGrid::poisson(pred.expected_goals.home, pred.expected_goals.away, MAX_GOALS);
        assert!((grid.total() - 1.0).abs() < 1e-6);
    }
}

#[test]
fn stronger_home_side_is_favoured() {
    let store = store();
    let cal = LeagueCalibration::default();
    let predictor = Predictor::new(&store, &cal);
    let pred = predictor
        .predict(&MatchInput::new(
            "PL",
            "Arsenal FC",
            "Sheffield United FC",
            1.25,
            6.5,
            12.0,
        ))
        .expect("both teams present");

    assert!(pred.home_win_prob > 0.6);
    assert!(pred.home_win_prob > pred.away_win_prob);
    assert!(pred.expected_goals.home > pred.expected_goals.away);
    assert_eq!(pred.breakdown.scorelines.len(), 3);
    assert_eq!(pred.breakdown.half_time_scorelines.len(), 3);
    assert_eq!(pred.breakdown.htft.len(), 3);
    assert_eq!(pred.breakdown.total_goals.len(), 3);
    assert_eq!(pred.match_label(), "Arsenal FC vs Sheffield United FC");
}

#[test]
fn missing_team_raises_data_not_found() {
    let store = store();
    let cal = LeagueCalibration::default();
    let predictor = Predictor::new(&store, &cal);
    let err = predictor
        .predict(&MatchInput::new(
            "PL",
            "Chelsea FC",
            "Liverpool FC",
            2.9,
            3.5,
            2.4,
        ))
        .unwrap_err();
    assert_eq!(
        err,
        PredictError::DataNotFound {
            league: "PL".to_string(),
            teams: vec!["Liverpool FC".to_string()],
        }
    );
    assert!(err.to_string().contains("Liverpool FC"));
}

#[test]
fn team_from_another_league_is_not_substituted() {
    let store = store();
    let cal = LeagueCalibration::default();
    let predictor = Predictor::new(&store, &cal);
    let err = predictor
        .predict(&MatchInput::new("PL", "Arsenal FC", "Getafe CF", 1.5, 4.0, 6.0))
        .unwrap_err();
    assert!(err.is_data_not_found());
}

#[test]
fn empty_league_code_uses_the_league_holding_both_teams() {
    let store = store();
    let cal = LeagueCalibration::default();
    let predictor = Predictor::new(&store, &cal);

    let detected = predictor
        .predict(&MatchInput::new("", "Real Madrid CF", "Getafe CF", 1.45, 4.6, 7.5))
        .expect("both teams present in PD");
    let explicit = predictor
        .predict(&MatchInput::new("PD", "Real Madrid CF", "Getafe CF", 1.45, 4.6, 7.5))
        .expect("both teams present in PD");

    assert_eq!(detected.league_code, "PD");
    assert_eq!(detected, explicit);
    assert!(detected.home_win_prob > detected.away_win_prob);
}

#[test]
fn empty_league_code_never_pairs_teams_across_leagues() {
    let store = store();
    let cal = LeagueCalibration::default();
    let predictor = Predictor::new(&store, &cal);
    let err = predictor
        .predict(&MatchInput::new("", "Arsenal FC", "Getafe CF", 1.5, 4.0, 6.0))
        .unwrap_err();
    assert!(err.is_data_not_found());
    assert!(err.to_string().contains("Arsenal FC"));
    assert!(err.to_string().contains("Getafe CF"));
}

#[test]
fn blank_team_name_is_rejected_before_lookup() {
    let store = store();
    let cal = LeagueCalibration::default();
    let predictor = Predictor::new(&store, &cal);
    let err = predictor
        .predict(&MatchInput::new("", "Arsenal FC", "   ", 1.5, 4.0, 6.0))
        .unwrap_err();
    assert_eq!(err, PredictError::MissingTeam { side: "away" });
    assert!(err.is_invalid_input());
}

#[test]
fn odds_floor_rejects_even_money_minus() {
    let store = store();
    let cal = LeagueCalibration::default();
    let predictor = Predictor::new(&store, &cal);

    let err = predictor
        .predict(&MatchInput::new("PL", "Arsenal FC", "Chelsea FC", 1.00, 3.5, 4.0))
        .unwrap_err();
    assert_eq!(
        err,
        PredictError::InvalidOdds {
            outcome: Outcome::Home,
            value: 1.00,
        }
    );
    assert!(err.is_invalid_input());

    let err = predictor
        .predict(&MatchInput::new(
            "PL",
            "Arsenal FC",
            "Chelsea FC",
            2.0,
            f64::NAN,
            4.0,
        ))
        .unwrap_err();
    assert!(matches!(
        err,
        PredictError::InvalidOdds {
            outcome: Outcome::Draw,
            ..
        }
    ));
}

#[test]
fn draw_adjustment_tracks_league_table() {
    let f = TeamFeatures::default();
    let input = MatchInput::new("X", "A", "B", 2.5, 3.2, 2.9);
    let params = |draw| LeagueParams {
        home_advantage: 1.02,
        draw_adjustment: draw,
    };
    let low = predict_match(&input, Some(&f), Some(&f), params(0.9), H2hAdjustment::NEUTRAL, 3)
        .expect("predict");
    let high = predict_match(&input, Some(&f), Some(&f), params(1.3), H2hAdjustment::NEUTRAL, 3)
        .expect("predict");
    assert!(high.draw_prob > low.draw_prob);
    assert!(high.home_win_prob < low.home_win_prob);
}

struct HomeBoost;

impl HeadToHead for HomeBoost {
    fn adjustment(&self, _league: &str, _home: &str, _away: &str) -> H2hAdjustment {
        H2hAdjustment {
            home: 1.3,
            away: 0.8,
        }
    }
}

#[test]
fn head_to_head_hook_is_applied() {
    let store = store();
    let cal = LeagueCalibration::default();
    let input = MatchInput::new("PL", "Chelsea FC", "Arsenal FC", 3.0, 3.4, 2.3);

    let neutral = Predictor::new(&store, &cal).predict(&input).expect("predict");
    let hook = HomeBoost;
    let boosted = Predictor::new(&store, &cal)
        .with_head_to_head(&hook)
        .predict(&input)
        .expect("predict");

    assert!((boosted.expected_goals.home / neutral.expected_goals.home - 1.3).abs() < 1e-9);
    assert!(boosted.home_win_prob > neutral.home_win_prob);
}

#[test]
fn lookup_trait_distinguishes_absent_from_defaulted() {
    let store = store();
    assert!(store.team_features("PD", "Getafe CF").is_some());
    assert!(store.team_features("PD", "Sevilla FC").is_none());
}
