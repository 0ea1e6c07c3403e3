use std::collections::HashSet;

use parlay_terminal::breakdown::Breakdown;
use parlay_terminal::calibration::{Outcome, Prob3};
use parlay_terminal::features::TeamFeatures;
use parlay_terminal::head_to_head::H2hAdjustment;
use parlay_terminal::league_params::LeagueParams;
use parlay_terminal::parlay::{alternates, best_parlay, generate_parlays};
use parlay_terminal::win_prob::{
    BetLeg, ExpectedGoals, MarketView, MatchInput, MatchPrediction, Recommendation,
    predict_match,
};

fn fixed(home: &str, away: &str, odds: [f64; 3], probs: [f64; 3]) -> MatchPrediction {
    let mut bets: Vec<BetLeg> = Outcome::ALL
        .iter()
        .enumerate()
        .map(|(i, o)| BetLeg::new(*o, probs[i], odds[i]))
        .collect();
    bets.sort_by(|a, b| b.expected_value.total_cmp(&a.expected_value));
    MatchPrediction {
        league_code: "PL".to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_win_prob: probs[0],
        draw_prob: probs[1],
        away_win_prob: probs[2],
        home_odds: odds[0],
        draw_odds: odds[1],
        away_odds: odds[2],
        expected_goals: ExpectedGoals {
            home: 1.4,
            away: 1.1,
        },
        best_bet: bets[0].outcome,
        best_ev: bets[0].expected_value,
        recommendation: Recommendation::for_ev(bets[0].expected_value),
        bets,
        market: MarketView {
            implied: Prob3::uniform(),
            overround: 0.0,
        },
        breakdown: Breakdown {
            scorelines: Vec::new(),
            half_time_scorelines: Vec::new(),
            htft: Vec::new(),
            total_goals: Vec::new(),
        },
    }
}

fn modelled(n: usize) -> Vec<MatchPrediction> {
    let params = LeagueParams {
        home_advantage: 1.05,
        draw_adjustment: 1.1,
    };
    (0..n)
        .map(|i| {
            let home = TeamFeatures {
                attack: Some(1.0 + 0.15 * i as f64),
                ..TeamFeatures::default()
            };
            let away = TeamFeatures {
                defense: Some(1.6 - 0.1 * i as f64),
                ..TeamFeatures::default()
            };
            let input = MatchInput::new(
                "PL",
                &format!("Home {i}"),
                &format!("Away {i}"),
                1.8 + 0.1 * i as f64,
                3.4,
                4.2 - 0.2 * i as f64,
            );
            predict_match(&input, Some(&home), Some(&away), params, H2hAdjustment::NEUTRAL, 3)
                .expect("valid fixture")
        })
        .collect()
}

#[test]
fn two_match_slip_ranks_nine_combinations() {
    let preds = vec![
        fixed("A", "B", [2.00, 3.20, 2.80], [0.45, 0.27, 0.28]),
        fixed("C", "D", [2.00, 3.20, 2.80], [0.45, 0.27, 0.28]),
    ];
    let ranked = generate_parlays(&preds);
    assert_eq!(ranked.len(), 9);

    let best = best_parlay(&ranked).expect("non-empty");
    assert_eq!(best.selections[0].outcome, Outcome::Home);
    assert_eq!(best.selections[1].outcome, Outcome::Home);
    assert!((best.total_odds - 4.0).abs() < 1e-12);
    assert!((best.total_prob - 0.2025).abs() < 1e-12);
    assert!((best.expected_value - (0.2025 * 4.0 - 1.0)).abs() < 1e-12);

    assert_eq!(alternates(&ranked, 10).len(), 8);
    assert_eq!(alternates(&ranked, 3).len(), 3);
}

#[test]
fn combination_count_and_ordering_hold_for_modelled_slips() {
    for n in 1..=5 {
        let preds = modelled(n);
        let ranked = generate_parlays(&preds);
        assert_eq!(ranked.len(), 3usize.pow(n as u32));

        for w in ranked.windows(2) {
            assert!(w[0].expected_value >= w[1].expected_value);
        }

        let mut seen = HashSet::new();
        for combo in &ranked {
            assert_eq!(combo.selections.len(), n);
            for (sel, pred) in combo.selections.iter().zip(&preds) {
                assert_eq!(sel.match_label, pred.match_label());
                let leg = pred.bet(sel.outcome).expect("leg exists");
                assert_eq!(sel.odds, leg.odds);
                assert_eq!(sel.probability, leg.probability);
            }
            let odds: f64 = combo.selections.iter().map(|s| s.odds).product();
            let prob: f64 = combo.selections.iter().map(|s| s.probability).product();
            assert!((combo.total_odds - odds).abs() < 1e-9);
            assert!((combo.total_prob - prob).abs() < 1e-12);
            assert!((combo.expected_value - (prob * odds - 1.0)).abs() < 1e-9);

            let key: Vec<Outcome> = combo.selections.iter().map(|s| s.outcome).collect();
            assert!(seen.insert(key), "duplicate combination");
        }
    }
}

#[test]
fn best_parlay_stacks_each_match_best_leg() {
    let preds = modelled(4);
    let ranked = generate_parlays(&preds);
    let best = best_parlay(&ranked).expect("non-empty");
    let max_ev = ranked
        .iter()
        .map(|c| c.expected_value)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(best.expected_value, max_ev);
}

#[test]
fn equal_ev_combinations_keep_generation_order() {
    // Every leg has EV 0, so every combination ties.
    let flat = [0.5, 0.25, 0.25];
    let odds = [2.0, 4.0, 4.0];
    let preds = vec![fixed("A", "B", odds, flat), fixed("C", "D", odds, flat)];
    let ranked = generate_parlays(&preds);
    let order: Vec<(Outcome, Outcome)> = ranked
        .iter()
        .map(|c| (c.selections[0].outcome, c.selections[1].outcome))
        .collect();
    let mut expected = Vec::new();
    for a in Outcome::ALL {
        for b in Outcome::ALL {
            expected.push((a, b));
        }
    }
    assert_eq!(order, expected);
}

#[test]
fn empty_slip_has_no_parlays() {
    let ranked = generate_parlays(&[]);
    assert!(ranked.is_empty());
    assert!(best_parlay(&ranked).is_none());
    assert!(alternates(&ranked, 10).is_empty());
}
