use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rayon::prelude::*;

use parlay_terminal::calibration::{self, Outcome, Prob3};
use parlay_terminal::config::Config;
use parlay_terminal::logging;
use parlay_terminal::win_prob::{MatchInput, MatchPrediction, Predictor};

#[derive(Debug, serde::Deserialize)]
struct HistoricalMatch {
    #[serde(flatten)]
    input: MatchInput,
    home_goals: u32,
    away_goals: u32,
}

fn main() -> Result<()> {
    logging::init(logging::DEFAULT_FILTER);

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/history.json"));
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("read history from {}", path.display()))?;
    let history: Vec<HistoricalMatch> = serde_json::from_str(&raw)
        .with_context(|| format!("parse history in {}", path.display()))?;

    let config = Config::from_env()?;
    let store = config.load_features()?;
    let calibration = config.load_calibration()?;
    let predictor = Predictor::new(&store, &calibration).with_top_n(1);

    // Each fixture is independent, so evaluate in parallel; collect keeps input order.
    let results: Vec<(Option<MatchPrediction>, Outcome)> = history
        .par_iter()
        .map(|m| {
            let actual = calibration::classify_outcome(m.home_goals, m.away_goals);
            match predictor.predict(&m.input) {
                Ok(pred) => (Some(pred), actual),
                Err(err) => {
                    tracing::warn!(fixture = %m.input.label(), error = %err, "not evaluated");
                    (None, actual)
                }
            }
        })
        .collect();

    let mut model = Vec::new();
    let mut market = Vec::new();
    let mut outcomes = Vec::new();
    let mut staked = 0usize;
    let mut returned = 0.0_f64;
    for (pred, actual) in &results {
        let Some(pred) = pred else { continue };
        model.push(pred.probs());
        market.push(pred.market.implied);
        outcomes.push(*actual);
        if pred.best_ev > 0.0 {
            staked += 1;
            if pred.best_bet == *actual {
                returned += pred
                    .bet(pred.best_bet)
                    .map(|b| b.odds)
                    .unwrap_or_default();
            }
        }
    }

    let skipped = results.len() - model.len();
    println!("Evaluated {} of {} matches ({} skipped)", model.len(), results.len(), skipped);
    print_metrics("Model", &model, &outcomes);
    print_metrics("Market", &market, &outcomes);
    if staked > 0 {
        let roi = (returned - staked as f64) / staked as f64;
        println!("Value bets: {staked} staked, return {returned:.2}, ROI {:+.2}%", roi * 100.0);
    } else {
        println!("Value bets: none placed");
    }
    Ok(())
}

fn print_metrics(name: &str, probs: &[Prob3], outcomes: &[Outcome]) {
    let m = calibration::evaluate_probs(probs, outcomes);
    println!(
        "{name:<7} brier {:.4} | log loss {:.4} | accuracy {:.1}% (n={})",
        m.brier,
        m.log_loss,
        m.accuracy * 100.0,
        m.samples
    );
}
