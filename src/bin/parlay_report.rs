use std::path::PathBuf;

use anyhow::{Result, bail};

use parlay_terminal::batch::{load_matches, predict_batch};
use parlay_terminal::config::Config;
use parlay_terminal::logging;
use parlay_terminal::parlay::generate_parlays;
use parlay_terminal::report::render_report;
use parlay_terminal::win_prob::Predictor;

fn main() -> Result<()> {
    logging::init(logging::DEFAULT_FILTER);

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/matches.json"));

    let config = Config::from_env()?;
    let store = config.load_features()?;
    let calibration = config.load_calibration()?;
    let inputs = load_matches(&path)?;
    if inputs.len() > config.max_matches {
        bail!(
            "{} matches exceeds PARLAY_MAX_MATCHES={}",
            inputs.len(),
            config.max_matches
        );
    }

    let predictor = Predictor::new(&store, &calibration).with_top_n(config.top_n);
    let outcome = predict_batch(&predictor, &inputs, config.batch_policy)?;
    let ranked = generate_parlays(&outcome.predictions);

    print!(
        "{}",
        render_report(
            &inputs,
            &outcome.predictions,
            &outcome.skipped,
            &ranked,
            config.alternates,
        )
    );
    Ok(())
}
