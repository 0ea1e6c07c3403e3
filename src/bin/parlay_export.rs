use std::path::PathBuf;

use anyhow::{Result, bail};
use chrono::Local;

use parlay_terminal::batch::{load_matches, predict_batch};
use parlay_terminal::config::Config;
use parlay_terminal::export::export_workbook;
use parlay_terminal::logging;
use parlay_terminal::parlay::generate_parlays;
use parlay_terminal::win_prob::Predictor;

const MAX_EXPORTED_PARLAYS: usize = 1000;

fn main() -> Result<()> {
    logging::init(logging::DEFAULT_FILTER);

    let mut args = std::env::args().skip(1);
    let matches_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/matches.json"));
    let out_path = args.next().map(PathBuf::from).unwrap_or_else(|| {
        PathBuf::from(format!(
            "parlays_{}.xlsx",
            Local::now().format("%Y%m%d_%H%M%S")
        ))
    });

    let config = Config::from_env()?;
    let store = config.load_features()?;
    let calibration = config.load_calibration()?;
    let inputs = load_matches(&matches_path)?;
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

    let report = export_workbook(&out_path, &outcome.predictions, &ranked, MAX_EXPORTED_PARLAYS)?;
    tracing::info!(
        path = %out_path.display(),
        predictions = report.predictions,
        parlays = report.parlays,
        "workbook written"
    );
    println!(
        "Wrote {} predictions and {} parlays to {}",
        report.predictions,
        report.parlays,
        out_path.display()
    );
    Ok(())
}
