use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::PredictError;
use crate::win_prob::{MatchInput, MatchPrediction, Predictor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Drop failing matches and keep going.
    Skip,
    /// Fail the whole batch on the first error.
    Abort,
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Successful predictions, in input order.
    pub predictions: Vec<MatchPrediction>,
    /// `(input index, error)` for every skipped match.
    pub skipped: Vec<(usize, PredictError)>,
}

pub fn predict_batch(
    predictor: &Predictor<'_>,
    matches: &[MatchInput],
    policy: BatchPolicy,
) -> Result<BatchOutcome, PredictError> {
    let mut out = BatchOutcome::default();
    for (idx, input) in matches.iter().enumerate() {
        match predictor.predict(input) {
            Ok(pred) => out.predictions.push(pred),
            Err(err) if policy == BatchPolicy::Skip => {
                tracing::warn!(index = idx, fixture = %input.label(), error = %err, "skipping match");
                out.skipped.push((idx, err));
            }
            Err(err) => return Err(err),
        }
    }
    tracing::info!(
        predicted = out.predictions.len(),
        skipped = out.skipped.len(),
        "batch predicted"
    );
    Ok(out)
}

/// Reads a JSON array of fixtures.
pub fn load_matches(path: &Path) -> Result<Vec<MatchInput>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read matches from {}", path.display()))?;
    serde_json::from_str::<Vec<MatchInput>>(&raw)
        .with_context(|| format!("parse matches in {}", path.display()))
}
