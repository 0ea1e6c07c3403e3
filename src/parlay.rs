use serde::{Deserialize, Serialize};

use crate::calibration::Outcome;
use crate::win_prob::MatchPrediction;

/// One leg of a parlay: a single outcome picked for a single match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParlaySelection {
    pub match_label: String,
    pub outcome: Outcome,
    pub odds: f64,
    pub probability: f64,
    pub expected_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParlayCombination {
    /// One selection per input match, in input order.
    pub selections: Vec<ParlaySelection>,
    pub total_odds: f64,
    pub total_prob: f64,
    pub expected_value: f64,
}

impl ParlayCombination {
    fn from_selections(selections: Vec<ParlaySelection>) -> Self {
        let total_odds: f64 = selections.iter().map(|s| s.odds).product();
        let total_prob: f64 = selections.iter().map(|s| s.probability).product();
        Self {
            selections,
            total_odds,
            total_prob,
            expected_value: total_prob * total_odds - 1.0,
        }
    }

    pub fn avg_leg_ev(&self) -> f64 {
        if self.selections.is_empty() {
            return 0.0;
        }
        self.selections.iter().map(|s| s.expected_value).sum::<f64>()
            / self.selections.len() as f64
    }

    /// e.g. `A vs B: home | C vs D: draw`
    pub fn label(&self) -> String {
        self.selections
            .iter()
            .map(|s| format!("{}: {}", s.match_label, s.outcome))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Every way of picking one leg per match (3^N combinations), best expected value
/// first. Equal expected values keep generation order.
pub fn generate_parlays(predictions: &[MatchPrediction]) -> Vec<ParlayCombination> {
    if predictions.is_empty() {
        return Vec::new();
    }

    let per_match: Vec<Vec<ParlaySelection>> = predictions
        .iter()
        .map(|p| {
            let label = p.match_label();
            p.bets
                .iter()
                .map(|b| ParlaySelection {
                    match_label: label.clone(),
                    outcome: b.outcome,
                    odds: b.odds,
                    probability: b.probability,
                    expected_value: b.expected_value,
                })
                .collect()
        })
        .collect();

    let capacity = per_match.iter().map(Vec::len).product();
    let mut out = Vec::with_capacity(capacity);
    let mut current = Vec::with_capacity(per_match.len());
    collect_combinations(&per_match, &mut current, &mut out);

    out.sort_by(|a, b| b.expected_value.total_cmp(&a.expected_value));
    tracing::debug!(
        matches = predictions.len(),
        combinations = out.len(),
        "parlays generated"
    );
    out
}

fn collect_combinations(
    per_match: &[Vec<ParlaySelection>],
    current: &mut Vec<ParlaySelection>,
    out: &mut Vec<ParlayCombination>,
) {
    let depth = current.len();
    if depth == per_match.len() {
        out.push(ParlayCombination::from_selections(current.clone()));
        return;
    }
    for selection in &per_match[depth] {
        current.push(selection.clone());
        collect_combinations(per_match, current, out);
        current.pop();
    }
}

pub fn best_parlay(ranked: &[ParlayCombination]) -> Option<&ParlayCombination> {
    ranked.first()
}

/// Runner-ups after the best parlay: indices `1..=n`, fewer if the list is shorter.
pub fn alternates(ranked: &[ParlayCombination], n: usize) -> &[ParlayCombination] {
    if ranked.len() <= 1 {
        return &[];
    }
    let end = n.saturating_add(1).min(ranked.len());
    &ranked[1..end]
}
