use std::collections::HashSet;
use std::fmt::Write as _;

use crate::error::PredictError;
use crate::parlay::{ParlayCombination, alternates, best_parlay};
use crate::win_prob::{MatchInput, MatchPrediction};

pub fn pct(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

pub fn format_prediction(idx: usize, pred: &MatchPrediction) -> String {
    let mut out = String::new();
    let league = if pred.league_code.is_empty() {
        "-"
    } else {
        pred.league_code.as_str()
    };
    let _ = writeln!(out, "Match #{}: {} [{}]", idx + 1, pred.match_label(), league);
    let _ = writeln!(
        out,
        "  xG {:.2} - {:.2}",
        pred.expected_goals.home, pred.expected_goals.away
    );
    let _ = writeln!(
        out,
        "  Home {:>6} @ {:.2} | Draw {:>6} @ {:.2} | Away {:>6} @ {:.2}",
        pct(pred.home_win_prob),
        pred.home_odds,
        pct(pred.draw_prob),
        pred.draw_odds,
        pct(pred.away_win_prob),
        pred.away_odds
    );
    let _ = writeln!(
        out,
        "  Market {} / {} / {} (overround {})",
        pct(pred.market.implied.home),
        pct(pred.market.implied.draw),
        pct(pred.market.implied.away),
        pct(pred.market.overround)
    );
    let _ = writeln!(out, "  Bets by expected value:");
    for leg in &pred.bets {
        let _ = writeln!(
            out,
            "    {:<5} EV {:+.4}  odds {:.2}  prob {}",
            leg.outcome.to_string(),
            leg.expected_value,
            leg.odds,
            pct(leg.probability)
        );
    }
    let _ = writeln!(
        out,
        "  Best: {} (EV {:+.4}, {})",
        pred.best_bet,
        pred.best_ev,
        pred.recommendation.label()
    );

    let b = &pred.breakdown;
    let scores = b
        .scorelines
        .iter()
        .map(|s| format!("{} {}", s.score, pct(s.probability)))
        .collect::<Vec<_>>()
        .join(", ");
    let ht = b
        .half_time_scorelines
        .iter()
        .map(|s| format!("{} {}", s.score, pct(s.probability)))
        .collect::<Vec<_>>()
        .join(", ");
    let htft = b
        .htft
        .iter()
        .map(|r| format!("{} {}", r.combo, pct(r.probability)))
        .collect::<Vec<_>>()
        .join(", ");
    let goals = b
        .total_goals
        .iter()
        .map(|g| format!("{} {}", g.bucket, pct(g.probability)))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "  Scores: {scores}");
    let _ = writeln!(out, "  Half-time: {ht}");
    let _ = writeln!(out, "  HT/FT: {htft}");
    let _ = writeln!(out, "  Total goals: {goals}");
    out
}

pub fn format_parlay(combo: &ParlayCombination) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  Total odds {:.2} | Win prob {:.4} ({}) | EV {:+.4}",
        combo.total_odds,
        combo.total_prob,
        pct(combo.total_prob),
        combo.expected_value
    );
    for (i, sel) in combo.selections.iter().enumerate() {
        let _ = writeln!(
            out,
            "    {}. {}: {} (odds {:.2}, prob {})",
            i + 1,
            sel.match_label,
            sel.outcome,
            sel.odds,
            pct(sel.probability)
        );
    }
    out
}

/// The whole run as text: each match, the best parlay, then `n_alternates` runner-ups.
/// Matches are numbered by their position in `inputs`, so skipped ones leave gaps.
pub fn render_report(
    inputs: &[MatchInput],
    predictions: &[MatchPrediction],
    skipped: &[(usize, PredictError)],
    ranked: &[ParlayCombination],
    n_alternates: usize,
) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    let _ = writeln!(out, "Match predictions");
    let _ = writeln!(out, "{rule}");
    let skipped_at: HashSet<usize> = skipped.iter().map(|(idx, _)| *idx).collect();
    let mut positions = (0..inputs.len()).filter(|idx| !skipped_at.contains(idx));
    for (i, pred) in predictions.iter().enumerate() {
        let position = positions.next().unwrap_or(i);
        out.push_str(&format_prediction(position, pred));
        out.push('\n');
    }
    for (idx, err) in skipped {
        let label = inputs
            .get(*idx)
            .map(MatchInput::label)
            .unwrap_or_else(|| format!("#{}", idx + 1));
        let _ = writeln!(out, "Skipped {label}: {err}");
    }

    let _ = writeln!(out, "\nBest parlay");
    let _ = writeln!(out, "{rule}");
    match best_parlay(ranked) {
        Some(best) => out.push_str(&format_parlay(best)),
        None => {
            let _ = writeln!(out, "  (no matches to combine)");
        }
    }

    let alts = alternates(ranked, n_alternates);
    if !alts.is_empty() {
        let _ = writeln!(out, "\nOther combinations ({} of {})", alts.len(), ranked.len());
        let _ = writeln!(out, "{rule}");
        for (i, combo) in alts.iter().enumerate() {
            let _ = writeln!(out, "#{}", i + 2);
            out.push_str(&format_parlay(combo));
        }
    }
    out
}
