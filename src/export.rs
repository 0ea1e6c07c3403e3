use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::parlay::ParlayCombination;
use crate::win_prob::MatchPrediction;

pub struct ExportReport {
    pub predictions: usize,
    pub parlays: usize,
}

/// Writes `Predictions` and `Parlays` sheets. `max_parlays` caps the second sheet.
pub fn export_workbook(
    path: &Path,
    predictions: &[MatchPrediction],
    ranked: &[ParlayCombination],
    max_parlays: usize,
) -> Result<ExportReport> {
    let mut prediction_rows = vec![
        [
            "League", "Home", "Away", "xG Home", "xG Away", "P Home", "P Draw", "P Away",
            "Odds Home", "Odds Draw", "Odds Away", "Best Bet", "Best EV", "Recommendation",
            "Top Score",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>(),
    ];
    for p in predictions {
        prediction_rows.push(vec![
            p.league_code.clone(),
            p.home_team.clone(),
            p.away_team.clone(),
            format!("{:.3}", p.expected_goals.home),
            format!("{:.3}", p.expected_goals.away),
            format!("{:.4}", p.home_win_prob),
            format!("{:.4}", p.draw_prob),
            format!("{:.4}", p.away_win_prob),
            format!("{:.2}", p.home_odds),
            format!("{:.2}", p.draw_odds),
            format!("{:.2}", p.away_odds),
            p.best_bet.to_string(),
            format!("{:.4}", p.best_ev),
            p.recommendation.label().to_string(),
            p.breakdown
                .scorelines
                .first()
                .map(|s| s.score.to_string())
                .unwrap_or_default(),
        ]);
    }

    let mut parlay_rows = vec![
        ["Rank", "Selections", "Total Odds", "Total Prob", "EV", "Avg Leg EV"]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>(),
    ];
    for (i, combo) in ranked.iter().take(max_parlays).enumerate() {
        parlay_rows.push(vec![
            (i + 1).to_string(),
            combo.label(),
            format!("{:.3}", combo.total_odds),
            format!("{:.6}", combo.total_prob),
            format!("{:.4}", combo.expected_value),
            format!("{:.4}", combo.avg_leg_ev()),
        ]);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Predictions")?;
        write_rows(sheet, &prediction_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Parlays")?;
        write_rows(sheet, &parlay_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        predictions: prediction_rows.len().saturating_sub(1),
        parlays: parlay_rows.len().saturating_sub(1),
    })
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
