use std::collections::VecDeque;

use crate::batch::BatchOutcome;
use crate::parlay::{ParlayCombination, generate_parlays};
use crate::win_prob::{MatchInput, MatchPrediction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Matches,
    Parlays,
}

/// Everything the slip viewer shows: predictions, the ranked parlays, a short log.
#[derive(Debug, Clone)]
pub struct SlipState {
    pub predictions: Vec<MatchPrediction>,
    pub parlays: Vec<ParlayCombination>,
    pub pane: Pane,
    pub selected_match: usize,
    pub selected_parlay: usize,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
}

impl SlipState {
    pub fn new(inputs: &[MatchInput], outcome: BatchOutcome) -> Self {
        let parlays = generate_parlays(&outcome.predictions);
        let mut state = Self {
            predictions: outcome.predictions,
            parlays,
            pane: Pane::Matches,
            selected_match: 0,
            selected_parlay: 0,
            help_overlay: false,
            logs: VecDeque::new(),
        };
        state.push_log(format!(
            "[INFO] {} matches, {} combinations",
            state.predictions.len(),
            state.parlays.len()
        ));
        for (idx, err) in &outcome.skipped {
            let label = inputs
                .get(*idx)
                .map(MatchInput::label)
                .unwrap_or_else(|| format!("#{}", idx + 1));
            state.push_log(format!("[WARN] skipped {label}: {err}"));
        }
        state
    }

    pub fn toggle_pane(&mut self) {
        self.pane = match self.pane {
            Pane::Matches => Pane::Parlays,
            Pane::Parlays => Pane::Matches,
        };
    }

    pub fn select_next(&mut self) {
        let (selected, total) = self.cursor();
        *selected = if total == 0 { 0 } else { (*selected + 1) % total };
    }

    pub fn select_prev(&mut self) {
        let (selected, total) = self.cursor();
        *selected = if total == 0 {
            0
        } else if *selected == 0 {
            total - 1
        } else {
            *selected - 1
        };
    }

    fn cursor(&mut self) -> (&mut usize, usize) {
        match self.pane {
            Pane::Matches => (&mut self.selected_match, self.predictions.len()),
            Pane::Parlays => (&mut self.selected_parlay, self.parlays.len()),
        }
    }

    pub fn selected_prediction(&self) -> Option<&MatchPrediction> {
        self.predictions.get(self.selected_match)
    }

    pub fn selected_parlay(&self) -> Option<&ParlayCombination> {
        self.parlays.get(self.selected_parlay)
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

/// Window of `visible` rows around `selected`.
pub fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}
