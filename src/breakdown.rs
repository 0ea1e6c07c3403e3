use std::fmt;

use serde::{Deserialize, Serialize};

use crate::calibration::{Outcome, Prob3};
use crate::score_grid::{GoalBucketProb, MAX_GOALS, ScoreGrid, ScoreProb, top_n};

/// Share of full-time expected goals scored before the break.
pub const HALF_TIME_GOAL_SHARE: f64 = 0.45;
/// Half-time grid cutoff: 60% of the full-time cutoff, never above 4.
pub const HALF_TIME_MAX_GOALS: u32 = {
    let scaled = (MAX_GOALS * 6 + 5) / 10;
    if scaled > 4 { 4 } else { scaled }
};

const HTFT_SAME_BOOST: f64 = 1.5;
const HTFT_FLIP_DAMP: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtFt {
    pub half_time: Outcome,
    pub full_time: Outcome,
}

impl fmt::Display for HtFt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.half_time.code(), self.full_time.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HtFtProb {
    pub combo: HtFt,
    pub probability: f64,
}

/// Auxiliary markets derived from one match's expected goals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub scorelines: Vec<ScoreProb>,
    pub half_time_scorelines: Vec<ScoreProb>,
    pub htft: Vec<HtFtProb>,
    pub total_goals: Vec<GoalBucketProb>,
}

pub fn half_time_grid(lambda_home: f64, lambda_away: f64) -> ScoreGrid {
    ScoreGrid::poisson(
        lambda_home * HALF_TIME_GOAL_SHARE,
        lambda_away * HALF_TIME_GOAL_SHARE,
        HALF_TIME_MAX_GOALS,
    )
}

/// All nine HT/FT pairs in home/draw/away order. A side leading at the break and still
/// ahead at the end is boosted; a lead that flips to the other side is damped.
pub fn htft_table(half_time: Prob3, full_time: Prob3) -> Vec<HtFtProb> {
    let mut rows = Vec::with_capacity(9);
    for ht in Outcome::ALL {
        for ft in Outcome::ALL {
            let weight = if ht == ft {
                HTFT_SAME_BOOST
            } else if is_flip(ht, ft) {
                HTFT_FLIP_DAMP
            } else {
                1.0
            };
            rows.push(HtFtProb {
                combo: HtFt {
                    half_time: ht,
                    full_time: ft,
                },
                probability: half_time.get(ht) * full_time.get(ft) * weight,
            });
        }
    }

    let total: f64 = rows.iter().map(|r| r.probability).sum();
    if total > 0.0 {
        rows.iter_mut().for_each(|r| r.probability /= total);
    }
    rows
}

fn is_flip(a: Outcome, b: Outcome) -> bool {
    matches!(
        (a, b),
        (Outcome::Home, Outcome::Away) | (Outcome::Away, Outcome::Home)
    )
}

/// `full_time` is the grid the 1X2 came from; `full_time_probs` the calibrated 1X2.
pub fn compute_breakdown(
    full_time: &ScoreGrid,
    full_time_probs: Prob3,
    lambda_home: f64,
    lambda_away: f64,
    top: usize,
) -> Breakdown {
    let ht_grid = half_time_grid(lambda_home, lambda_away);
    let htft = htft_table(ht_grid.outcome_probs(), full_time_probs);

    Breakdown {
        scorelines: full_time.top_scorelines(top),
        half_time_scorelines: ht_grid.top_scorelines(top),
        htft: top_n(htft, top, |r| r.probability),
        total_goals: full_time.top_goal_buckets(top),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_time_cutoff_is_three() {
        assert_eq!(HALF_TIME_MAX_GOALS, 3);
        let grid = half_time_grid(1.5, 1.2);
        assert_eq!(grid.max_goals(), 3);
        assert!((grid.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn half_time_is_tighter_than_full_time() {
        let ft = ScoreGrid::poisson(1.5, 1.2, MAX_GOALS).outcome_probs();
        let ht = half_time_grid(1.5, 1.2).outcome_probs();
        assert!(ht.draw > ft.draw);
    }

    #[test]
    fn htft_table_normalizes_and_weights() {
        let p = Prob3::uniform();
        let rows = htft_table(p, p);
        assert_eq!(rows.len(), 9);
        let sum: f64 = rows.iter().map(|r| r.probability).sum();
        assert!((sum - 1.0).abs() < 1e-12);

        let find = |ht: Outcome, ft: Outcome| {
            rows.iter()
                .find(|r| r.combo.half_time == ht && r.combo.full_time == ft)
                .map(|r| r.probability)
                .unwrap()
        };
        let same = find(Outcome::Home, Outcome::Home);
        let neutral = find(Outcome::Draw, Outcome::Home);
        let flip = find(Outcome::Home, Outcome::Away);
        assert!((same / neutral - 1.5).abs() < 1e-12);
        assert!((flip / neutral - 0.5).abs() < 1e-12);
    }

    #[test]
    fn breakdown_lists_are_top_three() {
        let grid = ScoreGrid::poisson(1.6, 1.0, MAX_GOALS);
        let b = compute_breakdown(&grid, grid.outcome_probs(), 1.6, 1.0, 3);
        assert_eq!(b.scorelines.len(), 3);
        assert_eq!(b.half_time_scorelines.len(), 3);
        assert_eq!(b.htft.len(), 3);
        assert_eq!(b.total_goals.len(), 3);
        assert!(b.htft[0].probability >= b.htft[2].probability);
        assert_eq!(b.half_time_scorelines[0].score.to_string(), "0-0");
    }

    #[test]
    fn htft_display_uses_codes() {
        let c = HtFt {
            half_time: Outcome::Draw,
            full_time: Outcome::Home,
        };
        assert_eq!(c.to_string(), "D/H");
    }
}
