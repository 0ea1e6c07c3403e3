use std::fmt;

use serde::{Deserialize, Serialize};

use crate::calibration::{Outcome, Prob3, classify_outcome};

/// Full-time grid cutoff. Fixed; the grid is never widened based on the odds.
pub const MAX_GOALS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scoreline {
    pub home: u32,
    pub away: u32,
}

impl Scoreline {
    pub fn outcome(self) -> Outcome {
        classify_outcome(self.home, self.away)
    }

    pub fn total_goals(self) -> u32 {
        self.home + self.away
    }
}

impl fmt::Display for Scoreline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreProb {
    pub score: Scoreline,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalBucket {
    #[serde(rename = "0-1")]
    ZeroToOne,
    #[serde(rename = "2-3")]
    TwoToThree,
    #[serde(rename = "4-6")]
    FourToSix,
    #[serde(rename = "7+")]
    SevenPlus,
}

impl GoalBucket {
    pub const ALL: [GoalBucket; 4] = [
        GoalBucket::ZeroToOne,
        GoalBucket::TwoToThree,
        GoalBucket::FourToSix,
        GoalBucket::SevenPlus,
    ];

    pub fn for_total(goals: u32) -> Self {
        match goals {
            0..=1 => GoalBucket::ZeroToOne,
            2..=3 => GoalBucket::TwoToThree,
            4..=6 => GoalBucket::FourToSix,
            _ => GoalBucket::SevenPlus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GoalBucket::ZeroToOne => "0-1",
            GoalBucket::TwoToThree => "2-3",
            GoalBucket::FourToSix => "4-6",
            GoalBucket::SevenPlus => "7+",
        }
    }
}

impl fmt::Display for GoalBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalBucketProb {
    pub bucket: GoalBucket,
    pub probability: f64,
}

/// Joint distribution over (home goals, away goals), both in `0..=max_goals`,
/// normalized so the cells sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreGrid {
    max_goals: u32,
    // Row-major: home goals pick the row.
    cells: Vec<f64>,
}

impl ScoreGrid {
    /// Independent Poisson goals for each side, truncated at `max_goals` and renormalized.
    pub fn poisson(lambda_home: f64, lambda_away: f64, max_goals: u32) -> Self {
        let pmf_h = poisson_pmf(lambda_home, max_goals);
        let pmf_a = poisson_pmf(lambda_away, max_goals);

        let mut cells = Vec::with_capacity(pmf_h.len() * pmf_a.len());
        for p_i in &pmf_h {
            for p_j in &pmf_a {
                cells.push(p_i * p_j);
            }
        }

        let total: f64 = cells.iter().sum();
        if total.is_finite() && total > 0.0 {
            for c in &mut cells {
                *c /= total;
            }
        } else {
            let n = cells.len() as f64;
            cells.iter_mut().for_each(|c| *c = 1.0 / n);
        }

        Self { max_goals, cells }
    }

    pub fn max_goals(&self) -> u32 {
        self.max_goals
    }

    pub fn prob(&self, home: u32, away: u32) -> f64 {
        if home > self.max_goals || away > self.max_goals {
            return 0.0;
        }
        let side = (self.max_goals + 1) as usize;
        self.cells[home as usize * side + away as usize]
    }

    pub fn total(&self) -> f64 {
        self.cells.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Scoreline, f64)> + '_ {
        let side = (self.max_goals + 1) as usize;
        self.cells.iter().enumerate().map(move |(idx, p)| {
            let score = Scoreline {
                home: (idx / side) as u32,
                away: (idx % side) as u32,
            };
            (score, *p)
        })
    }

    pub fn outcome_probs(&self) -> Prob3 {
        let mut out = Prob3 {
            home: 0.0,
            draw: 0.0,
            away: 0.0,
        };
        for (score, p) in self.iter() {
            match score.outcome() {
                Outcome::Home => out.home += p,
                Outcome::Draw => out.draw += p,
                Outcome::Away => out.away += p,
            }
        }
        out
    }

    /// Most likely exact scores. Ties keep grid order (fewer home goals first).
    pub fn top_scorelines(&self, n: usize) -> Vec<ScoreProb> {
        let all: Vec<ScoreProb> = self
            .iter()
            .map(|(score, probability)| ScoreProb { score, probability })
            .collect();
        top_n(all, n, |s| s.probability)
    }

    pub fn goal_buckets(&self) -> Vec<GoalBucketProb> {
        let mut sums = [0.0_f64; 4];
        for (score, p) in self.iter() {
            let idx = GoalBucket::ALL
                .iter()
                .position(|b| *b == GoalBucket::for_total(score.total_goals()))
                .unwrap_or(GoalBucket::ALL.len() - 1);
            sums[idx] += p;
        }
        GoalBucket::ALL
            .iter()
            .zip(sums)
            .map(|(bucket, probability)| GoalBucketProb {
                bucket: *bucket,
                probability,
            })
            .collect()
    }

    pub fn top_goal_buckets(&self, n: usize) -> Vec<GoalBucketProb> {
        top_n(self.goal_buckets(), n, |b| b.probability)
    }
}

/// `exp(-λ) λ^k / k!` for `k in 0..=max_k`, via the multiplicative recurrence.
pub fn poisson_pmf(lambda: f64, max_k: u32) -> Vec<f64> {
    let max_k = max_k as usize;
    let mut out = vec![0.0; max_k + 1];
    let lambda = lambda.max(0.0);

    out[0] = (-lambda).exp();
    for k in 1..=max_k {
        out[k] = out[k - 1] * lambda / k as f64;
    }
    out
}

/// Stable descending sort on `key`, truncated to `n`.
pub(crate) fn top_n<T>(mut items: Vec<T>, n: usize, key: impl Fn(&T) -> f64) -> Vec<T> {
    items.sort_by(|a, b| key(b).total_cmp(&key(a)));
    items.truncate(n);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factorial(n: u32) -> f64 {
        (1..=n).map(f64::from).product()
    }

    #[test]
    fn pmf_matches_closed_form() {
        let lambda = 1.7;
        let pmf = poisson_pmf(lambda, 6);
        for (k, p) in pmf.iter().enumerate() {
            let expected = (-lambda).exp() * lambda.powi(k as i32) / factorial(k as u32);
            assert!((p - expected).abs() < 1e-12, "k={k}");
        }
    }

    #[test]
    fn grid_sums_to_one() {
        for (h, a) in [(0.3, 0.2), (1.4, 1.1), (3.5, 0.4), (4.8, 4.8)] {
            let grid = ScoreGrid::poisson(h, a, MAX_GOALS);
            assert!((grid.total() - 1.0).abs() < 1e-9, "lambda=({h},{a})");
            assert!((grid.outcome_probs().sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn cells_are_proportional_to_pmf_products() {
        let grid = ScoreGrid::poisson(1.5, 1.0, MAX_GOALS);
        let ph = poisson_pmf(1.5, MAX_GOALS);
        let pa = poisson_pmf(1.0, MAX_GOALS);
        let ratio = grid.prob(1, 0) / (ph[1] * pa[0]);
        let ratio2 = grid.prob(3, 2) / (ph[3] * pa[2]);
        assert!((ratio - ratio2).abs() < 1e-9);
        assert_eq!(grid.prob(6, 0), 0.0);
    }

    #[test]
    fn stronger_home_side_wins_more() {
        let p = ScoreGrid::poisson(2.2, 0.8, MAX_GOALS).outcome_probs();
        assert!(p.home > p.away);
        assert!(p.home > p.draw);
    }

    #[test]
    fn top_scorelines_sorted_and_bounded() {
        let grid = ScoreGrid::poisson(1.3, 1.1, MAX_GOALS);
        let top = grid.top_scorelines(3);
        assert_eq!(top.len(), 3);
        assert!(top[0].probability >= top[1].probability);
        assert!(top[1].probability >= top[2].probability);
        assert_eq!(top[0].score, Scoreline { home: 1, away: 1 });
    }

    #[test]
    fn goal_buckets_cover_grid() {
        let grid = ScoreGrid::poisson(2.0, 1.6, MAX_GOALS);
        let buckets = grid.goal_buckets();
        assert_eq!(buckets.len(), 4);
        let sum: f64 = buckets.iter().map(|b| b.probability).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(buckets[3].probability > 0.0);
        assert_eq!(GoalBucket::for_total(7), GoalBucket::SevenPlus);
        assert_eq!(GoalBucket::for_total(10), GoalBucket::SevenPlus);
    }

    #[test]
    fn scoreline_display() {
        assert_eq!(Scoreline { home: 2, away: 1 }.to_string(), "2-1");
    }
}
