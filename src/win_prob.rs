use serde::{Deserialize, Serialize};

use crate::breakdown::{Breakdown, compute_breakdown};
use crate::calibration::{self, Outcome, Prob3};
use crate::error::{PredictError, check_odds};
use crate::features::{FeatureLookup, ResolvedFeatures, TeamFeatures};
use crate::head_to_head::{H2hAdjustment, HeadToHead, NeutralHeadToHead};
use crate::league_params::{LeagueCalibration, LeagueParams};
use crate::score_grid::{MAX_GOALS, ScoreGrid};

// Blend weights for a side's attack/defense rating.
const W_VENUE_AVG: f64 = 0.4;
const W_RATING: f64 = 0.3;
const W_RECENT: f64 = 0.2;
const W_XG: f64 = 0.1;

// Expected goals = own attack, opponent defense, own form.
const XG_ATTACK: f64 = 0.5;
const XG_OPP_DEFENSE: f64 = 0.3;
const XG_FORM: f64 = 0.1;

const MIN_HOME_XG: f64 = 0.3;
const MIN_AWAY_XG: f64 = 0.2;

const STRONG_EV: f64 = 0.05;

pub const DEFAULT_TOP_N: usize = 3;

/// One fixture as entered by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchInput {
    #[serde(default)]
    pub league_code: String,
    pub home_team: String,
    pub away_team: String,
    pub home_odds: f64,
    pub draw_odds: f64,
    pub away_odds: f64,
}

impl MatchInput {
    pub fn new(
        league_code: &str,
        home_team: &str,
        away_team: &str,
        home_odds: f64,
        draw_odds: f64,
        away_odds: f64,
    ) -> Self {
        Self {
            league_code: league_code.to_string(),
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            home_odds,
            draw_odds,
            away_odds,
        }
    }

    pub fn odds(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home_odds,
            Outcome::Draw => self.draw_odds,
            Outcome::Away => self.away_odds,
        }
    }

    pub fn label(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }

    /// Rejects bad odds and team selections before anything is looked up.
    pub fn validate(&self) -> Result<(), PredictError> {
        for outcome in Outcome::ALL {
            check_odds(outcome, self.odds(outcome))?;
        }
        let home = self.home_team.trim();
        let away = self.away_team.trim();
        if home.is_empty() {
            return Err(PredictError::MissingTeam { side: "home" });
        }
        if away.is_empty() {
            return Err(PredictError::MissingTeam { side: "away" });
        }
        if home.eq_ignore_ascii_case(away) {
            return Err(PredictError::SameTeam {
                team: home.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetLeg {
    pub outcome: Outcome,
    pub expected_value: f64,
    pub odds: f64,
    pub probability: f64,
}

impl BetLeg {
    pub fn new(outcome: Outcome, probability: f64, odds: f64) -> Self {
        Self {
            outcome,
            expected_value: probability * odds - 1.0,
            odds,
            probability,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Strong,
    Value,
    Caution,
}

impl Recommendation {
    pub fn for_ev(ev: f64) -> Self {
        if ev > STRONG_EV {
            Recommendation::Strong
        } else if ev > 0.0 {
            Recommendation::Value
        } else {
            Recommendation::Caution
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Recommendation::Strong => "strong",
            Recommendation::Value => "value",
            Recommendation::Caution => "caution",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedGoals {
    pub home: f64,
    pub away: f64,
}

/// What the bookmaker's prices imply, for display next to the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketView {
    pub implied: Prob3,
    pub overround: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPrediction {
    pub league_code: String,
    pub home_team: String,
    pub away_team: String,
    pub home_win_prob: f64,
    pub draw_prob: f64,
    pub away_win_prob: f64,
    pub home_odds: f64,
    pub draw_odds: f64,
    pub away_odds: f64,
    pub expected_goals: ExpectedGoals,
    /// Exactly three legs, best expected value first.
    pub bets: Vec<BetLeg>,
    pub best_bet: Outcome,
    pub best_ev: f64,
    pub recommendation: Recommendation,
    pub market: MarketView,
    pub breakdown: Breakdown,
}

impl MatchPrediction {
    pub fn match_label(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }

    pub fn probs(&self) -> Prob3 {
        Prob3 {
            home: self.home_win_prob,
            draw: self.draw_prob,
            away: self.away_win_prob,
        }
    }

    pub fn bet(&self, outcome: Outcome) -> Option<&BetLeg> {
        self.bets.iter().find(|b| b.outcome == outcome)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamStrength {
    pub attack: f64,
    pub defense: f64,
}

pub fn home_strength(f: &ResolvedFeatures) -> TeamStrength {
    TeamStrength {
        attack: blend(f.home_goals_scored_avg, f.attack, f.recent_scoring_rate, f.xg),
        defense: blend(f.home_goals_conceded_avg, f.defense, f.recent_conceding_rate, f.xga),
    }
}

pub fn away_strength(f: &ResolvedFeatures) -> TeamStrength {
    TeamStrength {
        attack: blend(f.away_goals_scored_avg, f.attack, f.recent_scoring_rate, f.xg),
        defense: blend(f.away_goals_conceded_avg, f.defense, f.recent_conceding_rate, f.xga),
    }
}

fn blend(venue_avg: f64, rating: f64, recent: f64, xg_proxy: f64) -> f64 {
    venue_avg * W_VENUE_AVG + rating * W_RATING + recent * W_RECENT + xg_proxy * W_XG
}

pub fn expected_goals(
    home: &ResolvedFeatures,
    away: &ResolvedFeatures,
    params: LeagueParams,
    h2h: H2hAdjustment,
) -> ExpectedGoals {
    let hs = home_strength(home);
    let aws = away_strength(away);

    let home_xg = (hs.attack * XG_ATTACK + aws.defense * XG_OPP_DEFENSE + home.form * XG_FORM)
        * params.home_advantage
        * h2h.home;
    let away_xg =
        (aws.attack * XG_ATTACK + hs.defense * XG_OPP_DEFENSE + away.form * XG_FORM) * h2h.away;

    ExpectedGoals {
        home: floor_xg(home_xg, MIN_HOME_XG),
        away: floor_xg(away_xg, MIN_AWAY_XG),
    }
}

// NaN from a misbehaving head-to-head hook lands on the floor too.
fn floor_xg(v: f64, min: f64) -> f64 {
    if v.is_finite() { v.max(min) } else { min }
}

/// Three legs sorted by expected value, best first. Exact ties keep home, draw, away order.
pub fn rank_bets(probs: Prob3, input: &MatchInput) -> Vec<BetLeg> {
    let mut bets: Vec<BetLeg> = Outcome::ALL
        .iter()
        .map(|o| BetLeg::new(*o, probs.get(*o), input.odds(*o)))
        .collect();
    bets.sort_by(|a, b| b.expected_value.total_cmp(&a.expected_value));
    bets
}

/// Runs the model on one fixture. Either both feature records are present or the call
/// fails with every missing team named; nothing is computed before validation passes.
pub fn predict_match(
    input: &MatchInput,
    home_features: Option<&TeamFeatures>,
    away_features: Option<&TeamFeatures>,
    params: LeagueParams,
    h2h: H2hAdjustment,
    top_n: usize,
) -> Result<MatchPrediction, PredictError> {
    input.validate()?;

    let (home_features, away_features) = match (home_features, away_features) {
        (Some(h), Some(a)) => (h, a),
        (h, a) => {
            let mut teams = Vec::new();
            if h.is_none() {
                teams.push(input.home_team.clone());
            }
            if a.is_none() {
                teams.push(input.away_team.clone());
            }
            return Err(PredictError::DataNotFound {
                league: input.league_code.clone(),
                teams,
            });
        }
    };

    let xg = expected_goals(
        &home_features.resolved(),
        &away_features.resolved(),
        params,
        h2h,
    );
    let grid = ScoreGrid::poisson(xg.home, xg.away, MAX_GOALS);
    let raw = grid.outcome_probs();
    let probs = calibration::apply_draw_adjustment(raw, params.draw_adjustment);

    tracing::debug!(
        home = %input.home_team,
        away = %input.away_team,
        xg_home = xg.home,
        xg_away = xg.away,
        p_home = probs.home,
        p_draw = probs.draw,
        p_away = probs.away,
        "match modelled"
    );

    let bets = rank_bets(probs, input);
    let best = bets[0];
    let (implied, overround) =
        calibration::implied_probs(input.home_odds, input.draw_odds, input.away_odds);
    let breakdown = compute_breakdown(&grid, probs, xg.home, xg.away, top_n);

    Ok(MatchPrediction {
        league_code: input.league_code.clone(),
        home_team: input.home_team.clone(),
        away_team: input.away_team.clone(),
        home_win_prob: probs.home,
        draw_prob: probs.draw,
        away_win_prob: probs.away,
        home_odds: input.home_odds,
        draw_odds: input.draw_odds,
        away_odds: input.away_odds,
        expected_goals: xg,
        best_bet: best.outcome,
        best_ev: best.expected_value,
        recommendation: Recommendation::for_ev(best.expected_value),
        bets,
        market: MarketView { implied, overround },
        breakdown,
    })
}

static NEUTRAL_H2H: NeutralHeadToHead = NeutralHeadToHead;

/// The model wired to its collaborators: feature lookup, league tables, head-to-head hook.
#[derive(Clone, Copy)]
pub struct Predictor<'a> {
    features: &'a dyn FeatureLookup,
    calibration: &'a LeagueCalibration,
    head_to_head: &'a dyn HeadToHead,
    top_n: usize,
}

impl<'a> Predictor<'a> {
    pub fn new(features: &'a dyn FeatureLookup, calibration: &'a LeagueCalibration) -> Self {
        Self {
            features,
            calibration,
            head_to_head: &NEUTRAL_H2H,
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_head_to_head(mut self, head_to_head: &'a dyn HeadToHead) -> Self {
        self.head_to_head = head_to_head;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// A blank league code is resolved to the one league holding both teams; its
    /// calibration then applies and the prediction carries that code.
    pub fn predict(&self, input: &MatchInput) -> Result<MatchPrediction, PredictError> {
        let league = self.features.fixture_league(
            &input.league_code,
            &input.home_team,
            &input.away_team,
        );
        let Some(league) = league else {
            return predict_match(
                input,
                None,
                None,
                self.calibration.params(&input.league_code),
                H2hAdjustment::NEUTRAL,
                self.top_n,
            );
        };

        let mut resolved = input.clone();
        resolved.league_code = league;
        let home = self
            .features
            .team_features(&resolved.league_code, &resolved.home_team);
        let away = self
            .features
            .team_features(&resolved.league_code, &resolved.away_team);
        let h2h = self.head_to_head.adjustment(
            &resolved.league_code,
            &resolved.home_team,
            &resolved.away_team,
        );
        predict_match(
            &resolved,
            home,
            away,
            self.calibration.params(&resolved.league_code),
            h2h,
            self.top_n,
        )
    }
}
