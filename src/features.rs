use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Statistical profile of one team in one league season. Every field may be missing;
/// [`TeamFeatures::resolved`] is the single place defaults are substituted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamFeatures {
    #[serde(default)]
    pub attack: Option<f64>,
    #[serde(default)]
    pub defense: Option<f64>,
    #[serde(default)]
    pub home_goals_scored_avg: Option<f64>,
    #[serde(default)]
    pub home_goals_conceded_avg: Option<f64>,
    #[serde(default)]
    pub away_goals_scored_avg: Option<f64>,
    #[serde(default)]
    pub away_goals_conceded_avg: Option<f64>,
    #[serde(default)]
    pub recent_scoring_rate: Option<f64>,
    #[serde(default)]
    pub recent_conceding_rate: Option<f64>,
    #[serde(default, alias = "recent_form")]
    pub form: Option<f64>,
    #[serde(default, rename = "xG")]
    pub xg: Option<f64>,
    #[serde(default, rename = "xGA")]
    pub xga: Option<f64>,
}

/// Feature record with every default applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedFeatures {
    pub attack: f64,
    pub defense: f64,
    pub home_goals_scored_avg: f64,
    pub home_goals_conceded_avg: f64,
    pub away_goals_scored_avg: f64,
    pub away_goals_conceded_avg: f64,
    pub recent_scoring_rate: f64,
    pub recent_conceding_rate: f64,
    pub form: f64,
    pub xg: f64,
    pub xga: f64,
}

impl ResolvedFeatures {
    pub const DEFAULTS: ResolvedFeatures = ResolvedFeatures {
        attack: 1.3,
        defense: 1.2,
        home_goals_scored_avg: 1.3,
        home_goals_conceded_avg: 1.1,
        away_goals_scored_avg: 1.1,
        away_goals_conceded_avg: 1.3,
        recent_scoring_rate: 1.2,
        recent_conceding_rate: 1.1,
        form: 1.0,
        xg: 1.2,
        xga: 1.1,
    };
}

impl TeamFeatures {
    pub fn resolved(&self) -> ResolvedFeatures {
        let d = ResolvedFeatures::DEFAULTS;
        ResolvedFeatures {
            attack: or_default(self.attack, d.attack),
            defense: or_default(self.defense, d.defense),
            home_goals_scored_avg: or_default(self.home_goals_scored_avg, d.home_goals_scored_avg),
            home_goals_conceded_avg: or_default(
                self.home_goals_conceded_avg,
                d.home_goals_conceded_avg,
            ),
            away_goals_scored_avg: or_default(self.away_goals_scored_avg, d.away_goals_scored_avg),
            away_goals_conceded_avg: or_default(
                self.away_goals_conceded_avg,
                d.away_goals_conceded_avg,
            ),
            recent_scoring_rate: or_default(self.recent_scoring_rate, d.recent_scoring_rate),
            recent_conceding_rate: or_default(self.recent_conceding_rate, d.recent_conceding_rate),
            form: or_default(self.form, d.form),
            xg: or_default(self.xg, d.xg),
            xga: or_default(self.xga, d.xga),
        }
    }
}

// NaN/inf from upstream CSV conversions count as missing.
fn or_default(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(default)
}

/// Read-only `(league, team) -> features` lookup the predictor is handed.
pub trait FeatureLookup: Send + Sync {
    fn team_features(&self, league_code: &str, team: &str) -> Option<&TeamFeatures>;

    /// League a fixture is modelled under. A blank code resolves to a league holding
    /// both teams; `None` when no single league does.
    fn fixture_league(
        &self,
        league_code: &str,
        home_team: &str,
        away_team: &str,
    ) -> Option<String>;
}

/// In-memory feature tables keyed by league code, then team name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureStore {
    leagues: BTreeMap<String, HashMap<String, TeamFeatures>>,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, league_code: &str, team: &str, features: TeamFeatures) {
        self.leagues
            .entry(league_code.to_string())
            .or_default()
            .insert(team.to_string(), features);
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("parse team feature json")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read team features from {}", path.display()))?;
        let store = Self::from_json_str(&raw)
            .with_context(|| format!("in {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            leagues = store.leagues.len(),
            teams = store.team_count(),
            "loaded team features"
        );
        Ok(store)
    }

    pub fn team_count(&self) -> usize {
        self.leagues.values().map(HashMap::len).sum()
    }

    pub fn league_codes(&self) -> impl Iterator<Item = &str> {
        self.leagues.keys().map(String::as_str)
    }

    pub fn teams(&self, league_code: &str) -> Vec<&str> {
        let mut teams: Vec<&str> = self
            .leagues
            .get(league_code)
            .map(|t| t.keys().map(String::as_str).collect())
            .unwrap_or_default();
        teams.sort_unstable();
        teams
    }
}

impl FeatureLookup for FeatureStore {
    fn team_features(&self, league_code: &str, team: &str) -> Option<&TeamFeatures> {
        self.leagues.get(league_code.trim())?.get(team)
    }

    fn fixture_league(
        &self,
        league_code: &str,
        home_team: &str,
        away_team: &str,
    ) -> Option<String> {
        let league_code = league_code.trim();
        if !league_code.is_empty() {
            return Some(league_code.to_string());
        }
        // First league in lexical order that knows both sides.
        self.leagues
            .iter()
            .find(|(_, teams)| teams.contains_key(home_team) && teams.contains_key(away_team))
            .map(|(code, _)| code.clone())
    }
}
