/// Multipliers applied to each side's expected goals from the fixture's history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct H2hAdjustment {
    pub home: f64,
    pub away: f64,
}

impl H2hAdjustment {
    pub const NEUTRAL: H2hAdjustment = H2hAdjustment {
        home: 1.0,
        away: 1.0,
    };
}

impl Default for H2hAdjustment {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Extension point for history-based adjustment of a fixture.
pub trait HeadToHead: Send + Sync {
    fn adjustment(&self, league_code: &str, home_team: &str, away_team: &str) -> H2hAdjustment;
}

/// No history available: leaves both sides untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralHeadToHead;

impl HeadToHead for NeutralHeadToHead {
    fn adjustment(&self, _league_code: &str, _home_team: &str, _away_team: &str) -> H2hAdjustment {
        H2hAdjustment::NEUTRAL
    }
}
