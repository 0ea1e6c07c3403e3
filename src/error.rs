use thiserror::Error;

use crate::calibration::Outcome;

/// Lowest decimal price a bookmaker quote can carry.
pub const MIN_ODDS: f64 = 1.01;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("invalid {outcome} odds {value}: must be finite and at least 1.01")]
    InvalidOdds { outcome: Outcome, value: f64 },

    #[error("home and away team are the same: {team}")]
    SameTeam { team: String },

    #[error("missing {side} team name")]
    MissingTeam { side: &'static str },

    #[error("no feature data in league '{league}' for: {}", .teams.join(", "))]
    DataNotFound { league: String, teams: Vec<String> },
}

impl PredictError {
    /// Malformed odds or team selection, rejected before any lookup happens.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            PredictError::InvalidOdds { .. }
                | PredictError::SameTeam { .. }
                | PredictError::MissingTeam { .. }
        )
    }

    pub fn is_data_not_found(&self) -> bool {
        matches!(self, PredictError::DataNotFound { .. })
    }
}

pub fn check_odds(outcome: Outcome, value: f64) -> Result<f64, PredictError> {
    if value.is_finite() && value >= MIN_ODDS {
        Ok(value)
    } else {
        Err(PredictError::InvalidOdds { outcome, value })
    }
}
