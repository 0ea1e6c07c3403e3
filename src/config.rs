use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::batch::BatchPolicy;
use crate::features::FeatureStore;
use crate::league_params::LeagueCalibration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Team feature store (JSON).
    pub features_path: PathBuf,
    /// Optional league calibration overrides (JSON).
    pub calibration_path: Option<PathBuf>,
    /// Length of the scoreline / HT-FT / goal bucket lists.
    pub top_n: usize,
    /// Runner-up parlays shown after the best one.
    pub alternates: usize,
    /// Largest batch the binaries will enumerate parlays for.
    pub max_matches: usize,
    pub batch_policy: BatchPolicy,
}

impl Config {
    /// `.env.local` takes precedence over `.env`; real environment variables over both.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any `key -> value` source. Unparsable values are errors;
    /// out-of-range numbers are clamped.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let skip_missing = match lookup("PARLAY_SKIP_MISSING") {
            Some(raw) => raw.trim().parse::<bool>().with_context(|| {
                format!("PARLAY_SKIP_MISSING must be true or false, got '{raw}'")
            })?,
            None => true,
        };

        Ok(Config {
            features_path: lookup("PARLAY_FEATURES_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/team_features.json")),

            calibration_path: lookup("PARLAY_CALIBRATION_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),

            top_n: parse_usize(&lookup, "PARLAY_TOP_N", 3)?.clamp(1, 10),

            alternates: parse_usize(&lookup, "PARLAY_ALTERNATES", 10)?.min(50),

            max_matches: parse_usize(&lookup, "PARLAY_MAX_MATCHES", 10)?.clamp(1, 12),

            batch_policy: if skip_missing {
                BatchPolicy::Skip
            } else {
                BatchPolicy::Abort
            },
        })
    }

    pub fn load_features(&self) -> Result<FeatureStore> {
        FeatureStore::load(&self.features_path)
    }

    /// Built-in league tables, with the overrides file merged on top when configured.
    pub fn load_calibration(&self) -> Result<LeagueCalibration> {
        match &self.calibration_path {
            Some(path) => LeagueCalibration::load_with_overrides(path),
            None => Ok(LeagueCalibration::default()),
        }
    }
}

fn parse_usize(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: usize,
) -> Result<usize> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .with_context(|| format!("{key} must be a non-negative integer, got '{raw}'")),
        None => Ok(default),
    }
}
