pub mod batch;
pub mod breakdown;
pub mod calibration;
pub mod config;
pub mod error;
pub mod export;
pub mod features;
pub mod head_to_head;
pub mod league_params;
pub mod logging;
pub mod parlay;
pub mod report;
pub mod score_grid;
pub mod slip;
pub mod win_prob;
