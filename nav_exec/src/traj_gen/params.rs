//! Trajectory generator parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for forward simulation of candidate twists.
#[derive(Clone, Debug, Deserialize)]
pub struct Params {
    /// Total simulated time per trajectory.
    pub sim_time_s: f64,

    /// If true the trajectory is discretised into fixed time steps of
    /// `time_granularity_s`. Otherwise the step count is chosen from the
    /// projected linear and angular displacement so that no step moves the
    /// robot by more than the configured granularities.
    pub discretize_by_time: bool,

    /// Step duration when discretising by time.
    pub time_granularity_s: f64,

    /// Maximum linear displacement per step when discretising by motion.
    pub linear_granularity_m: f64,

    /// Maximum angular displacement per step when discretising by motion.
    pub angular_granularity_rad: f64,
}
