//! Planner parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::critic::CriticConfig;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Top-of-stack planner parameters.
#[derive(Clone, Debug, Deserialize)]
pub struct Params {
    /// The working frame planning happens in. Plans arriving in another
    /// frame are transformed into this one each cycle.
    pub local_frame: String,

    /// Whether to discard plan poses the robot has passed.
    pub prune_plan: bool,

    /// Pruning and windowing horizon along the plan.
    pub prune_distance_m: f64,

    /// Log each illegal trajectory as it is rejected. Very verbose.
    pub debug_trajectory_details: bool,

    /// Keep the full per-candidate score table from the latest cycle,
    /// retrievable through [`super::LocalPlanner::last_evaluation`].
    pub record_evaluation: bool,

    /// The active critics, in scoring order.
    pub critics: Vec<CriticConfig>,
}
