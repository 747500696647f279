//! Top-level parameter file layout

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::kinematics::KinematicLimits;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The full planner parameter file. Each field is one section of the TOML
/// file.
#[derive(Clone, Debug, Deserialize)]
pub struct Params {
    pub kinematics: KinematicLimits,
    pub sampler: crate::twist_sampler::Params,
    pub traj_gen: crate::traj_gen::Params,
    pub goal_check: crate::goal_check::Params,
    pub critic: crate::critic::Params,
    pub planner: crate::planner::Params,
}
