//! # Local navigation library.
//!
//! A sampling-based local trajectory planner: each control cycle the planner
//! windows the global plan around the robot, sweeps a grid of candidate
//! twists, forward-simulates each candidate and scores it through a
//! configurable chain of critics, then commands the cheapest legal result.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Trajectory critics - score candidate trajectories, lower is better
pub mod critic;

/// Planar geometry value types - poses, twists and frame transforms
pub mod geom;

/// Goal checkers - decide when the end of the plan has been reached
pub mod goal_check;

/// External collaborator traits - obstacle cost queries and frame transforms
pub mod interfaces;

/// Kinematic model - the velocity and acceleration envelope of the robot
pub mod kinematics;

/// Top-level parameter file layout
pub mod params;

/// Global plan representation
pub mod path;

/// Plan windowing - extracts the section of the plan near the robot
pub mod plan_window;

/// The local planner - ties sampling, simulation and scoring together
pub mod planner;

/// Trajectory generator - forward-simulates candidate twists
pub mod traj_gen;

/// Velocity sample space - enumerates candidate twists
pub mod twist_sampler;
