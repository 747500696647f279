//! # Trajectory critics
//!
//! Each critic scores one aspect of a candidate trajectory - progress along
//! the plan, distance to the local goal, obstacle clearance, and so on. The
//! planner sums the weighted raw scores, lower totals winning, and a critic
//! may instead reject a trajectory outright as illegal.
//!
//! Critics are instantiated by name from the parameter file through
//! [`make_critic`], so the active set and its ordering are entirely
//! configuration-driven.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod oscillation;
pub mod standard;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::rc::Rc;

// Internal
use crate::geom::{Pose2D, Twist2D};
use crate::interfaces::CostOracle;
use crate::path::Path;
use crate::traj_gen::Trajectory;
use oscillation::OscillationCritic;
use standard::{GoalDistCritic, ObstacleCritic, PathDistCritic, RotateToGoalCritic};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters shared by the built-in critics.
#[derive(Clone, Debug, Deserialize)]
pub struct Params {
    /// Obstacle cost at or above which a pose counts as a collision.
    pub lethal_cost: f64,

    /// Translational distance to the goal inside which the rotate-to-goal
    /// critic takes over.
    pub xy_goal_tolerance_m: f64,

    /// Distance the robot must travel before the oscillation critic forgets
    /// a previously banned command sign.
    pub oscillation_reset_dist_m: f64,
}

/// One critic's name and weight, as listed in the parameter file. The list
/// order is the scoring order.
#[derive(Clone, Debug, Deserialize)]
pub struct CriticConfig {
    pub name: String,
    pub weight: f64,
}

/// One critic's contribution to a trajectory's total.
#[derive(Clone, Debug, Serialize)]
pub struct CriticScore {
    pub name: String,
    pub raw_score: f64,
    pub weight: f64,
}

/// A fully scored trajectory.
#[derive(Clone, Debug, Serialize)]
pub struct TrajectoryScore {
    pub traj: Trajectory,

    /// Per-critic breakdown, in scoring order. May be truncated if scoring
    /// exited early once the running total could no longer win.
    pub scores: Vec<CriticScore>,

    /// Weighted sum over `scores`.
    pub total: f64,
}

/// A critic's verdict that a trajectory must not be commanded.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{critic}: {reason}")]
pub struct IllegalTrajectory {
    /// Name of the rejecting critic.
    pub critic: &'static str,

    /// Human-readable rejection reason, used for aggregation when no legal
    /// trajectory is found.
    pub reason: String,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A single scoring concern.
///
/// Raw scores are non-negative, lower is better. Weighting and summation are
/// the planner's job, a critic only produces the raw score or rejects the
/// trajectory as illegal.
pub trait TrajectoryCritic {
    /// The name the critic is registered under.
    fn name(&self) -> &'static str;

    /// Called once per planning cycle before any trajectory is scored.
    ///
    /// Returning false indicates the critic could not prepare (for instance
    /// an empty plan window) and its scores are unreliable this cycle.
    fn prepare(
        &mut self,
        _pose: &Pose2D,
        _velocity: &Twist2D,
        _goal: &Pose2D,
        _plan: &Path,
    ) -> bool {
        true
    }

    /// Score one candidate trajectory.
    fn score(&mut self, traj: &Trajectory) -> Result<f64, IllegalTrajectory>;

    /// Called once per cycle with the twist the planner chose.
    fn debrief(&mut self, _chosen: &Twist2D) {}

    /// Drop any state carried between cycles. Called when a new plan is set.
    fn reset(&mut self) {}
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Instantiate a critic by its registered name, or `None` if the name is
/// unknown.
pub fn make_critic(
    name: &str,
    params: &Params,
    oracle: &Rc<dyn CostOracle>,
) -> Option<Box<dyn TrajectoryCritic>> {
    match name {
        "GoalDist" => Some(Box::new(GoalDistCritic::new())),
        "PathDist" => Some(Box::new(PathDistCritic::new())),
        "Obstacle" => Some(Box::new(ObstacleCritic::new(params, oracle.clone()))),
        "RotateToGoal" => Some(Box::new(RotateToGoalCritic::new(params))),
        "Oscillation" => Some(Box::new(OscillationCritic::new(params))),
        _ => None,
    }
}
