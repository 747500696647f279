//! # Goal checkers
//!
//! Decides whether the robot has reached the end of the current plan. Two
//! checkers are available, selected by name in the parameter file: a
//! proximity checker comparing pose alone, and a stopped checker which
//! additionally requires the robot to be (nearly) stationary.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::geom::{Pose2D, Twist2D};
use util::maths::get_ang_dist_2pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Goal checking parameters.
#[derive(Clone, Debug, Deserialize)]
pub struct Params {
    /// Which checker to use.
    pub checker: GoalCheckerKind,

    /// Maximum translational distance from the goal pose.
    pub xy_goal_tolerance_m: f64,

    /// Maximum (wrapped) heading error from the goal pose.
    pub yaw_goal_tolerance_rad: f64,

    /// Translational speed below which the robot counts as stopped.
    pub trans_stopped_speed_ms: f64,

    /// Rotation speed below which the robot counts as stopped.
    pub rot_stopped_speed_rads: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCheckerKind {
    Proximity,
    Stopped,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Decides whether the robot state satisfies the goal.
pub trait GoalChecker {
    fn is_goal_reached(&self, pose: &Pose2D, velocity: &Twist2D, goal: &Pose2D) -> bool;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

/// Goal reached when the pose is within the translational and heading
/// tolerances, both boundaries inclusive.
pub struct ProximityGoalChecker {
    sq_xy_tolerance_m: f64,
    yaw_tolerance_rad: f64,
}

impl ProximityGoalChecker {
    pub fn new(params: &Params) -> Self {
        Self {
            sq_xy_tolerance_m: params.xy_goal_tolerance_m * params.xy_goal_tolerance_m,
            yaw_tolerance_rad: params.yaw_goal_tolerance_rad,
        }
    }
}

impl GoalChecker for ProximityGoalChecker {
    fn is_goal_reached(&self, pose: &Pose2D, _velocity: &Twist2D, goal: &Pose2D) -> bool {
        if pose.sq_distance_to(goal) > self.sq_xy_tolerance_m {
            return false;
        }

        get_ang_dist_2pi(pose.heading_rad, goal.heading_rad).abs() <= self.yaw_tolerance_rad
    }
}

/// Goal reached when the pose tolerances are met and the robot has come to
/// rest within the configured speed tolerances.
pub struct StoppedGoalChecker {
    proximity: ProximityGoalChecker,
    trans_stopped_speed_ms: f64,
    rot_stopped_speed_rads: f64,
}

impl StoppedGoalChecker {
    pub fn new(params: &Params) -> Self {
        Self {
            proximity: ProximityGoalChecker::new(params),
            trans_stopped_speed_ms: params.trans_stopped_speed_ms,
            rot_stopped_speed_rads: params.rot_stopped_speed_rads,
        }
    }
}

impl GoalChecker for StoppedGoalChecker {
    fn is_goal_reached(&self, pose: &Pose2D, velocity: &Twist2D, goal: &Pose2D) -> bool {
        if !self.proximity.is_goal_reached(pose, velocity, goal) {
            return false;
        }

        velocity.sq_speed_xy() <= self.trans_stopped_speed_ms * self.trans_stopped_speed_ms
            && velocity.theta_rads.abs() <= self.rot_stopped_speed_rads
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Instantiate the checker named in the parameters.
pub fn make_goal_checker(params: &Params) -> Box<dyn GoalChecker> {
    match params.checker {
        GoalCheckerKind::Proximity => Box::new(ProximityGoalChecker::new(params)),
        GoalCheckerKind::Stopped => Box::new(StoppedGoalChecker::new(params)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    fn params(checker: GoalCheckerKind) -> Params {
        Params {
            checker,
            xy_goal_tolerance_m: 0.25,
            yaw_goal_tolerance_rad: 0.25,
            trans_stopped_speed_ms: 0.25,
            rot_stopped_speed_rads: 0.25,
        }
    }

    #[test]
    fn test_proximity() {
        let checker = ProximityGoalChecker::new(&params(GoalCheckerKind::Proximity));
        let goal = Pose2D::new(1.0, 1.0, 0.0);
        let vel = Twist2D::default();

        assert!(checker.is_goal_reached(&Pose2D::new(1.0, 1.0, 0.0), &vel, &goal));
        assert!(checker.is_goal_reached(&Pose2D::new(1.1, 1.1, 0.2), &vel, &goal));
        assert!(!checker.is_goal_reached(&Pose2D::new(1.3, 1.0, 0.0), &vel, &goal));
        assert!(!checker.is_goal_reached(&Pose2D::new(1.0, 1.0, 0.3), &vel, &goal));
    }

    #[test]
    fn test_proximity_boundary_inclusive() {
        let checker = ProximityGoalChecker::new(&params(GoalCheckerKind::Proximity));
        let goal = Pose2D::default();
        let vel = Twist2D::default();

        // Exactly on the distance tolerance
        assert!(checker.is_goal_reached(&Pose2D::new(0.25, 0.0, 0.0), &vel, &goal));
        // Exactly on the heading tolerance
        assert!(checker.is_goal_reached(&Pose2D::new(0.0, 0.0, 0.25), &vel, &goal));
    }

    #[test]
    fn test_heading_wraps() {
        let checker = ProximityGoalChecker::new(&params(GoalCheckerKind::Proximity));
        let vel = Twist2D::default();

        // pi and -pi are the same heading
        let goal = Pose2D::new(0.0, 0.0, PI);
        assert!(checker.is_goal_reached(&Pose2D::new(0.0, 0.0, -PI), &vel, &goal));

        // Just over the wrap boundary
        let goal = Pose2D::new(0.0, 0.0, PI - 0.1);
        assert!(checker.is_goal_reached(&Pose2D::new(0.0, 0.0, -PI + 0.1), &vel, &goal));
    }

    #[test]
    fn test_stopped() {
        let checker = StoppedGoalChecker::new(&params(GoalCheckerKind::Stopped));
        let goal = Pose2D::new(1.0, 1.0, 0.0);
        let pose = Pose2D::new(1.0, 1.0, 0.0);

        assert!(checker.is_goal_reached(&pose, &Twist2D::default(), &goal));
        assert!(checker.is_goal_reached(&pose, &Twist2D::new(0.1, 0.0, 0.1), &goal));

        // In position but still moving
        assert!(!checker.is_goal_reached(&pose, &Twist2D::new(0.3, 0.0, 0.0), &goal));
        assert!(!checker.is_goal_reached(&pose, &Twist2D::new(0.0, 0.0, 0.3), &goal));
    }
}
