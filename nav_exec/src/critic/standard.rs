//! Stateless critics: goal distance, path distance, obstacle clearance and
//! rotate-to-goal.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::rc::Rc;

// Internal
use super::{IllegalTrajectory, Params, TrajectoryCritic};
use crate::geom::{Pose2D, Twist2D};
use crate::interfaces::CostOracle;
use crate::path::Path;
use crate::traj_gen::Trajectory;
use util::maths::get_ang_dist_2pi;

// ---------------------------------------------------------------------------
// GOAL DISTANCE
// ---------------------------------------------------------------------------

/// Scores the distance between the trajectory's final pose and the local
/// goal. Drives progress towards the end of the plan window.
pub struct GoalDistCritic {
    goal: Pose2D,
}

impl GoalDistCritic {
    pub fn new() -> Self {
        Self {
            goal: Pose2D::default(),
        }
    }
}

impl TrajectoryCritic for GoalDistCritic {
    fn name(&self) -> &'static str {
        "GoalDist"
    }

    fn prepare(&mut self, _pose: &Pose2D, _vel: &Twist2D, goal: &Pose2D, _plan: &Path) -> bool {
        self.goal = *goal;
        true
    }

    fn score(&mut self, traj: &Trajectory) -> Result<f64, IllegalTrajectory> {
        match traj.poses.last() {
            Some(end) => Ok(end.sq_distance_to(&self.goal).sqrt()),
            None => Err(IllegalTrajectory {
                critic: self.name(),
                reason: "Empty trajectory.".into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// PATH DISTANCE
// ---------------------------------------------------------------------------

/// Scores how far the trajectory's final pose strays from the plan window.
pub struct PathDistCritic {
    plan: Vec<Pose2D>,
}

impl PathDistCritic {
    pub fn new() -> Self {
        Self { plan: Vec::new() }
    }
}

impl TrajectoryCritic for PathDistCritic {
    fn name(&self) -> &'static str {
        "PathDist"
    }

    fn prepare(&mut self, _pose: &Pose2D, _vel: &Twist2D, _goal: &Pose2D, plan: &Path) -> bool {
        self.plan = plan.poses.clone();
        !self.plan.is_empty()
    }

    fn score(&mut self, traj: &Trajectory) -> Result<f64, IllegalTrajectory> {
        let end = match traj.poses.last() {
            Some(end) => end,
            None => {
                return Err(IllegalTrajectory {
                    critic: self.name(),
                    reason: "Empty trajectory.".into(),
                })
            }
        };

        let sq_dist = self
            .plan
            .iter()
            .map(|pose| end.sq_distance_to(pose))
            .fold(f64::INFINITY, f64::min);

        Ok(sq_dist.sqrt())
    }
}

// ---------------------------------------------------------------------------
// OBSTACLE
// ---------------------------------------------------------------------------

/// Scores the worst obstacle cost along the trajectory and rejects any
/// trajectory touching lethal cost.
pub struct ObstacleCritic {
    oracle: Rc<dyn CostOracle>,
    lethal_cost: f64,
}

impl ObstacleCritic {
    pub fn new(params: &Params, oracle: Rc<dyn CostOracle>) -> Self {
        Self {
            oracle,
            lethal_cost: params.lethal_cost,
        }
    }
}

impl TrajectoryCritic for ObstacleCritic {
    fn name(&self) -> &'static str {
        "Obstacle"
    }

    fn score(&mut self, traj: &Trajectory) -> Result<f64, IllegalTrajectory> {
        if traj.poses.is_empty() {
            return Err(IllegalTrajectory {
                critic: self.name(),
                reason: "Empty trajectory.".into(),
            });
        }

        let mut worst = 0.0f64;

        for pose in &traj.poses {
            let cost = self.oracle.obstacle_cost(pose);

            if cost >= self.lethal_cost {
                return Err(IllegalTrajectory {
                    critic: self.name(),
                    reason: "Trajectory hits lethal obstacle cost.".into(),
                });
            }

            worst = worst.max(cost);
        }

        Ok(worst)
    }
}

// ---------------------------------------------------------------------------
// ROTATE TO GOAL
// ---------------------------------------------------------------------------

/// Forces the final in-place rotation onto the goal heading.
///
/// Outside the goal's translational tolerance this critic scores everything
/// zero. Inside it, translating trajectories are rejected and pure rotations
/// are scored by their final heading error.
pub struct RotateToGoalCritic {
    sq_xy_tolerance_m: f64,
    goal_heading_rad: f64,
    in_window: bool,
}

impl RotateToGoalCritic {
    pub fn new(params: &Params) -> Self {
        Self {
            sq_xy_tolerance_m: params.xy_goal_tolerance_m * params.xy_goal_tolerance_m,
            goal_heading_rad: 0.0,
            in_window: false,
        }
    }
}

impl TrajectoryCritic for RotateToGoalCritic {
    fn name(&self) -> &'static str {
        "RotateToGoal"
    }

    fn prepare(&mut self, pose: &Pose2D, _vel: &Twist2D, goal: &Pose2D, _plan: &Path) -> bool {
        self.goal_heading_rad = goal.heading_rad;
        self.in_window = pose.sq_distance_to(goal) <= self.sq_xy_tolerance_m;
        true
    }

    fn score(&mut self, traj: &Trajectory) -> Result<f64, IllegalTrajectory> {
        if !self.in_window {
            return Ok(0.0);
        }

        if traj.velocity.x_ms != 0.0 || traj.velocity.y_ms != 0.0 {
            return Err(IllegalTrajectory {
                critic: self.name(),
                reason: "Nonrotation command near goal.".into(),
            });
        }

        let end_heading_rad = match traj.poses.last() {
            Some(end) => end.heading_rad,
            None => {
                return Err(IllegalTrajectory {
                    critic: self.name(),
                    reason: "Empty trajectory.".into(),
                })
            }
        };

        Ok(get_ang_dist_2pi(end_heading_rad, self.goal_heading_rad).abs())
    }
}
