//! Oscillation critic.
//!
//! Watches the sign of the commanded x and theta velocities between cycles.
//! When a sign flips the critic pins the new sign: candidates flipping back
//! are rejected until the robot has travelled the configured reset distance
//! from where the flip happened. This stops the planner dithering between
//! two near-equal commands of opposite sign.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use super::{IllegalTrajectory, Params, TrajectoryCritic};
use crate::geom::{Pose2D, Twist2D};
use crate::path::Path;
use crate::traj_gen::Trajectory;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An active sign restriction on one command axis.
#[derive(Clone, Copy, Debug)]
struct SignRule {
    /// The only sign the axis may command while the rule holds.
    allowed_sign: f64,

    /// Where the robot was when the rule was set.
    set_at_m: Vector2<f64>,
}

pub struct OscillationCritic {
    reset_dist_m: f64,

    /// Robot position at the start of the current cycle.
    position_m: Vector2<f64>,

    /// Last twist the planner committed to.
    prev_chosen: Option<Twist2D>,

    x_rule: Option<SignRule>,
    theta_rule: Option<SignRule>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OscillationCritic {
    pub fn new(params: &Params) -> Self {
        Self {
            reset_dist_m: params.oscillation_reset_dist_m,
            position_m: Vector2::zeros(),
            prev_chosen: None,
            x_rule: None,
            theta_rule: None,
        }
    }

    /// Clear a rule once the robot has moved far enough from where it was
    /// set.
    fn expire(rule: &mut Option<SignRule>, position_m: &Vector2<f64>, reset_dist_m: f64) {
        if let Some(r) = rule {
            if (position_m - r.set_at_m).norm() > reset_dist_m {
                *rule = None;
            }
        }
    }

    fn violates(rule: &Option<SignRule>, velocity: f64) -> bool {
        match rule {
            Some(r) => velocity != 0.0 && velocity.signum() != r.allowed_sign,
            None => false,
        }
    }

    /// A rule pinning the freshly flipped sign, if `prev` and `chosen` have
    /// strictly opposite signs on this axis.
    fn flip_rule(prev: f64, chosen: f64, position_m: Vector2<f64>) -> Option<SignRule> {
        if prev != 0.0 && chosen != 0.0 && prev.signum() != chosen.signum() {
            Some(SignRule {
                allowed_sign: chosen.signum(),
                set_at_m: position_m,
            })
        } else {
            None
        }
    }
}

impl TrajectoryCritic for OscillationCritic {
    fn name(&self) -> &'static str {
        "Oscillation"
    }

    fn prepare(&mut self, pose: &Pose2D, _vel: &Twist2D, _goal: &Pose2D, _plan: &Path) -> bool {
        self.position_m = pose.position_m();

        Self::expire(&mut self.x_rule, &self.position_m, self.reset_dist_m);
        Self::expire(&mut self.theta_rule, &self.position_m, self.reset_dist_m);

        true
    }

    fn score(&mut self, traj: &Trajectory) -> Result<f64, IllegalTrajectory> {
        if Self::violates(&self.x_rule, traj.velocity.x_ms) {
            return Err(IllegalTrajectory {
                critic: self.name(),
                reason: "Oscillating commands on the x axis.".into(),
            });
        }

        if Self::violates(&self.theta_rule, traj.velocity.theta_rads) {
            return Err(IllegalTrajectory {
                critic: self.name(),
                reason: "Oscillating commands on the theta axis.".into(),
            });
        }

        Ok(0.0)
    }

    fn debrief(&mut self, chosen: &Twist2D) {
        if let Some(prev) = self.prev_chosen {
            if let Some(rule) = Self::flip_rule(prev.x_ms, chosen.x_ms, self.position_m) {
                self.x_rule = Some(rule);
            }
            if let Some(rule) =
                Self::flip_rule(prev.theta_rads, chosen.theta_rads, self.position_m)
            {
                self.theta_rule = Some(rule);
            }
        }

        self.prev_chosen = Some(*chosen);
    }

    fn reset(&mut self) {
        self.prev_chosen = None;
        self.x_rule = None;
        self.theta_rule = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn params() -> Params {
        Params {
            lethal_cost: 0.95,
            xy_goal_tolerance_m: 0.25,
            oscillation_reset_dist_m: 0.05,
        }
    }

    fn traj(velocity: Twist2D) -> Trajectory {
        Trajectory {
            poses: vec![Pose2D::default()],
            velocity,
            duration_s: 1.7,
        }
    }

    fn prepare_at(critic: &mut OscillationCritic, x_m: f64) {
        critic.prepare(
            &Pose2D::new(x_m, 0.0, 0.0),
            &Twist2D::default(),
            &Pose2D::default(),
            &Path::default(),
        );
    }

    #[test]
    fn test_flip_bans_flipping_back() {
        let mut critic = OscillationCritic::new(&params());

        prepare_at(&mut critic, 0.0);
        critic.debrief(&Twist2D::new(0.0, 0.0, 0.5));

        // Sign flip on theta, rule set
        prepare_at(&mut critic, 0.0);
        critic.debrief(&Twist2D::new(0.0, 0.0, -0.5));

        prepare_at(&mut critic, 0.0);
        assert!(critic.score(&traj(Twist2D::new(0.0, 0.0, 0.5))).is_err());
        assert!(critic.score(&traj(Twist2D::new(0.0, 0.0, -0.5))).is_ok());
        // Zero rotation is never an oscillation
        assert!(critic.score(&traj(Twist2D::new(0.1, 0.0, 0.0))).is_ok());
    }

    #[test]
    fn test_rule_expires_with_travel() {
        let mut critic = OscillationCritic::new(&params());

        prepare_at(&mut critic, 0.0);
        critic.debrief(&Twist2D::new(0.3, 0.0, 0.0));
        prepare_at(&mut critic, 0.0);
        critic.debrief(&Twist2D::new(-0.3, 0.0, 0.0));

        prepare_at(&mut critic, 0.0);
        assert!(critic.score(&traj(Twist2D::new(0.3, 0.0, 0.0))).is_err());

        // Travel past the reset distance clears the rule
        prepare_at(&mut critic, 0.1);
        assert!(critic.score(&traj(Twist2D::new(0.3, 0.0, 0.0))).is_ok());
    }

    #[test]
    fn test_reset_clears_state() {
        let mut critic = OscillationCritic::new(&params());

        prepare_at(&mut critic, 0.0);
        critic.debrief(&Twist2D::new(0.3, 0.0, 0.0));
        prepare_at(&mut critic, 0.0);
        critic.debrief(&Twist2D::new(-0.3, 0.0, 0.0));

        critic.reset();

        prepare_at(&mut critic, 0.0);
        assert!(critic.score(&traj(Twist2D::new(0.3, 0.0, 0.0))).is_ok());
    }
}
