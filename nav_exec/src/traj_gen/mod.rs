//! # Trajectory generator
//!
//! Forward-simulates a candidate twist into a time-stamped sequence of
//! poses over a fixed horizon. The simulated velocity ramps towards the
//! target twist under the per-axis acceleration and deceleration limits,
//! and each pose step integrates the body-frame velocity rotated into the
//! world frame at the pre-step heading.
//!
//! Generation is a pure function of its inputs and the configured limits:
//! identical inputs reproduce identical trajectories bit-for-bit. Commands
//! the robot cannot reach within the horizon still produce a (short)
//! trajectory - legality is decided by the critics, not here.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::geom::{Pose2D, Twist2D};
use crate::kinematics::{project_velocity, KinematicLimits};
use crate::twist_sampler::SamplerPolicy;
pub use params::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A forward-simulated trajectory.
///
/// Produced fresh per candidate and never mutated afterwards. The first
/// pose is always the start pose, followed by one pose per simulation step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Trajectory {
    /// The simulated pose sequence.
    pub poses: Vec<Pose2D>,

    /// The candidate twist this trajectory simulates.
    pub velocity: Twist2D,

    /// Total simulated duration.
    pub duration_s: f64,
}

/// Integrates candidate twists over the simulation horizon.
pub struct TrajectoryGenerator {
    params: Params,
    limits: KinematicLimits,

    /// Whether the simulated velocity ramps towards the target under the
    /// acceleration limits. Dynamic-window candidates are already
    /// reachability-limited by the sampler, so they apply the target
    /// directly.
    ramp_velocity: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryGenerator {
    pub fn new(params: Params, limits: KinematicLimits, policy: SamplerPolicy) -> Self {
        Self {
            params,
            limits,
            ramp_velocity: policy == SamplerPolicy::StaticLimits,
        }
    }

    /// Simulate holding `target` from the given start state over the
    /// configured horizon.
    pub fn generate(
        &self,
        start_pose: &Pose2D,
        start_vel: &Twist2D,
        target: &Twist2D,
    ) -> Trajectory {
        let steps = self.time_steps(target);

        let mut poses = Vec::with_capacity(steps.len() + 1);
        poses.push(*start_pose);

        let mut pose = *start_pose;
        let mut vel = *start_vel;

        for dt_s in steps {
            vel = if self.ramp_velocity {
                self.next_velocity(target, &vel, dt_s)
            } else {
                *target
            };
            pose = next_position(&pose, &vel, dt_s);
            poses.push(pose);
        }

        Trajectory {
            poses,
            velocity: *target,
            duration_s: self.params.sim_time_s,
        }
    }

    /// Compute the per-step durations for a candidate twist.
    ///
    /// Always at least one step, so even a near-zero command produces a
    /// two-pose trajectory spanning the full horizon.
    fn time_steps(&self, target: &Twist2D) -> Vec<f64> {
        let num_steps = if self.params.discretize_by_time {
            (self.params.sim_time_s / self.params.time_granularity_s).ceil() as usize
        } else {
            let lin_dist = target.x_ms.hypot(target.y_ms) * self.params.sim_time_s;
            let ang_dist = target.theta_rads.abs() * self.params.sim_time_s;

            let lin_steps = (lin_dist / self.params.linear_granularity_m).ceil() as usize;
            let ang_steps = (ang_dist / self.params.angular_granularity_rad).ceil() as usize;
            lin_steps.max(ang_steps)
        };
        let num_steps = num_steps.max(1);

        vec![self.params.sim_time_s / num_steps as f64; num_steps]
    }

    /// The velocity reached after `dt_s` of moving towards `target` from
    /// `vel`, each axis limited independently by its own acceleration and
    /// deceleration limits.
    fn next_velocity(&self, target: &Twist2D, vel: &Twist2D, dt_s: f64) -> Twist2D {
        Twist2D {
            x_ms: project_velocity(
                vel.x_ms,
                self.limits.acc_lim_x_mss,
                self.limits.decel_lim_x_mss,
                dt_s,
                target.x_ms,
            ),
            y_ms: project_velocity(
                vel.y_ms,
                self.limits.acc_lim_y_mss,
                self.limits.decel_lim_y_mss,
                dt_s,
                target.y_ms,
            ),
            theta_rads: project_velocity(
                vel.theta_rads,
                self.limits.acc_lim_theta_radss,
                self.limits.decel_lim_theta_radss,
                dt_s,
                target.theta_rads,
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Euler-integrate one holonomic motion step.
///
/// The body-frame velocity is rotated into the world frame at the pre-step
/// heading before being applied.
pub fn next_position(pose: &Pose2D, vel: &Twist2D, dt_s: f64) -> Pose2D {
    Pose2D {
        x_m: pose.x_m
            + (vel.x_ms * pose.heading_rad.cos() - vel.y_ms * pose.heading_rad.sin()) * dt_s,
        y_m: pose.y_m
            + (vel.x_ms * pose.heading_rad.sin() + vel.y_ms * pose.heading_rad.cos()) * dt_s,
        heading_rad: pose.heading_rad + vel.theta_rads * dt_s,
    }
}
