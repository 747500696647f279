//! # Velocity sample space
//!
//! Enumerates the candidate twists the planner scores each cycle. Each axis
//! is swept by a [`VelocityAxisIterator`] producing an even grid across the
//! axis's admissible range, and the three axes are nested (theta innermost)
//! by [`TwistSampler`]. Twists failing the kinematic validity predicate are
//! skipped rather than yielded.
//!
//! Two window policies are available: `DynamicWindow` restricts each axis
//! to the velocities reachable from the current velocity within one control
//! interval, `StaticLimits` sweeps the full velocity envelope regardless of
//! the current velocity.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::geom::Twist2D;
use crate::kinematics::{project_velocity, KinematicLimits};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance below which two axis velocities are considered equal.
const VELOCITY_EPS: f64 = 1e-5;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the velocity sample space.
#[derive(Clone, Debug, Deserialize)]
pub struct Params {
    /// Which window policy bounds the sampled ranges.
    pub policy: SamplerPolicy,

    /// Number of samples across the x velocity range.
    pub vx_samples: u32,

    /// Number of samples across the y velocity range.
    pub vy_samples: u32,

    /// Number of samples across the theta velocity range.
    pub vtheta_samples: u32,

    /// The control interval over which acceleration bounds the reachable
    /// window. Only used by the `DynamicWindow` policy.
    pub sim_period_s: f64,
}

/// Evenly spaced velocity samples across one axis.
///
/// An exact 0.0 sample is inserted when the range spans zero without any
/// grid sample hitting it, so that stopping (and pure-translation, on the
/// theta axis) candidates are always represented.
#[derive(Clone, Debug)]
pub struct VelocityAxisIterator {
    min_vel: f64,
    max_vel: f64,
    increment: f64,
    current: f64,
    insert_zero: bool,
    on_zero: bool,
}

/// The nested x/y/theta candidate sweep. Finite, lazy and non-restartable;
/// yields only twists satisfying `is_valid_speed`.
pub struct TwistSampler {
    limits: KinematicLimits,
    x_it: VelocityAxisIterator,
    y_it: VelocityAxisIterator,
    theta_it: VelocityAxisIterator,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Selects how the per-axis sample ranges are bounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerPolicy {
    /// Bounded by acceleration reachability from the current velocity.
    DynamicWindow,

    /// Bounded only by the absolute velocity limits.
    StaticLimits,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VelocityAxisIterator {
    /// Sweep the intersection of the axis limits with the window reachable
    /// from `current` within `dt`.
    pub fn new_dynamic(
        current: f64,
        min: f64,
        max: f64,
        acc_lim: f64,
        decel_lim: f64,
        dt: f64,
        num_samples: u32,
    ) -> Self {
        let current = util::maths::clamp(&current, &min, &max);
        let min_vel = project_velocity(current, acc_lim, decel_lim, dt, min);
        let max_vel = project_velocity(current, acc_lim, decel_lim, dt, max);
        Self::from_range(min_vel, max_vel, num_samples)
    }

    /// Sweep the full axis limit range.
    pub fn new_static(min: f64, max: f64, num_samples: u32) -> Self {
        Self::from_range(min, max, num_samples)
    }

    fn from_range(min_vel: f64, max_vel: f64, num_samples: u32) -> Self {
        let num_samples = num_samples.max(2);
        let increment = if (max_vel - min_vel).abs() < VELOCITY_EPS {
            1.0
        } else {
            (max_vel - min_vel) / (num_samples - 1) as f64
        };

        let mut it = Self {
            min_vel,
            max_vel,
            increment,
            current: min_vel,
            insert_zero: min_vel < 0.0 && max_vel > 0.0,
            on_zero: false,
        };
        it.reset();
        it
    }

    /// Restart the sweep from the minimum velocity.
    pub fn reset(&mut self) {
        self.current = self.min_vel;
        self.on_zero = false;
    }

    /// The sample at the current sweep position.
    pub fn velocity(&self) -> f64 {
        if self.on_zero {
            0.0
        } else {
            self.current
        }
    }

    /// Move to the next sample, inserting the exact zero sample when the
    /// sweep would step over it.
    pub fn advance(&mut self) {
        if self.insert_zero && !self.on_zero && self.current < 0.0 && self.current + self.increment > 0.0
        {
            self.on_zero = true;
        } else {
            self.current += self.increment;
            self.on_zero = false;
        }
    }

    /// True once the sweep has stepped past the maximum velocity.
    pub fn is_finished(&self) -> bool {
        self.current > self.max_vel + VELOCITY_EPS
    }
}

impl TwistSampler {
    /// Start a new candidate sweep seeded with the current velocity.
    pub fn new(limits: &KinematicLimits, params: &Params, current_vel: &Twist2D) -> Self {
        let (x_it, y_it, theta_it) = match params.policy {
            SamplerPolicy::DynamicWindow => (
                VelocityAxisIterator::new_dynamic(
                    current_vel.x_ms,
                    limits.min_vel_x_ms,
                    limits.max_vel_x_ms,
                    limits.acc_lim_x_mss,
                    limits.decel_lim_x_mss,
                    params.sim_period_s,
                    params.vx_samples,
                ),
                VelocityAxisIterator::new_dynamic(
                    current_vel.y_ms,
                    limits.min_vel_y_ms,
                    limits.max_vel_y_ms,
                    limits.acc_lim_y_mss,
                    limits.decel_lim_y_mss,
                    params.sim_period_s,
                    params.vy_samples,
                ),
                VelocityAxisIterator::new_dynamic(
                    current_vel.theta_rads,
                    limits.min_vel_theta_rads(),
                    limits.max_vel_theta_rads,
                    limits.acc_lim_theta_radss,
                    limits.decel_lim_theta_radss,
                    params.sim_period_s,
                    params.vtheta_samples,
                ),
            ),
            SamplerPolicy::StaticLimits => (
                VelocityAxisIterator::new_static(
                    limits.min_vel_x_ms,
                    limits.max_vel_x_ms,
                    params.vx_samples,
                ),
                VelocityAxisIterator::new_static(
                    limits.min_vel_y_ms,
                    limits.max_vel_y_ms,
                    params.vy_samples,
                ),
                VelocityAxisIterator::new_static(
                    limits.min_vel_theta_rads(),
                    limits.max_vel_theta_rads,
                    params.vtheta_samples,
                ),
            ),
        };

        let mut sampler = Self {
            limits: limits.clone(),
            x_it,
            y_it,
            theta_it,
        };

        if !sampler.is_valid() {
            sampler.advance_to_valid();
        }

        sampler
    }

    fn current_twist(&self) -> Twist2D {
        Twist2D::new(
            self.x_it.velocity(),
            self.y_it.velocity(),
            self.theta_it.velocity(),
        )
    }

    fn is_valid(&self) -> bool {
        self.limits.is_valid_speed(
            self.x_it.velocity(),
            self.y_it.velocity(),
            self.theta_it.velocity(),
        )
    }

    fn has_more(&self) -> bool {
        !self.x_it.is_finished()
    }

    /// Step the nested sweep by one position, theta innermost.
    fn advance_one(&mut self) {
        self.theta_it.advance();
        if self.theta_it.is_finished() {
            self.theta_it.reset();
            self.y_it.advance();
            if self.y_it.is_finished() {
                self.y_it.reset();
                self.x_it.advance();
            }
        }
    }

    fn advance_to_valid(&mut self) {
        let mut valid = false;
        while !valid && self.has_more() {
            self.advance_one();
            valid = self.is_valid();
        }
    }
}

impl Iterator for TwistSampler {
    type Item = Twist2D;

    fn next(&mut self) -> Option<Twist2D> {
        if !self.has_more() {
            return None;
        }

        let twist = self.current_twist();
        self.advance_to_valid();
        Some(twist)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kinematics::test::default_limits;

    fn params(policy: SamplerPolicy) -> Params {
        Params {
            policy,
            vx_samples: 20,
            vy_samples: 5,
            vtheta_samples: 20,
            sim_period_s: 0.05,
        }
    }

    fn no_threshold_limits() -> KinematicLimits {
        let mut limits = default_limits();
        limits.min_speed_xy_ms = -1.0;
        limits.max_speed_xy_ms = -1.0;
        limits.min_speed_theta_rads = -1.0;
        limits
    }

    #[test]
    fn test_cardinality_law() {
        // Static limits, no magnitude thresholds:
        // Sx*Sy*St + Sx*Sy - 1 candidates.
        let limits = no_threshold_limits();
        let sampler = TwistSampler::new(&limits, &params(SamplerPolicy::StaticLimits), &Twist2D::default());

        assert_eq!(sampler.count(), 20 * 5 * 20 + 20 * 5 - 1);
    }

    #[test]
    fn test_cardinality_with_zero_hitting_grid() {
        // With 5 theta samples across [-1, 1] the grid hits zero exactly, so
        // no extra sample is inserted on that axis.
        let limits = no_threshold_limits();
        let mut p = params(SamplerPolicy::StaticLimits);
        p.vx_samples = 10;
        p.vy_samples = 3;
        p.vtheta_samples = 5;
        let sampler = TwistSampler::new(&limits, &p, &Twist2D::default());

        assert_eq!(sampler.count(), 10 * 3 * 5 - 1);
    }

    #[test]
    fn test_all_yielded_twists_are_valid() {
        let limits = default_limits();
        let twists: Vec<Twist2D> =
            TwistSampler::new(&limits, &params(SamplerPolicy::StaticLimits), &Twist2D::default())
                .collect();

        // Fixture count: the magnitude thresholds strip the slow and fast
        // corners from the 2099-candidate grid.
        assert_eq!(twists.len(), 1926);

        for twist in &twists {
            assert!(limits.is_valid_speed(twist.x_ms, twist.y_ms, twist.theta_rads));
        }
    }

    #[test]
    fn test_dynamic_window_bounds() {
        // From rest, one 50 ms control interval reaches 0.125 m/s in x and
        // 0.16 rad/s in theta.
        let mut limits = default_limits();
        limits.min_speed_theta_rads = -1.0;

        let twists: Vec<Twist2D> =
            TwistSampler::new(&limits, &params(SamplerPolicy::DynamicWindow), &Twist2D::default())
                .collect();

        assert_eq!(twists.len(), 20 * 5 * 20 + 20 * 5 - 1);

        for twist in &twists {
            assert!(twist.x_ms >= 0.0 && twist.x_ms <= 0.125 + VELOCITY_EPS);
            assert!(twist.theta_rads.abs() <= 0.16 + VELOCITY_EPS);
        }

        let max_x = twists.iter().map(|t| t.x_ms).fold(f64::MIN, f64::max);
        let max_theta = twists.iter().map(|t| t.theta_rads).fold(f64::MIN, f64::max);
        assert!((max_x - 0.125).abs() < 1e-12);
        assert!((max_theta - 0.16).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic_order() {
        let limits = default_limits();
        let a: Vec<Twist2D> =
            TwistSampler::new(&limits, &params(SamplerPolicy::StaticLimits), &Twist2D::default())
                .collect();
        let b: Vec<Twist2D> =
            TwistSampler::new(&limits, &params(SamplerPolicy::StaticLimits), &Twist2D::default())
                .collect();

        assert_eq!(a, b);
    }

    #[test]
    fn test_axis_iterator_inserts_zero() {
        let mut it = VelocityAxisIterator::new_static(-1.0, 1.0, 20);
        let mut samples = Vec::new();
        while !it.is_finished() {
            samples.push(it.velocity());
            it.advance();
        }

        assert_eq!(samples.len(), 21);
        assert!(samples.contains(&0.0));
    }
}
