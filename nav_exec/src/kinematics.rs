//! # Kinematic model
//!
//! Describes the robot's velocity and acceleration envelope, and provides
//! the speed-validity predicate used to filter candidate twists.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The robot's velocity and acceleration envelope.
///
/// The combined-speed thresholds (`min_speed_xy_ms`, `max_speed_xy_ms`,
/// `min_speed_theta_rads`) may each be disabled by setting them negative.
#[derive(Clone, Debug, Deserialize)]
pub struct KinematicLimits {
    /// Minimum body-frame x velocity. Negative permits reversing.
    pub min_vel_x_ms: f64,

    /// Maximum body-frame x velocity.
    pub max_vel_x_ms: f64,

    /// Minimum body-frame y velocity. Zero for non-holonomic platforms.
    pub min_vel_y_ms: f64,

    /// Maximum body-frame y velocity.
    pub max_vel_y_ms: f64,

    /// Maximum rotation speed magnitude. The admissible rotation range is
    /// symmetric about zero.
    pub max_vel_theta_rads: f64,

    /// Minimum combined translational speed, negative to disable.
    pub min_speed_xy_ms: f64,

    /// Maximum combined translational speed, negative to disable.
    pub max_speed_xy_ms: f64,

    /// Minimum rotation speed magnitude, negative to disable.
    pub min_speed_theta_rads: f64,

    /// Acceleration limits per axis, all non-negative.
    pub acc_lim_x_mss: f64,
    pub acc_lim_y_mss: f64,
    pub acc_lim_theta_radss: f64,

    /// Deceleration limits per axis, all non-positive (signed opposite to
    /// the acceleration limits).
    pub decel_lim_x_mss: f64,
    pub decel_lim_y_mss: f64,
    pub decel_lim_theta_radss: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Configuration errors in the kinematic limits. These are fatal to the
/// configuration and surfaced at planner initialisation.
#[derive(Debug, thiserror::Error)]
pub enum KinematicsError {
    #[error("Velocity limits are inverted on the {0} axis (min > max)")]
    InvertedVelocityRange(&'static str),

    #[error("Acceleration limit on the {0} axis must be non-negative")]
    NegativeAcceleration(&'static str),

    #[error("Deceleration limit on the {0} axis must be non-positive")]
    PositiveDeceleration(&'static str),

    #[error("Maximum rotation speed must be non-negative")]
    NegativeMaxTheta,

    #[error("Combined speed thresholds are inverted (min_speed_xy > max_speed_xy)")]
    InvertedSpeedThresholds,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl KinematicLimits {
    /// Check the limits for internal consistency.
    pub fn validate(&self) -> Result<(), KinematicsError> {
        if self.min_vel_x_ms > self.max_vel_x_ms {
            return Err(KinematicsError::InvertedVelocityRange("x"));
        }
        if self.min_vel_y_ms > self.max_vel_y_ms {
            return Err(KinematicsError::InvertedVelocityRange("y"));
        }
        if self.max_vel_theta_rads < 0.0 {
            return Err(KinematicsError::NegativeMaxTheta);
        }

        for (axis, acc) in &[
            ("x", self.acc_lim_x_mss),
            ("y", self.acc_lim_y_mss),
            ("theta", self.acc_lim_theta_radss),
        ] {
            if *acc < 0.0 {
                return Err(KinematicsError::NegativeAcceleration(axis));
            }
        }

        for (axis, decel) in &[
            ("x", self.decel_lim_x_mss),
            ("y", self.decel_lim_y_mss),
            ("theta", self.decel_lim_theta_radss),
        ] {
            if *decel > 0.0 {
                return Err(KinematicsError::PositiveDeceleration(axis));
            }
        }

        if self.min_speed_xy_ms >= 0.0
            && self.max_speed_xy_ms >= 0.0
            && self.min_speed_xy_ms > self.max_speed_xy_ms
        {
            return Err(KinematicsError::InvertedSpeedThresholds);
        }

        Ok(())
    }

    /// True if the given twist components represent a commandable speed.
    ///
    /// Magnitudes are compared squared to avoid the square root, with
    /// semantics identical to comparing the plain magnitudes:
    /// - the combined translational speed must not exceed a configured
    ///   maximum,
    /// - translation and rotation must not both be below their configured
    ///   minimums,
    /// - the exact zero twist is never valid.
    pub fn is_valid_speed(&self, x_ms: f64, y_ms: f64, theta_rads: f64) -> bool {
        let sq_vmag = x_ms * x_ms + y_ms * y_ms;

        if self.max_speed_xy_ms >= 0.0 && sq_vmag > self.max_speed_xy_ms * self.max_speed_xy_ms {
            return false;
        }

        if self.min_speed_xy_ms >= 0.0
            && sq_vmag < self.min_speed_xy_ms * self.min_speed_xy_ms
            && self.min_speed_theta_rads >= 0.0
            && theta_rads.abs() < self.min_speed_theta_rads
        {
            return false;
        }

        if sq_vmag == 0.0 && theta_rads == 0.0 {
            return false;
        }

        true
    }

    /// Minimum rotation speed of the admissible (symmetric) theta range.
    pub fn min_vel_theta_rads(&self) -> f64 {
        -self.max_vel_theta_rads
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Project a velocity towards a target, limited by what the acceleration
/// and deceleration limits allow within `dt`.
///
/// `decel` is signed opposite `acc`, i.e. non-positive.
pub fn project_velocity(v0: f64, acc: f64, decel: f64, dt: f64, target: f64) -> f64 {
    if v0 < target {
        // Must accelerate
        target.min(v0 + acc * dt)
    } else {
        // Must decelerate
        target.max(v0 + decel * dt)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// The fixture limits shared by the sampler and generator tests.
    pub(crate) fn default_limits() -> KinematicLimits {
        KinematicLimits {
            min_vel_x_ms: 0.0,
            max_vel_x_ms: 0.55,
            min_vel_y_ms: -0.1,
            max_vel_y_ms: 0.1,
            max_vel_theta_rads: 1.0,
            min_speed_xy_ms: 0.1,
            max_speed_xy_ms: 0.55,
            min_speed_theta_rads: 0.4,
            acc_lim_x_mss: 2.5,
            acc_lim_y_mss: 2.5,
            acc_lim_theta_radss: 3.2,
            decel_lim_x_mss: -2.5,
            decel_lim_y_mss: -2.5,
            decel_lim_theta_radss: -3.2,
        }
    }

    #[test]
    fn test_valid_speed() {
        let limits = default_limits();

        // Comfortable forward motion
        assert!(limits.is_valid_speed(0.3, 0.0, 0.0));

        // Over the combined magnitude cap, even though each axis is in range
        assert!(!limits.is_valid_speed(0.55, 0.1, 0.0));

        // Too slow in both translation and rotation
        assert!(!limits.is_valid_speed(0.05, 0.0, 0.1));

        // Slow translation is fine if rotating fast enough
        assert!(limits.is_valid_speed(0.05, 0.0, 0.5));

        // Pure rotation is fine
        assert!(limits.is_valid_speed(0.0, 0.0, 0.5));

        // The null command is never a candidate
        assert!(!limits.is_valid_speed(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_zero_twist_rejected_without_thresholds() {
        let mut limits = default_limits();
        limits.min_speed_xy_ms = -1.0;
        limits.max_speed_xy_ms = -1.0;
        limits.min_speed_theta_rads = -1.0;

        assert!(!limits.is_valid_speed(0.0, 0.0, 0.0));
        assert!(limits.is_valid_speed(0.0, 0.0, 0.01));
    }

    #[test]
    fn test_validate() {
        assert!(default_limits().validate().is_ok());

        let mut inverted = default_limits();
        inverted.min_vel_x_ms = 1.0;
        assert!(matches!(
            inverted.validate(),
            Err(KinematicsError::InvertedVelocityRange("x"))
        ));

        let mut bad_decel = default_limits();
        bad_decel.decel_lim_theta_radss = 3.2;
        assert!(matches!(
            bad_decel.validate(),
            Err(KinematicsError::PositiveDeceleration("theta"))
        ));
    }

    #[test]
    fn test_project_velocity() {
        // Accelerating towards the target from rest
        assert_eq!(project_velocity(0.0, 0.1, -0.1, 1.0, 0.3), 0.1);
        // Target within reach
        assert_eq!(project_velocity(0.25, 0.1, -0.1, 1.0, 0.3), 0.3);
        // Decelerating towards a lower target
        assert_eq!(project_velocity(0.3, 0.1, -0.1, 1.0, 0.0), 0.2);
    }
}
