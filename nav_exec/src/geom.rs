//! # Planar geometry types
//!
//! Defines the pose, twist and frame-transform value types used throughout
//! the local planner. All poses live on the XY plane of some named working
//! frame, with the heading measured anticlockwise from the +X axis.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A position and heading on the XY plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    pub x_m: f64,
    pub y_m: f64,
    pub heading_rad: f64,
}

/// An instantaneous planar velocity - linear velocity in the body frame plus
/// a rotation rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Twist2D {
    pub x_ms: f64,
    pub y_ms: f64,
    pub theta_rads: f64,
}

/// A rigid 2D transform between two named frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    pub translation_m: Vector2<f64>,
    pub rotation_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose2D {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            x_m,
            y_m,
            heading_rad,
        }
    }

    /// The position part of the pose as a vector.
    pub fn position_m(&self) -> Vector2<f64> {
        Vector2::new(self.x_m, self.y_m)
    }

    /// Squared distance between the positions of two poses.
    pub fn sq_distance_to(&self, other: &Pose2D) -> f64 {
        let dx = self.x_m - other.x_m;
        let dy = self.y_m - other.y_m;
        dx * dx + dy * dy
    }
}

impl Twist2D {
    pub fn new(x_ms: f64, y_ms: f64, theta_rads: f64) -> Self {
        Self {
            x_ms,
            y_ms,
            theta_rads,
        }
    }

    /// Squared magnitude of the translational part of the twist.
    pub fn sq_speed_xy(&self) -> f64 {
        self.x_ms * self.x_ms + self.y_ms * self.y_ms
    }
}

impl Transform2D {
    /// The transform that maps every pose onto itself.
    pub fn identity() -> Self {
        Self {
            translation_m: Vector2::zeros(),
            rotation_rad: 0.0,
        }
    }

    /// Express a pose in the target frame of this transform.
    pub fn apply(&self, pose: &Pose2D) -> Pose2D {
        let (sin, cos) = self.rotation_rad.sin_cos();
        Pose2D {
            x_m: self.translation_m[0] + pose.x_m * cos - pose.y_m * sin,
            y_m: self.translation_m[1] + pose.x_m * sin + pose.y_m * cos,
            heading_rad: pose.heading_rad + self.rotation_rad,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_transform_apply() {
        let tf = Transform2D {
            translation_m: Vector2::new(1.0, 2.0),
            rotation_rad: FRAC_PI_2,
        };

        let pose = tf.apply(&Pose2D::new(1.0, 0.0, 0.0));

        assert!((pose.x_m - 1.0).abs() < 1e-12);
        assert!((pose.y_m - 3.0).abs() < 1e-12);
        assert!((pose.heading_rad - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_identity() {
        let pose = Pose2D::new(0.3, -0.2, 1.1);
        assert_eq!(Transform2D::identity().apply(&pose), pose);
    }
}
