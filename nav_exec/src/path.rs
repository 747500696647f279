//! # Global plan representation
//!
//! A path is an ordered sequence of poses expressed in a single named frame.
//! The planner receives one from the global planner and windows it down to
//! the section worth scoring against each cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use crate::geom::Pose2D;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An ordered pose sequence in a named frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// The frame the poses are expressed in.
    pub frame_id: String,

    /// The poses of the path in traversal order.
    pub poses: Vec<Pose2D>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Path {
    /// Build a straight-line path from `start_m` to `end_m`, with poses
    /// separated by at most `separation_m` and headings aligned along the
    /// segment.
    pub fn direct(
        frame_id: &str,
        start_m: (f64, f64),
        end_m: (f64, f64),
        separation_m: f64,
    ) -> Self {
        let dx = end_m.0 - start_m.0;
        let dy = end_m.1 - start_m.1;
        let length_m = dx.hypot(dy);
        let heading_rad = dy.atan2(dx);

        let num_segments = (length_m / separation_m).ceil().max(1.0) as usize;

        let mut poses = Vec::with_capacity(num_segments + 1);
        for i in 0..=num_segments {
            let t = i as f64 / num_segments as f64;
            poses.push(Pose2D::new(
                start_m.0 + dx * t,
                start_m.1 + dy * t,
                heading_rad,
            ));
        }

        Self {
            frame_id: frame_id.into(),
            poses,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }
}
