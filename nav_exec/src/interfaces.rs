//! # External collaborator interfaces
//!
//! The planner core never owns a cost map or a transform tree - both are
//! injected behind the traits defined here so the decision loop can be
//! exercised against synthetic implementations.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::geom::{Pose2D, Transform2D};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Synchronous obstacle cost queries over some spatial extent.
///
/// Costs are scalars in [0, 1], with values at or above a configured lethal
/// threshold treated as collisions by the obstacle critic. Only critics may
/// query the oracle - the generator and scorer never do.
pub trait CostOracle {
    /// The traversability cost at the given pose in the local working frame.
    fn obstacle_cost(&self, pose: &Pose2D) -> f64;

    /// The radius around the robot within which costs are meaningful.
    ///
    /// Plan windowing uses this to decide how much of the global plan is
    /// worth scoring against.
    fn relevant_radius_m(&self) -> f64;
}

/// Lookup of rigid transforms between named planar frames.
pub trait TransformSource {
    /// Get the transform taking poses expressed in `from` into `to`.
    fn get_transform(&self, from: &str, to: &str) -> Result<Transform2D, TransformError>;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by transform lookup. These fail the current cycle only,
/// the caller should retry on the next one.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("No transform available from frame \"{from}\" to frame \"{to}\"")]
    UnknownFrame { from: String, to: String },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

/// A transform source for setups where all frames coincide, for instance
/// demos and tests running entirely in one working frame.
pub struct IdentityTransforms;

impl TransformSource for IdentityTransforms {
    fn get_transform(&self, _from: &str, _to: &str) -> Result<Transform2D, TransformError> {
        Ok(Transform2D::identity())
    }
}
