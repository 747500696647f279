//! # Plan windowing
//!
//! Holds the current global plan and, each cycle, extracts the section near
//! the robot worth scoring against, transformed into the local working
//! frame. Optionally prunes passed poses from the stored plan so later
//! cycles never re-scan them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::geom::Pose2D;
use crate::interfaces::{TransformError, TransformSource};
use crate::path::Path;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The stored global plan and its windowing policy.
pub struct PlanWindow {
    /// Whether to discard stored poses the robot has passed.
    prune_plan: bool,

    /// Horizon distance for both pruning and window truncation.
    prune_distance_m: f64,

    plan: Option<Path>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Windowing failures. All fail the current planning cycle only.
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("No plan has been set")]
    NoPlanSet,

    #[error("Transform lookup failed: {0}")]
    Transform(#[from] TransformError),

    #[error("No poses of the plan are within range of the robot")]
    EmptyWindow,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PlanWindow {
    pub fn new(prune_plan: bool, prune_distance_m: f64) -> Self {
        Self {
            prune_plan,
            prune_distance_m,
            plan: None,
        }
    }

    /// Replace the stored plan. The previous plan, pruned or not, is
    /// discarded.
    pub fn set_plan(&mut self, plan: Path) {
        self.plan = Some(plan);
    }

    pub fn has_plan(&self) -> bool {
        self.plan.as_ref().map_or(false, |p| !p.is_empty())
    }

    /// The final pose of the stored plan and the frame it is expressed in.
    pub fn goal_pose(&self) -> Option<(&str, Pose2D)> {
        let plan = self.plan.as_ref()?;
        let last = plan.poses.last()?;
        Some((&plan.frame_id, *last))
    }

    /// Extract the section of the plan near the robot, expressed in
    /// `local_frame`, plus the local goal (the full plan's final pose,
    /// transformed).
    ///
    /// `robot_pose` is expressed in `local_frame`. `max_radius_m` bounds the
    /// window to the region where obstacle costs are meaningful.
    pub fn window(
        &mut self,
        robot_pose: &Pose2D,
        local_frame: &str,
        transforms: &dyn TransformSource,
        max_radius_m: f64,
    ) -> Result<(Path, Pose2D), WindowError> {
        let plan = match &self.plan {
            Some(plan) if !plan.is_empty() => plan,
            _ => return Err(WindowError::NoPlanSet),
        };

        // Work in the plan frame for the scans
        let local_to_plan = transforms.get_transform(local_frame, &plan.frame_id)?;
        let plan_to_local = transforms.get_transform(&plan.frame_id, local_frame)?;

        let robot_in_plan = local_to_plan.apply(robot_pose);

        // Catching up from behind is bounded by the prune distance, the
        // forward horizon by both it and the cost oracle's reach
        let sq_start_threshold = if self.prune_plan {
            let d = max_radius_m.min(self.prune_distance_m);
            d * d
        } else {
            max_radius_m * max_radius_m
        };
        let sq_end_threshold = {
            let d = max_radius_m.min(self.prune_distance_m);
            d * d
        };

        // Catch-up scan: the first pose strictly inside the threshold
        let begin = plan
            .poses
            .iter()
            .position(|pose| pose.sq_distance_to(&robot_in_plan) < sq_start_threshold)
            .ok_or(WindowError::EmptyWindow)?;

        // Horizon scan: take poses until one falls outside the horizon
        let end = plan.poses[begin..]
            .iter()
            .position(|pose| pose.sq_distance_to(&robot_in_plan) > sq_end_threshold)
            .map(|offset| begin + offset)
            .unwrap_or(plan.len());

        let window = Path {
            frame_id: local_frame.into(),
            poses: plan.poses[begin..end]
                .iter()
                .map(|pose| plan_to_local.apply(pose))
                .collect(),
        };

        if window.is_empty() {
            return Err(WindowError::EmptyWindow);
        }

        // The local goal is always the end of the full plan, even when the
        // window stops well short of it
        let goal = match plan.poses.last() {
            Some(last) => plan_to_local.apply(last),
            None => return Err(WindowError::NoPlanSet),
        };

        if self.prune_plan {
            if let Some(plan) = &mut self.plan {
                plan.poses.drain(..begin);
            }
        }

        Ok((window, goal))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geom::Transform2D;
    use crate::interfaces::IdentityTransforms;

    fn window_under_test(prune: bool) -> PlanWindow {
        let mut window = PlanWindow::new(prune, 1.0);
        window.set_plan(Path::direct("odom", (0.0, 0.0), (5.0, 0.0), 0.25));
        window
    }

    #[test]
    fn test_no_plan() {
        let mut window = PlanWindow::new(false, 1.0);
        let result = window.window(&Pose2D::default(), "odom", &IdentityTransforms, 3.0);
        assert!(matches!(result, Err(WindowError::NoPlanSet)));
    }

    #[test]
    fn test_window_near_start() {
        let mut window = window_under_test(false);

        let (path, goal) = window
            .window(&Pose2D::default(), "odom", &IdentityTransforms, 3.0)
            .unwrap();

        assert_eq!(path.frame_id, "odom");
        assert!(!path.is_empty());
        // Horizon bounded by the prune distance (1 m), not the full 5 m plan
        for pose in &path.poses {
            assert!(pose.x_m <= 1.0 + 1e-12);
        }
        // The goal is the end of the full plan regardless of the horizon
        assert_eq!(goal, Pose2D::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_robot_off_plan_is_empty_window() {
        let mut window = window_under_test(false);
        let far_pose = Pose2D::new(0.0, 50.0, 0.0);

        let result = window.window(&far_pose, "odom", &IdentityTransforms, 3.0);
        assert!(matches!(result, Err(WindowError::EmptyWindow)));

        // The stored plan is untouched by the failed cycle
        assert_eq!(window.plan.as_ref().unwrap().len(), 21);
    }

    #[test]
    fn test_transform_failure_leaves_plan_intact() {
        struct NoTransforms;

        impl TransformSource for NoTransforms {
            fn get_transform(
                &self,
                from: &str,
                to: &str,
            ) -> Result<Transform2D, TransformError> {
                Err(TransformError::UnknownFrame {
                    from: from.into(),
                    to: to.into(),
                })
            }
        }

        let mut window = PlanWindow::new(true, 1.0);
        window.set_plan(Path::direct("map", (0.0, 0.0), (5.0, 0.0), 0.25));

        let result = window.window(&Pose2D::default(), "odom", &NoTransforms, 3.0);
        assert!(matches!(
            result,
            Err(WindowError::Transform(TransformError::UnknownFrame { .. }))
        ));

        // Failed lookups must not prune anything
        assert_eq!(window.plan.as_ref().unwrap().len(), 21);
    }

    #[test]
    fn test_catch_up_threshold_is_exclusive() {
        let mut window = PlanWindow::new(true, 1.0);
        window.set_plan(Path {
            frame_id: "odom".into(),
            poses: vec![Pose2D::new(1.0, 0.0, 0.0), Pose2D::new(2.5, 0.0, 0.0)],
        });

        // The first pose sits exactly on the 1 m catch-up threshold, the
        // second beyond it: neither qualifies
        let result = window.window(&Pose2D::default(), "odom", &IdentityTransforms, 3.0);
        assert!(matches!(result, Err(WindowError::EmptyWindow)));
        assert_eq!(window.plan.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_single_far_pose_is_empty_window() {
        let mut window = PlanWindow::new(false, 1.0);
        window.set_plan(Path {
            frame_id: "odom".into(),
            poses: vec![Pose2D::new(100.0, 0.0, 0.0)],
        });

        let result = window.window(&Pose2D::default(), "odom", &IdentityTransforms, 3.0);
        assert!(matches!(result, Err(WindowError::EmptyWindow)));
        assert_eq!(window.plan.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_pruning_drops_passed_poses() {
        let mut window = window_under_test(true);

        window
            .window(&Pose2D::new(2.0, 0.0, 0.0), "odom", &IdentityTransforms, 3.0)
            .unwrap();

        let remaining = window.plan.as_ref().unwrap();
        // Poses at or beyond the prune distance behind the robot are gone
        assert!(remaining.poses[0].x_m >= 1.25 - 1e-12);
        // The goal pose survives pruning
        assert_eq!(*remaining.poses.last().unwrap(), Pose2D::new(5.0, 0.0, 0.0));

        // Pruning is monotonic: moving backwards cannot resurrect poses
        let before = remaining.len();
        let result = window.window(&Pose2D::new(-0.5, 0.0, 0.0), "odom", &IdentityTransforms, 3.0);
        assert!(matches!(result, Err(WindowError::EmptyWindow)));
        assert_eq!(window.plan.as_ref().unwrap().len(), before);
    }

    #[test]
    fn test_unpruned_plan_allows_catching_up_anywhere() {
        let mut window = window_under_test(false);

        // Join the plan near its far end
        let (path, _) = window
            .window(&Pose2D::new(4.5, 0.0, 0.0), "odom", &IdentityTransforms, 0.6)
            .unwrap();

        assert!(path.poses[0].x_m >= 4.0 - 1e-12);
        assert_eq!(*path.poses.last().unwrap(), Pose2D::new(5.0, 0.0, 0.0));
        assert_eq!(window.plan.as_ref().unwrap().len(), 21);
    }
}
