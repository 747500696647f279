//! # Local planner
//!
//! The decision loop tying the rest of the crate together. Each cycle the
//! planner windows the global plan down to the robot's surroundings, sweeps
//! the candidate twist space, forward-simulates every candidate and scores
//! it through the configured critics, then commands the twist of the
//! cheapest legal trajectory.
//!
//! When every candidate is rejected the cycle fails with a breakdown of
//! which critic rejected what, so the operator can see whether the robot is
//! boxed in, oscillation-locked, or misconfigured.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::rc::Rc;

// Internal
use crate::critic::{
    make_critic, CriticScore, IllegalTrajectory, TrajectoryCritic, TrajectoryScore,
};
use crate::geom::{Pose2D, Twist2D};
use crate::goal_check::{make_goal_checker, GoalChecker};
use crate::interfaces::{CostOracle, TransformSource};
use crate::kinematics::{KinematicLimits, KinematicsError};
use crate::path::Path;
use crate::plan_window::{PlanWindow, WindowError};
use crate::traj_gen::{Trajectory, TrajectoryGenerator};
use crate::twist_sampler::TwistSampler;
pub use params::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One configured critic and its weight.
struct CriticEntry {
    critic: Box<dyn TrajectoryCritic>,
    weight: f64,
}

/// The local planner.
pub struct LocalPlanner {
    params: Params,
    limits: KinematicLimits,
    sampler_params: crate::twist_sampler::Params,
    traj_gen: TrajectoryGenerator,
    critics: Vec<CriticEntry>,
    goal_checker: Box<dyn GoalChecker>,
    window: PlanWindow,
    oracle: Rc<dyn CostOracle>,
    transforms: Box<dyn TransformSource>,
    last_evaluation: Option<PlanEvaluation>,
}

/// Aggregated rejection counts from one planning cycle, keyed by the
/// rejecting critic and its reason.
#[derive(Clone, Debug, Default)]
pub struct IllegalTrajectoryTracker {
    counts: BTreeMap<(String, String), u32>,
    legal_count: u32,
}

/// The full score table from one planning cycle, for offline inspection.
/// Rejected candidates carry an empty breakdown and a total of -1.
#[derive(Clone, Debug, Serialize)]
pub struct PlanEvaluation {
    pub twists: Vec<TrajectoryScore>,
    pub best_index: Option<usize>,
    pub worst_index: Option<usize>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Configuration errors caught when the planner is constructed.
#[derive(Debug, thiserror::Error)]
pub enum PlannerInitError {
    #[error("Invalid kinematic limits: {0}")]
    InvalidLimits(#[from] KinematicsError),

    #[error("No critic is registered under the name {0:?}")]
    UnknownCritic(String),
}

/// Per-cycle planning failures. The caller should stop the robot and retry
/// on the next cycle.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("Could not window the plan: {0}")]
    Window(#[from] WindowError),

    #[error("No legal trajectories found:\n{0}")]
    NoLegalTrajectories(IllegalTrajectoryTracker),
}

/// Outcome of scoring a single candidate. Rejections keep the simulated
/// trajectory so diagnostics can still show where it would have gone.
enum ScoreOutcome {
    Scored(TrajectoryScore),
    Illegal(IllegalTrajectory, Trajectory),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LocalPlanner {
    /// Build a planner from the full parameter set and its external
    /// collaborators.
    pub fn new(
        params: crate::params::Params,
        oracle: Rc<dyn CostOracle>,
        transforms: Box<dyn TransformSource>,
    ) -> Result<Self, PlannerInitError> {
        params.kinematics.validate()?;

        let mut critics = Vec::with_capacity(params.planner.critics.len());
        for config in &params.planner.critics {
            let critic = make_critic(&config.name, &params.critic, &oracle)
                .ok_or_else(|| PlannerInitError::UnknownCritic(config.name.clone()))?;
            critics.push(CriticEntry {
                critic,
                weight: config.weight,
            });
        }

        let traj_gen = TrajectoryGenerator::new(
            params.traj_gen.clone(),
            params.kinematics.clone(),
            params.sampler.policy,
        );

        let window = PlanWindow::new(
            params.planner.prune_plan,
            params.planner.prune_distance_m,
        );

        Ok(Self {
            limits: params.kinematics,
            sampler_params: params.sampler,
            traj_gen,
            critics,
            goal_checker: make_goal_checker(&params.goal_check),
            window,
            oracle,
            transforms,
            last_evaluation: None,
            params: params.planner,
        })
    }

    /// Install a new global plan, dropping any state carried over from the
    /// previous one.
    pub fn set_plan(&mut self, plan: Path) {
        info!(
            "New plan set: {} poses in frame {:?}",
            plan.len(),
            plan.frame_id
        );

        self.window.set_plan(plan);

        for entry in &mut self.critics {
            entry.critic.reset();
        }
    }

    /// True once the robot satisfies the goal checker against the end of
    /// the current plan. Without a plan this is always false.
    ///
    /// `pose` is expressed in the local frame.
    pub fn is_goal_reached(&self, pose: &Pose2D, velocity: &Twist2D) -> bool {
        let (frame, goal) = match self.window.goal_pose() {
            Some(goal) => goal,
            None => {
                warn!("Goal check requested but no plan is set");
                return false;
            }
        };

        let to_local = match self.transforms.get_transform(frame, &self.params.local_frame) {
            Ok(tf) => tf,
            Err(e) => {
                warn!("Goal check failed: {}", e);
                return false;
            }
        };

        self.goal_checker
            .is_goal_reached(pose, velocity, &to_local.apply(&goal))
    }

    /// Run one planning cycle and return the chosen twist along with its
    /// simulated trajectory.
    ///
    /// `pose` and `velocity` are the robot's current state in the local
    /// frame.
    pub fn compute_twist(
        &mut self,
        pose: &Pose2D,
        velocity: &Twist2D,
    ) -> Result<(Twist2D, Trajectory), PlannerError> {
        let (plan, goal) = self.window.window(
            pose,
            &self.params.local_frame,
            self.transforms.as_ref(),
            self.oracle.relevant_radius_m(),
        )?;

        for entry in &mut self.critics {
            if !entry.critic.prepare(pose, velocity, &goal, &plan) {
                warn!(
                    "Critic {:?} failed to prepare, its scores may be unreliable",
                    entry.critic.name()
                );
            }
        }

        let result = self.score_candidates(pose, velocity);

        // Critics observe the committed command, or the stop the caller is
        // expected to fall back to
        let committed = match &result {
            Ok((twist, _)) => *twist,
            Err(_) => Twist2D::default(),
        };
        for entry in &mut self.critics {
            entry.critic.debrief(&committed);
        }

        result
    }

    /// The score table recorded by the latest cycle, if
    /// `record_evaluation` is enabled.
    pub fn last_evaluation(&self) -> Option<&PlanEvaluation> {
        self.last_evaluation.as_ref()
    }

    /// Sweep, simulate and score every candidate twist, keeping the
    /// cheapest legal trajectory.
    fn score_candidates(
        &mut self,
        pose: &Pose2D,
        velocity: &Twist2D,
    ) -> Result<(Twist2D, Trajectory), PlannerError> {
        let mut tracker = IllegalTrajectoryTracker::default();
        let mut best: Option<TrajectoryScore> = None;
        let mut worst_total = f64::MIN;
        let mut evaluation = self.params.record_evaluation.then(|| PlanEvaluation {
            twists: Vec::new(),
            best_index: None,
            worst_index: None,
        });

        let sampler = TwistSampler::new(&self.limits, &self.sampler_params, velocity);

        for twist in sampler {
            let traj = self.traj_gen.generate(pose, velocity, &twist);
            let best_total = best.as_ref().map(|b| b.total);

            match Self::score_trajectory(&mut self.critics, traj, best_total) {
                ScoreOutcome::Scored(score) => {
                    tracker.legal_count += 1;

                    // Early-exited candidates carry a partial but already
                    // losing total, so the strict comparison is safe
                    let is_best = best_total.map_or(true, |b| score.total < b);
                    let is_worst = score.total > worst_total;
                    if is_worst {
                        worst_total = score.total;
                    }

                    if let Some(eval) = &mut evaluation {
                        if is_best {
                            eval.best_index = Some(eval.twists.len());
                        }
                        if is_worst {
                            eval.worst_index = Some(eval.twists.len());
                        }
                        eval.twists.push(score.clone());
                    }

                    if is_best {
                        best = Some(score);
                    }
                }
                ScoreOutcome::Illegal(illegal, traj) => {
                    if self.params.debug_trajectory_details {
                        debug!("Rejected {:?}: {}", traj.velocity, illegal);
                    }

                    if let Some(eval) = &mut evaluation {
                        eval.twists.push(TrajectoryScore {
                            traj,
                            scores: Vec::new(),
                            total: -1.0,
                        });
                    }

                    tracker.record(&illegal);
                }
            }
        }

        self.last_evaluation = evaluation;

        match best {
            Some(score) => {
                debug!(
                    "Chose twist {:?} with total score {:.4}",
                    score.traj.velocity, score.total
                );
                Ok((score.traj.velocity, score.traj))
            }
            None => Err(PlannerError::NoLegalTrajectories(tracker)),
        }
    }

    /// Score one trajectory through the critic chain.
    ///
    /// Scoring stops as soon as the running total exceeds the best total so
    /// far: raw scores are non-negative, so the candidate can only get
    /// worse.
    fn score_trajectory(
        critics: &mut [CriticEntry],
        traj: Trajectory,
        best_total: Option<f64>,
    ) -> ScoreOutcome {
        let mut scores = Vec::with_capacity(critics.len());
        let mut total = 0.0;

        for entry in critics {
            if entry.weight == 0.0 {
                continue;
            }

            let raw_score = match entry.critic.score(&traj) {
                Ok(raw) => raw,
                Err(illegal) => return ScoreOutcome::Illegal(illegal, traj),
            };

            total += raw_score * entry.weight;
            scores.push(CriticScore {
                name: entry.critic.name().into(),
                raw_score,
                weight: entry.weight,
            });

            if let Some(best) = best_total {
                if total > best {
                    break;
                }
            }
        }

        ScoreOutcome::Scored(TrajectoryScore {
            traj,
            scores,
            total,
        })
    }
}

impl IllegalTrajectoryTracker {
    fn record(&mut self, illegal: &IllegalTrajectory) {
        *self
            .counts
            .entry((illegal.critic.to_string(), illegal.reason.clone()))
            .or_insert(0) += 1;
    }

    /// Total number of rejected candidates.
    pub fn illegal_count(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Number of candidates that scored legally.
    pub fn legal_count(&self) -> u32 {
        self.legal_count
    }

    /// Rejection share per (critic, reason) pair, as percentages of all
    /// rejections.
    pub fn percentages(&self) -> Vec<(String, String, f64)> {
        let total = self.illegal_count() as f64;
        self.counts
            .iter()
            .map(|((critic, reason), count)| {
                (
                    critic.clone(),
                    reason.clone(),
                    100.0 * *count as f64 / total,
                )
            })
            .collect()
    }
}

impl std::fmt::Display for IllegalTrajectoryTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (critic, reason, percent) in self.percentages() {
            writeln!(f, "  {:5.1}% {}: {}", percent, critic, reason)?;
        }
        write!(f, "  {} legal / {} rejected", self.legal_count, self.illegal_count())
    }
}
