//! Local navigation executable entry point.
//!
//! Runs the local planner against a synthetic world: a straight global plan
//! with a single obstacle part way along it, exercising the full cycle of
//! windowing, sampling, scoring and goal checking. The robot's pose is
//! integrated from the commanded twists, standing in for real odometry.
//!
//! The per-candidate score table of the final cycle is dumped to the session
//! directory for offline inspection.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, warn};
use nalgebra::Vector2;
use std::fs::File;
use std::rc::Rc;

// Internal
use nav_lib::{
    geom::{Pose2D, Twist2D},
    interfaces::{CostOracle, IdentityTransforms},
    path::Path,
    planner::LocalPlanner,
    traj_gen::next_position,
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one control cycle.
const CYCLE_PERIOD_S: f64 = 0.05;

/// Give up if the goal is not reached within this many cycles.
const MAX_CYCLES: u32 = 10000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A synthetic cost field: one circular obstacle with a linear cost falloff
/// around it.
struct SyntheticField {
    centre_m: Vector2<f64>,
    radius_m: f64,
    falloff_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CostOracle for SyntheticField {
    fn obstacle_cost(&self, pose: &Pose2D) -> f64 {
        let dist_m = (pose.position_m() - self.centre_m).norm();

        if dist_m <= self.radius_m {
            1.0
        } else {
            (1.0 - (dist_m - self.radius_m) / self.falloff_m).max(0.0)
        }
    }

    fn relevant_radius_m(&self) -> f64 {
        3.0
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    let session = Session::new("nav_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Local Navigation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: nav_lib::params::Params = util::params::load("nav_exec.toml")
        .wrap_err("Could not load planner params")?;

    info!("Planner parameters loaded");

    // ---- INITIALISE PLANNER ----

    let oracle = Rc::new(SyntheticField {
        centre_m: Vector2::new(2.5, 0.3),
        radius_m: 0.3,
        falloff_m: 0.5,
    });

    let mut planner = LocalPlanner::new(params, oracle, Box::new(IdentityTransforms))
        .wrap_err("Failed to initialise the planner")?;

    planner.set_plan(Path::direct("odom", (0.0, 0.0), (5.0, 0.0), 0.25));

    // ---- MAIN LOOP ----

    let mut pose = Pose2D::default();
    let mut velocity = Twist2D::default();
    let mut reached = false;

    for cycle in 0..MAX_CYCLES {
        if planner.is_goal_reached(&pose, &velocity) {
            info!("Goal reached after {} cycles at {:?}", cycle, pose);
            reached = true;
            break;
        }

        match planner.compute_twist(&pose, &velocity) {
            Ok((twist, _)) => {
                velocity = twist;
            }
            Err(e) => {
                warn!("Cycle {} failed, stopping: {}", cycle, e);
                velocity = Twist2D::default();
            }
        }

        // Stand-in for odometry: assume the command is tracked perfectly
        pose = next_position(&pose, &velocity, CYCLE_PERIOD_S);
    }

    // ---- SHUTDOWN ----

    if let Some(eval) = planner.last_evaluation() {
        let eval_path = session.session_root.join("plan_evaluation.json");
        let file = File::create(&eval_path)
            .wrap_err("Failed to create the evaluation dump file")?;
        serde_json::to_writer_pretty(file, eval)
            .wrap_err("Failed to write the evaluation dump")?;
        info!("Final cycle evaluation written to {:?}", eval_path);
    }

    if reached {
        Ok(())
    } else {
        Err(eyre!("Goal not reached within {} cycles", MAX_CYCLES))
    }
}
