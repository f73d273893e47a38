use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use dead_reckoning_rs::{extract_initial_pose, open_log, DeadReckoner, Pose, PoseSnapshot};

#[derive(Parser, Debug)]
#[command(name = "dead_reckoning")]
#[command(about = "Dead reckoning over a recorded motion log", long_about = None)]
struct Args {
    /// Motion log to replay (plain text or .gz)
    #[arg(value_name = "LOG_PATH")]
    log: PathBuf,

    /// Number of sensor sources in each log entry
    #[arg(value_name = "SOURCES", default_value_t = 1)]
    sources: usize,

    /// YAML file with the initial position & orientation
    #[arg(short = 'p', long = "pose", value_name = "YAML_FILE")]
    pose: Option<PathBuf>,

    /// Per-step angle delta bound in radians (overrides the pose file)
    #[arg(long)]
    max_delta_angle: Option<f64>,

    /// Print the pose after every entry
    #[arg(long)]
    every_step: bool,

    /// Print the final pose as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Summary {
    steps: u64,
    pose: PoseSnapshot,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut pose = match &args.pose {
        Some(path) => extract_initial_pose(path)
            .with_context(|| format!("loading initial pose from {}", path.display()))?,
        None => Pose::default(),
    };
    if let Some(limit) = args.max_delta_angle {
        pose = pose
            .with_max_delta_angle(limit)
            .context("invalid --max-delta-angle")?;
    }
    log::info!("Initial pose: {}", pose);

    let log = open_log(&args.log, args.sources)
        .with_context(|| format!("opening motion log {}", args.log.display()))?;
    log::info!(
        "Replaying {} with {} source(s) per entry",
        args.log.display(),
        args.sources
    );

    let mut reckoner = DeadReckoner::new(pose);
    let every_step = args.every_step;
    reckoner
        .run(log, |r, report| {
            if every_step {
                println!("[{}] {}", report.step, r.pose());
            }
        })
        .with_context(|| format!("replaying {}", args.log.display()))?;

    if args.json {
        let summary = Summary {
            steps: reckoner.steps(),
            pose: reckoner.pose().snapshot(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Final pose after {} steps: {}", reckoner.steps(), reckoner.pose());
    }
    Ok(())
}
