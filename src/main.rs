use std::sync::Arc;

use anyhow::{Context, anyhow};
use tracing::{debug, info};
use tracing_subscriber::{self, EnvFilter};

use linetrace::blackboard::{Blackboard, snapshot};
use linetrace::bus::Topic;
use linetrace::config::load_config;
use linetrace::host::{LoopSettings, run_loop};
use linetrace::sim::{build_track, from_config};
use linetrace::telemetry::{Telemetry, telemetry_task, watchdog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Line follower simulator started.");

    let config_path = std::env::args().nth(1);
    let cfg = load_config(config_path.as_deref()).context("loading configuration")?;

    let track = build_track(&cfg.track).context("building track")?;
    let mut sim = from_config(&cfg, track).context("assembling simulation")?;

    let settings = LoopSettings {
        ticks: cfg.simulation.ticks,
        realtime: cfg.simulation.realtime,
        dt: cfg.simulation.dt,
        telemetry_every: cfg.telemetry.every_n_ticks,
    };

    let bb: Blackboard = Arc::default();
    let telemetry_topic: Topic<Telemetry> = Topic::new(64);
    let telemetry_handle = tokio::spawn(telemetry_task(telemetry_topic.subscribe()));
    let watchdog_handle = tokio::spawn(watchdog(bb.clone(), cfg.telemetry.lost_line_timeout_ms));

    info!("Spawning simulation thread...");
    let sim_thread = std::thread::Builder::new()
        .name("simulation".into())
        .spawn({
            let bb = Arc::clone(&bb);
            // Moved in so the topic closes when the loop ends.
            let topic = telemetry_topic;
            move || {
                run_loop(&mut sim, settings, &bb, &topic);
                sim
            }
        })?;

    let sim = tokio::task::spawn_blocking(move || sim_thread.join())
        .await?
        .map_err(|_| anyhow!("Simulation thread panicked"))?;

    watchdog_handle.await??;
    telemetry_handle.await?;

    for robot in sim.robots() {
        info!(
            robot = %robot.name(),
            pose = %robot.pose(),
            odometry = %robot.odometry(),
            path_points = robot.path().len(),
            "Final state"
        );
        debug!("Recorded path of {}:\n{}", robot.name(), robot.path());
    }

    let state = snapshot(&bb);
    info!(ticks = state.tick, faults = state.faults.len(), "Simulation complete.");
    Ok(())
}
