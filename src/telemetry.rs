use std::sync::Arc;
use std::time::Duration;

use linetrace_kinematics::Pose;
use linetrace_sensing::SensorReading;
use tokio::sync::broadcast;
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::blackboard::{Blackboard, raise_fault, snapshot};
use crate::robot::TickReport;

/// Periodic sample of one robot, published on the telemetry topic.
#[derive(Debug, Clone, PartialEq)]
pub struct Telemetry {
    pub robot: String,
    pub tick: u64,
    pub pose: Pose,
    pub reading: SensorReading,
    pub error: Option<f64>,
    pub powers: (i32, i32),
}

impl Telemetry {
    pub fn from_report(robot: &str, report: &TickReport) -> Self {
        Telemetry {
            robot: robot.to_string(),
            tick: report.tick,
            pose: report.pose,
            reading: report.reading,
            error: report.error,
            powers: report.powers,
        }
    }
}

/// Log telemetry until the topic closes. Returns the number of samples seen.
pub async fn telemetry_task(mut rx: broadcast::Receiver<Arc<Telemetry>>) -> u64 {
    info!("Telemetry task started.");
    let mut seen = 0;
    loop {
        match rx.recv().await {
            Ok(sample) => {
                seen += 1;
                info!(
                    robot = %sample.robot,
                    tick = sample.tick,
                    pose = %sample.pose,
                    reading = %sample.reading,
                    error = ?sample.error,
                    left = sample.powers.0,
                    right = sample.powers.1,
                    "Telemetry"
                );
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("Telemetry receiver lagged by {} messages.", n);
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Telemetry topic closed.");
                break;
            }
        }
    }
    info!(samples = seen, "Telemetry task finished.");
    seen
}

/// Raise a fault for every robot that has been off the line longer than
/// `timeout_ms` of simulated time. Runs until the blackboard is marked finished.
pub async fn watchdog(bb: Blackboard, timeout_ms: u64) -> anyhow::Result<()> {
    info!(timeout_ms, "Watchdog task started.");
    let mut tick = time::interval(Duration::from_millis(25));
    loop {
        tick.tick().await;
        let state = snapshot(&bb);
        for robot in state.robots.iter().filter(|r| r.lost_ms > timeout_ms) {
            let msg = format!("{} lost the line", robot.name);
            if !state.faults.contains(&msg) {
                warn!(robot = %robot.name, lost_ms = robot.lost_ms, pose = %robot.pose, "Line lost for too long");
                raise_fault(&bb, &msg);
            }
        }
        if state.finished {
            break;
        }
    }
    let faults = snapshot(&bb).faults;
    if faults.is_empty() {
        info!("Watchdog finished with no faults.");
    } else {
        error!(?faults, "Watchdog finished with faults.");
    }
    Ok(())
}
