//! Drives a simulation on its own thread and fans results out to the
//! blackboard and the telemetry topic.

use std::time::Duration;

use linetrace_control::PowerCurve;
use linetrace_sensing::IntensityField;
use spin_sleep::SpinSleeper;
use tracing::info;

use crate::blackboard::{Blackboard, RobotStatus, finish};
use crate::bus::Topic;
use crate::sim::Simulation;
use crate::telemetry::Telemetry;

/// How the simulation loop runs.
#[derive(Debug, Clone, Copy)]
pub struct LoopSettings {
    pub ticks: u64,
    /// Sleep `dt` between ticks.
    pub realtime: bool,
    pub dt: f64,
    /// Publish telemetry every this many ticks (0 disables it).
    pub telemetry_every: u64,
}

/// Run `settings.ticks` ticks, updating `bb` after each one and publishing
/// telemetry. Marks the blackboard finished on return.
pub fn run_loop<F, C>(
    sim: &mut Simulation<F, C>,
    settings: LoopSettings,
    bb: &Blackboard,
    telemetry: &Topic<Telemetry>,
) where
    F: IntensityField,
    C: PowerCurve,
{
    info!(ticks = settings.ticks, realtime = settings.realtime, "Simulation loop started.");
    let sleeper = SpinSleeper::new(10_000);
    let period = Duration::from_secs_f64(settings.dt);

    for _ in 0..settings.ticks {
        let reports = sim.step();

        {
            let mut g = bb.write();
            g.tick = sim.tick_count();
            g.robots = sim
                .robots()
                .iter()
                .map(|r| RobotStatus {
                    name: r.name().to_string(),
                    pose: r.pose(),
                    reading: *r.reading(),
                    lost_ms: r.lost_ms(),
                })
                .collect();
        }

        let due = settings.telemetry_every > 0
            && reports.first().is_some_and(|r| r.tick % settings.telemetry_every == 0);
        if due {
            for (robot, report) in sim.robots().iter().zip(&reports) {
                telemetry.publish(Telemetry::from_report(robot.name(), report));
            }
        }

        if settings.realtime {
            sleeper.sleep(period);
        }
    }

    finish(bb);
    info!(ticks = sim.tick_count(), "Simulation loop finished.");
}
