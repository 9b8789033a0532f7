//! The simulation host: robots, a shared read-only track and a tick counter.

use linetrace_control::{LinearPowerCurve, PowerCurve};
use linetrace_kinematics::Pose;
use linetrace_sensing::{IntensityField, Track};
use tracing::info;

use crate::config::{RobotConfig, SimConfig, TrackConfig};
use crate::robot::{Robot, TickReport};

/// Robots driving over one track.
///
/// Robots are owned by value and ticked in order, so a run is a
/// deterministic function of the configuration and the track.
pub struct Simulation<F, C> {
    field: F,
    curve: C,
    robots: Vec<Robot>,
    tick: u64,
}

impl<F: IntensityField, C: PowerCurve> Simulation<F, C> {
    pub fn new(field: F, curve: C, robots: Vec<Robot>) -> Self {
        Simulation {
            field,
            curve,
            robots,
            tick: 0,
        }
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn robots_mut(&mut self) -> &mut [Robot] {
        &mut self.robots
    }

    /// Ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Advance every robot by one tick.
    pub fn step(&mut self) -> Vec<TickReport> {
        let tick = self.tick;
        let reports = self
            .robots
            .iter_mut()
            .map(|robot| robot.tick(tick, &self.field, &self.curve))
            .collect();
        self.tick += 1;
        reports
    }

    /// Run `ticks` ticks, handing every batch of reports to `observe`.
    pub fn run<O: FnMut(&[TickReport])>(&mut self, ticks: u64, mut observe: O) {
        for _ in 0..ticks {
            let reports = self.step();
            observe(&reports);
        }
    }
}

/// Build the configured track: the image if one is named, otherwise a ring.
pub fn build_track(cfg: &TrackConfig) -> anyhow::Result<Track> {
    match &cfg.image {
        Some(path) => Ok(Track::load(path)?),
        None => {
            info!(
                width = cfg.width,
                height = cfg.height,
                radius = cfg.ring_radius,
                line_width = cfg.line_width,
                "Generating ring track"
            );
            Ok(Track::ring(cfg.width, cfg.height, cfg.ring_radius, cfg.line_width))
        }
    }
}

/// Start pose of a robot: explicit pose, then route, then the rightmost
/// point of the generated ring heading up the screen.
pub fn start_pose(robot: &RobotConfig, track: &TrackConfig) -> Pose {
    if let Some([x, y, theta]) = robot.start {
        return Pose::new(x, y, theta);
    }
    if let Some([from, toward]) = robot.route {
        return Pose::facing((from[0], from[1]), (toward[0], toward[1]));
    }
    let cx = track.width as f64 / 2.0;
    let cy = track.height as f64 / 2.0;
    Pose::facing((cx + track.ring_radius, cy), (cx + track.ring_radius, cy - 1.0))
}

/// Assemble a simulation from configuration.
pub fn from_config<F: IntensityField>(
    cfg: &SimConfig,
    field: F,
) -> anyhow::Result<Simulation<F, LinearPowerCurve>> {
    let curve = LinearPowerCurve::new(cfg.drive.max_speed, cfg.drive.dead_band)?;
    let policy = cfg.simulation.out_of_bounds_policy();

    let robots = cfg
        .robots()
        .iter()
        .map(|rc| {
            Robot::new(
                rc,
                start_pose(rc, &cfg.track),
                cfg.simulation.dt,
                policy,
                &cfg.pid,
                &cfg.drive,
                &cfg.path,
            )
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    info!(robots = robots.len(), dt = cfg.simulation.dt, "Simulation assembled");
    Ok(Simulation::new(field, curve, robots))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_start_is_on_ring_heading_up() {
        let pose = start_pose(&RobotConfig::default(), &TrackConfig::default());
        assert_eq!((pose.x, pose.y), (500.0, 300.0));
        assert!((pose.theta - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_explicit_start_wins() {
        let rc = RobotConfig {
            start: Some([1.0, 2.0, 3.0]),
            route: Some([[0.0, 0.0], [1.0, 0.0]]),
            ..RobotConfig::default()
        };
        assert_eq!(start_pose(&rc, &TrackConfig::default()), Pose::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_step_advances_tick_and_every_robot() {
        let cfg = SimConfig {
            robots: vec![
                RobotConfig::default(),
                RobotConfig {
                    name: "robot-1".into(),
                    start: Some([100.0, 300.0, -1.0]),
                    ..RobotConfig::default()
                },
            ],
            ..SimConfig::default()
        };
        let track = build_track(&cfg.track).unwrap();
        let mut sim = from_config(&cfg, track).unwrap();
        let reports = sim.step();
        assert_eq!(reports.len(), 2);
        assert_eq!(sim.tick_count(), 1);
        assert!(reports.iter().all(|r| r.tick == 0));
        assert_ne!(sim.robots()[0].pose(), sim.robots()[1].pose());
    }
}
