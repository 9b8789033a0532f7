//! A simulated line-following robot.

use anyhow::Context;
use linetrace_control::{
    LineStrategy, Mixer, Path, PidController, PowerCurve, PowerOdometry, WeightedCentroid,
    wheel_velocities,
};
use linetrace_kinematics::{DifferentialDrive, KinematicIntegrator, Pose, WheelVelocities};
use linetrace_sensing::{IntensityField, OutOfBounds, SensorArray, SensorGeometry, SensorReading};
use tracing::{debug, info};

use crate::config::{DriveConfig, PathConfig, PidConfig, RobotConfig};

/// Everything that happened to one robot in one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    /// Pose after the tick.
    pub pose: Pose,
    /// Reading taken at the pose before the tick.
    pub reading: SensorReading,
    /// Strategy error, `None` while the line is lost.
    pub error: Option<f64>,
    pub correction: f64,
    pub powers: (i32, i32),
    pub wheels: WheelVelocities,
    /// Whether the path-judging sensor is over the line.
    pub on_line: bool,
}

/// One robot: pose, chassis, sensor bar, controller and recorder.
///
/// Nothing here is shared between robots.
#[derive(Debug, Clone)]
pub struct Robot {
    name: String,
    pose: Pose,
    integrator: KinematicIntegrator,
    sensors: SensorArray,
    strategy: WeightedCentroid,
    pid: PidController,
    mixer: Mixer,
    odometry: PowerOdometry,
    path: Path,
    /// Consecutive ticks without the line under any sensor.
    lost_ticks: u64,
}

impl Robot {
    /// Build a robot from configuration, starting at `pose`.
    pub fn new(
        cfg: &RobotConfig,
        pose: Pose,
        dt: f64,
        policy: OutOfBounds,
        pid: &PidConfig,
        drive: &DriveConfig,
        path: &PathConfig,
    ) -> anyhow::Result<Self> {
        let chassis = DifferentialDrive::new(cfg.wheel_distance)
            .with_context(|| format!("robot {}: bad wheel distance", cfg.name))?;
        let integrator = KinematicIntegrator::new(chassis, dt)
            .with_context(|| format!("robot {}: bad time step", cfg.name))?;

        let geometry = SensorGeometry {
            forward_offset: cfg.sensor_forward_offset,
            lateral_offset: cfg.sensor_lateral_offset,
            mount_height: cfg.sensor_mount_height,
            field_of_view: cfg.sensor_field_of_view,
        };
        let sensors = SensorArray::new(geometry, policy)
            .with_context(|| format!("robot {}: bad sensor geometry", cfg.name))?;

        let controller = PidController::new(pid.kp, pid.ki, pid.kd)
            .with_limits(pid.output_min, pid.output_max)
            .with_context(|| format!("robot {}: bad PID limits", cfg.name))?;
        let mixer = Mixer::new(drive.base_power, drive.max_power)
            .with_context(|| format!("robot {}: bad drive powers", cfg.name))?;

        info!(
            robot = %cfg.name,
            %pose,
            wheel_distance = cfg.wheel_distance,
            cone_radius = geometry.cone_radius(),
            samples = sensors.samples_per_sensor(),
            "Robot created"
        );

        Ok(Robot {
            name: cfg.name.clone(),
            pose,
            integrator,
            sensors,
            strategy: WeightedCentroid::new(drive.line_threshold),
            pid: controller,
            mixer,
            odometry: PowerOdometry::new(),
            path: Path::new(path.capacity, path.use_left_sensor),
            lost_ticks: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn reading(&self) -> &SensorReading {
        self.sensors.reading()
    }

    pub fn odometry(&self) -> &PowerOdometry {
        &self.odometry
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pid(&self) -> &PidController {
        &self.pid
    }

    /// Simulated milliseconds since the line was last seen.
    pub fn lost_ms(&self) -> u64 {
        (self.lost_ticks as f64 * self.integrator.dt() * 1000.0).round() as u64
    }

    /// Put the robot at `pose` and clear the controller and strategy.
    pub fn reset(&mut self, pose: Pose) {
        self.pose = pose;
        self.pid.reset();
        self.strategy = WeightedCentroid::new(self.strategy.threshold());
        self.lost_ticks = 0;
        debug!(robot = %self.name, %pose, "Robot reset");
    }

    /// Put the robot on `from`, aimed at `toward`.
    pub fn reset_to_route(&mut self, from: (f64, f64), toward: (f64, f64)) {
        self.reset(Pose::facing(from, toward));
    }

    /// Move the robot by hand: turn by `dtheta * dt`, then drive `delta * dt`.
    pub fn nudge(&mut self, delta: f64, dtheta: f64) {
        self.pose.nudge(delta, dtheta, self.integrator.dt());
    }

    /// Re-mount the sensor bar at a new height.
    pub fn set_sensor_height(&mut self, h: f64) -> anyhow::Result<()> {
        self.sensors
            .set_mount_height(h)
            .with_context(|| format!("robot {}: bad sensor height", self.name))
    }

    /// Run one control period: sense, steer, drive, record.
    pub fn tick<F, C>(&mut self, tick: u64, field: &F, curve: &C) -> TickReport
    where
        F: IntensityField + ?Sized,
        C: PowerCurve + ?Sized,
    {
        let reading = *self.sensors.sense(&self.pose, field);

        let error = self.strategy.error(&reading);
        if error.is_some() {
            self.lost_ticks = 0;
        } else {
            self.lost_ticks += 1;
        }
        // Keep turning toward where the line was last seen.
        let correction = self.pid.compute(error.unwrap_or(self.strategy.last_error()));

        let (left, right) = self.mixer.mix(correction);
        let wheels = wheel_velocities(curve, left, right);
        self.pose = self.integrator.advance(self.pose, wheels);

        self.odometry.update(left, right, self.integrator.dt());
        let judge = if self.path.use_left_sensor() { 2 } else { 3 };
        let on_line = reading[judge] < 0.5;
        self.path.attempt_update(&self.odometry, on_line);

        debug!(
            robot = %self.name,
            tick,
            x = self.pose.x,
            y = self.pose.y,
            theta = self.pose.theta,
            ?error,
            correction,
            left,
            right,
            "Tick"
        );

        TickReport {
            tick,
            pose: self.pose,
            reading,
            error,
            correction,
            powers: (left, right),
            wheels,
            on_line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use linetrace_control::LinearPowerCurve;

    fn robot(pose: Pose) -> Robot {
        robot_with_dt(pose, 0.01)
    }

    fn robot_with_dt(pose: Pose, dt: f64) -> Robot {
        Robot::new(
            &RobotConfig::default(),
            pose,
            dt,
            OutOfBounds::Clamp,
            &PidConfig::default(),
            &DriveConfig::default(),
            &PathConfig::default(),
        )
        .unwrap()
    }

    /// White field with a vertical dark stripe at x in [x0, x0 + w).
    fn stripe(x0: u32, w: u32) -> GrayImage {
        GrayImage::from_fn(400, 400, |x, _| {
            if x >= x0 && x < x0 + w { Luma([20]) } else { Luma([255]) }
        })
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let cfg = RobotConfig {
            wheel_distance: 0.0,
            ..RobotConfig::default()
        };
        let result = Robot::new(
            &cfg,
            Pose::default(),
            0.01,
            OutOfBounds::Clamp,
            &PidConfig::default(),
            &DriveConfig::default(),
            &PathConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_steers_toward_line_on_the_left() {
        // Facing up the screen; left is -x. Line 6 px to the left.
        let field = stripe(190, 8);
        let curve = LinearPowerCurve::new(60.0, 20).unwrap();
        let mut bot = robot(Pose::new(200.0, 300.0, std::f64::consts::FRAC_PI_2));
        let report = bot.tick(0, &field, &curve);
        assert!(report.error.unwrap() > 0.0);
        assert!(report.correction > 0.0);
        assert!(report.powers.1 > report.powers.0);
        assert!(report.pose.theta > std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn test_lost_line_counts_and_holds_turn() {
        let curve = LinearPowerCurve::new(60.0, 20).unwrap();
        let mut bot = robot(Pose::new(200.0, 300.0, std::f64::consts::FRAC_PI_2));
        bot.tick(0, &stripe(190, 8), &curve);
        let white = GrayImage::from_pixel(400, 400, Luma([255]));
        let report = bot.tick(1, &white, &curve);
        assert_eq!(report.error, None);
        // Still turning left on the remembered error.
        assert!(report.powers.1 > report.powers.0);
        assert_eq!(bot.lost_ms(), 10);
    }

    #[test]
    fn test_reset_and_nudge() {
        let mut bot = robot(Pose::new(1.0, 2.0, 3.0));
        bot.reset_to_route((10.0, 10.0), (20.0, 10.0));
        assert_eq!(bot.pose(), Pose::new(10.0, 10.0, 0.0));
        bot.nudge(100.0, 0.0);
        assert!((bot.pose().x - 11.0).abs() < 1e-9);
        assert_eq!(bot.pid().integral_error(), 0.0);
    }

    #[test]
    fn test_reset_forgets_remembered_turn() {
        let curve = LinearPowerCurve::new(60.0, 20).unwrap();
        let white = GrayImage::from_pixel(400, 400, Luma([255]));
        let mut bot = robot(Pose::new(200.0, 300.0, std::f64::consts::FRAC_PI_2));
        bot.tick(0, &stripe(190, 8), &curve);

        bot.reset(Pose::new(200.0, 300.0, std::f64::consts::FRAC_PI_2));
        let report = bot.tick(1, &white, &curve);
        assert_eq!(report.error, None);
        assert_eq!(report.correction, 0.0);
        assert_eq!(report.powers.0, report.powers.1);
    }

    #[test]
    fn test_odometry_uses_exact_time_step() {
        let curve = LinearPowerCurve::new(60.0, 20).unwrap();
        let white = GrayImage::from_pixel(400, 400, Luma([255]));
        // Sub-millisecond and fractional-millisecond steps, one simulated second each.
        for (dt, ticks) in [(0.0004, 2500), (0.0125, 80)] {
            let mut bot = robot_with_dt(Pose::new(200.0, 300.0, 0.0), dt);
            for t in 0..ticks {
                bot.tick(t, &white, &curve);
            }
            let expected = 110.0 * 100.0 / 255.0;
            assert!(
                (bot.odometry().dist_along - expected).abs() < 1e-6,
                "dt = {dt}: {}",
                bot.odometry().dist_along
            );
            assert_eq!(bot.path().len(), 43);
        }
    }

    #[test]
    fn test_sensor_height_change() {
        let mut bot = robot(Pose::default());
        assert!(bot.set_sensor_height(8.0).is_ok());
        assert!(bot.set_sensor_height(-1.0).is_err());
    }

    #[test]
    fn test_records_path_while_driving() {
        let field = stripe(196, 8);
        let curve = LinearPowerCurve::new(60.0, 20).unwrap();
        let mut bot = robot(Pose::new(200.0, 390.0, std::f64::consts::FRAC_PI_2));
        for t in 0..300 {
            bot.tick(t, &field, &curve);
        }
        // 3 s at power 110 is about 129 cm of odometry.
        assert!(bot.odometry().dist_along > 120.0);
        assert!(bot.path().len() >= 120);
        assert!(bot.path().points().iter().any(|p| p.on_line));
    }
}
