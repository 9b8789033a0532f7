//! Simulation configuration.
//!
//! Values come from `config/default.toml` (optional) overlaid with
//! `LINETRACE__SECTION__KEY` environment variables. Every field has a
//! default, so an empty configuration runs one robot around a generated
//! ring track.

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File, FileFormat};
use linetrace_sensing::OutOfBounds;
use serde::Deserialize;
use tracing::{error, info};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SimConfig {
    pub simulation: SimulationConfig,
    pub track: TrackConfig,
    pub pid: PidConfig,
    pub drive: DriveConfig,
    pub telemetry: TelemetryConfig,
    pub path: PathConfig,
    pub robots: Vec<RobotConfig>,
}

impl SimConfig {
    /// Configured robots, or one default robot when none are listed.
    pub fn robots(&self) -> Vec<RobotConfig> {
        if self.robots.is_empty() {
            vec![RobotConfig::default()]
        } else {
            self.robots.clone()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed time step in seconds.
    pub dt: f64,
    /// Number of ticks to run.
    pub ticks: u64,
    /// Pace ticks to wall-clock time.
    pub realtime: bool,
    /// `"clamp"` or `"constant"`.
    pub out_of_bounds: String,
    /// Intensity read off the track when `out_of_bounds = "constant"`.
    pub out_of_bounds_value: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            dt: 0.01,
            ticks: 4000,
            realtime: false,
            out_of_bounds: "clamp".to_string(),
            out_of_bounds_value: 1.0,
        }
    }
}

impl SimulationConfig {
    /// Out-of-bounds sampling policy. Unknown names fall back to clamping.
    pub fn out_of_bounds_policy(&self) -> OutOfBounds {
        match self.out_of_bounds.as_str() {
            "constant" => OutOfBounds::Constant(self.out_of_bounds_value),
            _ => OutOfBounds::Clamp,
        }
    }
}

/// Track source. A generated ring is used unless `image` is set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub image: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    pub ring_radius: f64,
    pub line_width: f64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        TrackConfig {
            image: None,
            width: 600,
            height: 600,
            ring_radius: 200.0,
            line_width: 8.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PidConfig {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub output_min: f64,
    pub output_max: f64,
}

impl Default for PidConfig {
    fn default() -> Self {
        PidConfig {
            kp: 0.5,
            ki: 0.0005,
            kd: 1.0,
            output_min: -1.0,
            output_max: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub base_power: i32,
    pub max_power: i32,
    /// Ground speed at full power (cm/s).
    pub max_speed: f64,
    pub dead_band: i32,
    /// Minimum sensor darkness that counts as seeing the line.
    pub line_threshold: f64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        DriveConfig {
            base_power: 110,
            max_power: 255,
            max_speed: 60.0,
            dead_band: 20,
            line_threshold: 0.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Publish telemetry every this many ticks.
    pub every_n_ticks: u64,
    /// Simulated time off the line before the watchdog raises a fault.
    pub lost_line_timeout_ms: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        TelemetryConfig {
            every_n_ticks: 100,
            lost_line_timeout_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub capacity: usize,
    pub use_left_sensor: bool,
}

impl Default for PathConfig {
    fn default() -> Self {
        PathConfig {
            capacity: 2048,
            use_left_sensor: true,
        }
    }
}

/// One robot. Lengths are track pixels (0.5 cm), angles radians.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub name: String,
    /// Explicit start `[x, y, theta]`.
    pub start: Option<[f64; 3]>,
    /// Start on the first point facing the second; used when `start` is unset.
    pub route: Option<[[f64; 2]; 2]>,
    pub wheel_distance: f64,
    pub sensor_forward_offset: f64,
    pub sensor_lateral_offset: f64,
    pub sensor_mount_height: f64,
    pub sensor_field_of_view: f64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        RobotConfig {
            name: "robot-0".to_string(),
            start: None,
            route: None,
            wheel_distance: 28.0,
            sensor_forward_offset: 30.0,
            sensor_lateral_offset: 3.0,
            sensor_mount_height: 4.0,
            sensor_field_of_view: std::f64::consts::FRAC_PI_3,
        }
    }
}

/// Load configuration from `path` (or [`DEFAULT_CONFIG_PATH`]) and the environment.
pub fn load_config(path: Option<&str>) -> Result<SimConfig, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    info!("Attempting to load configuration from {}", path);

    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(false))
        .add_source(Environment::with_prefix("LINETRACE").separator("__"))
        .build()
        .and_then(|c| c.try_deserialize::<SimConfig>());

    match settings {
        Ok(config) => {
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_source() {
        let cfg: SimConfig = Config::builder()
            .add_source(File::from_str("", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.simulation.dt, 0.01);
        assert_eq!(cfg.drive.base_power, 110);
        assert_eq!(cfg.robots().len(), 1);
        assert_eq!(cfg.simulation.out_of_bounds_policy(), OutOfBounds::Clamp);
    }

    #[test]
    fn test_toml_overrides() {
        let toml = r#"
            [simulation]
            dt = 0.02
            out_of_bounds = "constant"
            out_of_bounds_value = 0.5

            [pid]
            kp = 1.5

            [[robots]]
            name = "a"
            start = [10.0, 20.0, 0.5]

            [[robots]]
            name = "b"
            route = [[0.0, 0.0], [5.0, 0.0]]
        "#;
        let cfg: SimConfig = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.simulation.dt, 0.02);
        assert_eq!(cfg.simulation.out_of_bounds_policy(), OutOfBounds::Constant(0.5));
        assert_eq!(cfg.pid.kp, 1.5);
        assert_eq!(cfg.pid.output_min, -1.0);
        let robots = cfg.robots();
        assert_eq!(robots.len(), 2);
        assert_eq!(robots[0].start, Some([10.0, 20.0, 0.5]));
        assert_eq!(robots[1].route, Some([[0.0, 0.0], [5.0, 0.0]]));
        assert_eq!(robots[1].wheel_distance, 28.0);
    }
}
