//! Line follower simulator host.
//!
//! Wires the kinematics, sensing and control crates into robots that
//! drive over a track image, and runs them on a fixed time step.

pub mod blackboard;
pub mod bus;
pub mod config;
pub mod host;
pub mod robot;
pub mod sim;
pub mod telemetry;

pub use robot::{Robot, TickReport};
pub use sim::Simulation;
