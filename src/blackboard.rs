use parking_lot::RwLock;
use std::sync::Arc;

use linetrace_kinematics::Pose;
use linetrace_sensing::SensorReading;

/// Latest known state of one robot.
#[derive(Clone, Debug, Default)]
pub struct RobotStatus {
    pub name: String,
    pub pose: Pose,
    pub reading: SensorReading,
    /// Simulated milliseconds since the line was last seen.
    pub lost_ms: u64,
}

#[derive(Clone, Debug, Default)]
pub struct State {
    pub tick: u64,
    pub robots: Vec<RobotStatus>,
    pub faults: Vec<String>,
    pub finished: bool,
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn snapshot(bb: &Blackboard) -> State {
    (*bb.read()).clone()
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}

pub fn finish(bb: &Blackboard) {
    bb.write().finished = true;
}
