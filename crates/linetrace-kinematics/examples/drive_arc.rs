use linetrace_kinematics::*;

fn main() {
    let wheel_distance = 30.0; // px, 15 cm axle
    let dt = 0.02;
    let num_steps = 10;

    let integrator = match DifferentialDrive::new(wheel_distance)
        .and_then(|drive| KinematicIntegrator::new(drive, dt))
    {
        Ok(integrator) => integrator,
        Err(e) => {
            eprintln!("Failed to initialize kinematics: {}", e);
            return;
        }
    };

    let mut current_pose = Pose::new(100.0, 100.0, 0.0);
    let wheels = WheelVelocities::new(60.0, 66.0); // slight left curve

    println!("Initializing simulation...");
    println!("  {}", integrator.drive());
    println!("  Chassis Speeds: {}", integrator.drive().forward_kinematics(wheels));
    println!("  Time Step:      {} s", integrator.dt());

    for i in 0..num_steps {
        current_pose = integrator.advance(current_pose, wheels);
        println!("Step {:>2}: Pose: {}", i + 1, current_pose);
    }

    println!("Final Pose: {:?}", current_pose);
}
