use std::sync::Mutex;

use nalgebra::{Matrix6x4, UnitQuaternion, Vector3, Vector4};
use thrust_alloc::layout::{BOTTOM_RIGHT, TOP_LEFT};
use thrust_alloc::mixer::{PITCH, SURGE, YAW};
use thrust_alloc::{
    DoubleFailure, DynamicsParams, Mode, MotorFailureController, SingleFailure, ThrusterLayout,
};

/// Surge velocity, pitch rate and yaw rate integrated per axis.
struct VehicleOde {
    params: DynamicsParams,
    effort: Vector3<f64>,
}

impl fast_ode::DifferentialEquation<3> for VehicleOde {
    fn ode_dot_y(&self, _t: f64, y: &fast_ode::Coord<3>) -> (fast_ode::Coord<3>, bool) {
        let (m, d) = (&self.params.inertia, &self.params.linear_damping);
        let v = y.0;
        let dot_y = [
            (self.effort[0] - d.surge * v[0]) / m.surge,
            (self.effort[1] - d.pitch * v[1]) / m.pitch,
            (self.effort[2] - d.yaw * v[2]) / m.yaw,
        ];
        (fast_ode::Coord(dot_y), true)
    }
}

/// Failure timeline: a thruster dies, the detector notices it a little later.
fn scheduled_mode(time: f64) -> (Mode, &'static [usize]) {
    const NONE_DEAD: &[usize] = &[];
    const TOP_LEFT_DEAD: &[usize] = &[TOP_LEFT];
    const DIAGONAL_DEAD: &[usize] = &[TOP_LEFT, BOTTOM_RIGHT];

    if time < 2.0 {
        (Mode::Normal, NONE_DEAD)
    } else if time < 2.5 {
        (Mode::SingleFailureUndetected, TOP_LEFT_DEAD)
    } else if time < 5.0 {
        (Mode::SingleFailureDetected(SingleFailure::TopLeft), TOP_LEFT_DEAD)
    } else if time < 5.5 {
        (Mode::DoubleFailureUndetected, DIAGONAL_DEAD)
    } else {
        (
            Mode::DoubleFailureDetected(DoubleFailure::TopLeftToBottomRight),
            DIAGONAL_DEAD,
        )
    }
}

fn main() -> Result<(), thrust_alloc::Error> {
    let params = match std::env::args().nth(1) {
        Some(path) => DynamicsParams::load(path)?,
        None => DynamicsParams::default(),
    };

    let mut controller = MotorFailureController::new(ThrusterLayout::default())?;
    controller.apply_params(&params);
    controller.set_target(0.2, -0.1, 0.6);

    // Mode changes and control ticks come from different actors on a real
    // vehicle, so access goes through one lock.
    let controller = Mutex::new(controller);
    let full_matrix = ThrusterLayout::default().full_mixer_matrix();

    let simulation_span = 8.0;
    let dt = 0.01;
    let mut current_time = 0.0;
    let mut state = [0.0; 3];

    while current_time < simulation_span {
        let (mode, dead) = scheduled_mode(current_time);

        let (thrusts, controllability) = {
            let mut controller = controller.lock().expect("controller lock poisoned");
            if controller.mode() != mode {
                controller.set_mode(mode)?;
                println!(
                    "t={current_time:.2} mode -> {mode}, controllability {:.4}",
                    controller.controllability()
                );
            }
            let thrusts =
                controller.update(state[1], state[2], state[0], &UnitQuaternion::identity());
            (thrusts, controller.controllability())
        };

        let effort = plant_effort(&full_matrix, dead, &thrusts);
        let ode = VehicleOde { params, effort };
        match fast_ode::solve_ivp(
            &ode,
            (0.0, dt),
            fast_ode::Coord(state),
            |_, _| true,
            1e-6,
            1e-5,
        ) {
            fast_ode::IvpResult::FinalTimeReached(y) => state = y.0,
            _ => println!("Simulation failed at t={current_time:.2}"),
        }

        println!(
            "{:.2} surge {:.3} pitch {:.3} yaw {:.3} thrust [{:.2} {:.2} {:.2} {:.2}] c {:.3}",
            current_time,
            state[0],
            state[1],
            state[2],
            thrusts[0],
            thrusts[1],
            thrusts[2],
            thrusts[3],
            controllability
        );

        current_time += dt;
    }

    Ok(())
}

/// Surge force, pitch and yaw torque that the still-working thrusters produce.
fn plant_effort(
    full_matrix: &Matrix6x4<f64>,
    dead: &[usize],
    thrusts: &Vector4<f64>,
) -> Vector3<f64> {
    let mut delivered = *thrusts;
    for &i in dead {
        delivered[i] = 0.0;
    }
    let wrench = full_matrix * delivered;
    Vector3::new(wrench[SURGE], wrench[PITCH], wrench[YAW])
}
