//! Simple orbital integration example
//!
//! Runs one planet on a circular orbit around an immovable star under each
//! of the three integrators and compares how well they hold the radius and
//! the energy.
//!
//! Run with: cargo run --package planet-sim --example simple_orbit

use nalgebra::{Point2, Vector2};
use planet_sim::scenario::circular_orbit_velocity;
use planet_sim::{IntegratorKind, SimulationParameters, SystemState, TIME_STEP};

fn main() {
    println!("Planet Sandbox: Single Planet Orbit\n");
    println!("{}", "=".repeat(60));

    let star_mass = 1_000.0;
    let r = 100.0;
    let n_orbits = 5;

    for kind in IntegratorKind::ALL {
        let mut system = SystemState::with_parameters(SimulationParameters {
            integrator: kind,
            ..Default::default()
        });
        let star = system
            .add_body(Point2::origin(), Vector2::zeros(), star_mass, false)
            .expect("valid star");
        let position = Point2::new(r, 0.0);
        let velocity = circular_orbit_velocity(&system, star, position).expect("star exists");
        let planet = system
            .add_body(position, velocity, 1.0, true)
            .expect("valid planet");

        let orbital_period = std::f64::consts::TAU * r / velocity.magnitude();
        let steps_per_orbit = (orbital_period / TIME_STEP).round() as usize;

        println!("\n{kind} ({} force evaluations per step)", kind.force_evaluations());
        println!("  Circular velocity: {:.3}", velocity.magnitude());
        println!(
            "  Period: {:.3} ({} steps/orbit)",
            orbital_period, steps_per_orbit
        );

        let initial_energy = system.total_energy();
        let initial_l = system.total_angular_momentum();

        for orbit in 1..=n_orbits {
            for _ in 0..steps_per_orbit {
                system.update(TIME_STEP);
            }

            let body = system.body(planet).expect("planet survives");
            let r_current = body.position.coords.magnitude();
            let energy_error = ((system.total_energy() - initial_energy) / initial_energy).abs();
            let l_error = ((system.total_angular_momentum() - initial_l) / initial_l).abs();
            let r_error = ((r_current - r) / r).abs();

            println!(
                "  Orbit {}: r={:.4}, ΔE={:.2e}, ΔL={:.2e}, Δr={:.2e}",
                orbit, r_current, energy_error, l_error, r_error
            );
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("Expect Δr(Euler) ≥ Δr(Verlet) ≥ Δr(RK4).");
}
