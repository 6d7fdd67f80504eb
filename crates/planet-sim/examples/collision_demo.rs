//! Collision handling example
//!
//! Drops the same crowded random cluster into each collision mode and
//! reports what happened, then previews where the largest survivor is headed.
//!
//! Run with: cargo run --package planet-sim --example collision_demo

use planet_sim::scenario::random_cluster;
use planet_sim::{CollisionEvent, CollisionMode, FixedTimestep, Predictor};

fn main() {
    println!("Planet Sandbox: Collision Demo\n");
    println!("{}", "=".repeat(60));

    let seed = 2024;
    let n_bodies = 40;

    for mode in CollisionMode::ALL {
        let mut system = random_cluster(n_bodies, 250.0, seed).expect("valid cluster");
        system.parameters.collisions = mode;
        let initial_mass = system.total_mass();
        let initial_momentum = system.total_momentum();

        let mut clock = FixedTimestep::default();
        let mut merges = 0;
        let mut bounces = 0;

        // Five seconds of 60 Hz frames
        for _ in 0..300 {
            let report = clock.run(&mut system, 1.0 / 60.0);
            for event in &report.events {
                match event {
                    CollisionEvent::Merge { .. } => merges += 1,
                    CollisionEvent::Bounce { .. } => bounces += 1,
                }
            }
        }

        println!("\nMode: {mode}");
        println!("  Bodies: {} -> {}", n_bodies, system.body_count());
        println!("  Merges: {merges}, bounces: {bounces}");
        println!(
            "  Mass drift: {:.2e}",
            (system.total_mass() - initial_mass).abs()
        );
        println!(
            "  Momentum drift: {:.2e}",
            (system.total_momentum() - initial_momentum).magnitude()
        );

        let heaviest = system
            .bodies()
            .iter()
            .max_by(|a, b| a.mass.total_cmp(&b.mass))
            .copied();
        if let Some(heaviest) = heaviest {
            let predictions = Predictor::default()
                .predict(&system, None)
                .expect("valid predictor");
            let track = predictions.iter().find(|p| p.id == heaviest.id);
            if let Some(end) = track.and_then(|p| p.last()) {
                println!(
                    "  Heaviest {:?} (mass {:.1}) heads from ({:.1}, {:.1}) to ({:.1}, {:.1})",
                    heaviest.id,
                    heaviest.mass,
                    heaviest.position.x,
                    heaviest.position.y,
                    end.x,
                    end.y
                );
            }
        }
    }

    println!("\nDemo complete!");
}
