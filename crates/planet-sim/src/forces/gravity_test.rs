use approx::assert_relative_eq;
use nalgebra::{Point2, Vector2};

use crate::body::Body;
use crate::forces::{EPSILON, acceleration_at, potential_energy};
use crate::params::SimulationParameters;

fn params() -> SimulationParameters {
    SimulationParameters::default()
}

#[test]
fn test_single_body_feels_no_force() {
    let bodies = vec![Body::new([3.0, -7.0], [1.0, 1.0], 500.0)];

    let accel = acceleration_at(bodies[0].position, &bodies, Some(0), &params());

    assert_eq!(accel, Vector2::zeros());
}

#[test]
fn test_empty_collection_feels_no_force() {
    let accel = acceleration_at(Point2::new(1.0, 1.0), &[], None, &params());

    assert_eq!(accel, Vector2::zeros());
}

#[test]
fn test_acceleration_magnitude_and_direction() {
    let bodies = vec![
        Body::new([0.0, 0.0], [0.0, 0.0], 1.0),
        Body::new([0.0, 20.0], [0.0, 0.0], 4.0),
    ];

    let accel = acceleration_at(bodies[0].position, &bodies, Some(0), &params());

    // G * m / r² = 10000 * 4 / 400
    assert_relative_eq!(accel.y, 100.0, epsilon = 1e-9);
    assert_eq!(accel.x, 0.0);
}

#[test]
fn test_two_bodies_pull_toward_each_other() {
    let bodies = vec![
        Body::new([-50.0, 0.0], [0.0, 0.0], 100.0),
        Body::new([50.0, 0.0], [0.0, 0.0], 100.0),
    ];

    let a0 = acceleration_at(bodies[0].position, &bodies, Some(0), &params());
    let a1 = acceleration_at(bodies[1].position, &bodies, Some(1), &params());

    assert!(a0.x > 0.0);
    assert!(a1.x < 0.0);
    assert_relative_eq!(a0.x, -a1.x);
    assert_eq!(a0.y, 0.0);
}

#[test]
fn test_hypothetical_point_sums_every_body() {
    let bodies = vec![
        Body::new([-10.0, 0.0], [0.0, 0.0], 1.0),
        Body::new([10.0, 0.0], [0.0, 0.0], 1.0),
    ];

    // Symmetric pulls cancel at the midpoint
    let midpoint = acceleration_at(Point2::origin(), &bodies, None, &params());
    assert_relative_eq!(midpoint.magnitude(), 0.0, epsilon = 1e-12);

    // Off-centre the nearer body wins
    let off = acceleration_at(Point2::new(5.0, 0.0), &bodies, None, &params());
    assert!(off.x > 0.0);
}

#[test]
fn test_coincident_pair_contributes_zero() {
    let bodies = vec![
        Body::new([0.0, 0.0], [0.0, 0.0], 1.0),
        Body::new([0.0, 0.0], [0.0, 0.0], 1.0),
        Body::new([0.0, 10.0], [0.0, 0.0], 1.0),
    ];

    let accel = acceleration_at(bodies[0].position, &bodies, Some(0), &params());

    // Only the body at distance 10 counts
    assert!(accel.x.is_finite() && accel.y.is_finite());
    assert_eq!(accel.x, 0.0);
    assert_relative_eq!(accel.y, 100.0, epsilon = 1e-9);
}

#[test]
fn test_near_coincident_threshold() {
    let just_inside = EPSILON.sqrt() * 0.5;
    let bodies = vec![Body::new([just_inside, 0.0], [0.0, 0.0], 1.0)];

    let accel = acceleration_at(Point2::origin(), &bodies, None, &params());

    assert_eq!(accel, Vector2::zeros());
}

#[test]
fn test_softening_reduces_force() {
    let bodies = vec![Body::new([1.0, 0.0], [0.0, 0.0], 1.0)];
    let hard = params();
    let soft = SimulationParameters {
        softening: 2.0,
        ..params()
    };

    let a_hard = acceleration_at(Point2::origin(), &bodies, None, &hard);
    let a_soft = acceleration_at(Point2::origin(), &bodies, None, &soft);

    assert!(a_soft.magnitude() < a_hard.magnitude());
    // G * m / (r² + s²) = 10000 / 5
    assert_relative_eq!(a_soft.x, 2000.0, epsilon = 1e-9);
}

#[test]
fn test_acceleration_scales_with_gravity() {
    let bodies = vec![Body::new([10.0, 0.0], [0.0, 0.0], 1.0)];
    let doubled = SimulationParameters {
        gravity: 20_000.0,
        ..params()
    };

    let a = acceleration_at(Point2::origin(), &bodies, None, &params());
    let b = acceleration_at(Point2::origin(), &bodies, None, &doubled);

    assert_relative_eq!(b.x, 2.0 * a.x);
}

#[test]
fn test_deterministic() {
    let bodies: Vec<Body> = (0..10)
        .map(|i| {
            let angle = i as f64 * 0.7;
            Body::new([30.0 * angle.cos(), 30.0 * angle.sin()], [0.0, 0.0], 10.0 + i as f64)
        })
        .collect();

    let first = acceleration_at(Point2::new(1.0, 2.0), &bodies, None, &params());
    let second = acceleration_at(Point2::new(1.0, 2.0), &bodies, None, &params());

    assert_eq!(first, second);
}

#[test]
fn test_potential_energy_two_bodies() {
    let bodies = vec![
        Body::new([0.0, 0.0], [0.0, 0.0], 2.0),
        Body::new([10.0, 0.0], [0.0, 0.0], 3.0),
    ];

    // -G m1 m2 / r
    assert_relative_eq!(potential_energy(&bodies, &params()), -6000.0, epsilon = 1e-9);
}

#[test]
fn test_potential_energy_more_bodies_more_negative() {
    let mut bodies = vec![
        Body::new([0.0, 0.0], [0.0, 0.0], 2.0),
        Body::new([10.0, 0.0], [0.0, 0.0], 3.0),
    ];
    let pe_two = potential_energy(&bodies, &params());

    bodies.push(Body::new([0.0, 10.0], [0.0, 0.0], 1.0));
    let pe_three = potential_energy(&bodies, &params());

    assert!(pe_three < pe_two);
    assert_eq!(potential_energy(&bodies[..1], &params()), 0.0);
}
