//! Preset starting configurations
//!
//! Every builder is deterministic: the same arguments (and seed, for the
//! random cluster) always give the same system.

use std::f64::consts::TAU;

use nalgebra::{Point2, Rotation2, Vector2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

use crate::body::BodyId;
use crate::error::{Result, SimulationError};
use crate::forces::EPSILON;
use crate::params::{IntegratorKind, SimulationParameters};
use crate::state::SystemState;

/// Angle between successive planets in `star_with_planets`
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Placement attempts per body before `random_cluster` accepts an overlap
const PLACEMENT_ATTEMPTS: usize = 32;

/// Two bodies of mass 100 at rest on the x axis, 100 apart, Euler stepping
///
/// They fall together and merge into one body of mass 200 within a second
/// of simulated time.
pub fn two_body_collapse() -> Result<SystemState> {
    let mut state = SystemState::with_parameters(SimulationParameters {
        integrator: IntegratorKind::Euler,
        ..Default::default()
    });
    state.add_body(Point2::new(-50.0, 0.0), Vector2::zeros(), 100.0, true)?;
    state.add_body(Point2::new(50.0, 0.0), Vector2::zeros(), 100.0, true)?;
    Ok(state)
}

/// Two equal masses circling their common centre at the origin
///
/// # Examples
///
/// ```
/// use planet_sim::scenario::binary_orbit;
///
/// let system = binary_orbit(50.0, 200.0).unwrap();
///
/// assert_eq!(system.body_count(), 2);
/// assert!(system.total_momentum().magnitude() < 1e-9);
/// ```
pub fn binary_orbit(mass: f64, separation: f64) -> Result<SystemState> {
    if !separation.is_finite() || separation <= 0.0 {
        return Err(SimulationError::InvalidParameter {
            name: "separation",
            value: separation,
        });
    }

    let mut state = SystemState::new();
    let params = state.parameters;
    // Each body needs G m / d² = v² / (d / 2)
    let eps2 = params.softening * params.softening;
    let speed =
        (params.gravity * mass * separation / (2.0 * (separation * separation + eps2))).sqrt();
    let half = separation / 2.0;

    state.add_body(Point2::new(-half, 0.0), Vector2::new(0.0, -speed), mass, true)?;
    state.add_body(Point2::new(half, 0.0), Vector2::new(0.0, speed), mass, true)?;
    Ok(state)
}

/// An immovable star at the origin with `n` unit-mass planets on circular orbits
///
/// Planet `k` orbits at `inner_radius + k * spacing`, spread around the star
/// by the golden angle. Orbital speeds only account for the star.
pub fn star_with_planets(
    n: usize,
    star_mass: f64,
    inner_radius: f64,
    spacing: f64,
) -> Result<SystemState> {
    let mut state = SystemState::new();
    let star = state.add_body(Point2::origin(), Vector2::zeros(), star_mass, false)?;

    for k in 0..n {
        let distance = inner_radius + k as f64 * spacing;
        let direction = Rotation2::new(k as f64 * GOLDEN_ANGLE) * Vector2::x();
        let position = Point2::from(direction * distance);
        let velocity = circular_orbit_velocity(&state, star, position)?;
        state.add_body(position, velocity, 1.0, true)?;
    }

    Ok(state)
}

/// `n` bodies scattered over a disc of `radius`, with zero net momentum
///
/// Masses fall between 5 and 50. Each body gets a few tries to land clear
/// of those already placed.
///
/// # Examples
///
/// ```
/// use planet_sim::scenario::random_cluster;
///
/// let a = random_cluster(20, 400.0, 7).unwrap();
/// let b = random_cluster(20, 400.0, 7).unwrap();
///
/// assert_eq!(a, b);
/// assert_eq!(a.body_count(), 20);
/// ```
pub fn random_cluster(n: usize, radius: f64, seed: u64) -> Result<SystemState> {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    let mut state = SystemState::new();

    for _ in 0..n {
        let mass: f64 = rng.random_range(5.0..50.0);
        let reach = state.radius_of(mass);
        let density = state.parameters.density;

        let mut position = sample_disc(&mut rng, radius);
        for _ in 1..PLACEMENT_ATTEMPTS {
            let clear = state
                .bodies()
                .iter()
                .all(|b| (b.position - position).magnitude() > b.radius(density) + reach);
            if clear {
                break;
            }
            position = sample_disc(&mut rng, radius);
        }

        let velocity = Vector2::new(
            rng.random_range(-20.0..20.0),
            rng.random_range(-20.0..20.0),
        );
        state.add_body(position, velocity, mass, true)?;
    }

    // Work in the centre-of-momentum frame so the cluster stays in view
    let drift = state.total_momentum() / state.total_mass().max(EPSILON);
    let ids: Vec<BodyId> = state.bodies().iter().map(|b| b.id).collect();
    for id in ids {
        if let Some(body) = state.body_mut(id) {
            body.velocity -= drift;
        }
    }

    Ok(state)
}

/// Velocity for a circular orbit at `position` around the body `center`
///
/// Counter-clockwise, relative to the centre's own velocity, and consistent
/// with the softened force law. Other bodies are ignored.
///
/// # Errors
///
/// `BodyNotFound` if `center` is not in `state`.
///
/// # Examples
///
/// ```
/// use nalgebra::{Point2, Vector2};
/// use planet_sim::scenario::circular_orbit_velocity;
/// use planet_sim::state::SystemState;
///
/// let mut system = SystemState::new();
/// let sun = system.add_body(Point2::origin(), Vector2::zeros(), 1_000.0, false).unwrap();
///
/// let v = circular_orbit_velocity(&system, sun, Point2::new(100.0, 0.0)).unwrap();
///
/// // sqrt(G M / r) = sqrt(10_000 * 1_000 / 100)
/// assert!((v.y - 316.227766).abs() < 1e-6);
/// assert_eq!(v.x, 0.0);
/// ```
pub fn circular_orbit_velocity(
    state: &SystemState,
    center: BodyId,
    position: Point2<f64>,
) -> Result<Vector2<f64>> {
    let center = state.body(center).ok_or(SimulationError::BodyNotFound(center))?;

    let offset = position - center.position;
    let r2 = offset.magnitude_squared();
    if r2 < EPSILON {
        return Ok(center.velocity);
    }

    let params = &state.parameters;
    let r = r2.sqrt();
    let eps2 = params.softening * params.softening;
    let speed = (params.gravity * center.mass * r / (r2 + eps2)).sqrt();
    let tangent = Vector2::new(-offset.y, offset.x) / r;

    Ok(center.velocity + tangent * speed)
}

fn sample_disc(rng: &mut ChaChaRng, radius: f64) -> Point2<f64> {
    // sqrt keeps the density uniform over the area
    let r = radius * rng.random::<f64>().sqrt();
    let angle = rng.random_range(0.0..TAU);
    Point2::new(r * angle.cos(), r * angle.sin())
}
