//! Direct N-body gravity (O(N²) implementation)

use nalgebra::{Point2, Vector2};

use crate::body::Body;
use crate::forces::EPSILON;
use crate::params::SimulationParameters;

/// Gravitational acceleration at `position` due to `bodies`
///
/// Each body `j` other than `exclude` contributes
/// `G * m_j * normalize(sep) / (|sep|² + softening²)` with
/// `sep = body_j.position - position`. A body closer than `sqrt(EPSILON)`
/// contributes zero.
///
/// Pass `exclude = None` to probe a point that is not a body in the
/// collection (creation preview, field grid).
///
/// # Examples
///
/// ```
/// use planet_sim::body::Body;
/// use planet_sim::forces::acceleration_at;
/// use planet_sim::params::SimulationParameters;
/// use nalgebra::Point2;
///
/// let params = SimulationParameters::default();
/// let bodies = vec![Body::new([10.0, 0.0], [0.0, 0.0], 1.0)];
///
/// let accel = acceleration_at(Point2::origin(), &bodies, None, &params);
///
/// // Pulled toward the body along +x: G * m / r² = 10000 / 100
/// assert!((accel.x - 100.0).abs() < 1e-9);
/// assert_eq!(accel.y, 0.0);
/// ```
pub fn acceleration_at(
    position: Point2<f64>,
    bodies: &[Body],
    exclude: Option<usize>,
    params: &SimulationParameters,
) -> Vector2<f64> {
    let eps2 = params.softening * params.softening;

    bodies
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != exclude)
        .fold(Vector2::zeros(), |acc, (_, other)| {
            let separation = other.position - position;
            let r2 = separation.magnitude_squared();
            if r2 < EPSILON {
                return acc;
            }

            let direction = separation / r2.sqrt();
            acc + direction * (params.gravity * other.mass / (r2 + eps2))
        })
}

/// Plummer-softened potential energy of a single pair
///
/// Matches the force law exactly only at zero softening.
pub fn pair_potential(a: &Body, b: &Body, params: &SimulationParameters) -> f64 {
    let r2 = (a.position - b.position).magnitude_squared();
    if r2 < EPSILON {
        return 0.0;
    }
    let eps2 = params.softening * params.softening;
    -params.gravity * a.mass * b.mass / (r2 + eps2).sqrt()
}

/// Total potential energy, each pair counted once
pub fn potential_energy(bodies: &[Body], params: &SimulationParameters) -> f64 {
    bodies
        .iter()
        .enumerate()
        .flat_map(|(i, a)| {
            bodies[i + 1..]
                .iter()
                .map(move |b| pair_potential(a, b, params))
        })
        .sum()
}
