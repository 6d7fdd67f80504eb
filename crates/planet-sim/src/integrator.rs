//! Time integration for N-body systems
//!
//! Three fixed-step schemes advance one body against a frozen snapshot of the
//! whole system. Because every force evaluation reads the snapshot and never
//! a partially advanced neighbour, the result of a step does not depend on
//! the order in which bodies are visited.
//!
//! | scheme  | order | force evaluations |
//! |---------|-------|-------------------|
//! | Euler   | 1     | 1                 |
//! | Verlet  | 2     | 2                 |
//! | RK4     | 4     | 4                 |

use std::ops::{Add, Mul};

use nalgebra::{Point2, Vector2};

use crate::body::Body;
use crate::forces::acceleration_at;
use crate::params::{IntegratorKind, SimulationParameters};

impl IntegratorKind {
    /// Advance the body at `index` of `snapshot` by `dt`
    ///
    /// Immovable bodies come back unchanged without any force evaluation.
    ///
    /// # Examples
    ///
    /// ```
    /// use planet_sim::body::Body;
    /// use planet_sim::params::{IntegratorKind, SimulationParameters};
    ///
    /// let params = SimulationParameters::default();
    /// let snapshot = vec![
    ///     Body::new([-50.0, 0.0], [0.0, 0.0], 100.0),
    ///     Body::new([50.0, 0.0], [0.0, 0.0], 100.0),
    /// ];
    ///
    /// let next = IntegratorKind::Rk4.advance(&snapshot, 0, 1.0 / 60.0, &params);
    /// assert!(next.position.x > -50.0);
    /// assert!(next.velocity.x > 0.0);
    /// ```
    pub fn advance(
        self,
        snapshot: &[Body],
        index: usize,
        dt: f64,
        params: &SimulationParameters,
    ) -> Body {
        let body = snapshot[index];
        if !body.movable {
            return body;
        }

        let state = KinematicState::of(&body);
        let next = match self {
            IntegratorKind::Euler => euler(state, snapshot, index, dt, params),
            IntegratorKind::Verlet => verlet(state, snapshot, index, dt, params),
            IntegratorKind::Rk4 => rk4(state, snapshot, index, dt, params),
        };

        Body {
            position: next.position,
            velocity: next.velocity,
            ..body
        }
    }

    /// Advance every body of `snapshot`, returning the new collection
    pub fn step_all(self, snapshot: &[Body], dt: f64, params: &SimulationParameters) -> Vec<Body> {
        (0..snapshot.len())
            .map(|i| self.advance(snapshot, i, dt, params))
            .collect()
    }
}

/// Position and velocity of a single body, treated as one state vector
#[derive(Debug, Clone, Copy, PartialEq)]
struct KinematicState {
    position: Point2<f64>,
    velocity: Vector2<f64>,
}

impl KinematicState {
    fn of(body: &Body) -> Self {
        Self {
            position: body.position,
            velocity: body.velocity,
        }
    }

    /// Time derivative: (velocity, acceleration) at this state
    fn derivative(self, snapshot: &[Body], index: usize, params: &SimulationParameters) -> Derivative {
        Derivative {
            position: self.velocity,
            velocity: acceleration_at(self.position, snapshot, Some(index), params),
        }
    }
}

/// Rate of change of a `KinematicState`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Derivative {
    position: Vector2<f64>,
    velocity: Vector2<f64>,
}

impl Add for Derivative {
    type Output = Derivative;

    fn add(self, rhs: Derivative) -> Derivative {
        Derivative {
            position: self.position + rhs.position,
            velocity: self.velocity + rhs.velocity,
        }
    }
}

impl Mul<f64> for Derivative {
    type Output = Derivative;

    fn mul(self, scale: f64) -> Derivative {
        Derivative {
            position: self.position * scale,
            velocity: self.velocity * scale,
        }
    }
}

impl Add<Derivative> for KinematicState {
    type Output = KinematicState;

    fn add(self, delta: Derivative) -> KinematicState {
        KinematicState {
            position: self.position + delta.position,
            velocity: self.velocity + delta.velocity,
        }
    }
}

/// Semi-implicit Euler: kick first, then drift with the new velocity
fn euler(
    state: KinematicState,
    snapshot: &[Body],
    index: usize,
    dt: f64,
    params: &SimulationParameters,
) -> KinematicState {
    let accel = acceleration_at(state.position, snapshot, Some(index), params);
    let velocity = state.velocity + accel * dt;
    let position = state.position + velocity * dt;

    KinematicState { position, velocity }
}

/// Velocity Verlet
///
/// 1. x(t + dt) = x(t) + v(t) dt + ½ a(t) dt²
/// 2. v(t + dt) = v(t) + ½ (a(t) + a(t + dt)) dt
fn verlet(
    state: KinematicState,
    snapshot: &[Body],
    index: usize,
    dt: f64,
    params: &SimulationParameters,
) -> KinematicState {
    let accel = acceleration_at(state.position, snapshot, Some(index), params);
    let position = state.position + state.velocity * dt + accel * (0.5 * dt * dt);

    let new_accel = acceleration_at(position, snapshot, Some(index), params);
    let velocity = state.velocity + (accel + new_accel) * (0.5 * dt);

    KinematicState { position, velocity }
}

/// Classical fourth-order Runge-Kutta on the coupled (x, v) state
fn rk4(
    state: KinematicState,
    snapshot: &[Body],
    index: usize,
    dt: f64,
    params: &SimulationParameters,
) -> KinematicState {
    let half_dt = 0.5 * dt;

    let k1 = state.derivative(snapshot, index, params);
    let k2 = (state + k1 * half_dt).derivative(snapshot, index, params);
    let k3 = (state + k2 * half_dt).derivative(snapshot, index, params);
    let k4 = (state + k3 * dt).derivative(snapshot, index, params);

    let weighted = k1 + k2 * 2.0 + k3 * 2.0 + k4;
    state + weighted * (dt / 6.0)
}
