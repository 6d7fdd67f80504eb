//! Global simulation parameters
//!
//! Every field is plain data: a front end may overwrite any of them between
//! two calls to `SystemState::update` and the change takes effect on the next
//! call. Switching integrator or collision mode needs no transition logic.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::body::radius_for;
use crate::error::{Result, SimulationError};

pub const GRAVITY_DEFAULT: f64 = 10_000.0;
pub const GRAVITY_RANGE: RangeInclusive<f64> = 5_000.0..=20_000.0;

pub const DENSITY_DEFAULT: f64 = 1.0;
pub const DENSITY_RANGE: RangeInclusive<f64> = 0.1..=10.0;

pub const SOFTENING_DEFAULT: f64 = 0.0;
pub const SOFTENING_RANGE: RangeInclusive<f64> = 0.0..=50.0;

/// Time-integration scheme used for movable bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegratorKind {
    /// Semi-implicit (symplectic) Euler, one force evaluation
    Euler,
    /// Velocity Verlet, two force evaluations
    #[default]
    Verlet,
    /// Classical fourth-order Runge-Kutta, four force evaluations
    Rk4,
}

impl IntegratorKind {
    pub const ALL: [IntegratorKind; 3] = [
        IntegratorKind::Euler,
        IntegratorKind::Verlet,
        IntegratorKind::Rk4,
    ];

    /// Force evaluations per body per step
    pub fn force_evaluations(self) -> usize {
        match self {
            IntegratorKind::Euler => 1,
            IntegratorKind::Verlet => 2,
            IntegratorKind::Rk4 => 4,
        }
    }
}

impl fmt::Display for IntegratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntegratorKind::Euler => "Euler",
            IntegratorKind::Verlet => "Verlet",
            IntegratorKind::Rk4 => "RK4",
        };
        f.write_str(name)
    }
}

/// How overlapping, approaching bodies are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionMode {
    /// Bodies pass through each other
    None,
    /// The later body is absorbed into the earlier one
    #[default]
    Merge,
    /// Perfectly elastic bounce along the line of centres
    Elastic,
}

impl CollisionMode {
    pub const ALL: [CollisionMode; 3] = [
        CollisionMode::None,
        CollisionMode::Merge,
        CollisionMode::Elastic,
    ];
}

impl fmt::Display for CollisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CollisionMode::None => "None",
            CollisionMode::Merge => "Merge",
            CollisionMode::Elastic => "Elastic",
        };
        f.write_str(name)
    }
}

/// Parameters shared by every body in one simulation
///
/// Missing fields deserialize to their defaults, so a partial configuration
/// only needs to name what it changes.
///
/// ```
/// use planet_sim::params::{CollisionMode, IntegratorKind, SimulationParameters};
///
/// let params = SimulationParameters {
///     integrator: IntegratorKind::Rk4,
///     collisions: CollisionMode::Elastic,
///     ..Default::default()
/// };
/// assert!(params.validate().is_ok());
/// assert_eq!(params.gravity, 10_000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Scales every pairwise attraction
    pub gravity: f64,
    /// Converts mass to radius: r = (m / density)^(1/3)
    pub density: f64,
    /// Added in quadrature to every separation to bound close-range forces
    pub softening: f64,
    pub integrator: IntegratorKind,
    pub collisions: CollisionMode,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            gravity: GRAVITY_DEFAULT,
            density: DENSITY_DEFAULT,
            softening: SOFTENING_DEFAULT,
            integrator: IntegratorKind::default(),
            collisions: CollisionMode::default(),
        }
    }
}

impl SimulationParameters {
    /// Radius of a body of `mass` under the current density
    pub fn radius_of(&self, mass: f64) -> f64 {
        radius_for(mass, self.density)
    }

    /// Checks every scalar against its physical domain
    ///
    /// The slider ranges are advisory; only values that would make the
    /// physics meaningless (NaN, negative gravity, non-positive density) are
    /// rejected.
    pub fn validate(&self) -> Result<()> {
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(SimulationError::InvalidParameter {
                name: "gravity",
                value: self.gravity,
            });
        }
        if !self.density.is_finite() || self.density <= 0.0 {
            return Err(SimulationError::InvalidParameter {
                name: "density",
                value: self.density,
            });
        }
        if !self.softening.is_finite() || self.softening < 0.0 {
            return Err(SimulationError::InvalidParameter {
                name: "softening",
                value: self.softening,
            });
        }
        Ok(())
    }

    /// Copy with each scalar clamped into its control-panel range
    pub fn clamped(&self) -> Self {
        Self {
            gravity: clamp_to(self.gravity, &GRAVITY_RANGE),
            density: clamp_to(self.density, &DENSITY_RANGE),
            softening: clamp_to(self.softening, &SOFTENING_RANGE),
            ..*self
        }
    }
}

fn clamp_to(value: f64, range: &RangeInclusive<f64>) -> f64 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}
