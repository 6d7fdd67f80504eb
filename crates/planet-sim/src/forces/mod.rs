//! Gravitational force law
//!
//! Direct O(N²) summation over the body collection with a softening length.
//! Every integrator and the field overlay go through `acceleration_at`, so a
//! prediction and the live simulation see exactly the same forces.

pub mod gravity;

#[cfg(test)]
mod gravity_test;

pub use gravity::{acceleration_at, pair_potential, potential_energy};

/// Squared separations below this are treated as coincident
///
/// Such a pair contributes nothing instead of producing a NaN direction.
pub const EPSILON: f64 = 1.0e-9;
