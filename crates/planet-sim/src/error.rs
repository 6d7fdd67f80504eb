//! Error types for the simulation core
//!
//! The per-tick path (`SystemState::update`) never fails. Errors only come
//! from constructors and validation, where a caller handed in something the
//! engine refuses to store.

use thiserror::Error;

use crate::body::BodyId;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SimulationError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Bodies must carry a strictly positive, finite mass
    #[error("invalid body mass {0}: mass must be finite and positive")]
    InvalidMass(f64),

    /// A simulation parameter is outside its physical domain
    #[error("invalid parameter `{name}` = {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Fixed time steps must be finite and positive
    #[error("invalid time step {0}: must be finite and positive")]
    InvalidTimestep(f64),

    /// A body with this id is already in the collection
    #[error("body {0:?} is already present")]
    DuplicateBody(BodyId),

    /// Every `u32` id has been handed out; ids are never reused
    #[error("no body ids left")]
    IdsExhausted,

    /// No body with this id exists (it may have been merged away)
    #[error("body {0:?} not found")]
    BodyNotFound(BodyId),
}
