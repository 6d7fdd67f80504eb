//! Planet sandbox simulation core
//!
//! A variable set of point masses under softened mutual gravity, stepped by
//! one of three fixed-step integrators, with collisions that either bounce or
//! merge. A predictor runs a throwaway copy of the system forward to preview
//! trajectories without touching the live state.

pub mod body;
pub mod collisions;
pub mod error;
pub mod forces;
pub mod integrator;
pub mod params;
pub mod predictor;
pub mod scenario;
pub mod state;
pub mod timestep;

// Re-export the types most callers need at crate root
pub use body::{Body, BodyId};
pub use collisions::{CollisionEvent, CollisionReport};
pub use error::{Result, SimulationError};
pub use params::{CollisionMode, IntegratorKind, SimulationParameters};
pub use predictor::{
    MAX_PREDICT_LENGTH, PREDICT_LENGTH, Prediction, Predictor, TIME_STEP, predict,
};
pub use state::SystemState;
pub use timestep::FixedTimestep;

#[cfg(test)]
mod params_test;
