//! Trajectory prediction
//!
//! The predictor clones the live system, optionally adds one hypothetical
//! body (the one being placed by the user), and steps the clone forward with
//! the same integrator and collision code as the real thing. The live
//! `SystemState` is only ever borrowed immutably.

use std::collections::HashMap;

use log::trace;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::body::{Body, BodyId};
use crate::error::{Result, SimulationError};
use crate::state::SystemState;

/// Steps in a default prediction
pub const PREDICT_LENGTH: usize = 512;

/// Longest accepted horizon, about 18 minutes of simulated time
pub const MAX_PREDICT_LENGTH: usize = 1 << 16;

/// Fixed simulation step, one display frame at 60 Hz
pub const TIME_STEP: f64 = 1.0 / 60.0;

/// Forecast positions of one body, one entry per predicted step
///
/// Shorter than the horizon when the body was absorbed by a merge part way
/// through: the missing tail means the body no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: BodyId,
    pub positions: Vec<Point2<f64>>,
}

impl Prediction {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Predicted position after `step + 1` steps, if the body still exists
    pub fn at(&self, step: usize) -> Option<Point2<f64>> {
        self.positions.get(step).copied()
    }

    /// Last predicted position
    pub fn last(&self) -> Option<Point2<f64>> {
        self.positions.last().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Predictor {
    /// Number of steps to run
    pub horizon: usize,
    /// Step length handed to every `update`
    pub time_step: f64,
}

impl Default for Predictor {
    fn default() -> Self {
        Self {
            horizon: PREDICT_LENGTH,
            time_step: TIME_STEP,
        }
    }
}

impl Predictor {
    /// # Errors
    ///
    /// `InvalidTimestep` unless `time_step` is finite and positive,
    /// `InvalidParameter` for a horizon above `MAX_PREDICT_LENGTH`.
    pub fn new(horizon: usize, time_step: f64) -> Result<Self> {
        let predictor = Self { horizon, time_step };
        predictor.check()?;
        Ok(predictor)
    }

    /// Forecasts every body of `state`, plus `extra` if given
    ///
    /// Returns one `Prediction` per body, in the order of `state.bodies()`,
    /// with the extra body last. The extra body receives the id the live
    /// system would hand out next; its own `id` field is ignored.
    ///
    /// # Errors
    ///
    /// `InvalidTimestep` for a bad step, `InvalidParameter` for an
    /// oversized horizon, `InvalidMass` if `extra` has a bad mass.
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::{Point2, Vector2};
    /// use planet_sim::body::Body;
    /// use planet_sim::predictor::Predictor;
    /// use planet_sim::state::SystemState;
    ///
    /// let mut system = SystemState::new();
    /// system.add_body(Point2::origin(), Vector2::zeros(), 1_000.0, false).unwrap();
    ///
    /// let probe = Body::new([100.0, 0.0], [0.0, 300.0], 1.0);
    /// let predictor = Predictor { horizon: 120, ..Default::default() };
    /// let predictions = predictor.predict(&system, Some(&probe)).unwrap();
    ///
    /// assert_eq!(predictions.len(), 2);
    /// assert_eq!(predictions[1].len(), 120);
    /// // The live system is untouched
    /// assert_eq!(system.body_count(), 1);
    /// ```
    pub fn predict(&self, state: &SystemState, extra: Option<&Body>) -> Result<Vec<Prediction>> {
        self.check()?;

        let mut shadow = state.clone();
        if let Some(body) = extra {
            shadow.add_body(body.position, body.velocity, body.mass, body.movable)?;
        }

        let mut predictions: Vec<Prediction> = shadow
            .bodies()
            .iter()
            .map(|body| Prediction {
                id: body.id,
                positions: Vec::with_capacity(self.horizon),
            })
            .collect();
        let slots: HashMap<BodyId, usize> = predictions
            .iter()
            .enumerate()
            .map(|(slot, prediction)| (prediction.id, slot))
            .collect();

        for _ in 0..self.horizon {
            shadow.update(self.time_step);
            for body in shadow.bodies() {
                if let Some(&slot) = slots.get(&body.id) {
                    predictions[slot].positions.push(body.position);
                }
            }
        }

        trace!(
            "predicted {} bodies over {} steps, {} survive",
            predictions.len(),
            self.horizon,
            shadow.body_count()
        );
        Ok(predictions)
    }

    fn check(&self) -> Result<()> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(SimulationError::InvalidTimestep(self.time_step));
        }
        if self.horizon > MAX_PREDICT_LENGTH {
            return Err(SimulationError::InvalidParameter {
                name: "horizon",
                value: self.horizon as f64,
            });
        }
        Ok(())
    }
}

/// Forecasts `horizon` steps at the default `TIME_STEP`
pub fn predict(
    state: &SystemState,
    extra: Option<&Body>,
    horizon: usize,
) -> Result<Vec<Prediction>> {
    Predictor {
        horizon,
        ..Default::default()
    }
    .predict(state, extra)
}
