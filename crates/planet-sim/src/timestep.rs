//! Fixed-step clock
//!
//! Render loops deliver frames of varying length, while the integrators need
//! the same `dt` every step to stay reproducible. `FixedTimestep` banks frame
//! time and pays it out in whole steps, carrying the remainder to the next
//! frame.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::collisions::CollisionReport;
use crate::error::{Result, SimulationError};
use crate::predictor::TIME_STEP;
use crate::state::SystemState;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedTimestep {
    step: f64,
    accumulator: f64,
    max_steps: Option<usize>,
    step_count: u64,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self {
            step: TIME_STEP,
            accumulator: 0.0,
            max_steps: None,
            step_count: 0,
        }
    }
}

impl FixedTimestep {
    /// # Errors
    ///
    /// `InvalidTimestep` unless `step` is finite and positive.
    pub fn new(step: f64) -> Result<Self> {
        if !step.is_finite() || step <= 0.0 {
            return Err(SimulationError::InvalidTimestep(step));
        }
        Ok(Self {
            step,
            ..Default::default()
        })
    }

    /// Caps the steps paid out per frame
    ///
    /// Time beyond the cap is dropped rather than carried, so a long stall
    /// (a backgrounded tab, a breakpoint) does not trigger an ever-growing
    /// catch-up.
    pub fn with_max_steps(self, max_steps: usize) -> Self {
        Self {
            max_steps: Some(max_steps),
            ..self
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Steps paid out since creation or the last reset
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Banks `frame_delta` seconds and returns how many whole steps are due
    ///
    /// Negative and non-finite deltas count as zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use planet_sim::timestep::FixedTimestep;
    ///
    /// let mut clock = FixedTimestep::new(0.25).unwrap();
    ///
    /// assert_eq!(clock.advance(0.6), 2);
    /// // 0.1 carried over
    /// assert_eq!(clock.advance(0.2), 1);
    /// assert!((clock.alpha() - 0.2).abs() < 1e-9);
    /// ```
    pub fn advance(&mut self, frame_delta: f64) -> usize {
        if frame_delta.is_finite() && frame_delta > 0.0 {
            self.accumulator += frame_delta;
        }

        let mut due = (self.accumulator / self.step).floor() as usize;
        self.accumulator -= due as f64 * self.step;
        // Guards against a remainder that rounding left a hair above `step`
        if self.accumulator >= self.step {
            due += 1;
            self.accumulator -= self.step;
        }
        self.accumulator = self.accumulator.max(0.0);

        if let Some(max) = self.max_steps {
            if due > max {
                warn!(
                    "dropping {} steps ({:.3}s) to stay within {} per frame",
                    due - max,
                    (due - max) as f64 * self.step,
                    max
                );
                due = max;
                self.accumulator = 0.0;
            }
        }

        self.step_count += due as u64;
        due
    }

    /// Fraction of a step left in the accumulator, in `[0, 1)`
    ///
    /// Renderers can use it to interpolate between the last two states.
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.step
    }

    /// Banks `frame_delta` and steps `state` as many times as are due
    ///
    /// Returns the collision reports of all steps merged in order.
    pub fn run(&mut self, state: &mut SystemState, frame_delta: f64) -> CollisionReport {
        let due = self.advance(frame_delta);
        let mut report = CollisionReport::default();
        for _ in 0..due {
            report.events.extend(state.update(self.step).events);
        }
        report
    }

    /// Empties the accumulator and step counter, keeping step and cap
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.step_count = 0;
    }
}
