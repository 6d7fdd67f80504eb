use log::{debug, trace, warn};
use nalgebra::{Point2, Vector2};
use serde::Serialize;

use crate::body::{Body, BodyId};
use crate::collisions::{CollisionReport, resolve_collisions};
use crate::error::{Result, SimulationError};
use crate::forces::{acceleration_at, potential_energy};
use crate::params::SimulationParameters;

/// Complete state of a planet sandbox at a given time
///
/// Owns the body collection. Indices into `bodies()` are only valid until
/// the next `update`, because a merge removes a body and shifts the rest;
/// hold a `BodyId` and re-resolve it with `index_of` instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemState {
    /// Read on every `update`; may be changed freely between calls
    pub parameters: SimulationParameters,
    /// Simulated time elapsed since creation or the last reset
    pub time: f64,
    bodies: Vec<Body>,
    next_id: u32,
}

impl Default for SystemState {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemState {
    /// Creates an empty system with default parameters
    ///
    /// # Examples
    ///
    /// ```
    /// use planet_sim::state::SystemState;
    ///
    /// let system = SystemState::new();
    ///
    /// assert_eq!(system.body_count(), 0);
    /// assert_eq!(system.time, 0.0);
    /// assert_eq!(system.parameters.gravity, 10_000.0);
    /// ```
    pub fn new() -> Self {
        Self::with_parameters(SimulationParameters::default())
    }

    pub fn with_parameters(parameters: SimulationParameters) -> Self {
        Self {
            parameters,
            time: 0.0,
            bodies: Vec::new(),
            next_id: 0,
        }
    }

    /// Back to a freshly created system: default parameters, no bodies
    ///
    /// Ids restart from zero.
    pub fn reset(&mut self) {
        debug!("resetting system with {} bodies", self.bodies.len());
        *self = Self::new();
    }

    /// Advances the system by one step of `dt`
    ///
    /// Every movable body is integrated against a snapshot of the collection
    /// taken before the step, then collisions are resolved once, including
    /// pairs that passed through each other during the step. A zero `dt`
    /// skips integration but still resolves bodies that already overlap.
    /// A negative or non-finite `dt` is ignored and leaves the state as it
    /// was.
    ///
    /// The returned report lists every bounce and merge of this step.
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::{Point2, Vector2};
    /// use planet_sim::state::SystemState;
    ///
    /// let mut system = SystemState::new();
    /// system.add_body(Point2::new(-50.0, 0.0), Vector2::zeros(), 100.0, true).unwrap();
    /// system.add_body(Point2::new(50.0, 0.0), Vector2::zeros(), 100.0, true).unwrap();
    ///
    /// system.update(1.0 / 60.0);
    ///
    /// // The pair starts falling toward each other
    /// assert!(system.bodies()[0].velocity.x > 0.0);
    /// assert!(system.bodies()[1].velocity.x < 0.0);
    /// ```
    pub fn update(&mut self, dt: f64) -> CollisionReport {
        if !dt.is_finite() || dt < 0.0 {
            warn!("ignoring invalid time step {dt}");
            return CollisionReport::default();
        }

        if dt > 0.0 {
            let next = self
                .parameters
                .integrator
                .step_all(&self.bodies, dt, &self.parameters);
            self.bodies = next;
        }

        let report = resolve_collisions(
            &mut self.bodies,
            self.parameters.collisions,
            self.parameters.density,
            dt,
        );
        self.time += dt;

        trace!(
            "t = {:.4}: {} bodies, {} collisions ({})",
            self.time,
            self.bodies.len(),
            report.events.len(),
            self.parameters.integrator
        );
        report
    }

    /// Appends a new body and returns its id
    ///
    /// # Errors
    ///
    /// `InvalidMass` unless `mass` is finite and strictly positive,
    /// `IdsExhausted` once every id has been used.
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::{Point2, Vector2};
    /// use planet_sim::state::SystemState;
    ///
    /// let mut system = SystemState::new();
    /// let sun = system.add_body(Point2::origin(), Vector2::zeros(), 1_000.0, false).unwrap();
    /// let planet = system.add_body(Point2::new(100.0, 0.0), Vector2::new(0.0, 300.0), 1.0, true).unwrap();
    ///
    /// assert_ne!(sun, planet);
    /// assert_eq!(system.body_count(), 2);
    /// assert!(system.add_body(Point2::origin(), Vector2::zeros(), 0.0, true).is_err());
    /// ```
    pub fn add_body(
        &mut self,
        position: Point2<f64>,
        velocity: Vector2<f64>,
        mass: f64,
        movable: bool,
    ) -> Result<BodyId> {
        check_mass(mass)?;
        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or(SimulationError::IdsExhausted)?;

        let id = BodyId(self.next_id);
        self.next_id = next_id;
        self.bodies.push(Body {
            id,
            position,
            velocity,
            mass,
            movable,
        });
        debug!("added {id:?} (mass {mass}, movable {movable})");
        Ok(id)
    }

    /// Re-appends a body that keeps its own id
    ///
    /// Pairs with `pop_body` to redo an undone creation. Later `add_body`
    /// calls never hand out an id at or below one inserted here.
    ///
    /// # Errors
    ///
    /// `InvalidMass` for a bad mass, `DuplicateBody` if the id is in use,
    /// `IdsExhausted` for `u32::MAX`, which would leave no id for later
    /// bodies.
    pub fn insert_body(&mut self, body: Body) -> Result<BodyId> {
        check_mass(body.mass)?;
        if self.index_of(body.id).is_some() {
            return Err(SimulationError::DuplicateBody(body.id));
        }

        let after = body
            .id
            .0
            .checked_add(1)
            .ok_or(SimulationError::IdsExhausted)?;

        self.next_id = self.next_id.max(after);
        self.bodies.push(body);
        debug!("inserted {:?}", body.id);
        Ok(body.id)
    }

    /// Removes the body at `index`, shifting later bodies down
    pub fn remove_body(&mut self, index: usize) -> Option<Body> {
        if index >= self.bodies.len() {
            return None;
        }
        let body = self.bodies.remove(index);
        debug!("removed {:?}", body.id);
        Some(body)
    }

    /// Removes the body with the given id
    ///
    /// # Errors
    ///
    /// `BodyNotFound` if no such body exists, for example because it was
    /// absorbed by a merge.
    pub fn remove_by_id(&mut self, id: BodyId) -> Result<Body> {
        let index = self.index_of(id).ok_or(SimulationError::BodyNotFound(id))?;
        self.remove_body(index).ok_or(SimulationError::BodyNotFound(id))
    }

    /// Removes the most recently appended body (undo of a creation)
    pub fn pop_body(&mut self) -> Option<Body> {
        let body = self.bodies.pop()?;
        debug!("popped {:?}", body.id);
        Some(body)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    /// Mutable access for editing a live body (dragging, nudging)
    ///
    /// The id itself must not be changed.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    /// Current index of `id` in `bodies()`
    pub fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.iter().position(|b| b.id == id)
    }

    /// Steps a camera target through the collection, wrapping at both ends
    ///
    /// With no current target (or one that no longer exists), a forward step
    /// lands on the first body and a backward step on the last.
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::{Point2, Vector2};
    /// use planet_sim::state::SystemState;
    ///
    /// let mut system = SystemState::new();
    /// let a = system.add_body(Point2::new(0.0, 0.0), Vector2::zeros(), 1.0, true).unwrap();
    /// let b = system.add_body(Point2::new(100.0, 0.0), Vector2::zeros(), 1.0, true).unwrap();
    ///
    /// assert_eq!(system.cycle_target(None, 1), Some(a));
    /// assert_eq!(system.cycle_target(Some(a), 1), Some(b));
    /// assert_eq!(system.cycle_target(Some(b), 1), Some(a));
    /// assert_eq!(system.cycle_target(Some(a), -1), Some(b));
    /// ```
    pub fn cycle_target(&self, current: Option<BodyId>, step: isize) -> Option<BodyId> {
        let len = self.bodies.len() as isize;
        if len == 0 {
            return None;
        }

        let current = current.and_then(|id| self.index_of(id));
        let target = match current {
            Some(index) => index as isize + step,
            None if step == 0 => return None,
            None if step > 0 => step - 1,
            None => len + step,
        };
        let index = target.rem_euclid(len) as usize;
        Some(self.bodies[index].id)
    }

    /// Radius a body of `mass` has under the current density
    pub fn radius_of(&self, mass: f64) -> f64 {
        self.parameters.radius_of(mass)
    }

    /// Gravitational acceleration a test particle would feel at `point`
    pub fn field_at(&self, point: Point2<f64>) -> Vector2<f64> {
        acceleration_at(point, &self.bodies, None, &self.parameters)
    }

    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.mass).sum()
    }

    /// Returns the total momentum of all bodies
    ///
    /// Conserved by integration between free bodies and by every collision
    /// mode. Anchors absorb momentum, so it drifts once one is present.
    pub fn total_momentum(&self) -> Vector2<f64> {
        self.bodies
            .iter()
            .map(|b| b.momentum())
            .fold(Vector2::zeros(), |acc, p| acc + p)
    }

    /// Angular momentum about the origin
    pub fn total_angular_momentum(&self) -> f64 {
        self.bodies.iter().map(|b| b.angular_momentum()).sum()
    }

    /// Mass-weighted mean position, `None` for an empty system
    pub fn center_of_mass(&self) -> Option<Point2<f64>> {
        let total = self.total_mass();
        if self.bodies.is_empty() || total <= 0.0 {
            return None;
        }
        let weighted = self
            .bodies
            .iter()
            .fold(Vector2::zeros(), |acc, b| acc + b.position.coords * b.mass);
        Some(Point2::from(weighted / total))
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(|b| b.kinetic_energy()).sum()
    }

    pub fn potential_energy(&self) -> f64 {
        potential_energy(&self.bodies, &self.parameters)
    }

    /// Kinetic plus potential energy
    ///
    /// Useful for comparing integrator drift. Merges dissipate energy, so
    /// it is only conserved while no merge happens.
    pub fn total_energy(&self) -> f64 {
        self.kinetic_energy() + self.potential_energy()
    }
}

fn check_mass(mass: f64) -> Result<()> {
    if mass.is_finite() && mass > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidMass(mass))
    }
}
