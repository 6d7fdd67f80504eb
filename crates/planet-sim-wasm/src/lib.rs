//! WASM bindings for the planet sandbox.
//!
//! This crate provides JavaScript/TypeScript bindings for the planet-sim
//! crate, enabling a browser front end to drive the simulation, draw it and
//! preview trajectories.
//!
//! # Architecture
//!
//! The simulation state is stored in thread-local storage (WASM is single-threaded).
//! Functions return opaque IDs for referencing mutable state, and serializable
//! snapshots for reading state.
//!
//! # Example Usage (JavaScript)
//!
//! ```javascript
//! // Create an empty sandbox and drop a fixed star in the middle
//! const simId = simulation_create();
//! simulation_add_body(simId, { position: [0, 0], velocity: [0, 0], mass: 1000, movable: false });
//!
//! // Add a planet and follow it
//! const planetId = simulation_add_body(simId, {
//!   position: [100, 0],
//!   velocity: [0, 300],
//!   mass: 5
//! });
//!
//! // Once per animation frame
//! const report = simulation_advance_frame(simId, frameDeltaSeconds);
//! const bodies = simulation_get_bodies(simId);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use planet_sim::{
    Body, BodyId, CollisionEvent, CollisionMode, CollisionReport, FixedTimestep, IntegratorKind,
    Prediction, Predictor, SimulationParameters, SystemState,
};

// =============================================================================
// Serialization helpers
// =============================================================================

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsError::new(&e.to_string()))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsError::new(&e.to_string()))
}

fn to_js_error(e: planet_sim::SimulationError) -> JsError {
    JsError::new(&e.to_string())
}

// =============================================================================
// Thread-local storage for simulation state
// =============================================================================

/// Most steps a single `simulation_advance_frame` call will run
///
/// Half a second of catch-up at the default step; a longer stall drops the
/// excess instead of freezing the page.
pub const MAX_FRAME_STEPS: usize = 30;

/// Live system plus the frame clock that feeds it
struct Simulation {
    state: SystemState,
    clock: FixedTimestep,
    predictor: Predictor,
}

impl Simulation {
    fn new(state: SystemState) -> Self {
        Self {
            state,
            clock: FixedTimestep::default().with_max_steps(MAX_FRAME_STEPS),
            predictor: Predictor::default(),
        }
    }
}

thread_local! {
    static SIMULATIONS: RefCell<HashMap<u32, Simulation>> = RefCell::new(HashMap::new());
    static NEXT_SIM_ID: RefCell<u32> = const { RefCell::new(0) };
}

fn register(simulation: Simulation) -> u32 {
    let id = NEXT_SIM_ID.with(|next_id| {
        let mut id = next_id.borrow_mut();
        let current = *id;
        *id += 1;
        current
    });

    SIMULATIONS.with(|sims| {
        sims.borrow_mut().insert(id, simulation);
    });
    log::debug!("created simulation {id}");

    id
}

fn with_simulation<T>(
    sim_id: u32,
    f: impl FnOnce(&mut Simulation) -> Result<T, JsError>,
) -> Result<T, JsError> {
    SIMULATIONS.with(|sims| {
        let mut sims = sims.borrow_mut();
        let sim = sims
            .get_mut(&sim_id)
            .ok_or_else(|| JsError::new(&format!("Simulation {} not found", sim_id)))?;
        f(sim)
    })
}

// =============================================================================
// Serializable types for JavaScript interop
// =============================================================================

/// Body data for adding new bodies
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyInput {
    /// Position [x, y]
    pub position: [f64; 2],
    /// Velocity [x, y]
    #[serde(default)]
    pub velocity: [f64; 2],
    pub mass: f64,
    /// Anchors are placed with `movable: false`
    #[serde(default = "default_movable")]
    pub movable: bool,
}

fn default_movable() -> bool {
    true
}

impl BodyInput {
    fn to_body(&self) -> Body {
        let mut body = Body::new(self.position, self.velocity, self.mass);
        body.movable = self.movable;
        body
    }
}

/// Partial parameter change; absent fields keep their current value
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterUpdate {
    pub gravity: Option<f64>,
    pub density: Option<f64>,
    pub softening: Option<f64>,
    pub integrator: Option<IntegratorKind>,
    pub collisions: Option<CollisionMode>,
}

impl ParameterUpdate {
    fn apply(&self, current: SimulationParameters) -> SimulationParameters {
        SimulationParameters {
            gravity: self.gravity.unwrap_or(current.gravity),
            density: self.density.unwrap_or(current.density),
            softening: self.softening.unwrap_or(current.softening),
            integrator: self.integrator.unwrap_or(current.integrator),
            collisions: self.collisions.unwrap_or(current.collisions),
        }
    }
}

/// Body state snapshot for JavaScript
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodySnapshot {
    pub id: u32,
    pub position: [f64; 2],
    pub velocity: [f64; 2],
    pub mass: f64,
    /// Drawn radius under the current density
    pub radius: f64,
    pub movable: bool,
}

impl BodySnapshot {
    fn new(body: &Body, density: f64) -> Self {
        Self {
            id: body.id.0,
            position: [body.position.x, body.position.y],
            velocity: [body.velocity.x, body.velocity.y],
            mass: body.mass,
            radius: body.radius(density),
            movable: body.movable,
        }
    }
}

/// Complete simulation state snapshot
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSnapshot {
    pub time: f64,
    pub parameters: SimulationParameters,
    pub bodies: Vec<BodySnapshot>,
    pub kinetic_energy: f64,
    pub potential_energy: f64,
    pub total_energy: f64,
    pub total_momentum: [f64; 2],
    /// Fraction of a step left in the frame clock, for render interpolation
    pub alpha: f64,
}

/// Collision event for JavaScript
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionSnapshot {
    /// "bounce" or "merge"
    pub kind: &'static str,
    /// Survivor for merges, first body for bounces
    pub body_a: u32,
    /// Absorbed body for merges, second body for bounces
    pub body_b: u32,
}

impl From<&CollisionEvent> for CollisionSnapshot {
    fn from(event: &CollisionEvent) -> Self {
        match *event {
            CollisionEvent::Bounce { a, b } => Self {
                kind: "bounce",
                body_a: a.0,
                body_b: b.0,
            },
            CollisionEvent::Merge { survivor, absorbed } => Self {
                kind: "merge",
                body_a: survivor.0,
                body_b: absorbed.0,
            },
        }
    }
}

/// Result of one tick or one frame
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSnapshot {
    pub time: f64,
    pub steps: usize,
    pub collisions: Vec<CollisionSnapshot>,
}

impl StepSnapshot {
    fn new(time: f64, steps: usize, report: &CollisionReport) -> Self {
        Self {
            time,
            steps,
            collisions: report.events.iter().map(CollisionSnapshot::from).collect(),
        }
    }
}

/// Predicted path for one body
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionSnapshot {
    pub id: u32,
    /// Flattened [x0, y0, x1, y1, ...] ready for a polyline
    pub points: Vec<f64>,
}

impl From<&Prediction> for PredictionSnapshot {
    fn from(prediction: &Prediction) -> Self {
        Self {
            id: prediction.id.0,
            points: prediction
                .positions
                .iter()
                .flat_map(|p| [p.x, p.y])
                .collect(),
        }
    }
}

// =============================================================================
// Simulation management functions
// =============================================================================

/// Create an empty simulation with default parameters.
///
/// Returns a simulation ID for use with other functions.
#[wasm_bindgen]
pub fn simulation_create() -> u32 {
    register(Simulation::new(SystemState::new()))
}

/// Create an empty simulation with custom parameters.
///
/// Missing fields fall back to their defaults.
#[wasm_bindgen]
pub fn simulation_create_with_parameters(parameters: JsValue) -> Result<u32, JsError> {
    let parameters: SimulationParameters = from_js(parameters)?;
    parameters.validate().map_err(to_js_error)?;
    Ok(register(Simulation::new(SystemState::with_parameters(
        parameters,
    ))))
}

/// Create a simulation preloaded with a star and `n_planets` circular orbits.
#[wasm_bindgen]
pub fn simulation_create_star_system(
    n_planets: usize,
    star_mass: f64,
    inner_radius: f64,
    spacing: f64,
) -> Result<u32, JsError> {
    let state = planet_sim::scenario::star_with_planets(n_planets, star_mass, inner_radius, spacing)
        .map_err(to_js_error)?;
    Ok(register(Simulation::new(state)))
}

/// Create a simulation preloaded with a seeded random cluster.
#[wasm_bindgen]
pub fn simulation_create_cluster(n_bodies: usize, radius: f64, seed: u64) -> Result<u32, JsError> {
    let state =
        planet_sim::scenario::random_cluster(n_bodies, radius, seed).map_err(to_js_error)?;
    Ok(register(Simulation::new(state)))
}

/// Delete a simulation to free memory.
#[wasm_bindgen]
pub fn simulation_delete(sim_id: u32) {
    SIMULATIONS.with(|sims| {
        sims.borrow_mut().remove(&sim_id);
    });
}

/// Remove every body and restart time and body ids at zero.
#[wasm_bindgen]
pub fn simulation_reset(sim_id: u32) -> Result<(), JsError> {
    with_simulation(sim_id, |sim| {
        sim.state.reset();
        sim.clock.reset();
        Ok(())
    })
}

/// Overwrite simulation parameters.
///
/// Accepts a partial object: `{ integrator: "rk4" }` only switches the
/// integrator. The change applies from the next tick.
#[wasm_bindgen]
pub fn simulation_set_parameters(sim_id: u32, parameters: JsValue) -> Result<(), JsError> {
    let update: ParameterUpdate = from_js(parameters)?;
    with_simulation(sim_id, |sim| {
        let updated = update.apply(sim.state.parameters);
        updated.validate().map_err(to_js_error)?;
        sim.state.parameters = updated;
        Ok(())
    })
}

/// Current simulation parameters.
#[wasm_bindgen]
pub fn simulation_get_parameters(sim_id: u32) -> Result<JsValue, JsError> {
    with_simulation(sim_id, |sim| to_js(&sim.state.parameters))
}

// =============================================================================
// Body management
// =============================================================================

/// Add a body to the simulation.
///
/// # Arguments
/// * `sim_id` - Simulation ID
/// * `body` - Body parameters (position, velocity, mass, movable)
///
/// # Returns
/// The new body's ID
#[wasm_bindgen]
pub fn simulation_add_body(sim_id: u32, body: JsValue) -> Result<u32, JsError> {
    let body: BodyInput = from_js(body)?;

    with_simulation(sim_id, |sim| {
        let id = sim
            .state
            .add_body(
                Point2::new(body.position[0], body.position[1]),
                Vector2::new(body.velocity[0], body.velocity[1]),
                body.mass,
                body.movable,
            )
            .map_err(to_js_error)?;
        Ok(id.0)
    })
}

/// Remove a body from the simulation.
///
/// # Returns
/// `true` if the body was found and removed, `false` if it no longer exists
#[wasm_bindgen]
pub fn simulation_remove_body(sim_id: u32, body_id: u32) -> Result<bool, JsError> {
    with_simulation(sim_id, |sim| match sim.state.remove_by_id(BodyId(body_id)) {
        Ok(_) => Ok(true),
        Err(e) => {
            log::debug!("simulation {sim_id}: {e}");
            Ok(false)
        }
    })
}

/// Remove the most recently added body (undo).
///
/// # Returns
/// The removed body's ID, or `undefined` when the simulation is empty
#[wasm_bindgen]
pub fn simulation_pop_body(sim_id: u32) -> Result<Option<u32>, JsError> {
    with_simulation(sim_id, |sim| Ok(sim.state.pop_body().map(|b| b.id.0)))
}

/// Step through the bodies in insertion order.
///
/// # Arguments
/// * `current` - Currently followed body, or `undefined`
/// * `step` - +1 for next, -1 for previous
#[wasm_bindgen]
pub fn simulation_cycle_target(
    sim_id: u32,
    current: Option<u32>,
    step: i32,
) -> Result<Option<u32>, JsError> {
    with_simulation(sim_id, |sim| {
        Ok(sim
            .state
            .cycle_target(current.map(BodyId), step as isize)
            .map(|id| id.0))
    })
}

// =============================================================================
// Time stepping
// =============================================================================

/// Advance the simulation by exactly one step of `dt`.
#[wasm_bindgen]
pub fn simulation_step(sim_id: u32, dt: f64) -> Result<JsValue, JsError> {
    with_simulation(sim_id, |sim| {
        let report = sim.state.update(dt);
        to_js(&StepSnapshot::new(sim.state.time, 1, &report))
    })
}

/// Feed one rendered frame's wall-clock delta to the fixed-step clock.
///
/// Runs as many whole steps as the accumulated time allows and reports every
/// collision that happened along the way.
#[wasm_bindgen]
pub fn simulation_advance_frame(sim_id: u32, frame_delta: f64) -> Result<JsValue, JsError> {
    with_simulation(sim_id, |sim| {
        let before = sim.clock.step_count();
        let report = sim.clock.run(&mut sim.state, frame_delta);
        let steps = (sim.clock.step_count() - before) as usize;
        to_js(&StepSnapshot::new(sim.state.time, steps, &report))
    })
}

/// Replace the frame clock's fixed step and per-frame step cap.
///
/// Without `max_steps` the cap stays at `MAX_FRAME_STEPS`.
#[wasm_bindgen]
pub fn simulation_set_timestep(
    sim_id: u32,
    step: f64,
    max_steps: Option<usize>,
) -> Result<(), JsError> {
    let clock = FixedTimestep::new(step).map_err(to_js_error)?;
    let clock = clock.with_max_steps(max_steps.unwrap_or(MAX_FRAME_STEPS));
    with_simulation(sim_id, |sim| {
        sim.clock = clock;
        Ok(())
    })
}

// =============================================================================
// Queries
// =============================================================================

/// Get all bodies as an array for rendering.
#[wasm_bindgen]
pub fn simulation_get_bodies(sim_id: u32) -> Result<JsValue, JsError> {
    with_simulation(sim_id, |sim| {
        let density = sim.state.parameters.density;
        let bodies: Vec<BodySnapshot> = sim
            .state
            .bodies()
            .iter()
            .map(|b| BodySnapshot::new(b, density))
            .collect();
        to_js(&bodies)
    })
}

/// Get the complete simulation state including energies.
#[wasm_bindgen]
pub fn simulation_get_state(sim_id: u32) -> Result<JsValue, JsError> {
    with_simulation(sim_id, |sim| {
        let state = &sim.state;
        let density = state.parameters.density;
        let kinetic_energy = state.kinetic_energy();
        let potential_energy = state.potential_energy();
        let momentum = state.total_momentum();

        let snapshot = SimulationSnapshot {
            time: state.time,
            parameters: state.parameters,
            bodies: state
                .bodies()
                .iter()
                .map(|b| BodySnapshot::new(b, density))
                .collect(),
            kinetic_energy,
            potential_energy,
            total_energy: kinetic_energy + potential_energy,
            total_momentum: [momentum.x, momentum.y],
            alpha: sim.clock.alpha(),
        };
        to_js(&snapshot)
    })
}

/// Get the current simulation time.
#[wasm_bindgen]
pub fn simulation_get_time(sim_id: u32) -> Result<f64, JsError> {
    with_simulation(sim_id, |sim| Ok(sim.state.time))
}

/// Get the number of bodies in the simulation.
#[wasm_bindgen]
pub fn simulation_body_count(sim_id: u32) -> Result<usize, JsError> {
    with_simulation(sim_id, |sim| Ok(sim.state.body_count()))
}

/// Gravitational acceleration a unit test mass would feel at (x, y).
#[wasm_bindgen]
pub fn simulation_field_at(sim_id: u32, x: f64, y: f64) -> Result<Vec<f64>, JsError> {
    with_simulation(sim_id, |sim| {
        let field = sim.state.field_at(Point2::new(x, y));
        Ok(vec![field.x, field.y])
    })
}

// =============================================================================
// Prediction
// =============================================================================

/// Preview trajectories without touching the live state.
///
/// # Arguments
/// * `sim_id` - Simulation ID
/// * `extra` - Optional body being placed, same shape as `simulation_add_body`
///
/// # Returns
/// One `{ id, points }` path per body, the extra body last
#[wasm_bindgen]
pub fn simulation_predict(sim_id: u32, extra: JsValue) -> Result<JsValue, JsError> {
    let extra: Option<BodyInput> = if extra.is_undefined() || extra.is_null() {
        None
    } else {
        Some(from_js(extra)?)
    };

    with_simulation(sim_id, |sim| {
        let extra = extra.as_ref().map(BodyInput::to_body);
        let predictions = sim
            .predictor
            .predict(&sim.state, extra.as_ref())
            .map_err(to_js_error)?;
        let paths: Vec<PredictionSnapshot> =
            predictions.iter().map(PredictionSnapshot::from).collect();
        to_js(&paths)
    })
}

/// Change the preview horizon (number of steps) and its step size.
#[wasm_bindgen]
pub fn simulation_set_predictor(sim_id: u32, horizon: usize, time_step: f64) -> Result<(), JsError> {
    let predictor = Predictor::new(horizon, time_step).map_err(to_js_error)?;
    with_simulation(sim_id, |sim| {
        sim.predictor = predictor;
        Ok(())
    })
}

// =============================================================================
// Utility functions
// =============================================================================

/// Speed for a circular counter-clockwise orbit around `center_id` at (x, y).
///
/// # Returns
/// Velocity [vx, vy] including the centre body's own motion
#[wasm_bindgen]
pub fn simulation_circular_velocity(
    sim_id: u32,
    center_id: u32,
    x: f64,
    y: f64,
) -> Result<Vec<f64>, JsError> {
    with_simulation(sim_id, |sim| {
        let v = planet_sim::scenario::circular_orbit_velocity(
            &sim.state,
            BodyId(center_id),
            Point2::new(x, y),
        )
        .map_err(to_js_error)?;
        Ok(vec![v.x, v.y])
    })
}

/// Radius of a body of `mass` at `density`.
#[wasm_bindgen]
pub fn body_radius(mass: f64, density: f64) -> f64 {
    planet_sim::body::radius_for(mass, density)
}
