//! Collision detection and resolution for N-body systems
//!
//! Runs once per tick after integration. Depending on `CollisionMode`,
//! touching bodies that are closing in either bounce elastically or merge.

pub mod detection;
pub mod resolution;

#[cfg(test)]
mod resolution_test;

pub use detection::{Contact, detect_all, detect_collision, detect_contact, detect_crossing};
pub use resolution::{
    CollisionEvent, CollisionReport, bounce_bodies, merge_bodies, resolve_collisions,
};
