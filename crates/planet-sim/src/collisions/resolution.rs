//! Collision resolution: elastic bounces and momentum-conserving mergers
//!
//! `resolve_collisions` sweeps every pair once, in increasing `(i, j)` order,
//! on the live collection. A merge removes body `j`, so the sweep re-reads the
//! collection length every iteration and does not advance `j` after a merge:
//! the body that shifted into slot `j` is tested next.

use log::debug;
use nalgebra::Rotation2;
use serde::{Deserialize, Serialize};

use crate::body::{Body, BodyId};
use crate::collisions::detection::{Contact, detect_collision};
use crate::forces::EPSILON;
use crate::params::CollisionMode;

/// What happened to one colliding pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollisionEvent {
    /// Both bodies survived with new velocities
    Bounce { a: BodyId, b: BodyId },
    /// `absorbed` no longer exists; its mass and momentum live on in `survivor`
    Merge { survivor: BodyId, absorbed: BodyId },
}

/// Every collision resolved during one pass, in sweep order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionReport {
    pub events: Vec<CollisionEvent>,
}

impl CollisionReport {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn merge_count(&self) -> usize {
        self.absorbed().count()
    }

    /// Ids removed from the collection during the pass
    pub fn absorbed(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.events.iter().filter_map(|event| match event {
            CollisionEvent::Merge { absorbed, .. } => Some(*absorbed),
            CollisionEvent::Bounce { .. } => None,
        })
    }

    /// Follows merge chains: the id that now carries `id`'s mass
    ///
    /// Returns `id` itself if it was never absorbed. Lets a caller keep a
    /// camera target on whatever swallowed it.
    pub fn successor(&self, id: BodyId) -> BodyId {
        self.events.iter().fold(id, |current, event| match event {
            CollisionEvent::Merge { survivor, absorbed } if *absorbed == current => *survivor,
            _ => current,
        })
    }
}

/// Merge two bodies, conserving mass and momentum
///
/// The survivor keeps `a`'s id and position. When exactly
/// one of the two is immovable the survivor is that anchor: it stays put,
/// keeps its velocity and its id, and gains the mass.
///
/// # Examples
///
/// ```
/// use planet_sim::body::Body;
/// use planet_sim::collisions::merge_bodies;
///
/// let a = Body::new([0.0, 0.0], [2.0, 0.0], 1.0);
/// let b = Body::new([1.0, 0.0], [0.0, 3.0], 2.0);
///
/// let merged = merge_bodies(&a, &b);
///
/// assert_eq!(merged.mass, 3.0);
/// let p = a.momentum() + b.momentum();
/// assert!((merged.momentum() - p).magnitude() < 1e-12);
/// ```
pub fn merge_bodies(a: &Body, b: &Body) -> Body {
    let total_mass = a.mass + b.mass;

    match (a.movable, b.movable) {
        (true, false) => Body {
            mass: total_mass,
            ..*b
        },
        (false, true) => Body {
            mass: total_mass,
            ..*a
        },
        _ => Body {
            velocity: (a.momentum() + b.momentum()) / total_mass,
            mass: total_mass,
            ..*a
        },
    }
}

/// Perfectly elastic response along the line of centres
///
/// Velocities are rotated into the contact frame, the normal components are
/// exchanged with the 1-D elastic formulas, and the result is rotated back.
/// Overlapping bodies are then pushed apart along the normal by half the
/// overlap each, which also untangles a pair that crossed. An immovable
/// participant acts as infinite mass.
pub fn bounce_bodies(a: &mut Body, b: &mut Body, contact: &Contact) {
    if !a.movable && !b.movable {
        return;
    }

    let angle = contact.normal.y.atan2(contact.normal.x);
    let to_contact = Rotation2::new(-angle);
    let from_contact = Rotation2::new(angle);

    let mut a_local = to_contact * a.velocity;
    let mut b_local = to_contact * b.velocity;

    let (a_normal, b_normal) = match (a.movable, b.movable) {
        (true, true) => {
            let total = a.mass + b.mass;
            (
                (a.mass - b.mass) / total * a_local.x + 2.0 * b.mass / total * b_local.x,
                2.0 * a.mass / total * a_local.x + (b.mass - a.mass) / total * b_local.x,
            )
        }
        // Reflection off a wall moving with the anchor's velocity
        (true, false) => (2.0 * b_local.x - a_local.x, b_local.x),
        _ => (a_local.x, 2.0 * a_local.x - b_local.x),
    };
    a_local.x = a_normal;
    b_local.x = b_normal;

    if a.movable {
        a.velocity = from_contact * a_local;
    }
    if b.movable {
        b.velocity = from_contact * b_local;
    }

    let overlap = contact.radius_sum - contact.separation;
    if overlap > EPSILON {
        let (a_share, b_share) = match (a.movable, b.movable) {
            (true, true) => (0.5, 0.5),
            (true, false) => (1.0, 0.0),
            _ => (0.0, 1.0),
        };
        a.position += contact.normal * (overlap * a_share);
        b.position -= contact.normal * (overlap * b_share);
    }
}

/// Detect and resolve every collision in `bodies` in place
///
/// `dt` is the step that just moved the bodies; pairs that crossed during it
/// are caught as well. Pass `0.0` to only resolve pairs that touch now.
///
/// # Examples
///
/// ```
/// use planet_sim::body::{Body, BodyId};
/// use planet_sim::collisions::resolve_collisions;
/// use planet_sim::params::CollisionMode;
///
/// let mut a = Body::new([0.0, 0.0], [1.0, 0.0], 100.0);
/// let mut b = Body::new([5.0, 0.0], [-1.0, 0.0], 100.0);
/// a.id = BodyId(0);
/// b.id = BodyId(1);
/// let mut bodies = vec![a, b];
///
/// let report = resolve_collisions(&mut bodies, CollisionMode::Merge, 1.0, 0.0);
///
/// assert_eq!(bodies.len(), 1);
/// assert_eq!(bodies[0].mass, 200.0);
/// assert_eq!(report.merge_count(), 1);
/// ```
pub fn resolve_collisions(
    bodies: &mut Vec<Body>,
    mode: CollisionMode,
    density: f64,
    dt: f64,
) -> CollisionReport {
    let mut report = CollisionReport::default();
    if mode == CollisionMode::None {
        return report;
    }

    let mut i = 0;
    while i < bodies.len() {
        let mut j = i + 1;
        while j < bodies.len() {
            if !bodies[i].movable && !bodies[j].movable {
                j += 1;
                continue;
            }
            let Some(contact) = detect_collision(&bodies[i], &bodies[j], density, dt) else {
                j += 1;
                continue;
            };

            if mode == CollisionMode::Elastic {
                let (head, tail) = bodies.split_at_mut(j);
                bounce_bodies(&mut head[i], &mut tail[0], &contact);
                report.events.push(CollisionEvent::Bounce {
                    a: head[i].id,
                    b: tail[0].id,
                });
                j += 1;
                continue;
            }

            let absorbed = bodies.remove(j);
            let merged = merge_bodies(&bodies[i], &absorbed);
            // An anchor in slot j survives under its own id
            let lost = if merged.id == absorbed.id {
                bodies[i].id
            } else {
                absorbed.id
            };
            debug!(
                "merged {:?} into {:?} (mass {:.3})",
                lost, merged.id, merged.mass
            );
            report.events.push(CollisionEvent::Merge {
                survivor: merged.id,
                absorbed: lost,
            });
            bodies[i] = merged;
        }
        i += 1;
    }

    report
}
