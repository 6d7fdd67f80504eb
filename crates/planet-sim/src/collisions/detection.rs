//! Contact detection between pairs of bodies
//!
//! A pair is in contact when the circles given by their radii touch or
//! overlap and they are not already moving apart. The second condition keeps
//! two touching bodies that are separating from colliding again every tick.
//!
//! At fixed steps a fast pair can jump from "not yet touching" to "already
//! past each other" in one tick. `detect_crossing` catches that case by
//! sweeping the pair's relative motion back over the step.

use nalgebra::Vector2;

use crate::body::Body;
use crate::forces::EPSILON;

/// Geometry of a detected contact between `a` and `b`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector along the line of centres, pointing from `b` toward `a`
    pub normal: Vector2<f64>,
    /// Distance between the centres measured along `normal`
    ///
    /// Negative when the bodies ended the step on the wrong side of each
    /// other.
    pub separation: f64,
    /// Sum of the two radii
    pub radius_sum: f64,
}

impl Contact {
    /// How far the two circles interpenetrate (zero when just touching)
    pub fn overlap(&self) -> f64 {
        (self.radius_sum - self.separation).max(0.0)
    }
}

/// Returns the contact between `a` and `b` if they touch and are closing
///
/// # Examples
///
/// ```
/// use planet_sim::body::Body;
/// use planet_sim::collisions::detect_contact;
///
/// let a = Body::new([0.0, 0.0], [1.0, 0.0], 100.0);
/// let b = Body::new([8.0, 0.0], [-1.0, 0.0], 100.0);
///
/// // Radii are ~4.64 each at density 1, and the pair is closing
/// let contact = detect_contact(&a, &b, 1.0).unwrap();
/// assert!(contact.overlap() > 0.0);
///
/// // Same geometry, but moving apart: no collision
/// let a = Body::new([0.0, 0.0], [-1.0, 0.0], 100.0);
/// let b = Body::new([8.0, 0.0], [1.0, 0.0], 100.0);
/// assert!(detect_contact(&a, &b, 1.0).is_none());
/// ```
pub fn detect_contact(a: &Body, b: &Body, density: f64) -> Option<Contact> {
    let radius_sum = a.radius(density) + b.radius(density);
    let delta = a.position - b.position;
    let separation = delta.magnitude();
    if separation > radius_sum {
        return None;
    }

    let relative_velocity = a.velocity - b.velocity;
    if delta.dot(&relative_velocity) > 0.0 {
        return None;
    }

    Some(Contact {
        normal: unit_or_x(delta, separation),
        separation,
        radius_sum,
    })
}

/// Returns a contact for a pair that passed through each other during the
/// last step of length `dt`
///
/// The step is approximated as straight-line relative motion at the current
/// relative velocity (exact for semi-implicit Euler). The pair must have
/// been closing at the start of the step, be separating now, and have come
/// within touching distance in between. The normal is taken at the moment
/// of first touch, so the separation is negative if they ended up crossed.
///
/// ```
/// use planet_sim::body::Body;
/// use planet_sim::collisions::{detect_contact, detect_crossing};
///
/// // Fast pair that just swapped sides
/// let a = Body::new([1.5, 0.0], [400.0, 0.0], 100.0);
/// let b = Body::new([-1.5, 0.0], [-400.0, 0.0], 100.0);
///
/// assert!(detect_contact(&a, &b, 1.0).is_none());
/// let contact = detect_crossing(&a, &b, 1.0, 1.0 / 60.0).unwrap();
/// assert!(contact.separation < 0.0);
/// ```
pub fn detect_crossing(a: &Body, b: &Body, density: f64, dt: f64) -> Option<Contact> {
    if dt <= 0.0 {
        return None;
    }

    let delta = a.position - b.position;
    let motion = (a.velocity - b.velocity) * dt;
    let start = delta - motion;
    if start.dot(&motion) >= 0.0 || delta.dot(&motion) <= 0.0 {
        return None;
    }

    // |start + motion * t| = radius_sum, solved for the first root
    let radius_sum = a.radius(density) + b.radius(density);
    let qa = motion.magnitude_squared();
    let qb = start.dot(&motion);
    let qc = start.magnitude_squared() - radius_sum * radius_sum;
    let discriminant = qb * qb - qa * qc;
    if discriminant < 0.0 {
        return None;
    }

    let t = ((-qb - discriminant.sqrt()) / qa).clamp(0.0, 1.0);
    let touch = start + motion * t;
    let normal = unit_or_x(touch, touch.magnitude());

    Some(Contact {
        normal,
        separation: delta.dot(&normal),
        radius_sum,
    })
}

/// `detect_contact`, falling back to `detect_crossing`
pub fn detect_collision(a: &Body, b: &Body, density: f64, dt: f64) -> Option<Contact> {
    detect_contact(a, b, density).or_else(|| detect_crossing(a, b, density, dt))
}

/// All colliding pairs `(i, j)` with `i < j`, without resolving them
///
/// Useful for previews: the resolver itself re-detects while it mutates the
/// collection, so this list is only valid for the collection as given.
pub fn detect_all(bodies: &[Body], density: f64, dt: f64) -> Vec<(usize, usize, Contact)> {
    bodies
        .iter()
        .enumerate()
        .flat_map(|(i, a)| {
            bodies
                .iter()
                .enumerate()
                .skip(i + 1)
                .filter_map(move |(j, b)| {
                    detect_collision(a, b, density, dt).map(|c| (i, j, c))
                })
        })
        .collect()
}

/// Normalised `v`, or +x for coincident centres
fn unit_or_x(v: Vector2<f64>, length: f64) -> Vector2<f64> {
    if length * length < EPSILON {
        Vector2::x()
    } else {
        v / length
    }
}
