use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Stable handle for a body
///
/// Assigned once by `SystemState` and never reused, so it survives the index
/// shifts caused by merges and removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub position: Point2<f64>,
    pub velocity: Vector2<f64>,
    pub mass: f64,
    /// Immovable bodies are fixed anchors: they pull on others but are never
    /// integrated or pushed by a collision response.
    pub movable: bool,
}

impl Body {
    /// Creates a movable body with a placeholder id
    ///
    /// The id is replaced when the body is added to a `SystemState`.
    ///
    /// ```
    /// use planet_sim::body::Body;
    ///
    /// let body = Body::new([10.0, 0.0], [0.0, 5.0], 100.0);
    /// assert!(body.movable);
    /// assert_eq!(body.momentum().y, 500.0);
    /// ```
    pub fn new(position: [f64; 2], velocity: [f64; 2], mass: f64) -> Self {
        Body {
            id: BodyId(0),
            position: Point2::new(position[0], position[1]),
            velocity: Vector2::new(velocity[0], velocity[1]),
            mass,
            movable: true,
        }
    }

    /// Creates an immovable anchor at rest
    pub fn anchor(position: [f64; 2], mass: f64) -> Self {
        Body {
            movable: false,
            ..Body::new(position, [0.0, 0.0], mass)
        }
    }

    pub fn momentum(&self) -> Vector2<f64> {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.magnitude_squared()
    }

    pub fn distance_to(&self, other: &Body) -> f64 {
        (self.position - other.position).magnitude()
    }

    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }

    /// Interaction radius for a given density: (mass / density)^(1/3)
    pub fn radius(&self, density: f64) -> f64 {
        radius_for(self.mass, density)
    }

    /// Angular momentum about the origin (z-component of r × p)
    pub fn angular_momentum(&self) -> f64 {
        self.mass * (self.position.x * self.velocity.y - self.position.y * self.velocity.x)
    }
}

/// Radius of a body of `mass` at `density`
///
/// ```
/// use planet_sim::body::radius_for;
///
/// let r = radius_for(100.0, 1.0);
/// assert!((r - 4.6416).abs() < 1e-4);
/// ```
pub fn radius_for(mass: f64, density: f64) -> f64 {
    (mass / density).cbrt()
}
