use approx::assert_relative_eq;
use nalgebra::{Point2, Vector2};

use crate::body::{Body, BodyId};
use crate::collisions::detection::detect_contact;
use crate::collisions::resolution::*;
use crate::params::CollisionMode;

const DENSITY: f64 = 1.0;
const DT: f64 = 1.0 / 60.0;

fn with_id(mut body: Body, id: u32) -> Body {
    body.id = BodyId(id);
    body
}

fn total_momentum(bodies: &[Body]) -> Vector2<f64> {
    bodies.iter().map(|b| b.momentum()).sum()
}

fn total_kinetic_energy(bodies: &[Body]) -> f64 {
    bodies.iter().map(|b| b.kinetic_energy()).sum()
}

#[test]
fn test_merge_bodies_mass_and_momentum() {
    let a = with_id(Body::new([1.0, 0.0], [0.0, 5.0], 1.0), 0);
    let b = with_id(Body::new([1.1, 0.0], [0.0, 3.0], 2.0), 1);

    let merged = merge_bodies(&a, &b);

    assert_eq!(merged.mass, 3.0);
    assert_eq!(merged.id, BodyId(0));
    // (1 * 5 + 2 * 3) / 3
    assert_relative_eq!(merged.velocity.y, 11.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(merged.momentum(), a.momentum() + b.momentum(), epsilon = 1e-12);
}

#[test]
fn test_merge_bodies_survivor_stays_in_place() {
    let a = Body::new([1.0, 0.0], [0.0, 0.0], 1.0);
    let b = Body::new([2.0, 0.0], [0.0, 0.0], 1.0);

    let merged = merge_bodies(&a, &b);

    assert_eq!(merged.position, Point2::new(1.0, 0.0));
}

#[test]
fn test_heavy_body_does_not_shift_when_absorbing() {
    let mut bodies = vec![
        with_id(Body::new([0.0, 0.0], [0.0, 0.0], 1_000.0), 0),
        with_id(Body::new([10.5, 0.0], [0.0, 0.0], 1.0), 1),
    ];

    resolve_collisions(&mut bodies, CollisionMode::Merge, DENSITY, DT);

    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0].position, Point2::origin());
    assert_eq!(bodies[0].mass, 1_001.0);
}

#[test]
fn test_merge_into_anchor_keeps_anchor() {
    let planet = with_id(Body::new([5.0, 0.0], [-3.0, 1.0], 10.0), 0);
    let anchor = with_id(Body::anchor([0.0, 0.0], 1_000.0), 1);

    let merged = merge_bodies(&planet, &anchor);

    assert!(!merged.movable);
    assert_eq!(merged.id, BodyId(1));
    assert_eq!(merged.position, anchor.position);
    assert_eq!(merged.velocity, Vector2::zeros());
    assert_eq!(merged.mass, 1_010.0);

    // Argument order does not matter for who survives
    let swapped = merge_bodies(&anchor, &planet);
    assert_eq!(swapped, merged);
}

#[test]
fn test_resolve_merge_shrinks_collection_by_one() {
    let mut bodies = vec![
        with_id(Body::new([0.0, 0.0], [1.0, 0.0], 100.0), 0),
        with_id(Body::new([6.0, 0.0], [-1.0, 0.5], 50.0), 1),
    ];
    let p_before = total_momentum(&bodies);

    let report = resolve_collisions(&mut bodies, CollisionMode::Merge, DENSITY, DT);

    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0].id, BodyId(0));
    assert_eq!(bodies[0].mass, 150.0);
    assert_relative_eq!(total_momentum(&bodies), p_before, epsilon = 1e-12);
    assert_eq!(
        report.events,
        vec![CollisionEvent::Merge {
            survivor: BodyId(0),
            absorbed: BodyId(1)
        }]
    );
}

#[test]
fn test_resolve_elastic_preserves_count_momentum_and_energy() {
    let mut bodies = vec![
        with_id(Body::new([0.0, 0.0], [3.0, 1.0], 100.0), 0),
        with_id(Body::new([6.0, 2.0], [-2.0, 0.5], 40.0), 1),
    ];
    let p_before = total_momentum(&bodies);
    let ke_before = total_kinetic_energy(&bodies);

    let report = resolve_collisions(&mut bodies, CollisionMode::Elastic, DENSITY, DT);

    assert_eq!(bodies.len(), 2);
    assert_eq!(report.events.len(), 1);
    assert_relative_eq!(total_momentum(&bodies), p_before, epsilon = 1e-9);
    assert_relative_eq!(total_kinetic_energy(&bodies), ke_before, epsilon = 1e-9);
}

#[test]
fn test_elastic_equal_masses_head_on_swap_velocities() {
    let mut a = Body::new([0.0, 0.0], [2.0, 0.0], 100.0);
    let mut b = Body::new([9.0, 0.0], [-1.0, 0.0], 100.0);
    let contact = detect_contact(&a, &b, DENSITY).expect("contact");

    bounce_bodies(&mut a, &mut b, &contact);

    assert_relative_eq!(a.velocity, Vector2::new(-1.0, 0.0), epsilon = 1e-12);
    assert_relative_eq!(b.velocity, Vector2::new(2.0, 0.0), epsilon = 1e-12);
}

#[test]
fn test_elastic_pushes_overlap_apart_symmetrically() {
    let mut a = Body::new([0.0, 0.0], [1.0, 0.0], 100.0);
    let mut b = Body::new([6.0, 0.0], [-1.0, 0.0], 100.0);
    let contact = detect_contact(&a, &b, DENSITY).expect("contact");
    let overlap = contact.overlap();

    bounce_bodies(&mut a, &mut b, &contact);

    assert_relative_eq!(a.position.x, -overlap / 2.0, epsilon = 1e-12);
    assert_relative_eq!(b.position.x, 6.0 + overlap / 2.0, epsilon = 1e-12);
    assert_relative_eq!(a.distance_to(&b), contact.radius_sum, epsilon = 1e-12);
    // Now moving apart: no further collision
    assert!(detect_contact(&a, &b, DENSITY).is_none());
}

#[test]
fn test_elastic_tangential_velocity_untouched() {
    let mut a = Body::new([0.0, 0.0], [1.0, 4.0], 100.0);
    let mut b = Body::new([9.0, 0.0], [-1.0, -2.0], 100.0);
    let contact = detect_contact(&a, &b, DENSITY).expect("contact");

    bounce_bodies(&mut a, &mut b, &contact);

    assert_relative_eq!(a.velocity.y, 4.0, epsilon = 1e-12);
    assert_relative_eq!(b.velocity.y, -2.0, epsilon = 1e-12);
}

#[test]
fn test_elastic_against_anchor_reflects_and_anchor_stays() {
    let anchor = with_id(Body::anchor([0.0, 0.0], 100.0), 0);
    let planet = with_id(Body::new([-8.0, 0.0], [5.0, 1.0], 100.0), 1);
    let mut bodies = vec![anchor, planet];

    resolve_collisions(&mut bodies, CollisionMode::Elastic, DENSITY, DT);

    assert_eq!(bodies[0], anchor);
    assert_relative_eq!(bodies[1].velocity, Vector2::new(-5.0, 1.0), epsilon = 1e-12);
    // The planet takes the whole overlap push
    assert_relative_eq!(
        bodies[1].position.x,
        -2.0 * 100f64.cbrt(),
        epsilon = 1e-12
    );
}

#[test]
fn test_two_anchors_never_resolve() {
    let mut bodies = vec![
        with_id(Body::anchor([0.0, 0.0], 100.0), 0),
        with_id(Body::anchor([1.0, 0.0], 100.0), 1),
    ];
    let before = bodies.clone();

    for mode in CollisionMode::ALL {
        let report = resolve_collisions(&mut bodies, mode, DENSITY, DT);
        assert!(report.is_empty());
        assert_eq!(bodies, before);
    }
}

#[test]
fn test_none_mode_is_noop() {
    let mut bodies = vec![
        with_id(Body::new([0.0, 0.0], [1.0, 0.0], 100.0), 0),
        with_id(Body::new([1.0, 0.0], [-1.0, 0.0], 100.0), 1),
    ];
    let before = bodies.clone();

    let report = resolve_collisions(&mut bodies, CollisionMode::None, DENSITY, DT);

    assert!(report.is_empty());
    assert_eq!(bodies, before);
}

#[test]
fn test_chain_merge_collapses_to_one() {
    // Three overlapping bodies: the sweep must not skip the pair that shifts
    // into the removed slot
    let mut bodies = vec![
        with_id(Body::new([0.0, 0.0], [0.0, 0.0], 100.0), 0),
        with_id(Body::new([3.0, 0.0], [-1.0, 0.0], 100.0), 1),
        with_id(Body::new([-3.0, 0.0], [1.0, 0.0], 100.0), 2),
    ];
    let p_before = total_momentum(&bodies);

    let report = resolve_collisions(&mut bodies, CollisionMode::Merge, DENSITY, DT);

    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0].id, BodyId(0));
    assert_eq!(bodies[0].mass, 300.0);
    assert_relative_eq!(total_momentum(&bodies), p_before, epsilon = 1e-12);
    assert_eq!(report.merge_count(), 2);
    assert_eq!(report.absorbed().collect::<Vec<_>>(), vec![BodyId(1), BodyId(2)]);
}

#[test]
fn test_merge_leaves_unrelated_bodies_in_order() {
    let mut bodies = vec![
        with_id(Body::new([-200.0, 0.0], [0.0, 0.0], 10.0), 0),
        with_id(Body::new([0.0, 0.0], [1.0, 0.0], 100.0), 1),
        with_id(Body::new([5.0, 0.0], [-1.0, 0.0], 100.0), 2),
        with_id(Body::new([200.0, 0.0], [0.0, 0.0], 10.0), 3),
    ];

    resolve_collisions(&mut bodies, CollisionMode::Merge, DENSITY, DT);

    let ids: Vec<BodyId> = bodies.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![BodyId(0), BodyId(1), BodyId(3)]);
}

#[test]
fn test_movable_merging_into_later_anchor() {
    let mut bodies = vec![
        with_id(Body::new([-6.0, 0.0], [4.0, 0.0], 10.0), 0),
        with_id(Body::anchor([0.0, 0.0], 500.0), 1),
    ];

    let report = resolve_collisions(&mut bodies, CollisionMode::Merge, DENSITY, DT);

    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0].id, BodyId(1));
    assert!(!bodies[0].movable);
    assert_eq!(bodies[0].position, Point2::origin());
    assert_eq!(
        report.events,
        vec![CollisionEvent::Merge {
            survivor: BodyId(1),
            absorbed: BodyId(0)
        }]
    );
}

#[test]
fn test_report_successor_follows_chain() {
    let report = CollisionReport {
        events: vec![
            CollisionEvent::Merge {
                survivor: BodyId(4),
                absorbed: BodyId(7),
            },
            CollisionEvent::Bounce {
                a: BodyId(1),
                b: BodyId(2),
            },
            CollisionEvent::Merge {
                survivor: BodyId(0),
                absorbed: BodyId(4),
            },
        ],
    };

    assert_eq!(report.successor(BodyId(7)), BodyId(0));
    assert_eq!(report.successor(BodyId(4)), BodyId(0));
    assert_eq!(report.successor(BodyId(2)), BodyId(2));
}

#[test]
fn test_tunnelled_pair_merges() {
    let mut bodies = vec![
        with_id(Body::new([1.5, 0.0], [400.0, 0.0], 100.0), 0),
        with_id(Body::new([-1.5, 0.0], [-400.0, 0.0], 100.0), 1),
    ];

    let report = resolve_collisions(&mut bodies, CollisionMode::Merge, DENSITY, DT);

    assert_eq!(report.merge_count(), 1);
    assert_eq!(bodies.len(), 1);
    assert_relative_eq!(bodies[0].velocity, Vector2::zeros(), epsilon = 1e-12);
}

#[test]
fn test_tunnelled_pair_bounces_back_to_its_own_side() {
    let mut bodies = vec![
        with_id(Body::new([1.5, 0.0], [400.0, 0.0], 100.0), 0),
        with_id(Body::new([-1.5, 0.0], [-400.0, 0.0], 100.0), 1),
    ];
    let reach = 2.0 * 100f64.cbrt();

    resolve_collisions(&mut bodies, CollisionMode::Elastic, DENSITY, DT);

    // Back on the side each came from, just touching, and moving apart
    assert_relative_eq!(bodies[0].position.x, -reach / 2.0, epsilon = 1e-9);
    assert_relative_eq!(bodies[1].position.x, reach / 2.0, epsilon = 1e-9);
    assert_relative_eq!(bodies[0].velocity.x, -400.0, epsilon = 1e-9);
    assert_relative_eq!(bodies[1].velocity.x, 400.0, epsilon = 1e-9);
}
