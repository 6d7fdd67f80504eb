use approx::assert_relative_eq;

use crate::error::SimulationError;
use crate::params::*;

#[test]
fn test_defaults() {
    let params = SimulationParameters::default();

    assert_eq!(params.gravity, GRAVITY_DEFAULT);
    assert_eq!(params.density, DENSITY_DEFAULT);
    assert_eq!(params.softening, SOFTENING_DEFAULT);
    assert_eq!(params.integrator, IntegratorKind::Verlet);
    assert_eq!(params.collisions, CollisionMode::Merge);
    assert!(params.validate().is_ok());
}

#[test]
fn test_radius_of_uses_density() {
    let mut params = SimulationParameters::default();
    assert_relative_eq!(params.radius_of(100.0), 4.641588833612779, epsilon = 1e-12);

    params.density = 100.0;
    assert_relative_eq!(params.radius_of(100.0), 1.0, epsilon = 1e-12);
}

#[test]
fn test_validate_rejects_non_positive_density() {
    let params = SimulationParameters {
        density: 0.0,
        ..Default::default()
    };

    assert_eq!(
        params.validate(),
        Err(SimulationError::InvalidParameter {
            name: "density",
            value: 0.0
        })
    );
}

#[test]
fn test_validate_rejects_negative_gravity_and_nan_softening() {
    let negative = SimulationParameters {
        gravity: -1.0,
        ..Default::default()
    };
    assert!(matches!(
        negative.validate(),
        Err(SimulationError::InvalidParameter { name: "gravity", .. })
    ));

    let nan = SimulationParameters {
        softening: f64::NAN,
        ..Default::default()
    };
    assert!(matches!(
        nan.validate(),
        Err(SimulationError::InvalidParameter { name: "softening", .. })
    ));
}

#[test]
fn test_zero_gravity_is_valid() {
    let params = SimulationParameters {
        gravity: 0.0,
        ..Default::default()
    };
    assert!(params.validate().is_ok());
}

#[test]
fn test_clamped() {
    let params = SimulationParameters {
        gravity: 1.0e9,
        density: 0.0,
        softening: f64::NAN,
        ..Default::default()
    };
    let clamped = params.clamped();

    assert_eq!(clamped.gravity, *GRAVITY_RANGE.end());
    assert_eq!(clamped.density, *DENSITY_RANGE.start());
    assert_eq!(clamped.softening, *SOFTENING_RANGE.start());
    assert!(clamped.validate().is_ok());
}

#[test]
fn test_partial_config_fills_defaults() {
    let params: SimulationParameters =
        serde_json::from_str(r#"{ "integrator": "rk4", "collisions": "elastic" }"#).unwrap();

    assert_eq!(params.integrator, IntegratorKind::Rk4);
    assert_eq!(params.collisions, CollisionMode::Elastic);
    assert_eq!(params.gravity, GRAVITY_DEFAULT);
    assert_eq!(params.density, DENSITY_DEFAULT);
}

#[test]
fn test_serializes_modes_lowercase() {
    let json = serde_json::to_string(&SimulationParameters::default()).unwrap();

    assert!(json.contains(r#""integrator":"verlet""#));
    assert!(json.contains(r#""collisions":"merge""#));
}

#[test]
fn test_display_and_force_evaluations() {
    let labels: Vec<String> = IntegratorKind::ALL.iter().map(|k| k.to_string()).collect();
    assert_eq!(labels, ["Euler", "Verlet", "RK4"]);

    let modes: Vec<String> = CollisionMode::ALL.iter().map(|m| m.to_string()).collect();
    assert_eq!(modes, ["None", "Merge", "Elastic"]);

    assert_eq!(IntegratorKind::Euler.force_evaluations(), 1);
    assert_eq!(IntegratorKind::Verlet.force_evaluations(), 2);
    assert_eq!(IntegratorKind::Rk4.force_evaluations(), 4);
}
