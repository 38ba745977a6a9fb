//! Integration tests against the Rapier3D backend.
//!
//! These run the real physics engine, so assertions leave room for solver
//! noise; the exact behavior is covered by the fake-backend tests.

#![cfg(feature = "rapier3d")]

use std::time::Duration;

use approx::assert_relative_eq;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::*;
use capsule_controller::prelude::*;

/// Create a minimal test app with physics and character controller.
fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(TransformPlugin);
    app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule());
    app.add_plugins(CapsuleControllerPlugin::<Rapier3dBackend>::default());
    app.insert_resource(Time::<Fixed>::from_hz(60.0));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / 60.0,
    )));

    app.finish();
    app.cleanup();
    app
}

/// Spawn a static ground box whose top face is at `top`.
fn spawn_ground(app: &mut App, top: f32, half_extent: f32) -> Entity {
    let transform = Transform::from_xyz(0.0, top - 0.5, 0.0);
    app.world_mut()
        .spawn((
            transform,
            GlobalTransform::from(transform),
            RigidBody::Fixed,
            Collider::cuboid(half_extent, 0.5, half_extent),
        ))
        .id()
}

/// Spawn a character controller with a 0.3 radius capsule.
fn spawn_character(app: &mut App, position: Vec3, config: ControllerConfig) -> Entity {
    let transform = Transform::from_translation(position);
    app.world_mut()
        .spawn((
            transform,
            GlobalTransform::from(transform),
            CapsuleController::new(),
            config,
            MovementIntent::default(),
            Rapier3dCharacterBundle::new(),
            Collider::capsule_y(0.5, 0.3),
        ))
        .id()
}

fn tick(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn controller(app: &App, entity: Entity) -> &CapsuleController {
    app.world().get::<CapsuleController>(entity).unwrap()
}

fn position(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<Transform>(entity).unwrap().translation
}

#[test]
fn character_falls_and_settles_on_ground() {
    let mut app = create_test_app();
    spawn_ground(&mut app, 0.0, 20.0);
    let character = spawn_character(&mut app, Vec3::new(0.0, 1.0, 0.0), ControllerConfig::default());

    tick(&mut app, 5);
    assert!(!controller(&app, character).is_grounded());
    assert!(position(&app, character).y < 1.0, "gravity should pull the body down");

    tick(&mut app, 120);

    assert!(controller(&app, character).is_grounded());
    assert!(app.world().get::<Grounded>(character).is_some());
    assert_relative_eq!(position(&app, character).y, 0.0, epsilon = 1e-3);
    assert_eq!(app.world().get::<GravityScale>(character).map(|g| g.0), Some(0.0));
    assert!(app.world().get::<Velocity>(character).unwrap().linvel.y.abs() < 1e-3);
}

#[test]
fn collider_follows_standing_profile() {
    let mut app = create_test_app();
    spawn_ground(&mut app, 0.0, 20.0);
    let character = spawn_character(&mut app, Vec3::ZERO, ControllerConfig::default());

    tick(&mut app, 3);

    let collider = app.world().get::<Collider>(character).unwrap();
    let capsule = collider.as_capsule().unwrap();
    assert_relative_eq!(capsule.radius(), 0.3);
    let segment = capsule.segment();
    assert_relative_eq!(segment.a().y, 0.7, epsilon = 1e-4);
    assert_relative_eq!(segment.b().y, 1.7, epsilon = 1e-4);

    app.world_mut()
        .get_mut::<MovementIntent>(character)
        .unwrap()
        .crouch();
    tick(&mut app, 2);

    let collider = app.world().get::<Collider>(character).unwrap();
    let capsule = collider.as_capsule().unwrap();
    let segment = capsule.segment();
    // Crouching profile is 0.6 tall: the capsule collapses to a sphere at 0.7.
    assert_relative_eq!(segment.a().y, 0.7, epsilon = 1e-4);
    assert_relative_eq!(segment.b().y, 0.7, epsilon = 1e-4);
}

#[test]
fn grounded_character_walks_along_ground() {
    let mut app = create_test_app();
    spawn_ground(&mut app, 0.0, 20.0);
    let character = spawn_character(&mut app, Vec3::new(0.0, 0.5, 0.0), ControllerConfig::default());
    tick(&mut app, 60);
    assert!(controller(&app, character).is_grounded());

    app.world_mut()
        .get_mut::<MovementIntent>(character)
        .unwrap()
        .move_world(Vec3::X);
    tick(&mut app, 30);

    let pos = position(&app, character);
    assert!(pos.x > 0.5, "character should have moved along +X, got {}", pos.x);
    assert!(controller(&app, character).is_grounded());
    assert_relative_eq!(pos.y, 0.0, epsilon = 1e-3);
}

#[test]
fn jump_leaves_ground_and_lands_again() {
    let mut app = create_test_app();
    spawn_ground(&mut app, 0.0, 20.0);
    let character = spawn_character(&mut app, Vec3::new(0.0, 0.5, 0.0), ControllerConfig::default());
    tick(&mut app, 60);
    assert!(controller(&app, character).is_grounded());

    app.world_mut()
        .get_mut::<MovementIntent>(character)
        .unwrap()
        .jump();
    tick(&mut app, 5);

    assert!(!controller(&app, character).is_grounded());
    assert!(position(&app, character).y > 0.05);
    assert_eq!(app.world().get::<GravityScale>(character).map(|g| g.0), Some(1.0));

    tick(&mut app, 120);
    assert!(controller(&app, character).is_grounded());
    assert_eq!(controller(&app, character).jump.current_charge(), 0);
}

#[test]
fn walking_off_ledge_starts_falling() {
    let mut app = create_test_app();
    spawn_ground(&mut app, 0.0, 5.0);
    let character = spawn_character(&mut app, Vec3::new(4.0, 0.5, 0.0), ControllerConfig::default());
    tick(&mut app, 60);
    assert!(controller(&app, character).is_grounded());

    app.world_mut()
        .get_mut::<MovementIntent>(character)
        .unwrap()
        .move_world(Vec3::X);
    tick(&mut app, 60);

    assert!(!controller(&app, character).is_grounded());
    assert!(app.world().get::<Airborne>(character).is_some());
    assert!(position(&app, character).y < 0.0);
}
