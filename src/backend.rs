//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement
//! to work with the capsule controller. The controller never integrates
//! motion itself: it reads and writes the body's velocity, position and
//! gravity flag through the backend and lets the engine do the rest.
//!
//! Floor probing is not part of the trait. A backend registers its own floor
//! sensor system in [`CapsuleControllerSet::Sensors`](crate::CapsuleControllerSet)
//! from its plugin, typically by implementing
//! [`FloorRayCaster`](crate::detection::FloorRayCaster) over its query pipeline
//! and calling [`sample_floor`](crate::detection::sample_floor).

use bevy::prelude::*;

use crate::posture::CapsuleShapeProfile;

/// Trait for physics backend implementations.
///
/// Implement this trait to integrate a physics engine with the capsule
/// controller. For an example implementation, see the `rapier` module's
/// `Rapier3dBackend`.
pub trait CharacterPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Get the current linear velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec3;

    /// Set the linear velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3);

    /// Get the current position of an entity's origin.
    fn get_position(world: &World, entity: Entity) -> Vec3;

    /// Move an entity's origin to `position` (teleport, no sweep).
    fn set_position(world: &mut World, entity: Entity, position: Vec3);

    /// Get the current rotation of an entity.
    fn get_rotation(world: &World, entity: Entity) -> Quat;

    /// Whether the engine applies gravity to an entity.
    fn is_gravity_enabled(world: &World, entity: Entity) -> bool;

    /// Turn the engine's gravity on or off for an entity.
    fn set_gravity_enabled(world: &mut World, entity: Entity, enabled: bool);

    /// Radius of the entity's capsule shape.
    fn get_capsule_radius(world: &World, entity: Entity) -> f32;

    /// Rewrite the entity's capsule height and center, keeping its radius.
    fn set_capsule_profile(world: &mut World, entity: Entity, profile: CapsuleShapeProfile);

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }
}
