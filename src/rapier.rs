//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D.
//! Enable with the `rapier3d` feature.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::collision::CollisionData;
use crate::config::CapsuleController;
use crate::detection::sample_floor;
use crate::posture::CapsuleShapeProfile;

/// Rapier3D physics backend for the capsule controller.
///
/// Velocity lives in [`Velocity`], the gravity flag maps to [`GravityScale`]
/// (1.0 on, 0.0 off) and the shape is the entity's capsule [`Collider`].
/// Floor probing is handled by a dedicated Rapier system that receives the
/// Rapier context as a system parameter.
///
/// Add Rapier with `RapierPhysicsPlugin::in_fixed_schedule()` so the engine
/// integrates after the controller systems in the same fixed tick.
pub struct Rapier3dBackend;

impl CharacterPhysicsBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }

    fn get_position(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Transform>(entity)
            .map(|t| t.translation)
            .or_else(|| world.get::<GlobalTransform>(entity).map(|t| t.translation()))
            .unwrap_or(Vec3::ZERO)
    }

    fn set_position(world: &mut World, entity: Entity, position: Vec3) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation = position;
        }
    }

    fn get_rotation(world: &World, entity: Entity) -> Quat {
        world
            .get::<Transform>(entity)
            .map(|t| t.rotation)
            .unwrap_or(Quat::IDENTITY)
    }

    fn is_gravity_enabled(world: &World, entity: Entity) -> bool {
        // Rapier applies full gravity to bodies without a GravityScale.
        world
            .get::<GravityScale>(entity)
            .map(|scale| scale.0 != 0.0)
            .unwrap_or(true)
    }

    fn set_gravity_enabled(world: &mut World, entity: Entity, enabled: bool) {
        let scale = GravityScale(if enabled { 1.0 } else { 0.0 });
        if let Some(mut gravity) = world.get_mut::<GravityScale>(entity) {
            *gravity = scale;
        } else if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
            entity_mut.insert(scale);
        }
    }

    fn get_capsule_radius(world: &World, entity: Entity) -> f32 {
        world
            .get::<Collider>(entity)
            .map(get_collider_radius)
            .unwrap_or(0.0)
    }

    fn set_capsule_profile(world: &mut World, entity: Entity, profile: CapsuleShapeProfile) {
        let Some(mut collider) = world.get_mut::<Collider>(entity) else {
            return;
        };
        let radius = get_collider_radius(&collider);
        let (a, b) = profile.segment(radius);
        *collider = Collider::capsule(a, b, radius);
    }
}

/// Plugin that sets up Rapier3D-specific systems for the capsule controller.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        use crate::CapsuleControllerSet;

        app.add_systems(
            FixedUpdate,
            rapier_floor_sampling.in_set(CapsuleControllerSet::Sensors),
        );
    }
}

/// Radius of a capsule (or ball) collider; 0 for other shapes.
pub fn get_collider_radius(collider: &Collider) -> f32 {
    if let Some(capsule) = collider.as_capsule() {
        capsule.radius()
    } else if let Some(ball) = collider.as_ball() {
        ball.radius()
    } else {
        0.0
    }
}

/// Cast a solid ray straight down using the Rapier context.
fn rapier_cast_down(
    context: &RapierContext,
    origin: Vec3,
    max_distance: f32,
    exclude_entity: Entity,
    collision_groups: Option<CollisionGroups>,
) -> Option<CollisionData> {
    // Create filter to exclude the casting entity
    let mut filter = QueryFilter::default()
        .exclude_rigid_body(exclude_entity)
        .exclude_sensors();

    if let Some(groups) = collision_groups {
        filter = filter.groups(groups);
    }

    context
        .cast_ray(origin, Vec3::NEG_Y, max_distance, true, filter)
        .map(|(hit_entity, toi)| CollisionData::along_ray(origin, Vec3::NEG_Y, toi, Some(hit_entity)))
}

/// Rapier-specific floor sensor.
///
/// Runs every probe of the controller's layout from the body's current
/// `Transform` and stores the averaged result on the controller. Reading the
/// local `Transform` keeps the sample in step with snaps made earlier in the
/// same frame; controllers are expected to be root entities.
fn rapier_floor_sampling(
    rapier_context: ReadRapierContext,
    mut q_controllers: Query<(Entity, &Transform, &mut CapsuleController, Option<&CollisionGroups>)>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, mut controller, collision_groups) in &mut q_controllers {
        let groups = collision_groups.copied();
        let layout = controller.layout;
        let mut caster =
            |origin: Vec3, max_distance: f32| rapier_cast_down(&context, origin, max_distance, entity, groups);

        controller.floor = sample_floor(&layout, transform, &mut caster);
        trace!("capsule controller {entity}: floor {:?}", controller.floor);
    }
}

/// Bundle for creating a capsule character with Rapier3D physics.
///
/// Provides the rigid body, velocity tracking, gravity scale and axis locking
/// the controller writes to. Add a capsule [`Collider`] alongside it; its
/// radius is kept and its height/center are overwritten by the controller.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use capsule_controller::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 1.0, 0.0),
///         CapsuleController::new(),
///         ControllerConfig::player(),
///         MovementIntent::default(),
///         Rapier3dCharacterBundle::new(),
///         Collider::capsule_y(0.5, 0.3),
///     ));
/// }
/// ```
///
/// # Defaults
///
/// - `rigid_body`: [`RigidBody::Dynamic`]
/// - `velocity`: Zero velocity
/// - `gravity_scale`: 1.0 (the controller switches it between 1.0 and 0.0)
/// - `locked_axes`: [`LockedAxes::ROTATION_LOCKED`], yaw is driven by the
///   controller's orientation system instead
#[derive(Bundle)]
pub struct Rapier3dCharacterBundle {
    /// The rigid body type. Should be [`RigidBody::Dynamic`] so Rapier resolves collisions.
    pub rigid_body: RigidBody,
    /// Current linear and angular velocity. Written by the controller every tick.
    pub velocity: Velocity,
    /// Gravity toggle written by the grounding system.
    pub gravity_scale: GravityScale,
    /// Which axes are locked.
    pub locked_axes: LockedAxes,
}

impl Default for Rapier3dCharacterBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier3dCharacterBundle {
    /// Create a dynamic, rotation-locked character bundle.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::zero(),
            gravity_scale: GravityScale(1.0),
            locked_axes: LockedAxes::ROTATION_LOCKED,
        }
    }

    /// Set the rigid body type for the character.
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Set which axes should be locked for the rigid body.
    pub fn with_locked_axes(mut self, axes: LockedAxes) -> Self {
        self.locked_axes = axes;
        self
    }
}
