//! Core controller systems.
//!
//! These systems implement the capsule controller behavior. The ones that
//! touch the body are exclusive and generic over the physics backend so
//! different physics engines can be used.

use bevy::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::config::{CapsuleController, ConfigWarning, ControllerConfig};
use crate::detection::{FloorSample, ProbeLayout};
use crate::grounding::{step_grounding, GroundingTransition};
use crate::intent::MovementIntent;
use crate::motion::{compose_horizontal, yaw_delta};
use crate::posture::Posture;
use crate::state::{Airborne, Grounded, GroundingEvent};

/// Validate added or changed configs and schedule a shape refresh.
///
/// Problems are advisory: they are logged and sent as [`ConfigWarning`]
/// events, and the controller keeps running with the values it was given.
pub fn report_config_changes(
    mut q_controllers: Query<(Entity, &ControllerConfig, &mut CapsuleController), Changed<ControllerConfig>>,
    mut warnings: EventWriter<ConfigWarning>,
) {
    for (entity, config, mut controller) in &mut q_controllers {
        controller.mark_shape_dirty();
        for warning in config.validate() {
            warn!("capsule controller {entity}: {warning}");
            warnings.write(warning);
        }
    }
}

/// Forget last tick's floor sample.
///
/// A backend sensor that skips a tick leaves the controller with no floor
/// instead of a stale one.
pub fn clear_floor_samples(mut q_controllers: Query<&mut CapsuleController>) {
    for mut controller in &mut q_controllers {
        controller.floor = FloorSample::miss();
    }
}

/// Move posture requests from intents onto the controller.
pub fn apply_posture_requests(mut q_controllers: Query<(&mut MovementIntent, &mut CapsuleController)>) {
    for (mut intent, mut controller) in &mut q_controllers {
        if intent.posture_request.is_none() {
            continue;
        }
        match intent.take_posture_request() {
            Some(Posture::Crouching) => controller.crouch(),
            Some(Posture::Standing) => controller.stand(),
            None => {}
        }
    }
}

/// Recompute probe layouts and rewrite capsule shapes where needed.
///
/// Runs for new controllers, after config changes, and after crouch/stand.
pub fn refresh_controller_shapes<B: CharacterPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, ControllerConfig, Posture)> = world
        .query::<(Entity, &ControllerConfig, &CapsuleController)>()
        .iter(world)
        .filter(|(_, _, controller)| controller.shape_dirty)
        .map(|(e, config, controller)| (e, *config, controller.posture))
        .collect();

    for (entity, config, posture) in entities {
        let radius = B::get_capsule_radius(world, entity);
        let layout = ProbeLayout::new(&config, radius);

        let Some(mut controller) = world.get_mut::<CapsuleController>(entity) else {
            continue;
        };
        controller.layout = layout;
        controller.jump.set_max_charge(config.max_jump_charges);
        controller.shape_dirty = false;
        let profile = controller.shape_profile(&config);

        B::set_capsule_profile(world, entity, profile);
        debug!(
            "capsule controller {entity}: {posture:?} profile height {} center {}, {} probes",
            profile.height,
            profile.center,
            layout.probe_count()
        );
    }
}

/// Admit or drop pending jump requests.
///
/// Admission is checked against the grounding state at the start of the
/// tick, before the floor is sampled.
pub fn arbitrate_jump_requests(
    mut q_controllers: Query<(Entity, &mut MovementIntent, &mut CapsuleController, &ControllerConfig)>,
) {
    for (entity, mut intent, mut controller, config) in &mut q_controllers {
        if !intent.has_jump_request() {
            continue;
        }
        intent.take_jump_request();
        if controller.request_jump(config) {
            trace!(
                "capsule controller {entity}: jump latched, charge {}/{}",
                controller.jump.current_charge(),
                controller.jump.max_charge()
            );
        } else {
            trace!("capsule controller {entity}: jump request dropped");
        }
    }
}

/// Run the grounding state machine and write the vertical outcome to the body.
///
/// Reads the floor sample the backend sensor stored this tick. Position is
/// only written on snap; vertical velocity is left alone unless the
/// transition sets it.
pub fn update_grounding<B: CharacterPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, CapsuleController, f32)> = world
        .query::<(Entity, &CapsuleController, &ControllerConfig)>()
        .iter(world)
        .map(|(e, controller, config)| (e, controller.clone(), config.jump_speed))
        .collect();

    for (entity, mut controller, jump_speed) in entities {
        let mut velocity = B::get_velocity(world, entity);
        let position = B::get_position(world, entity);

        let (transition, next_state, resolution) = step_grounding(
            controller.state,
            &mut controller.jump,
            velocity.y,
            position.y,
            controller.floor,
            jump_speed,
        );

        if let Some(vertical_velocity) = resolution.vertical_velocity {
            velocity.y = vertical_velocity;
            B::set_velocity(world, entity, velocity);
        }
        if let Some(height) = resolution.snap_height {
            B::set_position(world, entity, position.with_y(height));
        }
        if let Some(enabled) = resolution.gravity_enabled {
            B::set_gravity_enabled(world, entity, enabled);
        }

        let event = match transition {
            GroundingTransition::Launch => Some(GroundingEvent::Jumped { entity }),
            GroundingTransition::Land { height } => Some(GroundingEvent::Landed { entity, height }),
            GroundingTransition::LoseFloor => Some(GroundingEvent::LeftGround { entity }),
            _ => None,
        };
        if let Some(event) = event {
            debug!("capsule controller {entity}: {event:?}");
            world.send_event(event);
        }

        if let Some(mut stored) = world.get_mut::<CapsuleController>(entity) {
            stored.state = next_state;
            stored.jump = controller.jump;
        }
    }
}

/// Apply horizontal movement intents.
///
/// Local intents are rotated by the body's current rotation. Airborne bodies
/// without mid-air control keep their horizontal velocity.
pub fn apply_horizontal_movement<B: CharacterPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, ControllerConfig, MovementIntent, bool)> = world
        .query::<(Entity, &ControllerConfig, &MovementIntent, &CapsuleController)>()
        .iter(world)
        .map(|(e, config, intent, controller)| (e, *config, intent.clone(), controller.is_grounded()))
        .collect();

    let dt = B::get_fixed_timestep(world);

    for (entity, config, intent, grounded) in entities {
        let velocity = B::get_velocity(world, entity);
        let direction = intent.world_direction(B::get_rotation(world, entity));
        let composed = compose_horizontal(velocity, direction, grounded, &config, dt);

        if composed != velocity {
            B::set_velocity(world, entity, composed);
        }
    }
}

/// Keep [`Grounded`] / [`Airborne`] markers in sync with the grounding state.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<(Entity, &CapsuleController, Has<Grounded>, Has<Airborne>)>,
) {
    for (entity, controller, has_grounded, has_airborne) in &q_controllers {
        let grounded = controller.is_grounded();
        if grounded && (!has_grounded || has_airborne) {
            commands.entity(entity).insert(Grounded).remove::<Airborne>();
        } else if !grounded && (has_grounded || !has_airborne) {
            commands.entity(entity).insert(Airborne).remove::<Grounded>();
        }
    }
}

/// Turn characters around the up axis at frame rate.
///
/// Runs in `Update` with the variable frame time, after the fixed physics
/// ticks of the same frame.
pub fn apply_rotation(
    time: Res<Time>,
    mut q_controllers: Query<(&MovementIntent, &ControllerConfig, &mut Transform), With<CapsuleController>>,
) {
    let dt = time.delta_secs();
    for (intent, config, mut transform) in &mut q_controllers {
        let angle = yaw_delta(intent.yaw, config, dt);
        if angle != 0.0 {
            transform.rotate_y(angle);
        }
    }
}
