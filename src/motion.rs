//! Horizontal motion and yaw.

use bevy::prelude::*;

use crate::config::ControllerConfig;

/// Compose the body velocity for one physics tick.
///
/// When grounded (or steerable in mid-air) the X and Z components are replaced
/// with `direction` scaled by the horizontal speed and the tick duration;
/// otherwise the velocity is returned unchanged so airborne momentum carries
/// over. The vertical component is never touched here.
pub fn compose_horizontal(
    velocity: Vec3,
    direction: Vec3,
    grounded: bool,
    config: &ControllerConfig,
    dt: f32,
) -> Vec3 {
    if !(grounded || config.allow_control_in_mid_air) {
        return velocity;
    }

    let scale = config.horizontal_speed * dt;
    Vec3::new(direction.x * scale, velocity.y, direction.z * scale)
}

/// Yaw rotation for one render frame, in radians.
pub fn yaw_delta(yaw_input: f32, config: &ControllerConfig, dt: f32) -> f32 {
    (yaw_input * config.rotation_speed * dt).to_radians()
}
