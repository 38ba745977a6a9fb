//! Ray hit results.
//!
//! These structures hold the results of the physics queries issued by the
//! floor sensor.

use bevy::prelude::*;

/// Information about a raycast collision.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionData {
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// World position of the hit point.
    pub point: Vec3,
    /// Entity that was hit (if any).
    pub entity: Option<Entity>,
}

impl CollisionData {
    /// Create a collision result.
    pub fn new(distance: f32, point: Vec3, entity: Option<Entity>) -> Self {
        Self {
            distance,
            point,
            entity,
        }
    }

    /// Build the hit for a ray travelling `distance` along `direction` from `origin`.
    pub fn along_ray(origin: Vec3, direction: Vec3, distance: f32, entity: Option<Entity>) -> Self {
        Self::new(distance, origin + direction * distance, entity)
    }

    /// World-space height of the hit point.
    #[inline]
    pub fn height(&self) -> f32 {
        self.point.y
    }
}
