//! Standing and crouching capsule profiles.

use bevy::prelude::*;

use crate::config::ControllerConfig;

/// Named capsule posture.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Posture {
    #[default]
    Standing,
    Crouching,
}

/// Capsule height and center offset for a posture.
///
/// The capsule floats at knee height above the body origin: the collider
/// covers the span from `knee_height` to the profile's full height, and its
/// center sits halfway along that span on the up axis. Heights below the knee
/// give a zero or negative capsule height, which is still returned as is.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct CapsuleShapeProfile {
    /// Capsule height, end cap to end cap.
    pub height: f32,
    /// Offset of the capsule center from the body origin along +Y.
    pub center: f32,
}

impl CapsuleShapeProfile {
    /// Profile for a body whose top sits at `full_height` above its origin.
    pub fn from_full_height(full_height: f32, knee_height: f32) -> Self {
        let height = full_height - knee_height;
        Self {
            height,
            center: height / 2.0 + knee_height,
        }
    }

    /// The profile for `posture` under `config`.
    pub fn for_posture(posture: Posture, config: &ControllerConfig) -> Self {
        match posture {
            Posture::Standing => Self::standing(config),
            Posture::Crouching => Self::crouching(config),
        }
    }

    /// The standing profile under `config`.
    pub fn standing(config: &ControllerConfig) -> Self {
        Self::from_full_height(config.standing_height, config.knee_height)
    }

    /// The crouching profile under `config`.
    pub fn crouching(config: &ControllerConfig) -> Self {
        Self::from_full_height(config.crouch_height, config.knee_height)
    }

    /// Center offset as a local-space vector.
    #[inline]
    pub fn center_offset(&self) -> Vec3 {
        Vec3::new(0.0, self.center, 0.0)
    }

    /// Half length of the capsule's inner segment for a given cap radius.
    ///
    /// Zero when the capsule is shorter than its two caps.
    pub fn half_segment(&self, radius: f32) -> f32 {
        (self.height / 2.0 - radius).max(0.0)
    }

    /// Local-space endpoints of the capsule's inner segment.
    pub fn segment(&self, radius: f32) -> (Vec3, Vec3) {
        let half = Vec3::new(0.0, self.half_segment(radius), 0.0);
        let center = self.center_offset();
        (center - half, center + half)
    }
}
