//! Movement intent components.
//!
//! Intents represent what player input or AI wants the character to do.
//! The controller systems read these intents each tick and apply them to the
//! body; movement and yaw are overwritten by the caller, never accumulated.

use bevy::prelude::*;

use crate::posture::Posture;

/// Space a movement vector is expressed in.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MoveSpace {
    /// World axes.
    #[default]
    World,
    /// Body axes, rotated by the character's current rotation when applied.
    Local,
}

/// Movement, rotation, jump and posture intents for one character.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use capsule_controller::prelude::*;
///
/// let mut intent = MovementIntent::new();
/// intent.move_local(Vec3::new(0.0, 0.0, 1.0));
/// intent.rotate(0.5);
/// intent.jump();
/// assert!(intent.is_moving());
/// assert!(intent.has_jump_request());
///
/// intent.clear();
/// assert!(!intent.is_moving());
/// ```
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct MovementIntent {
    /// Desired movement; the vertical component is ignored.
    pub direction: Vec3,
    /// Space `direction` is expressed in.
    pub space: MoveSpace,
    /// Desired yaw input; scaled by the rotation speed every frame.
    pub yaw: f32,
    /// Jump request waiting for admission on the next physics tick.
    pub(crate) jump_requested: bool,
    /// Posture change waiting for the next physics tick.
    pub(crate) posture_request: Option<Posture>,
}

impl MovementIntent {
    /// Create a new empty movement intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move along a world-space vector.
    pub fn move_world(&mut self, direction: Vec3) {
        self.direction = direction;
        self.space = MoveSpace::World;
    }

    /// Move along a body-local vector (e.g. `Vec3::Z` is the character's forward).
    pub fn move_local(&mut self, direction: Vec3) {
        self.direction = direction;
        self.space = MoveSpace::Local;
    }

    /// Set the yaw input (positive turns counter-clockwise seen from above).
    pub fn rotate(&mut self, amount: f32) {
        self.yaw = amount;
    }

    /// Ask for a jump.
    ///
    /// The request is checked against the jump budget at the start of the next
    /// physics tick; several calls before that tick count as one.
    pub fn jump(&mut self) {
        self.jump_requested = true;
    }

    /// Ask for the crouching capsule profile.
    pub fn crouch(&mut self) {
        self.posture_request = Some(Posture::Crouching);
    }

    /// Ask for the standing capsule profile.
    pub fn stand(&mut self) {
        self.posture_request = Some(Posture::Standing);
    }

    /// Clear movement and rotation intents.
    pub fn clear(&mut self) {
        self.direction = Vec3::ZERO;
        self.yaw = 0.0;
    }

    /// Check if there is active horizontal movement input.
    pub fn is_moving(&self) -> bool {
        self.direction.xz().length_squared() > 1e-6
    }

    /// Check if there's a pending jump request.
    pub fn has_jump_request(&self) -> bool {
        self.jump_requested
    }

    /// Take the pending jump request.
    pub fn take_jump_request(&mut self) -> bool {
        std::mem::take(&mut self.jump_requested)
    }

    /// Take the pending posture change.
    pub fn take_posture_request(&mut self) -> Option<Posture> {
        self.posture_request.take()
    }

    /// World-space movement vector for a body with the given rotation.
    pub fn world_direction(&self, rotation: Quat) -> Vec3 {
        match self.space {
            MoveSpace::World => self.direction,
            MoveSpace::Local => rotation * self.direction,
        }
    }
}
