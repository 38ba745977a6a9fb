//! Controller configuration and state components.
//!
//! [`ControllerConfig`] holds every tunable of a capsule controller.
//! [`CapsuleController`] is the per-character state the systems read and write.

use bevy::prelude::*;
use thiserror::Error;

use crate::detection::{FloorSample, ProbeLayout};
use crate::jump::JumpBudget;
use crate::posture::{CapsuleShapeProfile, Posture};
use crate::state::GroundingState;

/// Core capsule controller component.
///
/// This is the central hub for the controller state that persists between
/// ticks: the grounding classification, the jump budget, the posture, and the
/// probe layout derived from the configuration. The last floor sample is kept
/// for inspection only; body kinematics are always read back from the physics
/// engine.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct CapsuleController {
    /// Stored grounding state (never [`GroundingState::Rising`]).
    pub(crate) state: GroundingState,
    /// Jump charges and the pending jump latch.
    pub jump: JumpBudget,
    /// Floor sample from the most recent physics tick.
    pub floor: FloorSample,
    /// Probe geometry used by the floor sensor.
    pub layout: ProbeLayout,
    /// Current posture.
    pub(crate) posture: Posture,
    /// Set when the capsule profile or probe layout must be (re)applied.
    pub(crate) shape_dirty: bool,
}

impl Default for CapsuleController {
    fn default() -> Self {
        Self {
            state: GroundingState::Airborne,
            jump: JumpBudget::default(),
            floor: FloorSample::miss(),
            layout: ProbeLayout::default(),
            posture: Posture::Standing,
            shape_dirty: true,
        }
    }
}

impl CapsuleController {
    /// Create a new airborne, standing controller with no jump charge used.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the controller is currently grounded.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.state.is_grounded()
    }

    /// Stored grounding state.
    #[inline]
    pub fn state(&self) -> GroundingState {
        self.state
    }

    /// Current posture.
    #[inline]
    pub fn posture(&self) -> Posture {
        self.posture
    }

    /// Switch to the crouching profile on the next physics tick.
    pub fn crouch(&mut self) {
        self.posture = Posture::Crouching;
        self.shape_dirty = true;
    }

    /// Switch to the standing profile on the next physics tick.
    pub fn stand(&mut self) {
        self.posture = Posture::Standing;
        self.shape_dirty = true;
    }

    /// Capsule profile for the current posture.
    pub fn shape_profile(&self, config: &ControllerConfig) -> CapsuleShapeProfile {
        CapsuleShapeProfile::for_posture(self.posture, config)
    }

    /// Ask for a jump; see [`JumpBudget::request`].
    ///
    /// Returns whether the request was latched.
    pub fn request_jump(&mut self, config: &ControllerConfig) -> bool {
        self.jump.request(self.state.is_grounded(), config.allow_jump_in_mid_air)
    }

    /// Force the shape and probe layout to be recomputed on the next tick.
    pub fn mark_shape_dirty(&mut self) {
        self.shape_dirty = true;
    }
}

/// Configuration parameters for the capsule controller.
///
/// Distances are in world units measured from the body origin, which sits at
/// the character's feet.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct ControllerConfig {
    // === Posture ===
    /// Full height of the standing character.
    pub standing_height: f32,

    /// Full height of the crouching character.
    pub crouch_height: f32,

    /// Gap between the body origin and the bottom of the capsule. Floor
    /// bumps lower than this are walked over by snapping.
    pub knee_height: f32,

    // === Floor probes ===
    /// Number of probes on the ring around the center probe.
    pub probe_count: u32,

    /// How far below the body origin the probes reach.
    pub probe_extra_length: f32,

    // === Movement ===
    /// Horizontal speed, scaled by the fixed tick duration.
    pub horizontal_speed: f32,

    /// Yaw rotation speed in degrees per second.
    pub rotation_speed: f32,

    /// Whether movement intents steer the character while airborne.
    pub allow_control_in_mid_air: bool,

    // === Jumping ===
    /// Vertical velocity set when a jump launches.
    pub jump_speed: f32,

    /// Number of jumps allowed before touching the ground again.
    pub max_jump_charges: u32,

    /// Whether jump requests are admitted while airborne.
    pub allow_jump_in_mid_air: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            standing_height: 2.0,
            crouch_height: 1.0,
            knee_height: 0.4,

            probe_count: 8,
            probe_extra_length: 0.5,

            horizontal_speed: 200.0,
            rotation_speed: 200.0,
            allow_control_in_mid_air: false,

            jump_speed: 2.5,
            max_jump_charges: 1,
            allow_jump_in_mid_air: false,
        }
    }
}

impl ControllerConfig {
    /// Config for a player: steerable in the air and able to double jump.
    pub fn player() -> Self {
        Self {
            jump_speed: 5.0,
            max_jump_charges: 2,
            allow_control_in_mid_air: true,
            allow_jump_in_mid_air: true,
            ..default()
        }
    }

    /// Config for AI-controlled characters.
    pub fn ai() -> Self {
        Self {
            horizontal_speed: 150.0,
            rotation_speed: 120.0,
            ..default()
        }
    }

    /// Set standing, crouching and knee heights.
    pub fn with_heights(mut self, standing: f32, crouch: f32, knees: f32) -> Self {
        self.standing_height = standing;
        self.crouch_height = crouch;
        self.knee_height = knees;
        self
    }

    /// Set the number of ring probes.
    pub fn with_probe_count(mut self, count: u32) -> Self {
        self.probe_count = count;
        self
    }

    /// Set how far below the origin the probes reach.
    pub fn with_probe_extra_length(mut self, length: f32) -> Self {
        self.probe_extra_length = length;
        self
    }

    /// Builder: set horizontal speed.
    pub fn with_horizontal_speed(mut self, speed: f32) -> Self {
        self.horizontal_speed = speed;
        self
    }

    /// Builder: set rotation speed in degrees per second.
    pub fn with_rotation_speed(mut self, degrees_per_second: f32) -> Self {
        self.rotation_speed = degrees_per_second;
        self
    }

    /// Builder: set jump launch speed.
    pub fn with_jump_speed(mut self, speed: f32) -> Self {
        self.jump_speed = speed;
        self
    }

    /// Builder: set jumps allowed between landings.
    pub fn with_max_jump_charges(mut self, charges: u32) -> Self {
        self.max_jump_charges = charges;
        self
    }

    /// Builder: allow horizontal control while airborne.
    pub fn with_mid_air_control(mut self, allowed: bool) -> Self {
        self.allow_control_in_mid_air = allowed;
        self
    }

    /// Builder: allow jumping while airborne.
    pub fn with_mid_air_jump(mut self, allowed: bool) -> Self {
        self.allow_jump_in_mid_air = allowed;
        self
    }

    /// Check the configuration for inconsistent values.
    ///
    /// Every problem is advisory: the controller keeps running with whatever
    /// (possibly degenerate) profile the values produce.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.crouch_height < self.knee_height {
            warnings.push(ConfigWarning::CrouchBelowKnees {
                crouch: self.crouch_height,
                knees: self.knee_height,
            });
        }
        if self.standing_height < self.crouch_height {
            warnings.push(ConfigWarning::StandingBelowCrouch {
                standing: self.standing_height,
                crouch: self.crouch_height,
            });
        }
        if self.probe_count == 0 {
            warnings.push(ConfigWarning::NoRingProbes);
        }
        if self.max_jump_charges == 0 {
            warnings.push(ConfigWarning::NoJumpCharges);
        }

        warnings
    }
}

/// Advisory problem found in a [`ControllerConfig`].
///
/// Sent as an event by the controller plugin whenever a config is added or
/// changed, and logged at warn level.
#[derive(Event, Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigWarning {
    #[error("crouch height {crouch} is below knee height {knees}")]
    CrouchBelowKnees { crouch: f32, knees: f32 },
    #[error("standing height {standing} is below crouch height {crouch}")]
    StandingBelowCrouch { standing: f32, crouch: f32 },
    #[error("probe count is zero, a single ring probe is used")]
    NoRingProbes,
    #[error("max jump charges is zero, jump requests are never admitted")]
    NoJumpCharges,
}
