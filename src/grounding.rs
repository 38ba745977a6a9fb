//! Grounding state machine and vertical velocity resolution.
//!
//! Each physics tick the grounding system builds a [`GroundingInput`] from the
//! body and the latest floor sample, asks [`GroundingTransition::evaluate`]
//! what happens, and then writes the [`VerticalResolution`] back to the body.
//! Vertical velocity is only written here; when no transition applies it is
//! left for the physics engine's gravity to evolve.

use crate::detection::FloorSample;
use crate::jump::JumpBudget;
use crate::state::GroundingState;

/// Everything the state machine looks at in one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundingInput {
    /// Stored grounding state.
    pub state: GroundingState,
    /// Whether a jump is latched.
    pub jump_latched: bool,
    /// Current vertical velocity of the body.
    pub vertical_velocity: f32,
    /// Current height of the body origin.
    pub height: f32,
    /// Floor sample for the body's current pose.
    pub floor: FloorSample,
}

/// Outcome of one grounding evaluation, in priority order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroundingTransition {
    /// A latched jump launches the body.
    Launch,
    /// Grounded body follows the floor.
    Snap { height: f32 },
    /// Airborne body reached or sank below the floor and lands on it.
    Land { height: f32 },
    /// Airborne body sees a floor below but has not reached it yet.
    Approach,
    /// Grounded body lost the floor (no hit, or moving up).
    LoseFloor,
    /// Airborne with nothing to do; gravity keeps integrating.
    Coast,
}

impl GroundingTransition {
    /// Decide the transition for one tick.
    pub fn evaluate(input: &GroundingInput) -> Self {
        if input.jump_latched {
            return GroundingTransition::Launch;
        }

        let grounded = input.state.is_grounded();
        if input.vertical_velocity <= 0.0 {
            if let Some(floor) = input.floor.height() {
                return if grounded {
                    GroundingTransition::Snap { height: floor }
                } else if input.height <= floor {
                    GroundingTransition::Land { height: floor }
                } else {
                    GroundingTransition::Approach
                };
            }
        }

        if grounded {
            GroundingTransition::LoseFloor
        } else {
            GroundingTransition::Coast
        }
    }

    /// Stored state after the transition.
    pub fn next_state(&self, current: GroundingState) -> GroundingState {
        match self {
            GroundingTransition::Launch | GroundingTransition::LoseFloor => {
                GroundingState::Airborne
            }
            GroundingTransition::Snap { .. } | GroundingTransition::Land { .. } => {
                GroundingState::Grounded
            }
            GroundingTransition::Approach | GroundingTransition::Coast => match current {
                GroundingState::Rising => GroundingState::Airborne,
                other => other,
            },
        }
    }
}

/// Body writes implied by a transition.
///
/// `None` fields are left as they are in the physics engine.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VerticalResolution {
    /// New vertical velocity.
    pub vertical_velocity: Option<f32>,
    /// New height of the body origin.
    pub snap_height: Option<f32>,
    /// New gravity-enabled flag.
    pub gravity_enabled: Option<bool>,
}

impl VerticalResolution {
    /// Translate a transition into body writes.
    pub fn resolve(transition: GroundingTransition, jump_speed: f32) -> Self {
        match transition {
            GroundingTransition::Launch => Self {
                vertical_velocity: Some(jump_speed),
                snap_height: None,
                gravity_enabled: Some(true),
            },
            GroundingTransition::Snap { height } => Self {
                vertical_velocity: Some(0.0),
                snap_height: Some(height),
                gravity_enabled: None,
            },
            GroundingTransition::Land { height } => Self {
                vertical_velocity: Some(0.0),
                snap_height: Some(height),
                gravity_enabled: Some(false),
            },
            GroundingTransition::LoseFloor => Self {
                vertical_velocity: None,
                snap_height: None,
                gravity_enabled: Some(true),
            },
            GroundingTransition::Approach | GroundingTransition::Coast => Self::default(),
        }
    }

    /// Whether the resolution writes nothing.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Run one grounding step against the controller's own state.
///
/// Consumes the jump latch on launch and resets the jump budget on landing.
/// Returns the transition, the new stored state, and the body writes.
pub fn step_grounding(
    state: GroundingState,
    jump: &mut JumpBudget,
    vertical_velocity: f32,
    height: f32,
    floor: FloorSample,
    jump_speed: f32,
) -> (GroundingTransition, GroundingState, VerticalResolution) {
    let input = GroundingInput {
        state,
        jump_latched: jump.is_latched(),
        vertical_velocity,
        height,
        floor,
    };

    let transition = GroundingTransition::evaluate(&input);
    match transition {
        GroundingTransition::Launch => {
            jump.take();
        }
        GroundingTransition::Land { .. } => jump.reset(),
        _ => {}
    }

    (
        transition,
        transition.next_state(state),
        VerticalResolution::resolve(transition, jump_speed),
    )
}
