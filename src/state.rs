//! Grounding state and state marker components.
//!
//! [`GroundingState`] is the classification owned by the grounding state
//! machine. The marker components mirror it so gameplay systems can filter
//! queries with `With<Grounded>` / `With<Airborne>`; they are added and removed
//! by the controller systems.

use bevy::prelude::*;

/// Vertical classification of a capsule controller.
///
/// Only [`GroundingState::Airborne`] and [`GroundingState::Grounded`] are ever
/// stored. A jump leaves the controller Airborne with an upward velocity;
/// [`GroundingState::observe`] reports that phase as [`GroundingState::Rising`].
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GroundingState {
    /// Falling or coasting under engine gravity.
    #[default]
    Airborne,
    /// Snapped to the sampled floor with gravity disabled.
    Grounded,
    /// Airborne and moving up, usually right after a jump.
    Rising,
}

impl GroundingState {
    /// Whether this is the grounded state.
    #[inline]
    pub fn is_grounded(self) -> bool {
        self == GroundingState::Grounded
    }

    /// Whether this is an airborne state (falling or rising).
    #[inline]
    pub fn is_airborne(self) -> bool {
        !self.is_grounded()
    }

    /// Classify a stored state against the body's current vertical velocity.
    pub fn observe(self, vertical_velocity: f32) -> GroundingState {
        match self {
            GroundingState::Grounded => GroundingState::Grounded,
            _ if vertical_velocity > 0.0 => GroundingState::Rising,
            _ => GroundingState::Airborne,
        }
    }
}

/// Marker component indicating the character is grounded.
///
/// Added when the grounding state machine snaps the character to the floor.
/// Removed when the character becomes airborne.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use capsule_controller::prelude::*;
///
/// // Grounded is a marker component - just use it in queries
/// fn check_grounded(grounded: Option<&Grounded>) -> bool {
///     grounded.is_some()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is airborne.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Transition notifications sent by the grounding system.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum GroundingEvent {
    /// The character reached the floor and was snapped to `height`.
    Landed { entity: Entity, height: f32 },
    /// The character lost the floor without jumping.
    LeftGround { entity: Entity },
    /// A latched jump launched the character.
    Jumped { entity: Entity },
}

impl GroundingEvent {
    /// The controller entity the transition belongs to.
    pub fn entity(&self) -> Entity {
        match *self {
            GroundingEvent::Landed { entity, .. }
            | GroundingEvent::LeftGround { entity }
            | GroundingEvent::Jumped { entity } => entity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_airborne() {
        assert_eq!(GroundingState::default(), GroundingState::Airborne);
        assert!(GroundingState::default().is_airborne());
    }

    #[test]
    fn observe_reports_rising_only_when_airborne_and_moving_up() {
        assert_eq!(GroundingState::Airborne.observe(2.5), GroundingState::Rising);
        assert_eq!(GroundingState::Airborne.observe(0.0), GroundingState::Airborne);
        assert_eq!(GroundingState::Airborne.observe(-1.0), GroundingState::Airborne);
        assert_eq!(GroundingState::Grounded.observe(2.5), GroundingState::Grounded);
    }

    #[test]
    fn rising_counts_as_airborne() {
        assert!(GroundingState::Rising.is_airborne());
        assert!(!GroundingState::Rising.is_grounded());
    }

    #[test]
    fn event_entity() {
        let entity = Entity::from_raw(7);
        assert_eq!(GroundingEvent::Jumped { entity }.entity(), entity);
        assert_eq!(GroundingEvent::Landed { entity, height: 1.0 }.entity(), entity);
    }
}
