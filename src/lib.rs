//! # `capsule_controller`
//!
//! A kinematic-over-dynamics 3D capsule character controller with physics
//! backend abstraction.
//!
//! This crate drives a capsule rigid body that the physics engine still owns:
//! - Samples the floor with a ring of downward probes plus a center probe
//! - Snaps the body onto the averaged floor height and turns gravity off while grounded
//! - Lets the engine's gravity take over when the floor disappears or a jump launches
//! - Composes horizontal velocity from movement intents, keeping airborne momentum
//! - Rotates the body around the up axis at frame rate
//! - Switches between standing and crouching capsule profiles
//! - Arbitrates jumps against a per-airtime charge budget
//! - Abstracts physics backend for easy swapping (Rapier3D included)
//!
//! ## Architecture
//!
//! Every physics tick runs one ordered chain in `FixedUpdate`:
//! 1. Preparation: floor sample reset, config validation, posture requests, shape refresh, jump admission
//! 2. Sensors: the backend samples the floor under the capsule
//! 3. Grounding: the state machine snaps, lands, launches or releases the body
//! 4. Movement: horizontal velocity is written from the intent
//! 5. Markers: [`Grounded`](state::Grounded) / [`Airborne`](state::Airborne) follow the state
//!
//! Orientation runs separately in `Update` with the frame delta.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use capsule_controller::prelude::*;
//!
//! // Create controller components for a player character
//! let controller = CapsuleController::new();
//! let config = ControllerConfig::player();
//! let mut intent = MovementIntent::default();
//! intent.move_local(Vec3::Z);
//!
//! assert!(!controller.is_grounded());
//! assert!(config.validate().is_empty());
//! // These can be spawned together with physics components
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod collision;
pub mod config;
pub mod detection;
pub mod grounding;
pub mod intent;
pub mod jump;
pub mod motion;
pub mod posture;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::CharacterPhysicsBackend;
    pub use crate::collision::CollisionData;
    pub use crate::config::{CapsuleController, ConfigWarning, ControllerConfig};
    pub use crate::detection::{FloorRayCaster, FloorSample, ProbeLayout};
    pub use crate::intent::{MoveSpace, MovementIntent};
    pub use crate::jump::JumpBudget;
    pub use crate::posture::{CapsuleShapeProfile, Posture};
    pub use crate::state::{Airborne, Grounded, GroundingEvent, GroundingState};
    pub use crate::{CapsuleControllerPlugin, CapsuleControllerSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dCharacterBundle};
}

/// Ordering of the controller's systems.
///
/// All sets except [`Orientation`](CapsuleControllerSet::Orientation) run
/// chained in `FixedUpdate`. Backends add their floor sensor to
/// [`Sensors`](CapsuleControllerSet::Sensors).
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CapsuleControllerSet {
    /// Config validation, posture changes, shape refresh and jump admission.
    Preparation,
    /// Backend floor sampling.
    Sensors,
    /// Grounding state machine and vertical resolution.
    Grounding,
    /// Horizontal velocity.
    Movement,
    /// State marker components.
    Markers,
    /// Yaw rotation, in `Update`.
    Orientation,
}

/// Main plugin for the capsule controller.
///
/// This plugin is generic over a physics backend `B` which provides the actual
/// physics operations (velocity, position, gravity toggle, capsule shape).
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier3dBackend`)
///
/// # Examples
///
/// With Rapier3D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use capsule_controller::prelude::*;
///
/// App::new()
///     .add_plugins(MinimalPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
///     .add_plugins(CapsuleControllerPlugin::<Rapier3dBackend>::default())
///     .run();
/// ```
pub struct CapsuleControllerPlugin<B: backend::CharacterPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::CharacterPhysicsBackend> Default for CapsuleControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::CharacterPhysicsBackend> Plugin for CapsuleControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::CapsuleController>();
        app.register_type::<config::ControllerConfig>();
        app.register_type::<intent::MovementIntent>();
        app.register_type::<intent::MoveSpace>();
        app.register_type::<jump::JumpBudget>();
        app.register_type::<posture::Posture>();
        app.register_type::<state::GroundingState>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<detection::FloorSample>();
        app.register_type::<detection::ProbeLayout>();

        app.add_event::<state::GroundingEvent>();
        app.add_event::<config::ConfigWarning>();

        app.configure_sets(
            FixedUpdate,
            (
                CapsuleControllerSet::Preparation,
                CapsuleControllerSet::Sensors,
                CapsuleControllerSet::Grounding,
                CapsuleControllerSet::Movement,
                CapsuleControllerSet::Markers,
            )
                .chain(),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        // Core systems run in FixedUpdate for consistent physics behavior
        app.add_systems(
            FixedUpdate,
            (
                (
                    systems::clear_floor_samples,
                    systems::report_config_changes,
                    systems::apply_posture_requests,
                    systems::refresh_controller_shapes::<B>,
                    systems::arbitrate_jump_requests,
                )
                    .chain()
                    .in_set(CapsuleControllerSet::Preparation),
                systems::update_grounding::<B>.in_set(CapsuleControllerSet::Grounding),
                systems::apply_horizontal_movement::<B>.in_set(CapsuleControllerSet::Movement),
                systems::sync_state_markers.in_set(CapsuleControllerSet::Markers),
            ),
        );

        // Rotation follows the render rate
        app.add_systems(
            Update,
            systems::apply_rotation.in_set(CapsuleControllerSet::Orientation),
        );
    }
}
