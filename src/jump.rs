//! Jump admission.

use bevy::prelude::*;

/// Jump charges and the pending jump latch.
///
/// A request is admitted when nothing is latched yet, a charge is left, and the
/// character is grounded (or mid-air jumps are allowed). Admission spends the
/// charge right away; charges come back only when the character lands.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpBudget {
    current_charge: u32,
    max_charge: u32,
    latched: bool,
}

impl Default for JumpBudget {
    fn default() -> Self {
        Self::new(1)
    }
}

impl JumpBudget {
    /// Budget with `max_charge` jumps and nothing spent.
    pub fn new(max_charge: u32) -> Self {
        Self {
            current_charge: 0,
            max_charge,
            latched: false,
        }
    }

    /// Charges spent since the last landing.
    #[inline]
    pub fn current_charge(&self) -> u32 {
        self.current_charge
    }

    /// Charges available between landings.
    #[inline]
    pub fn max_charge(&self) -> u32 {
        self.max_charge
    }

    /// Whether a jump is waiting to launch.
    #[inline]
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Update the charge limit. Spent charges are kept.
    pub fn set_max_charge(&mut self, max_charge: u32) {
        self.max_charge = max_charge;
    }

    /// Try to latch a jump. Returns whether it was admitted.
    ///
    /// Rejected requests leave the budget untouched.
    pub fn request(&mut self, grounded: bool, allow_mid_air: bool) -> bool {
        if self.latched || self.current_charge >= self.max_charge || !(grounded || allow_mid_air) {
            return false;
        }

        self.current_charge += 1;
        self.latched = true;
        true
    }

    /// Consume the latch. Returns whether a jump was pending.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.latched)
    }

    /// Give all charges back. Called on landing.
    pub fn reset(&mut self) {
        self.current_charge = 0;
    }
}
