// Rust guideline compliant 2026-10-12

//! Finite State Machine module for gate sequencing.
//!
//! This module encodes the structural rules of the gate pipeline. Criteria
//! and capacity are checked elsewhere; these rules hold regardless of any
//! override:
//!
//! - Killed → anything is rejected (Killed is absorbing)
//! - Any → Killed, Any → Parked
//! - Parked → any active gate (resurrection)
//! - Active → next active gate (one step forward)
//! - Active → any earlier active gate (backward, any distance)

use crate::{Error, Gate, Result};

impl Gate {
    /// Checks if the pipeline allows moving from this gate to `target`.
    ///
    /// # Arguments
    ///
    /// * `target` - The gate to move to
    ///
    /// # Returns
    ///
    /// Ok if the move is structurally legal, Err with a descriptive message otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The current gate is Killed
    /// - The move skips forward over a gate
    /// - The target equals the current active gate
    pub fn can_transition_to(&self, target: Gate) -> Result<()> {
        // Killed wins over every other rule, including moves into terminal gates
        if *self == Gate::Killed {
            return Err(Error::InvalidTransition(format!(
                "{} is final; cannot move to {}",
                self, target
            )));
        }

        if target.is_terminal() {
            return Ok(());
        }

        if *self == Gate::Parked {
            return Ok(());
        }

        let (Some(current), Some(next)) = (self.ordinal(), target.ordinal()) else {
            return Err(Error::InvalidTransition(format!(
                "Cannot transition from {} to {}",
                self, target
            )));
        };

        if next == current + 1 || next < current {
            return Ok(());
        }

        if next == current {
            return Err(Error::InvalidTransition(format!(
                "Item is already in {}",
                self
            )));
        }

        Err(Error::InvalidTransition(format!(
            "Cannot skip from {} to {}; gates advance one step at a time",
            self, target
        )))
    }

    /// Returns the gates reachable from this gate, in pipeline order.
    pub fn valid_transitions(&self) -> Vec<Gate> {
        Gate::ALL
            .into_iter()
            .filter(|target| self.can_transition_to(*target).is_ok())
            .collect()
    }
}
