//! Setup-time errors.
//!
//! Steady-state operations never fail with an error: stale requests and
//! precondition violations are absorbed as `false`/no-op by the runtime. The
//! only errors that propagate are configuration inconsistencies detected while
//! a battle is being assembled, and those abort the battle setup.

use crate::state::PickupKind;

/// Configuration inconsistency that prevents a battle from starting.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    /// Placement data names a pickup kind the engine does not know.
    #[error("unknown pickup kind '{0}' in placement data")]
    UnknownPickupKind(String),

    /// A placement has a non-finite coordinate.
    #[error("placement {index} of {kind} pickups has a non-finite position")]
    InvalidPlacement { kind: PickupKind, index: usize },

    /// A numeric tunable is out of its allowed range.
    #[error("configuration value `{field}` is invalid: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
}

impl SetupError {
    /// Stable code for logs and diagnostics.
    pub const fn error_code(&self) -> &'static str {
        match self {
            SetupError::UnknownPickupKind(_) => "SETUP_UNKNOWN_PICKUP_KIND",
            SetupError::InvalidPlacement { .. } => "SETUP_INVALID_PLACEMENT",
            SetupError::InvalidConfig { .. } => "SETUP_INVALID_CONFIG",
        }
    }
}
