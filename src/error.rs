use thiserror::Error;

use crate::models::BackendKind;

/// Why a backend SDK script never became usable. Cloneable so the process-wide
/// registry can hand the same outcome to every adapter that waited on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BootstrapFailure {
    #[error("{kind} script injection failed after {attempts} attempts: {reason}")]
    InjectFailed {
        kind: BackendKind,
        attempts: u32,
        reason: String,
    },

    #[error("{kind} SDK not ready after {attempts} readiness checks")]
    TimedOut { kind: BackendKind, attempts: u32 },

    #[error("{kind} player could not be created: {reason}")]
    PlayerCreation { kind: BackendKind, reason: String },
}

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Backend bootstrap failed: {0}")]
    Bootstrap(#[from] BootstrapFailure),

    #[error("Adapter is not ready yet")]
    AdapterNotReady,

    #[error("Adapter is permanently unavailable")]
    AdapterUnavailable,

    #[error("Failed to load preferences: {0}")]
    PreferenceLoad(String),

    #[error("Failed to save preferences: {0}")]
    PreferenceSave(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing failed: {0}")]
    ParseFailed(#[from] serde_json::Error),

    #[error("Invalid reading route pattern: {0}")]
    InvalidRoutePattern(#[from] regex::Error),

    #[error("Player event loop has stopped")]
    PlayerClosed,

    #[error("A global player handle is already installed")]
    GlobalAlreadyInstalled,

    #[error("No global player handle has been installed")]
    GlobalNotInstalled,
}

impl PlayerError {
    /// Errors that mean the adapter will never accept commands again.
    pub(crate) fn is_permanent(&self) -> bool {
        matches!(
            self,
            PlayerError::Bootstrap(_) | PlayerError::AdapterUnavailable
        )
    }
}
