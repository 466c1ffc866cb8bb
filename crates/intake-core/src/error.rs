//! Error types for Intake core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer will map these
//! to user-friendly messages.

use thiserror::Error;

/// Result type alias for Intake operations.
pub type Result<T> = std::result::Result<T, IntakeError>;

/// Core error type for Intake operations.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Session token could not be obtained or created. Dependent
    /// operations no-op until a session is available.
    #[error("Session unavailable: {0}")]
    SessionUnavailable(String),

    /// Authenticated decryption failed: wrong session key, corrupted
    /// ciphertext, or structurally invalid input.
    ///
    /// Deliberately carries no detail so callers cannot distinguish the
    /// failure modes; specifics go to the diagnostic log only.
    #[error("Decryption failed")]
    Decryption,

    /// Encryption-side failure (key derivation or AEAD sealing).
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Persistence write failure. The in-progress save is aborted and the
    /// prior persisted state is left untouched.
    #[error("Store write error: {0}")]
    StoreWrite(String),

    /// Persistence delete failure.
    #[error("Store delete error: {0}")]
    StoreDelete(String),

    /// Storage backend error (reads, existence probes).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<std::io::Error> for IntakeError {
    fn from(err: std::io::Error) -> Self {
        IntakeError::Storage(err.to_string())
    }
}
