//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! The symmetric key is stretched from the current session token, so
//! ciphertexts are only recoverable within the session that wrote them.
//! The salt is fixed and non-secret: the goal is to obscure sensitive
//! fields at rest against casual inspection, not to resist an attacker
//! with script execution on the same origin.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::error::{IntakeError, Result};

/// PBKDF2 iteration count. Deliberately slow (tens of milliseconds) to
/// make offline guessing of the session token expensive.
const PBKDF2_ITERATIONS: u32 = 100_000;

/// Fixed, non-secret salt mixed into the derivation.
const KEY_SALT: &[u8] = b"intake-register-draft-salt";

/// Length of derived key in bytes (32 bytes = 256 bits for AES-256-GCM).
const KEY_LENGTH: usize = 32;

/// A symmetric key derived from the session token.
///
/// Key material is zeroized from memory when dropped, reducing the window
/// of exposure.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    /// The raw key bytes (zeroized on drop)
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// Avoid storing or logging this value. Use only for immediate
    /// encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive the field-encryption key from a session token.
///
/// Deterministic: the same token always yields the same key, so the key is
/// re-derivable at any point in the session and never needs to be cached
/// beyond a single operation.
///
/// # Errors
///
/// Returns `IntakeError::InvalidInput` if the token is empty.
pub fn derive_key(session_token: &str) -> Result<DerivedKey> {
    if session_token.is_empty() {
        return Err(IntakeError::InvalidInput(
            "Session token cannot be empty".to_string(),
        ));
    }

    let mut key_bytes = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(
        session_token.as_bytes(),
        KEY_SALT,
        PBKDF2_ITERATIONS,
        &mut key_bytes,
    );

    Ok(DerivedKey::from_bytes(key_bytes))
}
