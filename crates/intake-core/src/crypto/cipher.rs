//! Authenticated field encryption.
//!
//! Individual text values are sealed with AES-256-GCM under a key derived
//! from the session token. The wire form is `base64(nonce || ciphertext ||
//! tag)` with a fresh random 96-bit nonce per call, so encrypting the same
//! plaintext twice never yields the same output.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;

use crate::crypto::key::derive_key;
use crate::error::{IntakeError, Result};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Field cipher bound to one session token.
///
/// The token is threaded in explicitly rather than looked up from ambient
/// storage, so the cipher stays testable without a storage shim. The key is
/// re-derived per operation; derivation is deliberately expensive and runs
/// on the blocking thread pool so it never stalls the executor.
#[derive(Debug, Clone)]
pub struct FieldCipher {
    session_token: String,
}

impl FieldCipher {
    pub fn new(session_token: impl Into<String>) -> Self {
        Self {
            session_token: session_token.into(),
        }
    }

    /// Encrypt a text value.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::Crypto` if key derivation or sealing fails.
    pub async fn encrypt(&self, plaintext: &str) -> Result<String> {
        let token = self.session_token.clone();
        let plaintext = plaintext.to_string();
        tokio::task::spawn_blocking(move || encrypt_value(&token, &plaintext))
            .await
            .map_err(|e| IntakeError::Crypto(format!("Encryption task failed: {}", e)))?
    }

    /// Decrypt a value previously produced by [`encrypt`](Self::encrypt)
    /// within the same session.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::Decryption` when the authentication tag does
    /// not verify (different session, tampered data) or the input is not
    /// structurally valid. All failure modes collapse into the same
    /// detail-free error; specifics are logged only.
    pub async fn decrypt(&self, encoded: &str) -> Result<String> {
        let token = self.session_token.clone();
        let encoded = encoded.to_string();
        tokio::task::spawn_blocking(move || decrypt_value(&token, &encoded))
            .await
            .map_err(|e| IntakeError::Crypto(format!("Decryption task failed: {}", e)))?
    }
}

fn encrypt_value(token: &str, plaintext: &str) -> Result<String> {
    let key = derive_key(token)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| IntakeError::Crypto("Invalid key length".to_string()))?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| IntakeError::Crypto("AES-GCM sealing failed".to_string()))?;

    let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(combined))
}

fn decrypt_value(token: &str, encoded: &str) -> Result<String> {
    let key = derive_key(token)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| IntakeError::Crypto("Invalid key length".to_string()))?;

    let combined = BASE64.decode(encoded).map_err(|e| {
        debug!(error = %e, "ciphertext is not valid base64");
        IntakeError::Decryption
    })?;

    // Shortest valid input is a nonce plus an empty ciphertext with its tag.
    if combined.len() < NONCE_LEN + TAG_LEN {
        debug!(len = combined.len(), "ciphertext too short");
        return Err(IntakeError::Decryption);
    }

    let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let plaintext = cipher.decrypt(nonce, ciphertext).map_err(|_| {
        debug!("authentication tag verification failed");
        IntakeError::Decryption
    })?;

    String::from_utf8(plaintext).map_err(|_| {
        debug!("decrypted payload is not valid UTF-8");
        IntakeError::Decryption
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "0d9c8e4a-b1f2-4c3d-8e5f-6a7b8c9d0e1f";

    #[tokio::test]
    async fn test_round_trip() {
        let cipher = FieldCipher::new(TOKEN);

        let encrypted = cipher.encrypt("Taro Yamada").await.unwrap();
        assert_ne!(encrypted, "Taro Yamada");

        let decrypted = cipher.decrypt(&encrypted).await.unwrap();
        assert_eq!(decrypted, "Taro Yamada");
    }

    #[tokio::test]
    async fn test_ciphertext_is_nondeterministic() {
        let cipher = FieldCipher::new(TOKEN);

        let first = cipher.encrypt("same plaintext").await.unwrap();
        let second = cipher.encrypt("same plaintext").await.unwrap();

        // Fresh nonce per call.
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_session_isolation() {
        let cipher_a = FieldCipher::new("session-a");
        let cipher_b = FieldCipher::new("session-b");

        let encrypted = cipher_a.encrypt("private data").await.unwrap();
        let result = cipher_b.decrypt(&encrypted).await;

        assert!(matches!(result, Err(IntakeError::Decryption)));
    }

    #[tokio::test]
    async fn test_tampered_ciphertext_fails() {
        let cipher = FieldCipher::new(TOKEN);
        let encrypted = cipher.encrypt("private data").await.unwrap();

        let mut raw = BASE64.decode(&encrypted).unwrap();
        let mid = raw.len() / 2;
        raw[mid] ^= 0xFF;
        let tampered = BASE64.encode(raw);

        let result = cipher.decrypt(&tampered).await;
        assert!(matches!(result, Err(IntakeError::Decryption)));
    }

    #[tokio::test]
    async fn test_invalid_base64_fails() {
        let cipher = FieldCipher::new(TOKEN);

        let result = cipher.decrypt("not base64 at all!!!").await;
        assert!(matches!(result, Err(IntakeError::Decryption)));
    }

    #[tokio::test]
    async fn test_too_short_input_fails() {
        let cipher = FieldCipher::new(TOKEN);

        // Valid base64, but shorter than nonce + tag.
        let short = BASE64.encode([0u8; 8]);
        let result = cipher.decrypt(&short).await;
        assert!(matches!(result, Err(IntakeError::Decryption)));
    }

    #[tokio::test]
    async fn test_unicode_round_trip() {
        let cipher = FieldCipher::new(TOKEN);

        let plaintext = "山田 太郎";
        let encrypted = cipher.encrypt(plaintext).await.unwrap();
        let decrypted = cipher.decrypt(&encrypted).await.unwrap();
        assert_eq!(decrypted, plaintext);
    }
}
