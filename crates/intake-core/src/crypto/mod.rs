//! Cryptographic operations for Intake.
//!
//! Sensitive form fields are encrypted before they touch local storage and
//! transparently decrypted on read:
//! - **AES-256-GCM** for authenticated encryption of individual text values
//! - **PBKDF2-HMAC-SHA256** to stretch the session token into the key
//!
//! ## Threat model
//!
//! We defend against casual inspection of the persisted draft (someone
//! opening the local store file directly).
//!
//! We do NOT defend against an attacker who can execute code in the same
//! session, since the key derives from data available there.

pub mod cipher;
pub mod key;

pub use cipher::FieldCipher;
pub use key::{derive_key, DerivedKey};
