//! Session identity.
//!
//! A session token is an opaque random identifier scoping a draft to one
//! browser-session equivalent. It is created lazily on first access,
//! persisted in session-scoped storage, and never mutated afterward. Every
//! persistence operation reads it as an ownership tag.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::config::SESSION_KEY;
use crate::error::{IntakeError, Result};

/// Session-scoped key-value storage the core depends on.
///
/// The hosting environment provides the real implementation (browser
/// sessionStorage, a per-invocation file, ...). The core only ever stores
/// the session token under [`SESSION_KEY`].
pub trait SessionStorage: Send + Sync {
    /// Read a value by key. `Ok(None)` means the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, overwriting any previous one.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory session storage. One instance corresponds to one session;
/// dropping it ends the session.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|_| IntakeError::SessionUnavailable("session storage poisoned".to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| IntakeError::SessionUnavailable("session storage poisoned".to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Get the current session token, generating and persisting a fresh one if
/// this is the first access of the session.
///
/// The token is a v4 UUID: cryptographically random and globally unique for
/// all practical purposes.
pub fn get_or_create_session_id(storage: &dyn SessionStorage) -> Result<String> {
    if let Some(existing) = storage.get_item(SESSION_KEY)? {
        return Ok(existing);
    }

    let token = Uuid::new_v4().to_string();
    storage.set_item(SESSION_KEY, &token)?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_access_creates_token() {
        let storage = MemorySessionStorage::new();
        assert_eq!(storage.get_item(SESSION_KEY).unwrap(), None);

        let token = get_or_create_session_id(&storage).unwrap();
        assert!(!token.is_empty());
        assert_eq!(storage.get_item(SESSION_KEY).unwrap(), Some(token));
    }

    #[test]
    fn test_token_is_stable_within_session() {
        let storage = MemorySessionStorage::new();

        let first = get_or_create_session_id(&storage).unwrap();
        let second = get_or_create_session_id(&storage).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_separate_sessions_get_distinct_tokens() {
        let a = MemorySessionStorage::new();
        let b = MemorySessionStorage::new();

        let token_a = get_or_create_session_id(&a).unwrap();
        let token_b = get_or_create_session_id(&b).unwrap();
        assert_ne!(token_a, token_b);
    }

    #[test]
    fn test_token_parses_as_uuid() {
        let storage = MemorySessionStorage::new();
        let token = get_or_create_session_id(&storage).unwrap();
        assert!(Uuid::parse_str(&token).is_ok());
    }
}
