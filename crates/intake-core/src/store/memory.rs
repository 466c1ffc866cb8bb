//! In-memory draft store, used in tests and anywhere persistence across
//! process restarts is not needed.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::draft::StoredDraft;
use crate::error::{IntakeError, Result};
use crate::store::DraftStore;

#[derive(Debug)]
struct Inner {
    /// The singleton row, if any.
    row: Option<StoredDraft>,
    /// Whether the "table" has ever been created (first `put`).
    created: bool,
}

/// In-memory single-row store with the same lazy-creation semantics as the
/// durable backend: it does not "exist" until the first write.
#[derive(Debug)]
pub struct MemoryDraftStore {
    inner: Mutex<Inner>,
    version: watch::Sender<u64>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            inner: Mutex::new(Inner {
                row: None,
                created: false,
            }),
            version,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| IntakeError::Storage("Draft store poisoned".to_string()))
    }

    fn notify(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

impl Default for MemoryDraftStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn get(&self, id: &str) -> Result<Option<StoredDraft>> {
        let inner = self.lock()?;
        Ok(inner.row.as_ref().filter(|row| row.id == id).cloned())
    }

    async fn put(&self, draft: StoredDraft) -> Result<()> {
        {
            let mut inner = self.lock().map_err(|e| match e {
                IntakeError::Storage(msg) => IntakeError::StoreWrite(msg),
                other => other,
            })?;
            inner.created = true;
            inner.row = Some(draft);
        }
        self.notify();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let deleted = {
            let mut inner = self.lock().map_err(|e| match e {
                IntakeError::Storage(msg) => IntakeError::StoreDelete(msg),
                other => other,
            })?;
            match &inner.row {
                Some(row) if row.id == id => {
                    inner.row = None;
                    true
                }
                _ => false,
            }
        };
        if deleted {
            self.notify();
        }
        Ok(())
    }

    async fn exists(&self) -> Result<bool> {
        Ok(self.lock()?.created)
    }

    async fn destroy(&self) -> Result<()> {
        {
            let mut inner = self.lock().map_err(|e| match e {
                IntakeError::Storage(msg) => IntakeError::StoreDelete(msg),
                other => other,
            })?;
            inner.row = None;
            inner.created = false;
        }
        self.notify();
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}
