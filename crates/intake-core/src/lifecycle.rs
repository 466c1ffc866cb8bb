//! Draft lifecycle management.
//!
//! On startup the manager reconciles the stored draft's session tag against
//! the current session, discarding foreign drafts, and from then on exposes
//! the draft as a live, subscribable value that is decrypted on every read.
//! A draft that cannot be decrypted is indistinguishable from an absent one
//! at this boundary: consumers never see a raw decryption error.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::DRAFT_ID;
use crate::crypto::FieldCipher;
use crate::draft::{decrypt_draft, DraftRecord};
use crate::error::Result;
use crate::session::{get_or_create_session_id, SessionStorage};
use crate::store::DraftStore;

/// Startup phases, in bootstrap order. Diagnostic only: they show up in
/// the logs while `bootstrap` runs.
#[derive(Debug, Clone, Copy)]
enum LifecyclePhase {
    ResolvingSession,
    CheckingStoreExistence,
    Reconciling,
    Ready,
}

/// Session-scoped view over the draft store.
///
/// Constructed through [`bootstrap`](DraftManager::bootstrap); a manager in
/// hand is always fully initialized, so callers treat the pending bootstrap
/// future itself as the loading state.
pub struct DraftManager {
    session_id: String,
    store: Arc<dyn DraftStore>,
    cipher: FieldCipher,
}

impl DraftManager {
    /// Resolve the session, probe store existence and reconcile ownership.
    ///
    /// A record written by another session is a foreign-session conflict:
    /// it is deleted (best effort; a failed delete is logged and does not
    /// block readiness) and the manager proceeds as if no draft existed.
    /// The existence probe never materializes the store.
    pub async fn bootstrap(
        store: Arc<dyn DraftStore>,
        session_storage: &dyn SessionStorage,
    ) -> Result<Self> {
        let mut phase = LifecyclePhase::ResolvingSession;
        debug!(?phase, "bootstrapping draft manager");
        let session_id = get_or_create_session_id(session_storage)?;

        phase = LifecyclePhase::CheckingStoreExistence;
        debug!(?phase, "bootstrapping draft manager");
        let store_exists = store.exists().await?;

        phase = LifecyclePhase::Reconciling;
        debug!(?phase, "bootstrapping draft manager");
        if store_exists {
            match store.get(DRAFT_ID).await {
                Ok(Some(record)) if record.session_id != session_id => {
                    warn!("stored draft belongs to another session; discarding");
                    if let Err(err) = store.delete(DRAFT_ID).await {
                        // Non-fatal: the draft is unusable for this session
                        // either way and reads filter it out.
                        warn!(error = %err, "failed to delete foreign-session draft");
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(error = %err, "draft reconciliation read failed");
                }
            }
        }

        phase = LifecyclePhase::Ready;
        debug!(?phase, session_id = %session_id, "draft manager ready");

        Ok(Self {
            cipher: FieldCipher::new(session_id.clone()),
            session_id,
            store,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn store(&self) -> Arc<dyn DraftStore> {
        Arc::clone(&self.store)
    }

    pub fn cipher(&self) -> &FieldCipher {
        &self.cipher
    }

    /// The current decrypted draft, or `None` when the store doesn't exist,
    /// the record belongs to another session, or it cannot be decrypted.
    ///
    /// Pure function of current store state, so overlapping invocations are
    /// idempotent.
    pub async fn current_draft(&self) -> Option<DraftRecord> {
        read_current(self.store.as_ref(), &self.session_id, &self.cipher).await
    }

    /// Live draft view: recomputes the decrypted draft on every store
    /// change notification. The observed value is at least as new as the
    /// triggering mutation.
    pub fn subscribe(&self) -> watch::Receiver<Option<DraftRecord>> {
        let (tx, rx) = watch::channel(None);
        let store = Arc::clone(&self.store);
        let session_id = self.session_id.clone();
        let cipher = self.cipher.clone();
        let mut changes = store.subscribe();

        tokio::spawn(async move {
            let initial = read_current(store.as_ref(), &session_id, &cipher).await;
            if tx.send(initial).is_err() {
                return;
            }

            loop {
                tokio::select! {
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = tx.closed() => break,
                }

                let current = read_current(store.as_ref(), &session_id, &cipher).await;
                if tx.send(current).is_err() {
                    break;
                }
            }
        });

        rx
    }
}

/// Read-and-decrypt routine behind both `current_draft` and the live view.
async fn read_current(
    store: &dyn DraftStore,
    session_id: &str,
    cipher: &FieldCipher,
) -> Option<DraftRecord> {
    match store.exists().await {
        Ok(true) => {}
        Ok(false) => return None,
        Err(err) => {
            warn!(error = %err, "store existence probe failed");
            return None;
        }
    }

    let stored = match store.get(DRAFT_ID).await {
        Ok(Some(stored)) => stored,
        Ok(None) => return None,
        Err(err) => {
            warn!(error = %err, "draft read failed");
            return None;
        }
    };

    // Defense in depth against races with bootstrap reconciliation.
    if stored.session_id != session_id {
        return None;
    }

    match decrypt_draft(cipher, stored.data).await {
        Ok(data) => Some(DraftRecord {
            id: stored.id,
            session_id: stored.session_id,
            updated_at: stored.updated_at,
            data,
        }),
        Err(err) => {
            // A corrupted or foreign draft reads as absent.
            warn!(error = %err, "draft decryption failed; treating as absent");
            None
        }
    }
}
