//! Final submission and store teardown.
//!
//! Submission hands the draft off (simulated here by a fixed delay) and then
//! destroys the local store entirely, so no trace of the intake data remains
//! on the device afterwards.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::draft::DraftRecord;
use crate::error::Result;
use crate::store::DraftStore;

/// Submits the completed draft and tears the store down.
pub struct Submitter {
    store: Arc<dyn DraftStore>,
    delay: Duration,
    submitting: AtomicBool,
}

impl Submitter {
    pub fn new(store: Arc<dyn DraftStore>, delay: Duration) -> Self {
        Self {
            store,
            delay,
            submitting: AtomicBool::new(false),
        }
    }

    /// True exactly while a submission is in flight.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Submit the draft, then destroy the backing store.
    ///
    /// The delay stands in for the backend round trip. Teardown only runs
    /// after the hand-off completes, so an interrupted submission leaves the
    /// draft recoverable.
    pub async fn submit(&self, draft: &DraftRecord) -> Result<()> {
        self.submitting.store(true, Ordering::SeqCst);
        let result = self.submit_inner(draft).await;
        self.submitting.store(false, Ordering::SeqCst);
        result
    }

    async fn submit_inner(&self, draft: &DraftRecord) -> Result<()> {
        info!(
            session_id = %draft.session_id,
            document_type = ?draft.data.document_type(),
            "submitting registration"
        );
        tokio::time::sleep(self.delay).await;

        self.store.destroy().await?;
        info!("submission complete; local store destroyed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DRAFT_ID;
    use crate::draft::{SanitizedDraft, StoredDraft};
    use crate::store::{DraftStore, MemoryDraftStore};
    use chrono::Utc;

    fn record(session_id: &str) -> DraftRecord {
        DraftRecord {
            id: DRAFT_ID.to_string(),
            session_id: session_id.to_string(),
            updated_at: Utc::now(),
            data: SanitizedDraft {
                full_name: Some("Taro".to_string()),
                ..SanitizedDraft::default()
            },
        }
    }

    #[tokio::test]
    async fn test_submit_destroys_the_store() {
        let store = Arc::new(MemoryDraftStore::new());
        store
            .put(StoredDraft {
                id: DRAFT_ID.to_string(),
                session_id: "session-1".to_string(),
                updated_at: Utc::now(),
                data: SanitizedDraft::default(),
            })
            .await
            .unwrap();

        let submitter = Submitter::new(store.clone(), Duration::from_millis(1));
        submitter.submit(&record("session-1")).await.unwrap();

        assert!(!store.exists().await.unwrap());
        assert_eq!(store.get(DRAFT_ID).await.unwrap(), None);
        assert!(!submitter.is_submitting());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_waits_out_the_hand_off_delay() {
        let store = Arc::new(MemoryDraftStore::new());
        let submitter = Arc::new(Submitter::new(store.clone(), Duration::from_millis(800)));

        let task = tokio::spawn({
            let submitter = Arc::clone(&submitter);
            async move { submitter.submit(&record("session-1")).await }
        });

        // Let the task reach the sleep, then advance past it.
        tokio::task::yield_now().await;
        assert!(submitter.is_submitting());
        tokio::time::advance(Duration::from_millis(800)).await;

        task.await.unwrap().unwrap();
        assert!(!submitter.is_submitting());
    }
}
