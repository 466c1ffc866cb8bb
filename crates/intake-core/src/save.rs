//! Form-save orchestration.
//!
//! Merges step input with the existing draft, projects it through the
//! sanitizer, encrypts sensitive fields and persists the result. A
//! successful return is the wizard-advancement signal; failures are logged
//! and leave the prior persisted state untouched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error};

use crate::config::DRAFT_ID;
use crate::crypto::FieldCipher;
use crate::draft::{
    encrypt_draft, sanitize, DocumentType, DraftData, DraftRecord, ImageSlot, StoredDraft,
};
use crate::error::Result;
use crate::lifecycle::DraftManager;
use crate::store::DraftStore;

/// Result of a save attempt that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Persisted; the caller may advance the wizard.
    Advanced,
    /// No session token was available; nothing was done.
    SkippedNoSession,
}

/// Save orchestrator for wizard steps.
///
/// The `is_saving` flag is advisory: it is meant to disable the UI trigger
/// for the duration of an operation and does not lock the data layer, which
/// stays last-write-wins.
pub struct FormSaver {
    store: Arc<dyn DraftStore>,
    session_id: Option<String>,
    saving: AtomicBool,
}

impl FormSaver {
    pub fn new(store: Arc<dyn DraftStore>, session_id: Option<String>) -> Self {
        Self {
            store,
            session_id,
            saving: AtomicBool::new(false),
        }
    }

    /// Saver bound to a bootstrapped manager's session and store.
    pub fn for_manager(manager: &DraftManager) -> Self {
        Self::new(manager.store(), Some(manager.session_id().to_string()))
    }

    /// True exactly while a save operation is in flight, including ones
    /// that end in failure.
    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    /// Merge `input` over `existing` and persist.
    pub async fn save_and_advance(
        &self,
        existing: Option<&DraftRecord>,
        input: DraftData,
    ) -> Result<SaveOutcome> {
        self.save_with(existing, input, std::convert::identity)
            .await
    }

    /// Like [`save_and_advance`](Self::save_and_advance), with a
    /// pre-processing hook over the merged data before sanitizing.
    pub async fn save_with<F>(
        &self,
        existing: Option<&DraftRecord>,
        input: DraftData,
        pre_process: F,
    ) -> Result<SaveOutcome>
    where
        F: FnOnce(DraftData) -> DraftData,
    {
        let Some(session_id) = self.session_id.clone() else {
            debug!("no session token yet; skipping save");
            return Ok(SaveOutcome::SkippedNoSession);
        };

        self.saving.store(true, Ordering::SeqCst);
        let result = self
            .persist(session_id, existing, input, pre_process)
            .await;
        self.saving.store(false, Ordering::SeqCst);

        match result {
            Ok(()) => Ok(SaveOutcome::Advanced),
            Err(err) => {
                error!(error = %err, "failed to save draft");
                Err(err)
            }
        }
    }

    /// Switch the document type, clearing both images. Fields of the old
    /// variant are dropped by the sanitizer's projection.
    pub async fn change_document_type(
        &self,
        existing: Option<&DraftRecord>,
        new_type: DocumentType,
    ) -> Result<SaveOutcome> {
        let input = DraftData {
            document_type: Some(new_type),
            ..DraftData::default()
        };
        self.save_with(existing, input, |mut merged| {
            merged.front_image = None;
            merged.back_image = None;
            merged
        })
        .await
    }

    /// Remove a single uploaded image and persist the change.
    pub async fn remove_image(
        &self,
        existing: Option<&DraftRecord>,
        slot: ImageSlot,
    ) -> Result<SaveOutcome> {
        self.save_with(existing, DraftData::default(), move |mut merged| {
            match slot {
                ImageSlot::Front => merged.front_image = None,
                ImageSlot::Back => merged.back_image = None,
            }
            merged
        })
        .await
    }

    /// Start fresh: delete the current draft.
    pub async fn discard(&self) -> Result<()> {
        self.store.delete(DRAFT_ID).await
    }

    async fn persist<F>(
        &self,
        session_id: String,
        existing: Option<&DraftRecord>,
        input: DraftData,
        pre_process: F,
    ) -> Result<()>
    where
        F: FnOnce(DraftData) -> DraftData,
    {
        let base = existing
            .map(|record| record.data.clone().into_data())
            .unwrap_or_default();
        let merged = pre_process(DraftData::merged(base, input));
        let sanitized = sanitize(&merged);

        let cipher = FieldCipher::new(session_id.clone());
        let encrypted = encrypt_draft(&cipher, sanitized).await?;

        self.store
            .put(StoredDraft {
                id: DRAFT_ID.to_string(),
                session_id,
                updated_at: Utc::now(),
                data: encrypted,
            })
            .await
    }
}
