//! Startup retention sweep.
//!
//! Runs once before the draft manager bootstraps: a draft untouched for
//! longer than the retention window is deleted so it never reaches the form.
//! Failures are surfaced to the caller rather than silently retained so a
//! stale draft cannot outlive the policy unnoticed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::DRAFT_ID;
use crate::error::{IntakeError, Result};
use crate::store::DraftStore;

/// What the sweep found and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// The store does not exist or holds no draft.
    NoDraft,
    /// A draft exists and is within the retention window.
    Retained,
    /// A stale draft was deleted.
    Deleted,
}

/// Delete the stored draft if it is older than `retention`.
///
/// The age check is exclusive: a draft whose age equals the window exactly
/// is retained. The existence probe runs first so the sweep never
/// materializes the store.
pub async fn sweep(store: Arc<dyn DraftStore>, retention: Duration) -> Result<SweepOutcome> {
    sweep_at(store, retention, Utc::now()).await
}

/// Sweep against an explicit clock reading.
async fn sweep_at(
    store: Arc<dyn DraftStore>,
    retention: Duration,
    now: DateTime<Utc>,
) -> Result<SweepOutcome> {
    if !store.exists().await? {
        debug!("no draft store; nothing to sweep");
        return Ok(SweepOutcome::NoDraft);
    }

    let Some(draft) = store.get(DRAFT_ID).await? else {
        return Ok(SweepOutcome::NoDraft);
    };

    let window = chrono::Duration::from_std(retention)
        .map_err(|e| IntakeError::InvalidInput(format!("Retention window out of range: {e}")))?;
    let age = now - draft.updated_at;

    if age > window {
        info!(age_secs = age.num_seconds(), "deleting stale draft");
        store.delete(DRAFT_ID).await?;
        return Ok(SweepOutcome::Deleted);
    }

    debug!(age_secs = age.num_seconds(), "draft within retention window");
    Ok(SweepOutcome::Retained)
}
