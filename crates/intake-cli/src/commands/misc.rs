//! Discard and sweep commands.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use intake_core::store::SqliteDraftStore;
use intake_core::{sweep, FormSaver, SweepOutcome};

use crate::session::draft_db_path;

pub async fn discard(data_dir: &Path, new_session: bool) -> anyhow::Result<()> {
    let (_, manager) = super::bootstrap(data_dir, new_session).await?;

    if manager.current_draft().await.is_none() {
        println!("No draft to discard.");
        return Ok(());
    }

    let saver = FormSaver::for_manager(&manager);
    saver.discard().await?;
    println!("Draft discarded.");
    Ok(())
}

/// Standalone retention sweep over the draft database, without touching
/// the session.
pub async fn sweep_drafts(data_dir: &Path, retention_hours: u64) -> anyhow::Result<()> {
    let store = Arc::new(SqliteDraftStore::new(draft_db_path(data_dir)));
    let retention = Duration::from_secs(retention_hours * 60 * 60);

    match sweep(store, retention).await? {
        SweepOutcome::NoDraft => println!("No draft stored."),
        SweepOutcome::Retained => println!("Draft is within the retention window."),
        SweepOutcome::Deleted => println!("Stale draft deleted."),
    }
    Ok(())
}
