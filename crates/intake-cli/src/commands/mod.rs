//! Command implementations.

pub mod misc;
pub mod start;
pub mod status;

use std::path::Path;
use std::sync::Arc;

use intake_core::store::SqliteDraftStore;
use intake_core::{sweep, DraftManager, IntakeConfig, SESSION_KEY};

use crate::session::{draft_db_path, FileSessionStorage};

/// Shared startup sequence: retention sweep, session resolution, draft
/// reconciliation.
pub(crate) async fn bootstrap(
    data_dir: &Path,
    new_session: bool,
) -> anyhow::Result<(Arc<SqliteDraftStore>, DraftManager)> {
    let session = FileSessionStorage::new(data_dir);
    if new_session {
        session.clear(SESSION_KEY)?;
    }

    let store = Arc::new(SqliteDraftStore::new(draft_db_path(data_dir)));
    sweep(store.clone(), IntakeConfig::default().retention).await?;

    let manager = DraftManager::bootstrap(store.clone(), &session).await?;
    Ok((store, manager))
}
