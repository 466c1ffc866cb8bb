//! Draft store trait and implementations.
//!
//! The store is a persistent single-row table holding the current draft,
//! keyed by the fixed draft identifier. Backends must guarantee:
//! - `put` is all-or-nothing and last-write-wins on the fixed id
//! - change notifications fire after every successful `put` or `delete`
//! - the existence probe never materializes storage

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::draft::StoredDraft;
use crate::error::Result;

/// Persistent-map contract the core depends on.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Fetch the draft by id. `Ok(None)` when absent. Must not create the
    /// backing storage.
    async fn get(&self, id: &str) -> Result<Option<StoredDraft>>;

    /// Persist the draft, replacing any existing row with the same id.
    /// All-or-nothing: on failure the prior persisted state is untouched.
    async fn put(&self, draft: StoredDraft) -> Result<()>;

    /// Delete the draft by id. Deleting an absent draft is not an error.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Whether the backing storage has ever been created. Must not create
    /// it as a side effect.
    async fn exists(&self) -> Result<bool>;

    /// Tear down the backing storage entirely (post-submission cleanup).
    async fn destroy(&self) -> Result<()>;

    /// Change notifications: the receiver observes a monotonically
    /// increasing version, bumped after every successful mutation. A
    /// subscriber re-reading the store after a bump sees a state at least
    /// as new as the triggering mutation.
    fn subscribe(&self) -> watch::Receiver<u64>;
}

pub use memory::MemoryDraftStore;
pub use sqlite::SqliteDraftStore;
