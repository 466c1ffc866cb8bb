//! # Intake Core
//!
//! Core library for Intake - a multi-step identity-verification registration
//! flow with encrypted, session-scoped draft persistence.
//!
//! This crate provides the domain logic, storage abstractions, and data
//! models independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **draft**: Draft data model, sanitization, validation
//! - **crypto**: Session-key derivation and field encryption
//! - **store**: Draft store trait and backends (SQLite, in-memory)
//! - **session**: Session token resolution
//! - **lifecycle**: Startup reconciliation and the live draft view
//! - **save**: Step-save orchestration (merge, sanitize, encrypt, persist)
//! - **sweep**: Retention sweep for stale drafts
//! - **submit**: Final submission and store teardown

pub mod config;
pub mod crypto;
pub mod draft;
pub mod error;
pub mod lifecycle;
pub mod save;
pub mod session;
pub mod store;
pub mod submit;
pub mod sweep;

pub use config::{IntakeConfig, DRAFT_ID, SESSION_KEY};
pub use error::{IntakeError, Result};
pub use lifecycle::DraftManager;
pub use save::{FormSaver, SaveOutcome};
pub use store::DraftStore;
pub use submit::Submitter;
pub use sweep::{sweep, SweepOutcome};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
