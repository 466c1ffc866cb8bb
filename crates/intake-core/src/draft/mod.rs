//! The registration draft data model and its pure helpers.
//!
//! - **types**: the schema-varying record (tagged union by document type)
//! - **sanitize**: allow-list projection to the active variant's field set
//! - **fields**: sensitive-field mapping and draft-level encrypt/decrypt
//! - **validate**: pass/fail form validation

pub mod fields;
pub mod sanitize;
pub mod types;
pub mod validate;

pub use fields::{decrypt_draft, encrypt_draft, sensitive_fields, SensitiveField};
pub use sanitize::sanitize;
pub use validate::{validate_basic_info, validate_document, validate_image};
pub use types::{
    DocumentFields, DocumentType, DraftData, DraftRecord, ImageBlob, ImageSlot, SanitizedDraft,
    StoredDraft,
};
