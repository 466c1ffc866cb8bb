//! Sensitive field mapping.
//!
//! Knows, per document type, which named fields must pass through the field
//! cipher: the four common personal-info fields always, plus exactly one
//! variant-specific number field. Images, the discriminator and dates are
//! never ciphered (the cipher operates on text only).

use crate::crypto::FieldCipher;
use crate::draft::types::{DocumentFields, DocumentType, SanitizedDraft};
use crate::error::Result;

/// A field name that receives cipher treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensitiveField {
    FullName,
    Email,
    PhoneNumber,
    Address,
    LicenseNumber,
    PassportNumber,
    MyNumber,
}

impl SensitiveField {
    pub fn name(&self) -> &'static str {
        match self {
            SensitiveField::FullName => "full_name",
            SensitiveField::Email => "email",
            SensitiveField::PhoneNumber => "phone_number",
            SensitiveField::Address => "address",
            SensitiveField::LicenseNumber => "license_number",
            SensitiveField::PassportNumber => "passport_number",
            SensitiveField::MyNumber => "my_number",
        }
    }
}

const COMMON_FIELDS: [SensitiveField; 4] = [
    SensitiveField::FullName,
    SensitiveField::Email,
    SensitiveField::PhoneNumber,
    SensitiveField::Address,
];

/// Ordered set of fields requiring cipher treatment for the given
/// discriminator.
pub fn sensitive_fields(document_type: Option<DocumentType>) -> Vec<SensitiveField> {
    let mut fields = COMMON_FIELDS.to_vec();
    match document_type {
        Some(DocumentType::DriversLicense) => fields.push(SensitiveField::LicenseNumber),
        Some(DocumentType::Passport) => fields.push(SensitiveField::PassportNumber),
        Some(DocumentType::MyNumber) => fields.push(SensitiveField::MyNumber),
        None => {}
    }
    fields
}

/// Encrypt the sensitive fields of a sanitized draft in place, returning
/// the ciphertext-valued shape fit for persistence.
///
/// Empty and absent values are carried through untouched.
pub async fn encrypt_draft(cipher: &FieldCipher, draft: SanitizedDraft) -> Result<SanitizedDraft> {
    apply(cipher, draft, Mode::Encrypt).await
}

/// Decrypt the sensitive fields of a stored draft, returning the
/// plaintext-valued shape handed to consumers.
pub async fn decrypt_draft(cipher: &FieldCipher, draft: SanitizedDraft) -> Result<SanitizedDraft> {
    apply(cipher, draft, Mode::Decrypt).await
}

#[derive(Clone, Copy)]
enum Mode {
    Encrypt,
    Decrypt,
}

/// Both directions walk [`sensitive_fields`], so the lookup is the single
/// source of truth for what gets ciphered.
async fn apply(cipher: &FieldCipher, mut draft: SanitizedDraft, mode: Mode) -> Result<SanitizedDraft> {
    for field in sensitive_fields(draft.document_type()) {
        if let Some(slot) = field_slot(&mut draft, field) {
            let value = slot.take();
            *slot = transform(cipher, value, mode).await?;
        }
    }
    Ok(draft)
}

/// The value slot a sensitive field occupies in this draft, or `None` when
/// the field belongs to an inactive variant.
fn field_slot(draft: &mut SanitizedDraft, field: SensitiveField) -> Option<&mut Option<String>> {
    match field {
        SensitiveField::FullName => Some(&mut draft.full_name),
        SensitiveField::Email => Some(&mut draft.email),
        SensitiveField::PhoneNumber => Some(&mut draft.phone_number),
        SensitiveField::Address => Some(&mut draft.address),
        SensitiveField::LicenseNumber => match draft.document.as_mut() {
            Some(DocumentFields::DriversLicense { license_number, .. }) => Some(license_number),
            _ => None,
        },
        SensitiveField::PassportNumber => match draft.document.as_mut() {
            Some(DocumentFields::Passport { passport_number }) => Some(passport_number),
            _ => None,
        },
        SensitiveField::MyNumber => match draft.document.as_mut() {
            Some(DocumentFields::MyNumber { my_number, .. }) => Some(my_number),
            _ => None,
        },
    }
}

async fn transform(
    cipher: &FieldCipher,
    value: Option<String>,
    mode: Mode,
) -> Result<Option<String>> {
    match value {
        Some(v) if !v.is_empty() => {
            let out = match mode {
                Mode::Encrypt => cipher.encrypt(&v).await?,
                Mode::Decrypt => cipher.decrypt(&v).await?,
            };
            Ok(Some(out))
        }
        other => Ok(other),
    }
}
