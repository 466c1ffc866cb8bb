//! Core data types for the registration draft.
//!
//! The draft is a schema-varying record: four common personal-info fields
//! plus a tagged union over the three identity-document variants. The union
//! is modeled as a real sum type so a persisted draft cannot structurally
//! carry fields belonging to an inactive variant.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Discriminator selecting which identity-document variant's fields apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    DriversLicense,
    Passport,
    /// National ID card ("My Number" card).
    MyNumber,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::DriversLicense => "drivers_license",
            DocumentType::Passport => "passport",
            DocumentType::MyNumber => "my_number",
        }
    }

    /// Human-readable label for confirmation views.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::DriversLicense => "Driver's license",
            DocumentType::Passport => "Passport",
            DocumentType::MyNumber => "National ID card",
        }
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "drivers_license" => Ok(DocumentType::DriversLicense),
            "passport" => Ok(DocumentType::Passport),
            "my_number" => Ok(DocumentType::MyNumber),
            other => Err(format!("unknown document type: {}", other)),
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded document image. Stored as an opaque blob; never encrypted
/// by this core.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ImageBlob {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBlob")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &format_args!("{} bytes", self.bytes.len()))
            .finish()
    }
}

/// Which image slot an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Front,
    Back,
}

/// Flat, possibly over-populated form data as it arrives from wizard steps.
///
/// This is the merge shape: step input is laid over the existing draft
/// field-by-field, so it can simultaneously hold fields from several
/// document variants. [`sanitize`](crate::draft::sanitize) projects it down
/// to the valid shape before anything is persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftData {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,

    pub document_type: Option<DocumentType>,
    pub front_image: Option<ImageBlob>,
    pub back_image: Option<ImageBlob>,

    pub license_number: Option<String>,
    pub passport_number: Option<String>,
    pub my_number: Option<String>,
    pub expiration_date: Option<NaiveDate>,
}

impl DraftData {
    /// Shallow merge: fields present in `patch` win over `base`.
    pub fn merged(base: DraftData, patch: DraftData) -> DraftData {
        DraftData {
            full_name: patch.full_name.or(base.full_name),
            email: patch.email.or(base.email),
            phone_number: patch.phone_number.or(base.phone_number),
            address: patch.address.or(base.address),
            document_type: patch.document_type.or(base.document_type),
            front_image: patch.front_image.or(base.front_image),
            back_image: patch.back_image.or(base.back_image),
            license_number: patch.license_number.or(base.license_number),
            passport_number: patch.passport_number.or(base.passport_number),
            my_number: patch.my_number.or(base.my_number),
            expiration_date: patch.expiration_date.or(base.expiration_date),
        }
    }
}

/// Fields specific to the active document variant. Each variant carries
/// exactly its own field set: a passport structurally has no back image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "document_type", rename_all = "snake_case")]
pub enum DocumentFields {
    DriversLicense {
        license_number: Option<String>,
        back_image: Option<ImageBlob>,
    },
    Passport {
        passport_number: Option<String>,
    },
    MyNumber {
        my_number: Option<String>,
        expiration_date: Option<NaiveDate>,
        back_image: Option<ImageBlob>,
    },
}

impl DocumentFields {
    pub fn document_type(&self) -> DocumentType {
        match self {
            DocumentFields::DriversLicense { .. } => DocumentType::DriversLicense,
            DocumentFields::Passport { .. } => DocumentType::Passport,
            DocumentFields::MyNumber { .. } => DocumentType::MyNumber,
        }
    }
}

/// The draft projected to its valid shape: common fields, the
/// document-agnostic front image, and at most one variant's field set.
///
/// Values are carried verbatim; absent stays absent, no defaults are
/// invented.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SanitizedDraft {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub front_image: Option<ImageBlob>,
    #[serde(flatten)]
    pub document: Option<DocumentFields>,
}

impl SanitizedDraft {
    pub fn document_type(&self) -> Option<DocumentType> {
        self.document.as_ref().map(DocumentFields::document_type)
    }

    /// Flatten back into merge shape, e.g. to lay the next step's input
    /// over an existing draft.
    pub fn into_data(self) -> DraftData {
        let mut data = DraftData {
            full_name: self.full_name,
            email: self.email,
            phone_number: self.phone_number,
            address: self.address,
            front_image: self.front_image,
            ..DraftData::default()
        };

        match self.document {
            Some(DocumentFields::DriversLicense {
                license_number,
                back_image,
            }) => {
                data.document_type = Some(DocumentType::DriversLicense);
                data.license_number = license_number;
                data.back_image = back_image;
            }
            Some(DocumentFields::Passport { passport_number }) => {
                data.document_type = Some(DocumentType::Passport);
                data.passport_number = passport_number;
            }
            Some(DocumentFields::MyNumber {
                my_number,
                expiration_date,
                back_image,
            }) => {
                data.document_type = Some(DocumentType::MyNumber);
                data.my_number = my_number;
                data.expiration_date = expiration_date;
                data.back_image = back_image;
            }
            None => {}
        }

        data
    }
}

/// The persisted draft row. Sensitive field values are ciphertext; only
/// `id`, `session_id` and `updated_at` are readable without the session key.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDraft {
    /// Fixed singleton identifier ([`DRAFT_ID`](crate::config::DRAFT_ID)).
    pub id: String,

    /// Session token that created/last wrote this record.
    pub session_id: String,

    /// Timestamp of last write, used for staleness and retention decisions.
    pub updated_at: DateTime<Utc>,

    /// Draft fields with sensitive values in encrypted form.
    pub data: SanitizedDraft,
}

/// A decrypted draft as handed to consumers. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftRecord {
    pub id: String,
    pub session_id: String,
    pub updated_at: DateTime<Utc>,
    pub data: SanitizedDraft,
}
