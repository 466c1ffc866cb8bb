//! Field-set sanitizer.
//!
//! Projects merged, possibly over-populated form data down to exactly the
//! fields valid for the active document type. This is an allow-list: fields
//! foreign to the active variant are structurally absent from the result,
//! not merely blanked, which keeps the data-model invariant true at the
//! storage boundary.

use crate::draft::types::{DocumentFields, DocumentType, DraftData, SanitizedDraft};

/// Project `data` to the shape valid for its discriminator.
///
/// Always carries the four common fields, the discriminator and the front
/// image verbatim (absent stays absent; no defaults are invented). Variant
/// fields are added only for the active discriminator; with no
/// discriminator, only the common projection is returned.
pub fn sanitize(data: &DraftData) -> SanitizedDraft {
    let common = SanitizedDraft {
        full_name: data.full_name.clone(),
        email: data.email.clone(),
        phone_number: data.phone_number.clone(),
        address: data.address.clone(),
        front_image: data.front_image.clone(),
        document: None,
    };

    let document = match data.document_type {
        Some(DocumentType::DriversLicense) => Some(DocumentFields::DriversLicense {
            license_number: data.license_number.clone(),
            back_image: data.back_image.clone(),
        }),
        // A passport has no back side; any stray back image is dropped here.
        Some(DocumentType::Passport) => Some(DocumentFields::Passport {
            passport_number: data.passport_number.clone(),
        }),
        Some(DocumentType::MyNumber) => Some(DocumentFields::MyNumber {
            my_number: data.my_number.clone(),
            expiration_date: data.expiration_date,
            back_image: data.back_image.clone(),
        }),
        None => None,
    };

    SanitizedDraft { document, ..common }
}
