//! Form validation.
//!
//! Pass/fail contract over step input. The rules mirror the registration
//! form: numeric document numbers of fixed length, a future expiration
//! date, and bounded image uploads.

use chrono::{NaiveDate, Utc};

use crate::draft::types::{DocumentFields, DraftData, ImageBlob, SanitizedDraft};
use crate::error::{IntakeError, Result};

const MAX_NAME_LEN: usize = 100;
const MAX_ADDRESS_LEN: usize = 200;
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const ACCEPTED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Validate the step-1 personal-info fields.
pub fn validate_basic_info(data: &DraftData) -> Result<()> {
    let full_name = required(&data.full_name, "full name")?;
    if full_name.chars().count() > MAX_NAME_LEN {
        return Err(IntakeError::Validation(format!(
            "Full name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }

    let email = required(&data.email, "email")?;
    validate_email(email)?;

    let phone = required(&data.phone_number, "phone number")?;
    if !is_digits(phone) || !(10..=11).contains(&phone.len()) {
        return Err(IntakeError::Validation(
            "Phone number must be 10 or 11 digits".to_string(),
        ));
    }

    let address = required(&data.address, "address")?;
    if address.chars().count() > MAX_ADDRESS_LEN {
        return Err(IntakeError::Validation(format!(
            "Address must be at most {} characters",
            MAX_ADDRESS_LEN
        )));
    }

    Ok(())
}

/// Validate the step-2 document fields of a sanitized draft, including
/// the images required by the active variant.
pub fn validate_document(draft: &SanitizedDraft) -> Result<()> {
    let document = draft.document.as_ref().ok_or_else(|| {
        IntakeError::Validation("A document type must be selected".to_string())
    })?;

    let front = draft
        .front_image
        .as_ref()
        .ok_or_else(|| IntakeError::Validation("A front image is required".to_string()))?;
    validate_image(front)?;

    match document {
        DocumentFields::DriversLicense {
            license_number,
            back_image,
        } => {
            let number = required(license_number, "license number")?;
            if !is_digits(number) || number.len() != 12 {
                return Err(IntakeError::Validation(
                    "License number must be 12 digits".to_string(),
                ));
            }
            let back = back_image.as_ref().ok_or_else(|| {
                IntakeError::Validation("A back image is required".to_string())
            })?;
            validate_image(back)?;
        }
        DocumentFields::Passport { passport_number } => {
            let number = required(passport_number, "passport number")?;
            validate_passport_number(number)?;
        }
        DocumentFields::MyNumber {
            my_number,
            expiration_date,
            back_image,
        } => {
            let number = required(my_number, "national ID number")?;
            if !is_digits(number) || number.len() != 12 {
                return Err(IntakeError::Validation(
                    "National ID number must be 12 digits".to_string(),
                ));
            }
            let expiry = expiration_date.ok_or_else(|| {
                IntakeError::Validation("An expiration date is required".to_string())
            })?;
            validate_expiration(expiry)?;
            let back = back_image.as_ref().ok_or_else(|| {
                IntakeError::Validation("A back image is required".to_string())
            })?;
            validate_image(back)?;
        }
    }

    Ok(())
}

/// Validate an uploaded image: bounded size, accepted content type.
pub fn validate_image(image: &ImageBlob) -> Result<()> {
    if image.bytes.is_empty() {
        return Err(IntakeError::Validation("Image is empty".to_string()));
    }
    if image.bytes.len() > MAX_IMAGE_BYTES {
        return Err(IntakeError::Validation(
            "Image must be at most 5 MiB".to_string(),
        ));
    }
    if !ACCEPTED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
        return Err(IntakeError::Validation(
            "Only JPEG, PNG and WebP images are accepted".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    let invalid = || IntakeError::Validation("Email address is not valid".to_string());
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(invalid());
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(())
}

fn validate_passport_number(number: &str) -> Result<()> {
    // Two uppercase letters followed by seven digits, e.g. TK1234567.
    let valid = number.len() == 9
        && number.chars().take(2).all(|c| c.is_ascii_uppercase())
        && number.chars().skip(2).all(|c| c.is_ascii_digit());
    if !valid {
        return Err(IntakeError::Validation(
            "Passport number must be 2 uppercase letters followed by 7 digits".to_string(),
        ));
    }
    Ok(())
}

fn validate_expiration(expiry: NaiveDate) -> Result<()> {
    if expiry <= Utc::now().date_naive() {
        return Err(IntakeError::Validation(
            "The document has expired".to_string(),
        ));
    }
    Ok(())
}

fn required<'a>(value: &'a Option<String>, label: &str) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(IntakeError::Validation(format!(
            "A {} is required",
            label
        ))),
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
