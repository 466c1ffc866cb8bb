//! The registration wizard: basic info, identity document, confirm, submit.
//!
//! Every completed step is persisted immediately, so quitting between steps
//! (or being killed) loses at most the step being edited. Re-running the
//! wizard within the same session resumes from the saved draft.

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use dialoguer::{Confirm, Input, Select};

use intake_core::draft::{
    sanitize, validate_basic_info, validate_document, validate_image, DocumentType, DraftData,
    DraftRecord, ImageBlob,
};
use intake_core::{FormSaver, IntakeConfig, Submitter};

const DOCUMENT_TYPES: [DocumentType; 3] = [
    DocumentType::DriversLicense,
    DocumentType::Passport,
    DocumentType::MyNumber,
];

pub async fn run(data_dir: &Path, new_session: bool) -> anyhow::Result<()> {
    let (store, manager) = super::bootstrap(data_dir, new_session).await?;
    let saver = FormSaver::for_manager(&manager);

    let mut existing = manager.current_draft().await;
    if let Some(draft) = &existing {
        println!("Resuming draft last saved at {}", draft.updated_at);
    }

    // Step 1: basic info.
    let basic = prompt_basic_info(existing.as_ref())?;
    saver.save_and_advance(existing.as_ref(), basic).await?;
    existing = manager.current_draft().await;

    // Step 2: identity document.
    let document_type = prompt_document_type(existing.as_ref())?;
    if let Some(previous) = existing.as_ref().and_then(|d| d.data.document_type()) {
        if previous != document_type {
            println!("Document type changed; clearing uploaded images.");
            saver
                .change_document_type(existing.as_ref(), document_type)
                .await?;
            existing = manager.current_draft().await;
        }
    }

    let document = prompt_document(existing.as_ref(), document_type)?;
    saver.save_and_advance(existing.as_ref(), document).await?;
    existing = manager.current_draft().await;

    // Confirm and submit.
    let draft = existing.context("draft disappeared while editing")?;
    print_confirmation(&draft);

    if Confirm::new()
        .with_prompt("Submit registration now?")
        .default(false)
        .interact()?
    {
        let submitter = Submitter::new(store, IntakeConfig::default().submit_delay);
        println!("Submitting...");
        submitter.submit(&draft).await?;
        println!("Registration submitted. Local draft data has been erased.");
    } else {
        println!("Draft saved. Run `intake start` to continue later.");
    }

    Ok(())
}

fn prompt_basic_info(existing: Option<&DraftRecord>) -> anyhow::Result<DraftData> {
    println!("\n== Step 1: Basic information ==");
    let current = existing.map(|d| &d.data);

    loop {
        let input = DraftData {
            full_name: Some(prompt_text(
                "Full name",
                current.and_then(|d| d.full_name.clone()),
            )?),
            email: Some(prompt_text(
                "Email",
                current.and_then(|d| d.email.clone()),
            )?),
            phone_number: Some(prompt_text(
                "Phone number (digits only)",
                current.and_then(|d| d.phone_number.clone()),
            )?),
            address: Some(prompt_text(
                "Address",
                current.and_then(|d| d.address.clone()),
            )?),
            ..DraftData::default()
        };

        match validate_basic_info(&input) {
            Ok(()) => return Ok(input),
            Err(e) => eprintln!("{e}"),
        }
    }
}

fn prompt_document_type(existing: Option<&DraftRecord>) -> anyhow::Result<DocumentType> {
    println!("\n== Step 2: Identity document ==");

    let current = existing.and_then(|d| d.data.document_type());
    let default = current
        .and_then(|t| DOCUMENT_TYPES.iter().position(|&d| d == t))
        .unwrap_or(0);

    let labels: Vec<&str> = DOCUMENT_TYPES.iter().map(|t| t.label()).collect();
    let selected = Select::new()
        .with_prompt("Document type")
        .items(&labels)
        .default(default)
        .interact()?;

    Ok(DOCUMENT_TYPES[selected])
}

fn prompt_document(
    existing: Option<&DraftRecord>,
    document_type: DocumentType,
) -> anyhow::Result<DraftData> {
    let current = existing.map(|d| d.data.clone().into_data());
    let current = current.as_ref();

    loop {
        let mut input = DraftData {
            document_type: Some(document_type),
            ..DraftData::default()
        };

        match document_type {
            DocumentType::DriversLicense => {
                input.license_number = Some(prompt_text(
                    "License number (12 digits)",
                    current.and_then(|d| d.license_number.clone()),
                )?);
            }
            DocumentType::Passport => {
                input.passport_number = Some(prompt_text(
                    "Passport number (e.g. TK1234567)",
                    current.and_then(|d| d.passport_number.clone()),
                )?);
            }
            DocumentType::MyNumber => {
                input.my_number = Some(prompt_text(
                    "National ID number (12 digits)",
                    current.and_then(|d| d.my_number.clone()),
                )?);
                input.expiration_date = Some(prompt_date(
                    "Expiration date (YYYY-MM-DD)",
                    current.and_then(|d| d.expiration_date),
                )?);
            }
        }

        input.front_image = prompt_image("Front image", current.and_then(|d| d.front_image.clone()))?;
        if document_type != DocumentType::Passport {
            input.back_image =
                prompt_image("Back image", current.and_then(|d| d.back_image.clone()))?;
        }

        let base = current.cloned().unwrap_or_default();
        let merged = DraftData::merged(base, input.clone());
        match validate_document(&sanitize(&merged)) {
            Ok(()) => return Ok(input),
            Err(e) => eprintln!("{e}"),
        }
    }
}

fn prompt_text(prompt: &str, default: Option<String>) -> anyhow::Result<String> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(value) = default {
        input = input.default(value);
    }
    Ok(input.interact_text()?)
}

fn prompt_date(prompt: &str, default: Option<NaiveDate>) -> anyhow::Result<NaiveDate> {
    loop {
        let raw = prompt_text(prompt, default.map(|d| d.format("%Y-%m-%d").to_string()))?;
        match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(date) => return Ok(date),
            Err(_) => eprintln!("Enter a date as YYYY-MM-DD"),
        }
    }
}

/// Prompt for an image path. An empty answer keeps the already-uploaded
/// image, if any.
fn prompt_image(prompt: &str, current: Option<ImageBlob>) -> anyhow::Result<Option<ImageBlob>> {
    loop {
        let label = match &current {
            Some(image) => format!("{prompt} [{}]", image.file_name),
            None => prompt.to_string(),
        };
        let raw: String = Input::new()
            .with_prompt(format!("{label} (path)"))
            .allow_empty(true)
            .interact_text()?;

        if raw.trim().is_empty() {
            return Ok(current);
        }

        match load_image(Path::new(raw.trim())) {
            Ok(image) => return Ok(Some(image)),
            Err(e) => eprintln!("{e}"),
        }
    }
}

pub(crate) fn load_image(path: &Path) -> anyhow::Result<ImageBlob> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let content_type = content_type_for(path)
        .with_context(|| format!("unsupported image extension: {}", path.display()))?;

    let image = ImageBlob {
        file_name,
        content_type: content_type.to_string(),
        bytes,
    };
    validate_image(&image)?;
    Ok(image)
}

fn content_type_for(path: &Path) -> Option<&'static str> {
    match path
        .extension()?
        .to_string_lossy()
        .to_ascii_lowercase()
        .as_str()
    {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn print_confirmation(draft: &DraftRecord) {
    println!("\n== Confirm ==");
    let data = &draft.data;
    println!("Full name:    {}", data.full_name.as_deref().unwrap_or("-"));
    println!("Email:        {}", data.email.as_deref().unwrap_or("-"));
    println!(
        "Phone number: {}",
        data.phone_number.as_deref().unwrap_or("-")
    );
    println!("Address:      {}", data.address.as_deref().unwrap_or("-"));

    if let Some(doc_type) = data.document_type() {
        println!("Document:     {}", doc_type.label());
    }
    let flat = data.clone().into_data();
    if let Some(number) = flat
        .license_number
        .or(flat.passport_number)
        .or(flat.my_number)
    {
        println!("Number:       {}", number);
    }
    if let Some(expiry) = flat.expiration_date {
        println!("Expires:      {}", expiry);
    }
    if let Some(front) = &flat.front_image {
        println!("Front image:  {}", front.file_name);
    }
    if let Some(back) = &flat.back_image {
        println!("Back image:   {}", back.file_name);
    }
    println!();
}
