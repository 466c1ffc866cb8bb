//! Show the current draft.

use std::path::Path;

use serde_json::json;

pub async fn run(data_dir: &Path, new_session: bool, json: bool) -> anyhow::Result<()> {
    let (_, manager) = super::bootstrap(data_dir, new_session).await?;

    let Some(draft) = manager.current_draft().await else {
        if json {
            println!("{}", json!({ "draft": null }));
        } else {
            println!("No draft in progress.");
        }
        return Ok(());
    };

    let data = &draft.data;
    let flat = data.clone().into_data();

    if json {
        // Image payloads are summarized by name; the bytes stay local.
        let output = json!({
            "draft": {
                "updated_at": draft.updated_at,
                "full_name": data.full_name,
                "email": data.email,
                "phone_number": data.phone_number,
                "address": data.address,
                "document_type": data.document_type().map(|t| t.as_str()),
                "license_number": flat.license_number,
                "passport_number": flat.passport_number,
                "my_number": flat.my_number,
                "expiration_date": flat.expiration_date,
                "front_image": flat.front_image.as_ref().map(|i| &i.file_name),
                "back_image": flat.back_image.as_ref().map(|i| &i.file_name),
            }
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Draft last saved at {}", draft.updated_at);
    println!("Full name:    {}", data.full_name.as_deref().unwrap_or("-"));
    println!("Email:        {}", data.email.as_deref().unwrap_or("-"));
    println!(
        "Phone number: {}",
        data.phone_number.as_deref().unwrap_or("-")
    );
    println!("Address:      {}", data.address.as_deref().unwrap_or("-"));
    match data.document_type() {
        Some(doc_type) => println!("Document:     {}", doc_type.label()),
        None => println!("Document:     (not selected)"),
    }
    if let Some(front) = &flat.front_image {
        println!("Front image:  {}", front.file_name);
    }
    if let Some(back) = &flat.back_image {
        println!("Back image:   {}", back.file_name);
    }

    Ok(())
}
