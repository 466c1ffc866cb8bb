//! End-to-end draft flow over the durable SQLite backend: step saves,
//! encryption at rest, session reconciliation, retention, and submission
//! teardown.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tempfile::TempDir;

use intake_core::draft::{DocumentFields, DocumentType, DraftData, ImageBlob, ImageSlot};
use intake_core::session::{get_or_create_session_id, MemorySessionStorage, SessionStorage};
use intake_core::store::SqliteDraftStore;
use intake_core::{
    sweep, DraftManager, DraftStore, FormSaver, SaveOutcome, Submitter, SweepOutcome, DRAFT_ID,
    SESSION_KEY,
};

fn store_in(dir: &TempDir) -> Arc<SqliteDraftStore> {
    Arc::new(SqliteDraftStore::new(dir.path().join("register.db")))
}

fn jpeg(name: &str) -> ImageBlob {
    ImageBlob {
        file_name: name.to_string(),
        content_type: "image/jpeg".to_string(),
        bytes: vec![0xD8; 64],
    }
}

fn basic_info() -> DraftData {
    DraftData {
        full_name: Some("Yamada Taro".to_string()),
        email: Some("taro@example.com".to_string()),
        phone_number: Some("09012345678".to_string()),
        address: Some("1-2-3 Chiyoda, Tokyo".to_string()),
        ..DraftData::default()
    }
}

#[tokio::test]
async fn test_two_step_flow_round_trips_through_disk() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let session = MemorySessionStorage::new();

    let manager = DraftManager::bootstrap(store.clone(), &session)
        .await
        .unwrap();
    let saver = FormSaver::for_manager(&manager);

    // Step 1: basic info.
    let outcome = saver.save_and_advance(None, basic_info()).await.unwrap();
    assert_eq!(outcome, SaveOutcome::Advanced);

    // Step 2: passport details.
    let existing = manager.current_draft().await.unwrap();
    let step2 = DraftData {
        document_type: Some(DocumentType::Passport),
        passport_number: Some("TK1234567".to_string()),
        front_image: Some(jpeg("passport.jpg")),
        ..DraftData::default()
    };
    saver
        .save_and_advance(Some(&existing), step2)
        .await
        .unwrap();

    // Reopen from disk under the same session: everything survives.
    let reopened = Arc::new(SqliteDraftStore::new(store.path()));
    let manager2 = DraftManager::bootstrap(reopened, &session).await.unwrap();
    let draft = manager2.current_draft().await.unwrap();

    assert_eq!(draft.data.full_name.as_deref(), Some("Yamada Taro"));
    assert_eq!(draft.data.email.as_deref(), Some("taro@example.com"));
    assert!(draft.data.front_image.is_some());
    match draft.data.document {
        Some(DocumentFields::Passport { passport_number }) => {
            assert_eq!(passport_number.as_deref(), Some("TK1234567"));
        }
        other => panic!("unexpected document fields: {:?}", other),
    }
}

#[tokio::test]
async fn test_sensitive_fields_are_ciphertext_at_rest() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let session = MemorySessionStorage::new();

    let manager = DraftManager::bootstrap(store.clone(), &session)
        .await
        .unwrap();
    let saver = FormSaver::for_manager(&manager);
    saver.save_and_advance(None, basic_info()).await.unwrap();

    let stored = store.get(DRAFT_ID).await.unwrap().unwrap();
    for (plain, at_rest) in [
        ("Yamada Taro", &stored.data.full_name),
        ("taro@example.com", &stored.data.email),
        ("09012345678", &stored.data.phone_number),
        ("1-2-3 Chiyoda, Tokyo", &stored.data.address),
    ] {
        let value = at_rest.as_deref().unwrap();
        assert_ne!(value, plain);
        assert!(!value.contains(plain));
    }
}

#[tokio::test]
async fn test_document_type_switch_drops_old_variant_and_images() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let session = MemorySessionStorage::new();

    let manager = DraftManager::bootstrap(store, &session).await.unwrap();
    let saver = FormSaver::for_manager(&manager);

    let license = DraftData {
        document_type: Some(DocumentType::DriversLicense),
        license_number: Some("123456789012".to_string()),
        front_image: Some(jpeg("front.jpg")),
        back_image: Some(jpeg("back.jpg")),
        ..DraftData::default()
    };
    saver.save_and_advance(None, license).await.unwrap();

    let existing = manager.current_draft().await.unwrap();
    saver
        .change_document_type(Some(&existing), DocumentType::Passport)
        .await
        .unwrap();

    let draft = manager.current_draft().await.unwrap();
    assert_eq!(draft.data.front_image, None);
    let flat = draft.data.into_data();
    assert_eq!(flat.document_type, Some(DocumentType::Passport));
    assert_eq!(flat.license_number, None);
    assert_eq!(flat.back_image, None);
}

#[tokio::test]
async fn test_image_removal_survives_reload() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let session = MemorySessionStorage::new();

    let manager = DraftManager::bootstrap(store.clone(), &session)
        .await
        .unwrap();
    let saver = FormSaver::for_manager(&manager);

    let step = DraftData {
        document_type: Some(DocumentType::MyNumber),
        my_number: Some("210987654321".to_string()),
        front_image: Some(jpeg("front.jpg")),
        back_image: Some(jpeg("back.jpg")),
        ..DraftData::default()
    };
    saver.save_and_advance(None, step).await.unwrap();

    let existing = manager.current_draft().await.unwrap();
    saver
        .remove_image(Some(&existing), ImageSlot::Front)
        .await
        .unwrap();

    let reopened = Arc::new(SqliteDraftStore::new(store.path()));
    let manager2 = DraftManager::bootstrap(reopened, &session).await.unwrap();
    let draft = manager2.current_draft().await.unwrap();

    assert_eq!(draft.data.front_image, None);
    match draft.data.document {
        Some(DocumentFields::MyNumber { back_image, .. }) => {
            assert!(back_image.is_some());
        }
        other => panic!("unexpected document fields: {:?}", other),
    }
}

#[tokio::test]
async fn test_foreign_session_draft_is_discarded_on_reload() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    // First visitor writes a draft.
    let first_session = MemorySessionStorage::new();
    let manager = DraftManager::bootstrap(store.clone(), &first_session)
        .await
        .unwrap();
    let saver = FormSaver::for_manager(&manager);
    saver.save_and_advance(None, basic_info()).await.unwrap();

    // Second visitor on the same machine gets a fresh session token.
    let second_session = MemorySessionStorage::new();
    let manager2 = DraftManager::bootstrap(store.clone(), &second_session)
        .await
        .unwrap();

    assert_ne!(
        first_session.get_item(SESSION_KEY).unwrap(),
        second_session.get_item(SESSION_KEY).unwrap()
    );
    assert_eq!(manager2.current_draft().await, None);
    assert_eq!(store.get(DRAFT_ID).await.unwrap(), None);
}

#[tokio::test]
async fn test_retention_sweep_deletes_only_stale_drafts() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let session = MemorySessionStorage::new();

    let manager = DraftManager::bootstrap(store.clone(), &session)
        .await
        .unwrap();
    let saver = FormSaver::for_manager(&manager);
    saver.save_and_advance(None, basic_info()).await.unwrap();

    // Fresh draft survives the sweep.
    let outcome = sweep(store.clone(), Duration::from_secs(24 * 60 * 60))
        .await
        .unwrap();
    assert_eq!(outcome, SweepOutcome::Retained);
    assert!(store.get(DRAFT_ID).await.unwrap().is_some());

    // Backdate it beyond the window, then sweep again.
    let mut stale = store.get(DRAFT_ID).await.unwrap().unwrap();
    stale.updated_at = Utc::now() - chrono::Duration::hours(25);
    store.put(stale).await.unwrap();

    let outcome = sweep(store.clone(), Duration::from_secs(24 * 60 * 60))
        .await
        .unwrap();
    assert_eq!(outcome, SweepOutcome::Deleted);
    assert_eq!(store.get(DRAFT_ID).await.unwrap(), None);
}

#[tokio::test]
async fn test_submission_tears_down_the_database_file() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let session = MemorySessionStorage::new();

    let manager = DraftManager::bootstrap(store.clone(), &session)
        .await
        .unwrap();
    let saver = FormSaver::for_manager(&manager);

    saver.save_and_advance(None, basic_info()).await.unwrap();
    let existing = manager.current_draft().await.unwrap();
    let final_step = DraftData {
        document_type: Some(DocumentType::Passport),
        passport_number: Some("TK1234567".to_string()),
        front_image: Some(jpeg("passport.jpg")),
        ..DraftData::default()
    };
    saver
        .save_and_advance(Some(&existing), final_step)
        .await
        .unwrap();

    let draft = manager.current_draft().await.unwrap();
    let submitter = Submitter::new(store.clone(), Duration::from_millis(1));
    submitter.submit(&draft).await.unwrap();

    assert!(!store.path().exists());
    assert!(!store.exists().await.unwrap());
    assert_eq!(manager.current_draft().await, None);
}

#[tokio::test]
async fn test_session_token_is_stable_within_a_session() {
    let session = MemorySessionStorage::new();
    let first = get_or_create_session_id(&session).unwrap();
    let second = get_or_create_session_id(&session).unwrap();
    assert_eq!(first, second);
}
