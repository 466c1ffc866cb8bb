//! SQLite-backed draft store.
//!
//! One table, one row, keyed by the fixed draft id. The database file is
//! created lazily on the first write so a user who never types anything
//! never materializes storage; reads and existence probes on a missing
//! file short-circuit without touching the filesystem beyond a stat.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};
use tokio::sync::watch;

use crate::draft::{DocumentFields, DocumentType, ImageBlob, SanitizedDraft, StoredDraft};
use crate::error::{IntakeError, Result};
use crate::store::DraftStore;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS register_draft (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    full_name TEXT,
    email TEXT,
    phone_number TEXT,
    address TEXT,

    document_type TEXT,
    license_number TEXT,
    passport_number TEXT,
    my_number TEXT,
    expiration_date TEXT,

    front_image_name TEXT,
    front_image_type TEXT,
    front_image_data BLOB,
    back_image_name TEXT,
    back_image_type TEXT,
    back_image_data BLOB
);
"#;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Durable draft store over a single SQLite file.
pub struct SqliteDraftStore {
    path: PathBuf,
    conn: Arc<Mutex<Option<Connection>>>,
    version: watch::Sender<u64>,
}

impl SqliteDraftStore {
    /// Bind to a database path without creating anything.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            path: path.into(),
            conn: Arc::new(Mutex::new(None)),
            version,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(err: rusqlite::Error) -> IntakeError {
        IntakeError::Storage(format!("SQLite error: {}", err))
    }

    fn notify(&self) {
        self.version.send_modify(|v| *v += 1);
    }

    /// Run `f` with the open connection on the blocking pool, creating
    /// file and schema on first use. SQLite and filesystem calls never run
    /// on the async executor itself.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| IntakeError::Storage("SQLite connection poisoned".to_string()))?;

            if guard.is_none() {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                let opened = Connection::open(&path).map_err(Self::storage_error)?;
                opened.execute_batch(SCHEMA).map_err(Self::storage_error)?;
                *guard = Some(opened);
            }

            // Unwrap is safe: populated just above.
            f(guard.as_ref().unwrap())
        })
        .await
        .map_err(|e| IntakeError::Storage(format!("Storage task failed: {}", e)))?
    }

    fn row_to_draft(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
        Ok(RawRow {
            id: row.get("id")?,
            session_id: row.get("session_id")?,
            updated_at: row.get("updated_at")?,
            full_name: row.get("full_name")?,
            email: row.get("email")?,
            phone_number: row.get("phone_number")?,
            address: row.get("address")?,
            document_type: row.get("document_type")?,
            license_number: row.get("license_number")?,
            passport_number: row.get("passport_number")?,
            my_number: row.get("my_number")?,
            expiration_date: row.get("expiration_date")?,
            front_image_name: row.get("front_image_name")?,
            front_image_type: row.get("front_image_type")?,
            front_image_data: row.get("front_image_data")?,
            back_image_name: row.get("back_image_name")?,
            back_image_type: row.get("back_image_type")?,
            back_image_data: row.get("back_image_data")?,
        })
    }
}

/// Flat row as it comes out of SQLite, before reassembling the tagged union.
struct RawRow {
    id: String,
    session_id: String,
    updated_at: String,
    full_name: Option<String>,
    email: Option<String>,
    phone_number: Option<String>,
    address: Option<String>,
    document_type: Option<String>,
    license_number: Option<String>,
    passport_number: Option<String>,
    my_number: Option<String>,
    expiration_date: Option<String>,
    front_image_name: Option<String>,
    front_image_type: Option<String>,
    front_image_data: Option<Vec<u8>>,
    back_image_name: Option<String>,
    back_image_type: Option<String>,
    back_image_data: Option<Vec<u8>>,
}

impl RawRow {
    fn into_draft(self) -> Result<StoredDraft> {
        let updated_at = DateTime::parse_from_rfc3339(&self.updated_at)
            .map_err(|e| IntakeError::Storage(format!("Invalid timestamp: {}", e)))?
            .with_timezone(&Utc);

        let front_image = image_from_columns(
            self.front_image_name,
            self.front_image_type,
            self.front_image_data,
        );
        let back_image = image_from_columns(
            self.back_image_name,
            self.back_image_type,
            self.back_image_data,
        );

        let document = match self.document_type.as_deref() {
            None => None,
            Some(raw) => {
                let doc_type: DocumentType = raw
                    .parse()
                    .map_err(|e: String| IntakeError::Storage(format!("Invalid row: {}", e)))?;
                Some(match doc_type {
                    DocumentType::DriversLicense => DocumentFields::DriversLicense {
                        license_number: self.license_number,
                        back_image,
                    },
                    DocumentType::Passport => DocumentFields::Passport {
                        passport_number: self.passport_number,
                    },
                    DocumentType::MyNumber => DocumentFields::MyNumber {
                        my_number: self.my_number,
                        expiration_date: self
                            .expiration_date
                            .map(|raw| {
                                NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| {
                                    IntakeError::Storage(format!("Invalid date: {}", e))
                                })
                            })
                            .transpose()?,
                        back_image,
                    },
                })
            }
        };

        Ok(StoredDraft {
            id: self.id,
            session_id: self.session_id,
            updated_at,
            data: SanitizedDraft {
                full_name: self.full_name,
                email: self.email,
                phone_number: self.phone_number,
                address: self.address,
                front_image,
                document,
            },
        })
    }
}

fn image_from_columns(
    name: Option<String>,
    content_type: Option<String>,
    data: Option<Vec<u8>>,
) -> Option<ImageBlob> {
    data.map(|bytes| ImageBlob {
        file_name: name.unwrap_or_default(),
        content_type: content_type.unwrap_or_default(),
        bytes,
    })
}

fn image_columns(image: Option<&ImageBlob>) -> (Option<&str>, Option<&str>, Option<&[u8]>) {
    match image {
        Some(img) => (
            Some(img.file_name.as_str()),
            Some(img.content_type.as_str()),
            Some(img.bytes.as_slice()),
        ),
        None => (None, None, None),
    }
}

#[async_trait]
impl DraftStore for SqliteDraftStore {
    async fn get(&self, id: &str) -> Result<Option<StoredDraft>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let id = id.to_string();
        let raw = self
            .with_conn(move |conn| {
                conn.query_row(
                    "SELECT * FROM register_draft WHERE id = ?",
                    [id],
                    Self::row_to_draft,
                )
                .optional()
                .map_err(Self::storage_error)
            })
            .await?;

        raw.map(RawRow::into_draft).transpose()
    }

    async fn put(&self, draft: StoredDraft) -> Result<()> {
        let result = self.with_conn(move |conn| {
            let data = &draft.data;
            let (front_name, front_type, front_data) = image_columns(data.front_image.as_ref());

            let (document_type, license_number, passport_number, my_number, expiration, back) =
                match &data.document {
                    Some(DocumentFields::DriversLicense {
                        license_number,
                        back_image,
                    }) => (
                        Some(DocumentType::DriversLicense.as_str()),
                        license_number.as_deref(),
                        None,
                        None,
                        None,
                        back_image.as_ref(),
                    ),
                    Some(DocumentFields::Passport { passport_number }) => (
                        Some(DocumentType::Passport.as_str()),
                        None,
                        passport_number.as_deref(),
                        None,
                        None,
                        None,
                    ),
                    Some(DocumentFields::MyNumber {
                        my_number,
                        expiration_date,
                        back_image,
                    }) => (
                        Some(DocumentType::MyNumber.as_str()),
                        None,
                        None,
                        my_number.as_deref(),
                        expiration_date.map(|d| d.format(DATE_FORMAT).to_string()),
                        back_image.as_ref(),
                    ),
                    None => (None, None, None, None, None, None),
                };
            let (back_name, back_type, back_data) = image_columns(back);

            // Single statement: replacement of the singleton row is atomic.
            conn.execute(
                r#"
                INSERT OR REPLACE INTO register_draft (
                    id, session_id, updated_at,
                    full_name, email, phone_number, address,
                    document_type, license_number, passport_number, my_number, expiration_date,
                    front_image_name, front_image_type, front_image_data,
                    back_image_name, back_image_type, back_image_data
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                rusqlite::params![
                    draft.id,
                    draft.session_id,
                    draft.updated_at.to_rfc3339(),
                    data.full_name,
                    data.email,
                    data.phone_number,
                    data.address,
                    document_type,
                    license_number,
                    passport_number,
                    my_number,
                    expiration,
                    front_name,
                    front_type,
                    front_data,
                    back_name,
                    back_type,
                    back_data,
                ],
            )
            .map_err(Self::storage_error)?;
            Ok(())
        })
        .await;

        match result {
            Ok(()) => {
                self.notify();
                Ok(())
            }
            Err(IntakeError::Storage(msg)) => Err(IntakeError::StoreWrite(msg)),
            Err(other) => Err(other),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let id = id.to_string();
        let result = self
            .with_conn(move |conn| {
                conn.execute("DELETE FROM register_draft WHERE id = ?", [id])
                    .map_err(Self::storage_error)
            })
            .await;

        match result {
            Ok(affected) => {
                if affected > 0 {
                    self.notify();
                }
                Ok(())
            }
            Err(IntakeError::Storage(msg)) => Err(IntakeError::StoreDelete(msg)),
            Err(other) => Err(other),
        }
    }

    async fn exists(&self) -> Result<bool> {
        Ok(self.path.exists())
    }

    async fn destroy(&self) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| IntakeError::StoreDelete("SQLite connection poisoned".to_string()))?;
            // Drop the open connection before unlinking the file.
            *guard = None;

            if path.exists() {
                std::fs::remove_file(&path)
                    .map_err(|e| IntakeError::StoreDelete(e.to_string()))?;
            }
            Ok::<(), IntakeError>(())
        })
        .await
        .map_err(|e| IntakeError::StoreDelete(format!("Storage task failed: {}", e)))??;

        self.notify();
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DRAFT_ID;
    use tempfile::TempDir;

    fn draft(session_id: &str) -> StoredDraft {
        StoredDraft {
            id: DRAFT_ID.to_string(),
            session_id: session_id.to_string(),
            updated_at: Utc::now(),
            data: SanitizedDraft {
                full_name: Some("opaque-ciphertext".to_string()),
                email: Some("opaque-ciphertext-2".to_string()),
                front_image: Some(ImageBlob {
                    file_name: "front.png".to_string(),
                    content_type: "image/png".to_string(),
                    bytes: vec![7; 64],
                }),
                document: Some(DocumentFields::MyNumber {
                    my_number: Some("opaque-ciphertext-3".to_string()),
                    expiration_date: NaiveDate::from_ymd_opt(2031, 4, 1),
                    back_image: None,
                }),
                ..SanitizedDraft::default()
            },
        }
    }

    #[tokio::test]
    async fn test_lazy_creation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("intake.db");
        let store = SqliteDraftStore::new(&path);

        assert!(!store.exists().await.unwrap());
        assert_eq!(store.get(DRAFT_ID).await.unwrap(), None);
        store.delete(DRAFT_ID).await.unwrap();
        // Probes, reads and deletes never create the file.
        assert!(!path.exists());

        store.put(draft("s1")).await.unwrap();
        assert!(path.exists());
        assert!(store.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_round_trip_preserves_row() {
        let dir = TempDir::new().unwrap();
        let store = SqliteDraftStore::new(dir.path().join("intake.db"));

        let original = draft("s1");
        store.put(original.clone()).await.unwrap();

        let loaded = store.get(DRAFT_ID).await.unwrap().unwrap();
        assert_eq!(loaded.session_id, original.session_id);
        assert_eq!(loaded.data, original.data);
        assert_eq!(
            loaded.updated_at.timestamp_millis(),
            original.updated_at.timestamp_millis()
        );
    }

    #[tokio::test]
    async fn test_put_replaces_singleton_row() {
        let dir = TempDir::new().unwrap();
        let store = SqliteDraftStore::new(dir.path().join("intake.db"));

        store.put(draft("s1")).await.unwrap();
        store.put(draft("s2")).await.unwrap();

        let loaded = store.get(DRAFT_ID).await.unwrap().unwrap();
        assert_eq!(loaded.session_id, "s2");
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("intake.db");

        {
            let store = SqliteDraftStore::new(&path);
            store.put(draft("s1")).await.unwrap();
        }

        let reopened = SqliteDraftStore::new(&path);
        let loaded = reopened.get(DRAFT_ID).await.unwrap().unwrap();
        assert_eq!(loaded.session_id, "s1");
    }

    #[tokio::test]
    async fn test_destroy_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("intake.db");
        let store = SqliteDraftStore::new(&path);

        store.put(draft("s1")).await.unwrap();
        assert!(path.exists());

        store.destroy().await.unwrap();
        assert!(!path.exists());
        assert!(!store.exists().await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_writers_from_spawned_tasks() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(SqliteDraftStore::new(dir.path().join("intake.db")));

        // Store futures must be Send so they can run from spawned tasks.
        let mut handles = Vec::new();
        for i in 0..4 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.put(draft(&format!("s{i}"))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let loaded = store.get(DRAFT_ID).await.unwrap().unwrap();
        assert!(loaded.session_id.starts_with('s'));
    }

    #[tokio::test]
    async fn test_subscription_fires_on_put() {
        let dir = TempDir::new().unwrap();
        let store = SqliteDraftStore::new(dir.path().join("intake.db"));
        let mut rx = store.subscribe();
        let before = *rx.borrow_and_update();

        store.put(draft("s1")).await.unwrap();
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update() > before);
    }
}
