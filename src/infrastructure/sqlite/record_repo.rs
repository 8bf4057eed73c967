use crate::domain::entities::record::Record;
use crate::domain::error::DomainError;
use crate::domain::ports::record_repository::RecordRepository;
use crate::domain::values::config::StoreConfig;
use crate::infrastructure::sqlite::migrations::run_migrations;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub const DB_FILE: &str = "records.sqlite3";

/// Stores a collection in a single SQLite database, vectors as little-endian
/// `f32` blobs.
pub struct SqliteRecordRepository {
    conn: Mutex<Connection>,
}

impl SqliteRecordRepository {
    pub fn new(conn: Connection) -> Result<Self, DomainError> {
        run_migrations(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open(path: &Path) -> Result<Self, DomainError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DomainError::Storage(format!("Failed to create {}: {e}", parent.display())))?;
        }
        let conn = Connection::open(path).map_err(|e| DomainError::Storage(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Storage(format!("WAL error: {e}")))?;
        Self::new(conn)
    }

    /// `<storage_root>/<name>/records.sqlite3`
    pub fn for_config(config: &StoreConfig) -> Result<Self, DomainError> {
        Self::open(&config.collection_dir().join(DB_FILE))
    }

    pub fn in_memory() -> Result<Self, DomainError> {
        let conn = Connection::open_in_memory().map_err(|e| DomainError::Storage(format!("DB error: {e}")))?;
        Self::new(conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DomainError> {
        self.conn.lock().map_err(|e| DomainError::Storage(e.to_string()))
    }

    fn serialize_vector(v: &[f32]) -> Vec<u8> {
        v.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_vector(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn format_time(t: &DateTime<Utc>) -> String {
        t.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    fn parse_time(raw: &str) -> Result<DateTime<Utc>, DomainError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DomainError::Storage(format!("Invalid timestamp '{raw}': {e}")))
    }

    fn load_rows(conn: &Connection) -> Result<Vec<Record>, DomainError> {
        let mut stmt = conn
            .prepare("SELECT id, text, vector, created_at, updated_at FROM records")
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            let (id, text, blob, created, updated) = row.map_err(|e| DomainError::Storage(e.to_string()))?;
            records.push(Record {
                id,
                text,
                vector: Self::deserialize_vector(&blob),
                created_at: Self::parse_time(&created)?,
                updated_at: Self::parse_time(&updated)?,
            });
        }
        Ok(records)
    }
}

#[async_trait::async_trait]
impl RecordRepository for SqliteRecordRepository {
    async fn put(&self, record: &Record) -> Result<(), DomainError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO records (id, text, vector, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.text,
                Self::serialize_vector(&record.vector),
                Self::format_time(&record.created_at),
                Self::format_time(&record.updated_at),
            ],
        )
        .map_err(|e| DomainError::Storage(format!("Failed to store record {}: {e}", record.id)))?;
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Record>, DomainError> {
        let conn = self.lock()?;
        Self::load_rows(&conn)
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let conn = self.lock()?;
        let removed = conn
            .execute("DELETE FROM records WHERE id = ?1", params![id])
            .map_err(|e| DomainError::Storage(format!("Failed to delete record {id}: {e}")))?;
        Ok(removed > 0)
    }

    async fn delete_all(&self) -> Result<(), DomainError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM records", [])
            .map_err(|e| DomainError::Storage(format!("Failed to clear records: {e}")))?;
        Ok(())
    }
}
