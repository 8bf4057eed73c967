use crate::domain::entities::record::Record;
use crate::domain::error::DomainError;
use crate::domain::ports::record_repository::RecordRepository;
use crate::domain::values::config::StoreConfig;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

const RECORD_EXT: &str = "json";
const TMP_SUFFIX: &str = ".tmp";

/// One pretty-printed JSON file per record under the collection directory.
///
/// Writes land in `<id>.json.tmp` and are renamed over `<id>.json`, so a
/// reader sees either the previous file or the complete new one.
pub struct JsonFileRepository {
    dir: PathBuf,
}

impl JsonFileRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn for_config(config: &StoreConfig) -> Self {
        Self::new(config.collection_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{RECORD_EXT}"))
    }

    async fn read_record(path: &Path) -> Result<Record, DomainError> {
        let bytes = fs::read(path)
            .await
            .map_err(|e| DomainError::Storage(format!("Failed to read {}: {e}", path.display())))?;
        let record: Record = serde_json::from_slice(&bytes)
            .map_err(|e| DomainError::Storage(format!("Malformed record file {}: {e}", path.display())))?;

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        if stem != record.id {
            return Err(DomainError::Storage(format!(
                "Record file {} holds id '{}'",
                path.display(),
                record.id
            )));
        }
        Ok(record)
    }
}

fn is_record_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXT)
}

#[async_trait::async_trait]
impl RecordRepository for JsonFileRepository {
    async fn put(&self, record: &Record) -> Result<(), DomainError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DomainError::Storage(format!("Failed to create {}: {e}", self.dir.display())))?;

        let json = serde_json::to_vec_pretty(record)
            .map_err(|e| DomainError::Storage(format!("Failed to encode record {}: {e}", record.id)))?;
        let path = self.record_path(&record.id);
        let mut tmp = path.clone().into_os_string();
        tmp.push(TMP_SUFFIX);
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, &json)
            .await
            .map_err(|e| DomainError::Storage(format!("Failed to write {}: {e}", tmp.display())))?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            if let Err(cleanup) = fs::remove_file(&tmp).await {
                warn!(path = %tmp.display(), error = %cleanup, "could not remove uncommitted record file");
            }
            return Err(DomainError::Storage(format!("Failed to commit {}: {e}", path.display())));
        }
        debug!(id = %record.id, path = %path.display(), "record written");
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Record>, DomainError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(DomainError::Storage(format!("Failed to list {}: {e}", self.dir.display())))
            }
        };

        let mut records = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::Storage(format!("Failed to list {}: {e}", self.dir.display())))?
        {
            let path = entry.path();
            if !is_record_file(&path) {
                if path.to_string_lossy().ends_with(TMP_SUFFIX) {
                    warn!(path = %path.display(), "ignoring uncommitted record file");
                }
                continue;
            }
            records.push(Self::read_record(&path).await?);
        }
        Ok(records)
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let path = self.record_path(id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DomainError::Storage(format!("Failed to delete {}: {e}", path.display()))),
        }
    }

    async fn delete_all(&self) -> Result<(), DomainError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(DomainError::Storage(format!("Failed to list {}: {e}", self.dir.display())))
            }
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::Storage(format!("Failed to list {}: {e}", self.dir.display())))?
        {
            let path = entry.path();
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            match fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(DomainError::Storage(format!("Failed to delete {}: {e}", path.display())))
                }
            }
        }
        Ok(())
    }
}
