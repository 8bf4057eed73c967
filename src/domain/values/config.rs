use crate::domain::error::DomainError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_THRESHOLD: f64 = 0.0;
pub const DEFAULT_NUM_RESULTS: usize = 10;

/// Raw, unvalidated store options as they arrive from a config file, the
/// environment or the command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreOptions {
    pub name: Option<String>,
    pub dimension: Option<i64>,
    #[serde(alias = "storage_root")]
    pub directory: Option<PathBuf>,
    pub threshold: Option<f64>,
    pub num_results: Option<usize>,
}

impl StoreOptions {
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        serde_json::from_str(json).map_err(|e| DomainError::Parse(format!("Invalid store options: {e}")))
    }

    /// Reads `EMBEDSTORE_*` variables. Unset variables stay `None`.
    pub fn from_env() -> Result<Self, DomainError> {
        Ok(Self {
            name: std::env::var("EMBEDSTORE_NAME").ok(),
            dimension: env_parsed("EMBEDSTORE_DIMENSION")?,
            directory: std::env::var_os("EMBEDSTORE_DIR").map(PathBuf::from),
            threshold: env_parsed("EMBEDSTORE_THRESHOLD")?,
            num_results: env_parsed("EMBEDSTORE_NUM_RESULTS")?,
        })
    }

    /// Layers `other` on top of `self`; values set in `other` win.
    pub fn merge(self, other: StoreOptions) -> Self {
        Self {
            name: other.name.or(self.name),
            dimension: other.dimension.or(self.dimension),
            directory: other.directory.or(self.directory),
            threshold: other.threshold.or(self.threshold),
            num_results: other.num_results.or(self.num_results),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>, DomainError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| DomainError::InvalidConfiguration(format!("{key} has invalid value '{raw}'"))),
        Err(_) => Ok(None),
    }
}

/// Validated, immutable description of one store instance.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    name: String,
    dimension: usize,
    storage_root: PathBuf,
    threshold: f64,
    num_results: usize,
}

impl StoreConfig {
    pub fn new(name: impl Into<String>, dimension: usize) -> Result<Self, DomainError> {
        Self::from_options(StoreOptions {
            name: Some(name.into()),
            dimension: Some(dimension as i64),
            ..StoreOptions::default()
        })
    }

    pub fn from_options(options: StoreOptions) -> Result<Self, DomainError> {
        let name = options
            .name
            .ok_or_else(|| DomainError::InvalidConfiguration("name is required".into()))?;
        validate_name(&name)?;

        let dimension = match options.dimension {
            Some(d) if d > 0 => d as usize,
            Some(d) => {
                return Err(DomainError::InvalidConfiguration(format!(
                    "dimension must be positive, got {d}"
                )))
            }
            None => return Err(DomainError::InvalidConfiguration("dimension is required".into())),
        };

        let threshold = options.threshold.unwrap_or(DEFAULT_THRESHOLD);
        if !threshold.is_finite() || !(-1.0..=1.0).contains(&threshold) {
            return Err(DomainError::InvalidConfiguration(format!(
                "threshold must be within [-1, 1], got {threshold}"
            )));
        }

        let num_results = options.num_results.unwrap_or(DEFAULT_NUM_RESULTS);
        if num_results == 0 {
            return Err(DomainError::InvalidConfiguration("num_results must be at least 1".into()));
        }

        Ok(Self {
            name,
            dimension,
            storage_root: options.directory.unwrap_or_else(default_storage_root),
            threshold,
            num_results,
        })
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.storage_root = directory.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn num_results(&self) -> usize {
        self.num_results
    }

    /// Directory holding this collection's records: `<storage_root>/<name>`.
    pub fn collection_dir(&self) -> PathBuf {
        self.storage_root.join(&self.name)
    }
}

pub fn default_storage_root() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("embedstore"))
        .unwrap_or_else(|| PathBuf::from(".embedstore"))
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidConfiguration("name must not be empty".into()));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(DomainError::InvalidConfiguration(format!(
            "name '{name}' must be a single path component"
        )));
    }
    Ok(())
}
