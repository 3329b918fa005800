//! Storage location configuration.
//!
//! # Responsibility
//! - Resolve where the local notes file lives.
//! - Provide the path-provider seam consumed by `LocalNoteStore`.
//!
//! # Invariants
//! - A resolved data directory is never empty.
//! - `CYBERNOTES_DATA_DIR` overrides the default location when set.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable overriding the notes data directory.
pub const DATA_DIR_ENV: &str = "CYBERNOTES_DATA_DIR";
/// File name of the local notes file inside the data directory.
pub const DEFAULT_DATA_FILE_NAME: &str = "cybernotes_data.json";

/// Supplies the single file path the local store reads and writes.
pub trait NotesPathProvider {
    fn notes_file_path(&self) -> PathBuf;
}

impl NotesPathProvider for PathBuf {
    fn notes_file_path(&self) -> PathBuf {
        self.clone()
    }
}

impl NotesPathProvider for Path {
    fn notes_file_path(&self) -> PathBuf {
        self.to_path_buf()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyDataDir,
    EmptyFileName,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDataDir => write!(f, "notes data directory cannot be empty"),
            Self::EmptyFileName => write!(f, "notes data file name cannot be empty"),
        }
    }
}

impl Error for ConfigError {}

/// Location of the notes file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesConfig {
    files_dir: PathBuf,
    data_file_name: String,
}

impl NotesConfig {
    /// Uses `files_dir` with the default file name.
    pub fn new(files_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let files_dir = files_dir.as_ref();
        if files_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        Ok(Self {
            files_dir: files_dir.to_path_buf(),
            data_file_name: DEFAULT_DATA_FILE_NAME.to_string(),
        })
    }

    /// Resolves from `CYBERNOTES_DATA_DIR`, falling back to the temp dir.
    pub fn from_env() -> Self {
        let files_dir = std::env::var(DATA_DIR_ENV)
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);
        Self {
            files_dir,
            data_file_name: DEFAULT_DATA_FILE_NAME.to_string(),
        }
    }

    pub fn with_file_name(self, data_file_name: impl Into<String>) -> Result<Self, ConfigError> {
        let data_file_name = data_file_name.into();
        if data_file_name.trim().is_empty() {
            return Err(ConfigError::EmptyFileName);
        }
        Ok(Self {
            data_file_name,
            ..self
        })
    }

    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    pub fn data_file_name(&self) -> &str {
        &self.data_file_name
    }
}

impl NotesPathProvider for NotesConfig {
    fn notes_file_path(&self) -> PathBuf {
        self.files_dir.join(&self.data_file_name)
    }
}
