use fieldmeta_core::{CreateMetaQuery, MetaSource};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum FileSourceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Metadata read from a saved JSON response.
///
/// Whatever is asked for, the file content is returned; it is up to the
/// caller to point at a document of the right shape.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    fn read(&self) -> Result<Value, FileSourceError> {
        debug!(path = %self.path.display(), "reading metadata document");
        let content = std::fs::read_to_string(&self.path).map_err(|source| FileSourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| FileSourceError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

impl MetaSource for FileSource {
    type Error = FileSourceError;

    fn create_meta(&self, _query: &CreateMetaQuery) -> Result<Value, FileSourceError> {
        self.read()
    }

    fn edit_meta(&self, _issue_key: &str) -> Result<Value, FileSourceError> {
        self.read()
    }

    fn create_meta_issue_types(&self, _project_key: &str) -> Result<Value, FileSourceError> {
        self.read()
    }

    fn create_meta_fields(
        &self,
        _project_key: &str,
        _issue_type_id: &str,
    ) -> Result<Value, FileSourceError> {
        self.read()
    }
}
