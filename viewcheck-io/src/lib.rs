use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use viewcheck_core::document::Document;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse document snapshot {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Document, IoError>;
}

pub trait DocumentSaver {
    fn save(&self, document: &Document, path: &Path) -> Result<(), IoError>;
}

/// Reads and writes the JSON snapshot a host exports of its document tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFacade;

impl JsonFacade {
    pub fn new() -> Self {
        Self
    }

    /// Parses a snapshot held in memory. View references are checked only by
    /// [`DocumentLoader::load`].
    pub fn parse_snapshot(&self, data: &str) -> Result<Document, serde_json::Error> {
        serde_json::from_str(data)
    }

    pub fn render_snapshot(&self, document: &Document) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(document)
    }
}

fn validate(document: &Document) -> Result<(), IoError> {
    if let Some(id) = document.duplicate_view_id() {
        return Err(IoError::InvalidDocument(format!(
            "view id {} is used more than once",
            id.get()
        )));
    }
    if let Some((view, parent)) = document.dangling_parent() {
        return Err(IoError::InvalidDocument(format!(
            "view {} references missing parent view {}",
            view.get(),
            parent.get()
        )));
    }
    Ok(())
}

impl DocumentLoader for JsonFacade {
    fn load(&self, path: &Path) -> Result<Document, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let document = self.parse_snapshot(&data).map_err(|source| IoError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        validate(&document)?;
        debug!(
            path = %path.display(),
            kind = document.kind().as_str(),
            views = document.view_count(),
            bodies = document.bodies().len(),
            "document snapshot loaded"
        );
        Ok(document)
    }
}

impl DocumentSaver for JsonFacade {
    fn save(&self, document: &Document, path: &Path) -> Result<(), IoError> {
        let mut data = self
            .render_snapshot(document)
            .map_err(|err| IoError::InvalidDocument(err.to_string()))?;
        data.push('\n');
        fs::write(path, data).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "document snapshot saved");
        Ok(())
    }
}

/// Appends report text to a log file, creating the directory and the file
/// on first use.
#[derive(Debug, Clone)]
pub struct ReportLog {
    dir: PathBuf,
    file_name: String,
}

impl ReportLog {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    pub fn append(&self, text: &str) -> Result<(), IoError> {
        let path = self.path();
        fs::create_dir_all(&self.dir).map_err(|source| IoError::WriteError {
            path: self.dir.clone(),
            source,
        })?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| IoError::WriteError {
                path: path.clone(),
                source,
            })?;

        let mut entry = text.to_string();
        if !entry.ends_with('\n') {
            entry.push('\n');
        }
        file.write_all(entry.as_bytes())
            .map_err(|source| IoError::WriteError { path, source })
    }
}
