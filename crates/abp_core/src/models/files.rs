//! User-supplied file references.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{ModelError, ModelResult};

/// Where the bytes of a file reference live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Read lazily from disk when the file is staged.
    Path(PathBuf),
    /// Already in memory (dropped or generated content).
    Bytes(Arc<[u8]>),
}

/// Opaque handle to a user-supplied audio file plus its display name.
///
/// Cheap to clone; the wizard owns these and everything downstream only
/// reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    name: String,
    source: FileSource,
}

impl FileRef {
    /// Reference a file on disk. The display name is the file name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self {
            name,
            source: FileSource::Path(path),
        }
    }

    /// Wrap in-memory bytes under a display name.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            source: FileSource::Bytes(bytes.into()),
        }
    }

    /// Display name shown to the user.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying byte source.
    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// Lowercased extension of the display name, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .filter(|e| !e.is_empty())
    }

    /// Load the file contents.
    pub fn read_bytes(&self) -> ModelResult<Vec<u8>> {
        match &self.source {
            FileSource::Path(path) => fs::read(path).map_err(|source| ModelError::ReadFile {
                path: path.clone(),
                source,
            }),
            FileSource::Bytes(bytes) => Ok(bytes.to_vec()),
        }
    }
}
