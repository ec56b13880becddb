use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Raised whenever a corpus, schema or log file cannot be opened, read,
/// created or written. This is the only error category of this crate,
/// it is never handled internally.
#[derive(Error, Debug)]
#[error("could not access file at {path:?}: {source}")]
pub struct FileAccessError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl FileAccessError {
    pub fn new(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Helper to attach the accessed path to an io result.
pub(crate) trait FileAccessContext<T> {
    fn file_access(self, path: impl AsRef<Path>) -> Result<T, FileAccessError>;
}

impl<T> FileAccessContext<T> for io::Result<T> {
    fn file_access(self, path: impl AsRef<Path>) -> Result<T, FileAccessError> {
        self.map_err(|e| FileAccessError::new(path, e))
    }
}
