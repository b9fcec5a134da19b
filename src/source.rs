use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),
}

/// Independent, positioned reader over a source.
pub trait SourceReader: Read + Seek + Send {}

impl<T: Read + Seek + Send> SourceReader for T {}

/// Seekable, fixed-size text source.
///
/// Every call to [`TextSource::open`] must return a reader with its own
/// position, so concurrent workers never share file-position state.
pub trait TextSource: Send + Sync {
    fn len(&self) -> Result<u64, SourceError>;
    fn open(&self) -> Result<Box<dyn SourceReader>, SourceError>;
    fn describe(&self) -> String;
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Checks that `path` names a readable regular file.
    pub fn new(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        if !file.metadata()?.is_file() {
            return Err(SourceError::NotAFile(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl TextSource for FileSource {
    fn len(&self) -> Result<u64, SourceError> {
        Ok(std::fs::metadata(&self.path)?.len())
    }

    fn open(&self) -> Result<Box<dyn SourceReader>, SourceError> {
        Ok(Box::new(File::open(&self.path)?))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory source, mostly for tests and embedding.
#[derive(Clone)]
pub struct MemorySource {
    bytes: Arc<[u8]>,
}

impl MemorySource {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl TextSource for MemorySource {
    fn len(&self) -> Result<u64, SourceError> {
        Ok(self.bytes.len() as u64)
    }

    fn open(&self) -> Result<Box<dyn SourceReader>, SourceError> {
        Ok(Box::new(Cursor::new(Arc::clone(&self.bytes))))
    }

    fn describe(&self) -> String {
        format!("<memory:{} bytes>", self.bytes.len())
    }
}
