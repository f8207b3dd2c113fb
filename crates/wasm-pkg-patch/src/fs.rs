//! Filesystem access for the patcher
//!
//! All reads and writes go through [`PackageFs`] so the transforms can run
//! against a real package directory ([`DiskFs`]) or an in-memory one
//! ([`MemoryFs`]) in tests.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while touching package files
#[derive(Debug, Error)]
pub enum FsError {
    /// File could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid UTF-8 text
    #[error("File is not valid UTF-8: {path}")]
    NotUtf8 { path: PathBuf },
}

impl FsError {
    /// Path of the file the failed operation touched
    pub fn path(&self) -> &Path {
        match self {
            FsError::Read { path, .. } | FsError::Write { path, .. } | FsError::NotUtf8 { path } => {
                path
            }
        }
    }

    /// True when the underlying cause is a missing file
    pub fn is_not_found(&self) -> bool {
        match self {
            FsError::Read { source, .. } | FsError::Write { source, .. } => {
                source.kind() == std::io::ErrorKind::NotFound
            }
            FsError::NotUtf8 { .. } => false,
        }
    }
}

/// File capability used by the patch pipeline
pub trait PackageFs {
    /// Read a UTF-8 text file
    fn read_text(&self, path: &Path) -> Result<String, FsError>;

    /// Read a file as raw bytes
    fn read_binary(&self, path: &Path) -> Result<Vec<u8>, FsError>;

    /// Replace a text file's contents
    ///
    /// Implementations must either fully replace the file or leave it
    /// untouched.
    fn write_text(&mut self, path: &Path, contents: &str) -> Result<(), FsError>;
}

/// Real filesystem with atomic replacement on write
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskFs;

impl DiskFs {
    pub fn new() -> Self {
        Self
    }
}

impl PackageFs for DiskFs {
    fn read_text(&self, path: &Path) -> Result<String, FsError> {
        let bytes = self.read_binary(path)?;
        String::from_utf8(bytes).map_err(|_| FsError::NotUtf8 {
            path: path.to_path_buf(),
        })
    }

    fn read_binary(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        std::fs::read(path).map_err(|source| FsError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_text(&mut self, path: &Path, contents: &str) -> Result<(), FsError> {
        let write_err = |source: std::io::Error| FsError::Write {
            path: path.to_path_buf(),
            source,
        };

        // Stage next to the target so the final rename stays on one filesystem
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        staged.write_all(contents.as_bytes()).map_err(write_err)?;
        staged.as_file().sync_all().map_err(write_err)?;

        // Keep the original file's permissions across the swap
        if let Ok(metadata) = std::fs::metadata(path) {
            std::fs::set_permissions(staged.path(), metadata.permissions()).map_err(write_err)?;
        }

        staged.persist(path).map_err(|e| write_err(e.error))?;
        log::debug!("wrote {} bytes to {}", contents.len(), path.display());
        Ok(())
    }
}

/// In-memory filesystem keyed by path
#[derive(Debug, Default, Clone)]
pub struct MemoryFs {
    files: HashMap<PathBuf, Vec<u8>>,
    writes: usize,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, returning `self` for chaining
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Add or replace a file without counting it as a write
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }

    /// Raw contents of a file, if present
    pub fn get(&self, path: &Path) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Contents of a file as text, if present and valid UTF-8
    pub fn get_text(&self, path: &Path) -> Option<&str> {
        self.get(path).and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Number of successful `write_text` calls
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn not_found(path: &Path) -> std::io::Error {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no such file: {}", path.display()),
        )
    }
}

impl PackageFs for MemoryFs {
    fn read_text(&self, path: &Path) -> Result<String, FsError> {
        let bytes = self.read_binary(path)?;
        String::from_utf8(bytes).map_err(|_| FsError::NotUtf8 {
            path: path.to_path_buf(),
        })
    }

    fn read_binary(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        self.files.get(path).cloned().ok_or_else(|| FsError::Read {
            path: path.to_path_buf(),
            source: Self::not_found(path),
        })
    }

    fn write_text(&mut self, path: &Path, contents: &str) -> Result<(), FsError> {
        self.files.insert(path.to_path_buf(), contents.as_bytes().to_vec());
        self.writes += 1;
        Ok(())
    }
}
