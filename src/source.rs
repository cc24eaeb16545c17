// ABOUTME: Source document module for the big-deck engine
// ABOUTME: Tracks where deck text comes from and whether it changed since the last read

use crate::errors::{DeckError, Result};
use log::{debug, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A document the canvas can parse pages from
pub trait SourceDocument {
    /// True when the document changed since the last `read`
    fn is_modified(&self) -> bool;

    /// Read the full text and mark the document as up to date
    fn read(&mut self) -> Result<String>;

    /// Resolve a path referenced from inside the document
    fn full_path(&self, _relative: &str) -> Option<PathBuf> {
        None
    }

    /// Scratch directory for derived files
    fn tmp_dir(&self) -> Option<PathBuf> {
        None
    }

    /// Human readable name used in log output
    fn name(&self) -> String;
}

/// A document on disk, considered modified whenever its mtime moves past the
/// time of the last read
pub struct FileSource {
    path: PathBuf,
    last_read: Option<SystemTime>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_read: None,
        }
    }

    /// Like `new`, but fails unless `path` names an existing regular file
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Ok(Self::new(path)),
            Ok(_) => Err(DeckError::ValidationError(format!(
                "Deck source is not a file: {:?}",
                path
            ))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DeckError::PathNotFoundError(path))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }
}

impl SourceDocument for FileSource {
    fn is_modified(&self) -> bool {
        match (self.modified_time(), self.last_read) {
            (Some(_), None) => true,
            (Some(mtime), Some(last_read)) => mtime > last_read,
            (None, _) => {
                debug!("Cannot stat {:?}, treating as unmodified", self.path);
                false
            }
        }
    }

    fn read(&mut self) -> Result<String> {
        info!("Reading deck source: {:?}", self.path);
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DeckError::PathNotFoundError(self.path.clone()),
            _ => DeckError::FileReadError(e),
        })?;
        self.last_read = self.modified_time().or_else(|| Some(SystemTime::now()));
        Ok(text)
    }

    fn full_path(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        if relative.is_absolute() {
            return Some(relative.to_path_buf());
        }
        let base = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Some(base.join(relative))
    }

    fn tmp_dir(&self) -> Option<PathBuf> {
        let stem = self.path.file_stem()?.to_string_lossy().to_string();
        Some(std::env::temp_dir().join("big-deck").join(stem))
    }

    fn name(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

/// A document held in memory; modified until read, and again after `replace`
pub struct MemorySource {
    text: String,
    modified: bool,
    base_dir: Option<PathBuf>,
}

impl MemorySource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            modified: true,
            base_dir: None,
        }
    }

    /// Resolve relative references against `dir`
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn replace(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.modified = true;
    }
}

impl SourceDocument for MemorySource {
    fn is_modified(&self) -> bool {
        self.modified
    }

    fn read(&mut self) -> Result<String> {
        self.modified = false;
        Ok(self.text.clone())
    }

    fn full_path(&self, relative: &str) -> Option<PathBuf> {
        self.base_dir.as_ref().map(|dir| dir.join(relative))
    }

    fn name(&self) -> String {
        "<memory>".to_string()
    }
}
