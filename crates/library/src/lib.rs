mod delete;
#[cfg(test)]
mod fixtures;
mod ingest;
mod scan;
mod store;

use std::fmt;
use std::path::{Path, PathBuf};

pub use ingest::IngestedTrack;
pub use scan::AUDIO_EXTENSIONS;
pub use store::MetadataMap;

/// Name of the directory holding uploaded audio binaries, under the storage
/// root.
pub const UPLOADS_DIR: &str = "uploads";
/// Reserved subdirectory of the uploads directory for extracted cover art.
pub const COVERS_DIR: &str = "covers";
/// Name of the JSON metadata store inside the uploads directory.
pub const STORE_FILE: &str = "metadata.json";

/// Handle on the storage root. Every operation re-reads state from disk;
/// nothing is cached between requests.
#[derive(Clone)]
pub struct Library {
    storage_root: PathBuf,
}

impl Library {
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
        }
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.storage_root.join(UPLOADS_DIR)
    }

    pub fn covers_dir(&self) -> PathBuf {
        self.uploads_dir().join(COVERS_DIR)
    }

    pub fn store_path(&self) -> PathBuf {
        self.uploads_dir().join(STORE_FILE)
    }

    /// On-disk location of a track's audio binary. `track_id` must already
    /// be sanitized.
    pub fn audio_path(&self, track_id: &str) -> PathBuf {
        self.uploads_dir().join(track_id)
    }

    pub fn cover_path(&self, file_name: &str) -> PathBuf {
        self.covers_dir().join(file_name)
    }
}

#[derive(Debug)]
pub enum LibraryError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Io(err) => write!(f, "io error: {}", err),
            LibraryError::Json(err) => write!(f, "json error: {}", err),
        }
    }
}

impl std::error::Error for LibraryError {}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::Io(err)
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::Json(err)
    }
}
