use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::warn;

use crate::{Library, LibraryError};

impl Library {
    /// Removes a track's audio binary, cover art, and store entry.
    ///
    /// File removals are best-effort: missing files are expected (store and
    /// filesystem drift between steps) and other unlink errors are logged
    /// without aborting. The one fatal failure is the store rewrite, which
    /// would otherwise leave an entry pointing at removed files. Deleting an
    /// id with no entry and no files succeeds.
    pub fn delete(&self, track_id: &str) -> Result<(), LibraryError> {
        let store = self.read_store();
        let entry = store.get(track_id);
        if entry.is_none() {
            warn!(
                "Metadata not found for {}; attempting file removal anyway",
                track_id
            );
        }

        remove_file_quiet(&self.audio_path(track_id));

        if let Some(cover_src) = entry.and_then(|e| e.cover_src.as_deref()) {
            if let Some(name) = cover_src.rsplit('/').next() {
                remove_file_quiet(&self.cover_path(name));
            }
        }

        if entry.is_some() {
            self.remove_entry(track_id)?;
        }
        Ok(())
    }
}

fn remove_file_quiet(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != ErrorKind::NotFound {
            warn!("Failed to remove {:?}: {}", path, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::wav_with_tags;
    use tempfile::tempdir;

    #[test]
    fn deleting_an_unknown_id_succeeds() {
        let root = tempdir().unwrap();
        let library = Library::new(root.path());
        library.delete("never-existed.mp3").unwrap();
    }

    #[test]
    fn delete_removes_file_and_store_entry() {
        let root = tempdir().unwrap();
        let library = Library::new(root.path());

        library.ingest("gone soon.mp3", b"bytes").unwrap();
        assert!(library.audio_path("gone_soon.mp3").is_file());

        library.delete("gone_soon.mp3").unwrap();
        assert!(!library.audio_path("gone_soon.mp3").exists());
        assert!(library.read_store().is_empty());
    }

    #[test]
    fn delete_tolerates_missing_audio_file() {
        let root = tempdir().unwrap();
        let library = Library::new(root.path());

        library.ingest("drifted.mp3", b"bytes").unwrap();
        fs::remove_file(library.audio_path("drifted.mp3")).unwrap();

        library.delete("drifted.mp3").unwrap();
        assert!(library.read_store().is_empty());
    }

    #[test]
    fn upload_scan_delete_round_trip() {
        let root = tempdir().unwrap();
        let library = Library::new(root.path());

        let wav = wav_with_tags("Ode", "X");
        library.ingest("ode.wav", &wav).unwrap();

        let tracks = library.scan().unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "Ode");
        assert_eq!(tracks[0].artist.name, "X");

        library.delete("ode.wav").unwrap();
        assert!(library.scan().unwrap().is_empty());

        let raw = fs::read_to_string(library.store_path()).unwrap();
        assert!(!raw.contains("ode.wav"));
    }
}
