use common::{
    album_group_id, artist_group_id, sanitize_filename, Album, Artist, Track, TrackMetadataEntry,
};
use tracing::warn;
use walkdir::WalkDir;

use crate::{Library, LibraryError, COVERS_DIR, STORE_FILE};

/// Extensions the scanner recognizes as audio, compared case-insensitively.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg"];

fn is_audio_file(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => AUDIO_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)),
        None => false,
    }
}

impl Library {
    /// Rebuilds the client-facing track list from the uploads directory and
    /// the metadata store. Audio files without a store entry are logged and
    /// skipped, not repaired. The result is sorted by title,
    /// case-insensitive ascending; it is the single source of truth clients
    /// consume.
    pub fn scan(&self) -> Result<Vec<Track>, LibraryError> {
        let uploads = self.uploads_dir();
        if !uploads.exists() {
            return Ok(Vec::new());
        }

        let store = self.read_store();
        let mut tracks = Vec::new();

        for entry in WalkDir::new(&uploads).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = match entry.file_name().to_str() {
                Some(name) => name,
                None => continue,
            };
            if name == STORE_FILE || name == COVERS_DIR || !is_audio_file(name) {
                continue;
            }

            // On-disk names come from prior ingestion, so this is a no-op
            // for them; it keeps the store key derivation in one place.
            let track_id = sanitize_filename(name);
            match store.get(&track_id) {
                Some(meta) => tracks.push(build_track(&track_id, meta)),
                None => {
                    warn!("Metadata not found for {:?}; skipping it", name);
                }
            }
        }

        tracks.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        Ok(tracks)
    }
}

fn build_track(track_id: &str, meta: &TrackMetadataEntry) -> Track {
    let artist = Artist {
        id: artist_group_id(&meta.artist),
        name: meta.artist.clone(),
    };
    let album = Album {
        id: album_group_id(&meta.album, &meta.artist),
        name: meta.album.clone(),
        artist: artist.clone(),
        cover_src: meta.cover_src.clone(),
    };
    Track {
        id: track_id.to_string(),
        title: meta.title.clone(),
        artist,
        album,
        duration: meta.duration,
        cover_src: meta.cover_src.clone(),
        audio_url: meta.audio_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn is_audio_file_matches_known_extensions_case_insensitive() {
        assert!(is_audio_file("a.mp3"));
        assert!(is_audio_file("a.MP3"));
        assert!(is_audio_file("a.Wav"));
        assert!(is_audio_file("a.ogg"));
        assert!(!is_audio_file("a.flac"));
        assert!(!is_audio_file("a.txt"));
        assert!(!is_audio_file("noext"));
    }

    #[test]
    fn missing_uploads_dir_scans_to_empty() {
        let root = tempdir().unwrap();
        let library = Library::new(root.path());
        assert!(library.scan().unwrap().is_empty());
    }

    #[test]
    fn scan_skips_non_audio_and_reserved_names() {
        let root = tempdir().unwrap();
        let library = Library::new(root.path());

        library.ingest("keep.mp3", b"bytes").unwrap();
        fs::write(library.uploads_dir().join("notes.txt"), b"x").unwrap();
        // covers/ and metadata.json already exist from the ingest above.

        let tracks = library.scan().unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "keep.mp3");
    }

    #[test]
    fn orphaned_audio_files_are_invisible() {
        let root = tempdir().unwrap();
        let library = Library::new(root.path());

        library.ingest("known.mp3", b"bytes").unwrap();
        fs::write(library.uploads_dir().join("stray.mp3"), b"bytes").unwrap();

        let tracks = library.scan().unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "known.mp3");
    }

    #[test]
    fn store_entries_without_files_are_excluded() {
        let root = tempdir().unwrap();
        let library = Library::new(root.path());

        library.ingest("here.mp3", b"bytes").unwrap();
        library.ingest("gone.mp3", b"bytes").unwrap();
        fs::remove_file(library.audio_path("gone.mp3")).unwrap();

        let tracks = library.scan().unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "here.mp3");
        // The entry itself is still in the store until deleted.
        assert!(library.read_store().contains_key("gone.mp3"));
    }

    #[test]
    fn tracks_are_sorted_by_title_case_insensitive() {
        let root = tempdir().unwrap();
        let library = Library::new(root.path());

        // Unparsable uploads default their title to the filename stem.
        library.ingest("banana.mp3", b"bytes").unwrap();
        library.ingest("Apple.mp3", b"bytes").unwrap();
        library.ingest("cherry.mp3", b"bytes").unwrap();

        let titles: Vec<String> = library
            .scan()
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn scan_synthesizes_grouping_objects() {
        let root = tempdir().unwrap();
        let library = Library::new(root.path());

        library.ingest("solo.mp3", b"bytes").unwrap();
        let tracks = library.scan().unwrap();
        let track = &tracks[0];
        assert_eq!(track.artist.name, "Unknown Artist");
        assert_eq!(track.album.name, "Unknown Album");
        assert_eq!(track.album.artist.id, track.artist.id);
        assert_eq!(track.artist.id, artist_group_id("Unknown Artist"));
    }
}
