use std::fs;

use common::{file_stem, sanitize_filename, TrackMetadataEntry, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
use metadata::read_tags;
use tracing::warn;

use crate::{Library, LibraryError, COVERS_DIR, UPLOADS_DIR};

/// Outcome of ingesting one uploaded file, suitable for immediate display
/// without waiting for the next scan.
#[derive(Debug, Clone)]
pub struct IngestedTrack {
    pub track_id: String,
    pub entry: TrackMetadataEntry,
}

impl Library {
    /// Persists one uploaded binary and records its metadata.
    ///
    /// Tag extraction and cover persistence are best-effort: either failure
    /// leaves the corresponding defaults in place. Only the binary write
    /// itself is fatal to the caller's batch. A failed store update is
    /// logged and swallowed; the returned entry still reflects what was
    /// extracted.
    pub fn ingest(
        &self,
        original_filename: &str,
        data: &[u8],
    ) -> Result<IngestedTrack, LibraryError> {
        let track_id = sanitize_filename(original_filename);
        let audio_path = self.audio_path(&track_id);

        // covers/ sits inside uploads/, so this creates both.
        fs::create_dir_all(self.covers_dir())?;
        fs::write(&audio_path, data)?;

        let stem = file_stem(&track_id).to_string();
        let mut entry = TrackMetadataEntry {
            title: stem.clone(),
            artist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            duration: 0.0,
            cover_src: None,
            audio_url: format!("/{}/{}", UPLOADS_DIR, track_id),
            original_filename: original_filename.to_string(),
        };

        match read_tags(&audio_path) {
            Ok(tags) => {
                if let Some(title) = tags.title {
                    entry.title = title;
                }
                if let Some(artist) = tags.artist {
                    entry.artist = artist;
                }
                if let Some(album) = tags.album {
                    entry.album = album;
                }
                entry.duration = tags.duration_secs;

                if let Some(cover) = tags.cover {
                    let cover_name = format!("{}.{}", stem, cover.ext);
                    match fs::write(self.cover_path(&cover_name), &cover.data) {
                        Ok(()) => {
                            entry.cover_src =
                                Some(format!("/{}/{}/{}", UPLOADS_DIR, COVERS_DIR, cover_name));
                        }
                        Err(err) => {
                            warn!("Failed to save cover art for {}: {}", track_id, err);
                        }
                    }
                }
            }
            Err(err) => {
                warn!("Could not parse metadata for {}: {:?}", track_id, err);
            }
        }

        if let Err(err) = self.upsert_entry(&track_id, entry.clone()) {
            warn!("Failed to update metadata store for {}: {}", track_id, err);
        }

        Ok(IngestedTrack { track_id, entry })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::wav_with_tags;
    use tempfile::tempdir;

    #[test]
    fn unparsable_upload_keeps_defaults() {
        let root = tempdir().unwrap();
        let library = Library::new(root.path());

        let ingested = library.ingest("My Song!!.mp3", b"definitely not audio").unwrap();
        assert_eq!(ingested.track_id, "My_Song__.mp3");
        assert_eq!(ingested.entry.title, "My_Song__");
        assert_eq!(ingested.entry.artist, "Unknown Artist");
        assert_eq!(ingested.entry.album, "Unknown Album");
        assert_eq!(ingested.entry.duration, 0.0);
        assert!(ingested.entry.cover_src.is_none());
        assert_eq!(ingested.entry.audio_url, "/uploads/My_Song__.mp3");
        assert_eq!(ingested.entry.original_filename, "My Song!!.mp3");

        assert!(library.audio_path("My_Song__.mp3").is_file());
        let map = library.read_store();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("My_Song__.mp3"));
    }

    #[test]
    fn tagged_wav_is_extracted() {
        let root = tempdir().unwrap();
        let library = Library::new(root.path());

        let wav = wav_with_tags("Ode", "X");
        let ingested = library.ingest("ode take 1.wav", &wav).unwrap();
        assert_eq!(ingested.track_id, "ode_take_1.wav");
        assert_eq!(ingested.entry.title, "Ode");
        assert_eq!(ingested.entry.artist, "X");
        assert_eq!(ingested.entry.album, "Unknown Album");
        assert!(ingested.entry.duration > 0.5 && ingested.entry.duration < 1.5);
    }

    #[test]
    fn colliding_identifiers_overwrite() {
        let root = tempdir().unwrap();
        let library = Library::new(root.path());

        library.ingest("song?.mp3", b"first bytes").unwrap();
        library.ingest("song!.mp3", b"second bytes").unwrap();

        let map = library.read_store();
        assert_eq!(map.len(), 1);
        let entry = &map["song_.mp3"];
        assert_eq!(entry.original_filename, "song!.mp3");
        assert_eq!(fs::read(library.audio_path("song_.mp3")).unwrap(), b"second bytes");
    }
}
