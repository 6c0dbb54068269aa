use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;

use common::TrackMetadataEntry;
use tracing::warn;

use crate::{Library, LibraryError};

/// The whole persisted store: track id to metadata entry, serialized as one
/// pretty-printed JSON object.
pub type MetadataMap = BTreeMap<String, TrackMetadataEntry>;

impl Library {
    /// Reads the whole store. A missing file is an empty library; an
    /// unreadable or unparsable file is treated the same way, so the next
    /// write starts over from a valid file. Prior entries are lost in that
    /// case, which is the accepted tradeoff.
    pub fn read_store(&self) -> MetadataMap {
        let path = self.store_path();
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return MetadataMap::new(),
            Err(err) => {
                warn!("Failed to read metadata store {:?}: {}", path, err);
                return MetadataMap::new();
            }
        };
        match serde_json::from_str(&data) {
            Ok(map) => map,
            Err(err) => {
                warn!(
                    "Metadata store {:?} is not valid JSON ({}); treating it as empty",
                    path, err
                );
                MetadataMap::new()
            }
        }
    }

    /// Sets or overwrites one entry and rewrites the whole file. Creates the
    /// containing directory on first write.
    pub fn upsert_entry(
        &self,
        track_id: &str,
        entry: TrackMetadataEntry,
    ) -> Result<(), LibraryError> {
        let mut map = self.read_store();
        map.insert(track_id.to_string(), entry);
        self.write_store(&map)
    }

    /// Drops one entry and rewrites the file. A missing key is a no-op.
    pub fn remove_entry(&self, track_id: &str) -> Result<(), LibraryError> {
        let mut map = self.read_store();
        if map.remove(track_id).is_none() {
            return Ok(());
        }
        self.write_store(&map)
    }

    fn write_store(&self, map: &MetadataMap) -> Result<(), LibraryError> {
        let path = self.store_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(map)?;
        fs::write(&path, data)?;
        Ok(())
    }
}
