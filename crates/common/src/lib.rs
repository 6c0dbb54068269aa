use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

const KEY_SEP: char = '\x1f';

/// One persisted metadata record. The store keys these by the sanitized
/// filename, which doubles as the public track id.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackMetadataEntry {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Seconds; 0 means unknown.
    pub duration: f64,
    pub cover_src: Option<String>,
    pub audio_url: String,
    /// Client-supplied name, kept for display only. Never a storage key.
    pub original_filename: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub name: String,
    pub artist: Artist,
    pub cover_src: Option<String>,
}

/// Client-facing track record synthesized on every scan.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: Artist,
    pub album: Album,
    pub duration: f64,
    pub cover_src: Option<String>,
    pub audio_url: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumSummary {
    pub id: String,
    pub name: String,
    pub artist: Artist,
    pub cover_src: Option<String>,
    pub track_count: usize,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistSummary {
    pub id: String,
    pub name: String,
    pub track_count: usize,
}

/// Reduces an untrusted client filename to its final path component, with
/// every character outside `[a-zA-Z0-9._-]` replaced by `_`. The result is
/// safe as a path component and as a store key. Deterministic; distinct
/// inputs that collapse to the same output overwrite each other.
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or("");
    base.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

/// Filename without its extension. A leading dot does not start an
/// extension.
pub fn file_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

pub fn stable_id(input: &str) -> String {
    blake3::hash(input.as_bytes()).to_hex().to_string()
}

pub fn artist_group_id(artist_name: &str) -> String {
    stable_id(artist_name)
}

pub fn album_group_id(album_name: &str, artist_name: &str) -> String {
    stable_id(&format!("{}{}{}", album_name, KEY_SEP, artist_name))
}

/// Folds the flat track list into album groups, one per
/// (album name, artist name) pair in first-seen order. The first cover art
/// encountered for a group wins.
pub fn albums_from_tracks(tracks: &[Track]) -> Vec<AlbumSummary> {
    let mut albums: Vec<AlbumSummary> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for track in tracks {
        let key = format!("{}{}{}", track.album.name, KEY_SEP, track.artist.name);
        match index.get(&key) {
            Some(&at) => {
                let album = &mut albums[at];
                album.track_count += 1;
                if album.cover_src.is_none() {
                    album.cover_src = track.cover_src.clone();
                }
            }
            None => {
                index.insert(key, albums.len());
                albums.push(AlbumSummary {
                    id: track.album.id.clone(),
                    name: track.album.name.clone(),
                    artist: track.artist.clone(),
                    cover_src: track.cover_src.clone(),
                    track_count: 1,
                });
            }
        }
    }

    albums
}

/// Folds the flat track list into artist groups by name, first-seen order.
pub fn artists_from_tracks(tracks: &[Track]) -> Vec<ArtistSummary> {
    let mut artists: Vec<ArtistSummary> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for track in tracks {
        match index.get(&track.artist.name) {
            Some(&at) => artists[at].track_count += 1,
            None => {
                index.insert(track.artist.name.clone(), artists.len());
                artists.push(ArtistSummary {
                    id: track.artist.id.clone(),
                    name: track.artist.name.clone(),
                    track_count: 1,
                });
            }
        }
    }

    artists
}
