use std::path::Path;

use lofty::error::LoftyError;
use lofty::prelude::{AudioFile, ItemKey, TaggedFileExt};

/// Best-effort tag data pulled from an uploaded audio binary. Absent fields
/// stay `None`; the caller supplies its own fallbacks.
#[derive(Debug, Default, Clone)]
pub struct TagInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration_secs: f64,
    pub cover: Option<CoverArt>,
}

#[derive(Debug, Clone)]
pub struct CoverArt {
    pub data: Vec<u8>,
    /// File extension derived from the picture's declared media subtype.
    pub ext: String,
}

#[derive(Debug)]
pub enum MetadataError {
    Io(std::io::Error),
    Lofty(LoftyError),
}

impl From<std::io::Error> for MetadataError {
    fn from(err: std::io::Error) -> Self {
        MetadataError::Io(err)
    }
}

impl From<LoftyError> for MetadataError {
    fn from(err: LoftyError) -> Self {
        MetadataError::Lofty(err)
    }
}

/// Reads title/artist/album, duration, and the first embedded picture from
/// an audio file. Only the first picture is considered; its extension comes
/// from the declared media subtype, `jpg` when that is absent or malformed.
pub fn read_tags(path: &Path) -> Result<TagInfo, MetadataError> {
    let tagged_file = lofty::read_from_path(path)?;

    let mut info = TagInfo {
        duration_secs: tagged_file.properties().duration().as_secs_f64(),
        ..TagInfo::default()
    };

    if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        info.title = non_empty(tag.get_string(&ItemKey::TrackTitle));
        info.artist = non_empty(tag.get_string(&ItemKey::TrackArtist))
            .or_else(|| non_empty(tag.get_string(&ItemKey::AlbumArtist)));
        info.album = non_empty(tag.get_string(&ItemKey::AlbumTitle));
        info.cover = tag.pictures().first().map(|picture| CoverArt {
            data: picture.data().to_vec(),
            ext: ext_from_mime(picture.mime_type().map(|mime| mime.as_str())),
        });
    }

    Ok(info)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn ext_from_mime(mime: Option<&str>) -> String {
    let subtype = mime
        .and_then(|m| m.split('/').nth(1))
        .map(str::trim)
        .unwrap_or("");
    if !subtype.is_empty() && subtype.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        subtype.to_ascii_lowercase()
    } else {
        "jpg".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{ext_from_mime, non_empty, read_tags};
    use std::fs;

    #[test]
    fn ext_comes_from_media_subtype() {
        assert_eq!(ext_from_mime(Some("image/png")), "png");
        assert_eq!(ext_from_mime(Some("image/jpeg")), "jpeg");
        assert_eq!(ext_from_mime(Some("image/WebP")), "webp");
    }

    #[test]
    fn ext_defaults_to_jpg() {
        assert_eq!(ext_from_mime(None), "jpg");
        assert_eq!(ext_from_mime(Some("image/")), "jpg");
        assert_eq!(ext_from_mime(Some("garbage")), "jpg");
        assert_eq!(ext_from_mime(Some("image/sv+g;x")), "jpg");
    }

    #[test]
    fn non_empty_trims_and_filters() {
        assert_eq!(non_empty(Some("  Ode  ")), Some("Ode".to_string()));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        fs::write(&path, b"this is not an mp3 frame").unwrap();
        assert!(read_tags(&path).is_err());
    }
}
