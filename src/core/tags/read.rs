//! core/tags/read.rs
//! Read the five merger fields back out of an MP3's ID3 tag.

use std::path::Path;

use id3::frame::Content;
use id3::{ErrorKind, Tag, TagLike};

use super::art::read_embedded_art;
use crate::core::error::{Error, Result};
use crate::core::types::MetadataRecord;

/// Read title/artist/album/year/cover. A file without a tag reads as an empty record.
pub fn read_metadata(path: &Path) -> Result<MetadataRecord> {
    let tag = match Tag::read_from_path(path) {
        Ok(t) => t,
        Err(e) if matches!(e.kind, ErrorKind::NoTag) => return Ok(MetadataRecord::default()),
        Err(source) => {
            return Err(Error::ContainerOpen {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    Ok(record_from_tag(&tag))
}

fn record_from_tag(tag: &Tag) -> MetadataRecord {
    MetadataRecord {
        title: tag
            .title()
            .map(str::to_owned)
            .or_else(|| text_frame(tag, "TIT2")),
        artist: tag
            .artist()
            .map(str::to_owned)
            .or_else(|| text_frame(tag, "TPE1")),
        album: tag
            .album()
            .map(str::to_owned)
            .or_else(|| text_frame(tag, "TALB")),
        year: text_frame(tag, "TDRC").or_else(|| text_frame(tag, "TYER")),
        cover_image: read_embedded_art(tag).map(|(data, _mime)| data),
    }
}

/// Get a best-effort string value from a frame id.
fn text_frame(tag: &Tag, id: &str) -> Option<String> {
    let frame = tag.get(id)?;
    match frame.content() {
        Content::Text(s) => Some(s.clone()),
        _ => None,
    }
}
