use id3::Tag;
use id3::frame::PictureType;

/// Description stored on every cover we write.
pub(crate) const COVER_DESCRIPTION: &str = "Cover";

/// Mime used when the bytes are not recognized.
pub(crate) const DEFAULT_COVER_MIME: &str = "image/jpeg";

/// Best-effort mime from magic bytes; unknown formats fall back to JPEG.
pub(crate) fn cover_mime(data: &[u8]) -> &'static str {
    if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        "image/gif"
    } else if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        "image/webp"
    } else {
        DEFAULT_COVER_MIME
    }
}

/// Returns (image_bytes, mime) for the front cover, or the first picture if none is typed as such.
pub fn read_embedded_art(tag: &Tag) -> Option<(Vec<u8>, String)> {
    let front = tag
        .pictures()
        .find(|p| p.picture_type == PictureType::CoverFront);
    let pic = front.or_else(|| tag.pictures().next())?;
    Some((pic.data.clone(), pic.mime_type.clone()))
}
