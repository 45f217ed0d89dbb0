//! Write a `MetadataRecord` (and the merger comment) into an MP3's ID3 tag.
//!
//! Per call: Opened -> TagEnsured -> FieldsApplied -> Saved.
//! Open/parse and save failures are fatal. A field the tag rejects is skipped
//! and listed in the returned [`TagReport`].

use std::path::{Path, PathBuf};

use id3::frame::{Comment, Picture, PictureType};
use id3::{ErrorKind, Tag, TagLike, Timestamp, Version};
use tracing::{debug, info, warn};

use super::art::{COVER_DESCRIPTION, cover_mime};
use crate::core::error::{Error, Result};
use crate::core::types::{MetadataRecord, non_blank};

/// A field that was present in the record but not written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedField {
    pub field: &'static str,
    pub reason: String,
}

/// What one tagging call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagReport {
    pub path: PathBuf,
    pub written: Vec<&'static str>,
    pub skipped: Vec<SkippedField>,
}

/// Apply `record` to the file at `path` and save it in place.
pub fn apply_metadata(path: &Path, record: &MetadataRecord) -> Result<PathBuf> {
    apply_metadata_report(path, record).map(|report| report.path)
}

/// Like [`apply_metadata`], but also says which fields were written or skipped.
pub fn apply_metadata_report(path: &Path, record: &MetadataRecord) -> Result<TagReport> {
    let mut tag = open_or_new(path)?;
    debug!(path = %path.display(), "tag ensured");

    let mut report = TagReport {
        path: path.to_path_buf(),
        written: Vec::new(),
        skipped: Vec::new(),
    };

    if let Some(title) = non_blank(&record.title) {
        tag.set_title(title);
        report.written.push("title");
    }
    if let Some(artist) = non_blank(&record.artist) {
        tag.set_artist(artist);
        report.written.push("artist");
    }
    if let Some(album) = non_blank(&record.album) {
        tag.set_album(album);
        report.written.push("album");
    }

    // Year (best-effort): only values the timestamp frame accepts.
    if let Some(year) = non_blank(&record.year) {
        match year.parse::<Timestamp>() {
            Ok(ts) => {
                tag.set_date_recorded(ts);
                report.written.push("year");
            }
            Err(_) => {
                warn!(path = %path.display(), year, "year is not a valid ID3 timestamp; skipping");
                report.skipped.push(SkippedField {
                    field: "year",
                    reason: format!("'{year}' is not a valid recording date"),
                });
            }
        }
    }

    if let Some(data) = record.cover_image.as_ref().filter(|d| !d.is_empty()) {
        tag.remove_picture_by_type(PictureType::CoverFront);
        tag.add_frame(Picture {
            mime_type: cover_mime(data).to_string(),
            picture_type: PictureType::CoverFront,
            description: COVER_DESCRIPTION.to_string(),
            data: data.clone(),
        });
        report.written.push("cover");
    }
    debug!(path = %path.display(), written = ?report.written, "fields applied");

    save(&tag, path)?;
    info!(
        path = %path.display(),
        written = ?report.written,
        skipped = report.skipped.len(),
        "tags saved"
    );

    Ok(report)
}

/// Replace every comment frame with a single `eng` comment carrying `text`.
pub fn stamp_comment(path: &Path, text: &str) -> Result<()> {
    let mut tag = open_or_new(path)?;

    tag.remove("COMM");
    tag.add_frame(Comment {
        lang: "eng".to_string(),
        description: String::new(),
        text: text.to_string(),
    });

    save(&tag, path)
}

/// Existing tag, or a fresh one if the file has none yet.
fn open_or_new(path: &Path) -> Result<Tag> {
    match Tag::read_from_path(path) {
        Ok(tag) => Ok(tag),
        Err(e) if matches!(e.kind, ErrorKind::NoTag) => Ok(Tag::new()),
        Err(source) => Err(Error::ContainerOpen {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn save(tag: &Tag, path: &Path) -> Result<()> {
    tag.write_to_path(path, Version::Id3v24)
        .map_err(|source| Error::Persistence {
            path: path.to_path_buf(),
            source,
        })
}
