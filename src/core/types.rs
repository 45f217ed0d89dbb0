//! Core data types shared by the merge engine and the tagger.
//!
//! Rule of thumb:
//! - These structs are "boring bags of data"
//! - No decoding code
//! - No tag parsing code
//!
//! The only logic here is construction-time validation (non-empty sources,
//! "is anything set" checks on the metadata record).

use std::path::{Path, PathBuf};

use super::error::{Error, Result};

/// Fixed encoder bitrate for every merged output (kbit/s, constant bitrate).
pub const TARGET_BITRATE_KBPS: u32 = 192;

/// Comment frame text stamped into every merged output.
pub const MERGER_COMMENT: &str = "Created with Audio Merger";

/// Ordered, non-empty list of input files. Order is playback order.
///
/// The engine reads these paths in place; they must stay valid for the whole merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSource {
    paths: Vec<PathBuf>,
}

impl AudioSource {
    /// Fails with [`Error::NoInput`] before any I/O if `paths` is empty.
    pub fn new<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        if paths.is_empty() {
            return Err(Error::NoInput);
        }
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Always false; kept for the `len` / `is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Output container settings. Only MP3 exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSettings {
    pub bitrate_kbps: u32,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            bitrate_kbps: TARGET_BITRATE_KBPS,
        }
    }
}

/// Where the merged MP3 goes. Overwritten if it already exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeTarget {
    path: PathBuf,
    settings: EncodeSettings,
}

impl MergeTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            settings: EncodeSettings::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> EncodeSettings {
        self.settings
    }
}

/// User-supplied tags for the merged file.
///
/// Every field is optional. `None` (or a blank string) means "leave that slot alone".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Free-form; only written if it parses as an ID3 timestamp.
    pub year: Option<String>,
    /// Raw image bytes for the front cover.
    pub cover_image: Option<Vec<u8>>,
}

impl MetadataRecord {
    /// True if at least one field would be written.
    pub fn has_any(&self) -> bool {
        [&self.title, &self.artist, &self.album, &self.year]
            .into_iter()
            .any(|v| non_blank(v).is_some())
            || self.cover_image.as_ref().is_some_and(|b| !b.is_empty())
    }
}

/// `Some(trimmed)` when the value has visible text.
pub(crate) fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// One progress observation: overall fraction plus the status that was current at the time.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// In `[0.0, 1.0]`, never decreasing within one invocation.
    pub fraction: f32,
    pub status: String,
}
