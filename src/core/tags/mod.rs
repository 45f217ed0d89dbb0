//! core/tags/mod.rs
//!
//! ID3 tag read/write for the merged output.
//! Public API:
//! - [`apply_metadata`] writes a
//!   [`MetadataRecord`](crate::core::types::MetadataRecord) into an MP3.
//! - [`stamp_comment`] replaces the comment frame (used for the merger signature).
//! - [`read_metadata`] reads the same five fields back.

mod art;
mod read;
mod write;

pub use read::read_metadata;
pub use write::{SkippedField, TagReport, apply_metadata, apply_metadata_report, stamp_comment};
