//! Audio Merger
//!
//! # What this crate does
//! Takes an ordered list of audio files (MP3, WAV, OGG, FLAC, AAC, M4A...), joins them
//! end to end into one 192 kbit/s MP3, then writes title / artist / album / year / cover
//! into that MP3's ID3 tag.
//!
//! # Shape
//! - [`core::merge`] turns N sources into one MP3. Two interchangeable strategies:
//!   in-process decode + splice + encode, or an external `ffmpeg` concat run.
//! - [`core::tags`] writes (and reads back) the metadata.
//! - [`core::merge_and_tag`] runs both, reporting progress through an [`Observer`].
//!
//! Uploading, ordering UI, temp directories and download links live with the caller;
//! this crate only sees local paths.
//!
//! ```no_run
//! use audio_merger::{AudioSource, MergeTarget, MergerConfig, MetadataRecord, Observer};
//!
//! # fn main() -> audio_merger::Result<()> {
//! let engine = MergerConfig::from_env()?.engine();
//! let sources = AudioSource::new(["intro.wav", "talk.m4a", "outro.mp3"])?;
//! let record = MetadataRecord {
//!     title: Some("Episode 12".into()),
//!     ..Default::default()
//! };
//!
//! let out = audio_merger::merge_and_tag(
//!     engine.as_ref(),
//!     &sources,
//!     &MergeTarget::new("episode-12.mp3"),
//!     &record,
//!     Observer::none().on_progress(|e| println!("{:>5.1}% {}", e.fraction * 100.0, e.status)),
//! )?;
//! println!("wrote {}", out.display());
//! # Ok(())
//! # }
//! ```

pub mod core;

pub use crate::core::config::{MergerConfig, StrategyKind};
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::merge::{DecodeConcat, FfmpegConcat, MergeStrategy, merge};
pub use crate::core::merge_and_tag;
pub use crate::core::progress::Observer;
pub use crate::core::tags::{apply_metadata, read_metadata};
pub use crate::core::types::{AudioSource, MergeTarget, MetadataRecord, ProgressEvent};
