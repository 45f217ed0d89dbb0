//! core/merge/in_process.rs
//! Decode every source, splice in order, encode once.
//!
//! Memory is O(total decoded duration): fine for a handful of tracks, not for
//! hours of audio. Use the ffmpeg strategy for that.

use std::path::PathBuf;

use tracing::info;

use super::MergeStrategy;
use super::decoder::decode_file;
use super::encoder::encode_mp3;
use crate::core::error::{Result, display_name};
use crate::core::progress::Reporter;
use crate::core::types::{AudioSource, MergeTarget};

/// Share of the engine's band spent decoding; the rest is the encode.
const DECODE_SHARE: f32 = 0.8;

#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeConcat;

impl MergeStrategy for DecodeConcat {
    fn name(&self) -> &'static str {
        "decode"
    }

    fn merge(
        &self,
        sources: &AudioSource,
        target: &MergeTarget,
        reporter: &mut Reporter<'_>,
    ) -> Result<PathBuf> {
        let paths = sources.paths();
        let n = paths.len();

        reporter.status("Starting audio file merging...");
        reporter.progress(0.0);

        // The first file is just the initial buffer.
        let mut merged = decode_file(&paths[0])?;

        reporter.with_band(0.0, DECODE_SHARE, |reporter| -> Result<()> {
            for (i, path) in paths.iter().enumerate().skip(1) {
                reporter.status(format!("Merging file {}/{}: {}", i + 1, n, display_name(path)));

                let next = decode_file(path)?;
                merged.append(next);

                reporter.progress(i as f32 / (n - 1) as f32);
            }
            Ok(())
        })?;
        reporter.progress(DECODE_SHARE);

        info!(
            sources = n,
            seconds = merged.duration_secs(),
            sample_rate = merged.sample_rate(),
            channels = merged.channels(),
            "sources spliced"
        );

        reporter.status("Exporting merged audio as MP3...");
        encode_mp3(merged, target.path(), target.settings())?;

        Ok(target.path().to_path_buf())
    }
}
