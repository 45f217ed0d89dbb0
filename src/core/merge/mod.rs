//! core/merge/mod.rs
//! Merge engine: N ordered sources -> one 192 kbit/s MP3.
//!
//! Two interchangeable strategies sit behind [`MergeStrategy`]:
//! - [`DecodeConcat`]: decode in-process, splice, encode once (Symphonia + LAME)
//! - [`FfmpegConcat`]: hand a concat manifest to an external `ffmpeg`
//!
//! [`merge`] wraps either one with the shared contract: input validation up front,
//! the "Created with Audio Merger" comment stamped onto the output, and the final
//! 1.0 / "Done" report only once the file is written and closed.

mod decoder;
mod encoder;
mod external;
mod in_process;
mod pcm;

#[cfg(test)]
pub(crate) mod test_audio;
#[cfg(all(test, unix))]
pub(crate) mod test_tools;

use std::path::{Path, PathBuf};

use tracing::info;

pub use decoder::decode_file;
pub use encoder::encode_mp3;
pub use external::{CommandOutput, FfmpegConcat};
pub use in_process::DecodeConcat;
pub use pcm::PcmBuffer;

use super::error::{Error, Result};
use super::progress::{Observer, Reporter};
use super::tags;
use super::types::{AudioSource, MERGER_COMMENT, MergeTarget};

/// Terminal status message.
pub const DONE_STATUS: &str = "Done";

/// One way of turning an [`AudioSource`] into the target MP3.
///
/// Implementations read sources strictly in order, abort on the first bad source,
/// and report progress only through `reporter`.
pub trait MergeStrategy {
    fn name(&self) -> &'static str;

    fn merge(
        &self,
        sources: &AudioSource,
        target: &MergeTarget,
        reporter: &mut Reporter<'_>,
    ) -> Result<PathBuf>;
}

/// Merge `sources` into `target` and report progress to `observer`.
pub fn merge(
    strategy: &dyn MergeStrategy,
    sources: &AudioSource,
    target: &MergeTarget,
    observer: Observer<'_>,
) -> Result<PathBuf> {
    let mut reporter = Reporter::new(observer);
    let out = merge_with(strategy, sources, target, &mut reporter)?;
    reporter.done(DONE_STATUS);
    Ok(out)
}

/// [`merge`] without the terminal report, for callers that keep going afterwards.
pub(crate) fn merge_with(
    strategy: &dyn MergeStrategy,
    sources: &AudioSource,
    target: &MergeTarget,
    reporter: &mut Reporter<'_>,
) -> Result<PathBuf> {
    ensure_target_is_not_a_source(sources, target)?;

    info!(
        strategy = strategy.name(),
        sources = sources.len(),
        output = %target.path().display(),
        "merge started"
    );

    let out = strategy.merge(sources, target, reporter)?;
    tags::stamp_comment(&out, MERGER_COMMENT)?;

    info!(output = %out.display(), "merge finished");
    Ok(out)
}

fn ensure_target_is_not_a_source(sources: &AudioSource, target: &MergeTarget) -> Result<()> {
    let target_key = comparable(target.path());
    if sources.paths().iter().any(|p| comparable(p) == target_key) {
        return Err(Error::TargetIsSource {
            path: target.path().to_path_buf(),
        });
    }
    Ok(())
}

/// Canonical path when the file exists, otherwise canonical parent + file name.
fn comparable(path: &Path) -> PathBuf {
    if let Ok(p) = path.canonicalize() {
        return p;
    }
    let abs = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    match (abs.parent().and_then(|d| d.canonicalize().ok()), abs.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => abs,
    }
}
