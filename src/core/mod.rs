//! core/mod.rs
//!
//! The whole job, start to finish:
//!   (A) merge ordered sources -> one MP3 (`merge`)
//!   (B) write the user's metadata into it (`tags`)
//!
//! Both stages run on the caller's thread, one after the other. Progress and status
//! go out through an [`Observer`](progress::Observer); nothing the observer does can
//! change the result.

pub mod config;
pub mod error;
pub mod merge;
pub mod progress;
pub mod tags;
pub mod types;

use std::path::PathBuf;

use tracing::info;

use error::Result;
use merge::{DONE_STATUS, MergeStrategy};
use progress::{Observer, Reporter};
use types::{AudioSource, MergeTarget, MetadataRecord};

/// Share of overall progress given to the merge; tagging gets the rest.
const MERGE_SHARE: f32 = 0.8;

/// Merge `sources` into `target`, then apply `record` to the result.
///
/// Tagging is skipped entirely when `record` has nothing set. Per-field tag
/// problems (e.g. an unparseable year) are logged and skipped; everything else
/// is returned as an error and no "Done" status is emitted.
pub fn merge_and_tag(
    strategy: &dyn MergeStrategy,
    sources: &AudioSource,
    target: &MergeTarget,
    record: &MetadataRecord,
    observer: Observer<'_>,
) -> Result<PathBuf> {
    let mut reporter = Reporter::new(observer);

    let out = reporter.with_band(0.0, MERGE_SHARE, |reporter| {
        merge::merge_with(strategy, sources, target, reporter)
    })?;
    reporter.progress(MERGE_SHARE);

    if record.has_any() {
        reporter.status("Adding metadata...");
        let report = tags::apply_metadata_report(&out, record)?;
        if !report.skipped.is_empty() {
            info!(skipped = ?report.skipped, "some metadata fields were not written");
        }
    }

    reporter.done(DONE_STATUS);
    Ok(out)
}
