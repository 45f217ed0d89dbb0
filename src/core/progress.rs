//! core/progress.rs
//! Status / progress side-channel.
//!
//! The caller registers at most one status sink and one progress sink in an
//! [`Observer`]. The engine only ever talks to a [`Reporter`], which:
//! - maps stage-local fractions into the band the caller allotted
//! - clamps to `[0.0, 1.0]` and never lets the fraction go backwards
//! - isolates sinks: a panicking sink is detached and the work carries on
//!
//! Nothing here can change the outcome of a merge.

use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::warn;

use super::types::ProgressEvent;

type StatusSink<'a> = Box<dyn FnMut(&str) + 'a>;
type ProgressSink<'a> = Box<dyn FnMut(ProgressEvent) + 'a>;

/// Optional observation hooks supplied at call time.
#[derive(Default)]
pub struct Observer<'a> {
    status: Option<StatusSink<'a>>,
    progress: Option<ProgressSink<'a>>,
}

impl<'a> Observer<'a> {
    /// No sinks at all.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn on_status(mut self, sink: impl FnMut(&str) + 'a) -> Self {
        self.status = Some(Box::new(sink));
        self
    }

    pub fn on_progress(mut self, sink: impl FnMut(ProgressEvent) + 'a) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }
}

impl std::fmt::Debug for Observer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("status", &self.status.is_some())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Engine-side handle over an [`Observer`].
pub struct Reporter<'a> {
    observer: Observer<'a>,
    band: (f32, f32),
    last: f32,
    status: String,
}

impl<'a> Reporter<'a> {
    pub fn new(observer: Observer<'a>) -> Self {
        Self {
            observer,
            band: (0.0, 1.0),
            last: 0.0,
            status: String::new(),
        }
    }

    /// Last fraction handed to the progress sink (or 0.0).
    pub fn fraction(&self) -> f32 {
        self.last
    }

    pub fn status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
        let msg = self.status.as_str();
        if let Some(sink) = self.observer.status.as_mut() {
            if catch_unwind(AssertUnwindSafe(|| sink(msg))).is_err() {
                warn!("status sink panicked; detaching it");
                self.observer.status = None;
            }
        }
    }

    /// Report `local` (0..=1) of the current band.
    pub fn progress(&mut self, local: f32) {
        let local = if local.is_finite() { local.clamp(0.0, 1.0) } else { 0.0 };
        let (lo, hi) = self.band;
        let absolute = (lo + local * (hi - lo)).clamp(0.0, 1.0);
        self.emit(absolute);
    }

    /// Run `f` with the band narrowed to `[lo, hi]` of the current band.
    pub fn with_band<R>(&mut self, lo: f32, hi: f32, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.band;
        let (b0, b1) = saved;
        let width = b1 - b0;
        self.band = (b0 + lo.clamp(0.0, 1.0) * width, b0 + hi.clamp(0.0, 1.0) * width);
        let out = f(self);
        self.band = saved;
        out
    }

    /// Final observation: exactly 1.0, then the terminal status.
    pub fn done(&mut self, msg: impl Into<String>) {
        self.emit(1.0);
        self.status(msg);
    }

    fn emit(&mut self, absolute: f32) {
        let fraction = absolute.max(self.last);
        self.last = fraction;
        if let Some(sink) = self.observer.progress.as_mut() {
            let event = ProgressEvent {
                fraction,
                status: self.status.clone(),
            };
            if catch_unwind(AssertUnwindSafe(|| sink(event))).is_err() {
                warn!("progress sink panicked; detaching it");
                self.observer.progress = None;
            }
        }
    }
}
