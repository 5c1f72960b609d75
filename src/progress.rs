//! Progress reporting for upload and conversion pipelines.
//!
//! Every orchestration call accepts an optional [`ProgressObserver`]. Events
//! arrive as [`ProgressEvent`]s carrying a phase and a fraction in `0..=1`:
//!
//! ```text
//! Uploading(0.1) → Uploading(0.5) → Uploading(1.0) → Converting(0.4) → … → Stop(1.0)
//! ```
//!
//! Delivery is ordered and at-most-once per phase transition; the final
//! event of any pipeline run is always `Stop` with fraction `1.0`. A `Stop`
//! event does not by itself distinguish success from failure; callers must
//! inspect the returned `Result` for that.
//!
//! # Why a trait and not bare closures?
//!
//! The source of truth for progress is the pipeline, but how the host
//! application consumes it varies: a terminal bar, a WebSocket, a UI store.
//! An `Arc<dyn ProgressObserver>` is the least-invasive seam, and
//! [`ChannelProgressObserver::channel`] wraps it into a single-consumer
//! event stream for callers that prefer `recv()` over callbacks.

use std::sync::Arc;

use tokio::sync::mpsc;

/// The phase of a pipeline run a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    /// Bytes are moving to the object store.
    Uploading,
    /// The conversion service is processing the uploaded document.
    Converting,
    /// Terminal. Emitted exactly once per run, success or failure.
    Stop,
}

/// A single progress tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressEvent {
    pub phase: UploadPhase,
    /// Fractional completion of the current phase, `0.0..=1.0`.
    pub fraction: f64,
}

impl ProgressEvent {
    pub fn new(phase: UploadPhase, fraction: f64) -> Self {
        Self { phase, fraction }
    }

    /// The terminal event every pipeline run ends with.
    pub fn stop() -> Self {
        Self::new(UploadPhase::Stop, 1.0)
    }
}

/// Receives progress events from a pipeline run.
///
/// Implementations must be `Send + Sync`; the batch image path delivers
/// `Uploading` ticks from concurrently running transfers.
pub trait ProgressObserver: Send + Sync {
    /// Called for every progress tick. Default is a no-op.
    fn on_progress(&self, event: ProgressEvent) {
        let _ = event;
    }
}

/// A no-op observer for callers that don't need progress events.
pub struct NoopProgressObserver;

impl ProgressObserver for NoopProgressObserver {}

/// Convenience alias matching the type the pipeline passes around.
pub type SharedProgressObserver = Arc<dyn ProgressObserver>;

/// An observer that forwards every event into an unbounded channel.
///
/// Events arrive on the receiver in exactly the order the pipeline emitted
/// them. The sender never blocks; if the receiver is dropped, further
/// events are discarded silently.
pub struct ChannelProgressObserver {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelProgressObserver {
    /// Create an observer and the receiving end of its event stream.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressObserver for ChannelProgressObserver {
    fn on_progress(&self, event: ProgressEvent) {
        // A closed receiver means the caller stopped listening; dropping the
        // event is the documented behavior.
        let _ = self.tx.send(event);
    }
}

/// Forward an event to an optional observer.
///
/// Internal helper; keeps the `if let Some(..)` noise out of the pipeline.
pub(crate) fn emit(observer: Option<&SharedProgressObserver>, event: ProgressEvent) {
    if let Some(obs) = observer {
        obs.on_progress(event);
    }
}
