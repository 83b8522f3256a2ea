//! Progress reporting and cancellation support.
//!
//! [`ProgressCallback`] observes playback as frames are presented,
//! [`CancellationToken`] stops the packet loop cooperatively, and
//! [`ProgressInfo`] is the snapshot handed to callbacks.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use yuvplay::{Player, PlayerOptions, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{} frames presented", info.frames_presented);
//!     }
//! }
//!
//! let options = PlayerOptions::new("video.mp4").with_progress(Arc::new(PrintProgress));
//! Player::new(options).play()?;
//! # Ok::<(), yuvplay::PlaybackError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// A snapshot of playback progress.
///
/// Delivered to [`ProgressCallback::on_progress`] every
/// [`batch_size`](crate::PlayerOptions::with_batch_size) presented frames.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Frames handed to the presenter so far.
    pub frames_presented: u64,
    /// Estimated total frame count, if the container reports a duration.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time since playback started.
    pub elapsed: Duration,
    /// Presentation time of the last frame, if it carried a timestamp.
    pub current_timestamp: Option<Duration>,
}

/// Trait for receiving progress updates during playback.
///
/// Callbacks observe but cannot halt playback. Use [`CancellationToken`]
/// to stop it.
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals while frames are being presented.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. The default callback.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// The packet loop checks [`is_cancelled`](CancellationToken::is_cancelled)
/// at the top of every iteration. The presenter cancels it when the window
/// receives a quit request; clones may be cancelled from any thread.
///
/// # Example
///
/// ```
/// use yuvplay::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks timing and fires the callback every `batch_size` frames.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total: Option<u64>, batch_size: u64) -> Self {
        Self {
            callback,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one presented frame.
    pub(crate) fn advance(&mut self, timestamp: Option<Duration>) {
        self.current += 1;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report(timestamp);
            self.items_since_last_report = 0;
        }
    }

    /// Unconditionally emit a final report.
    pub(crate) fn finish(&mut self) {
        self.report(None);
    }

    fn report(&self, timestamp: Option<Duration>) {
        let percentage = self
            .total
            .filter(|&t| t > 0)
            .map(|t| ((self.current as f32 / t as f32) * 100.0).min(100.0));

        let info = ProgressInfo {
            frames_presented: self.current,
            total: self.total,
            percentage,
            elapsed: self.start_time.elapsed(),
            current_timestamp: timestamp,
        };

        self.callback.on_progress(&info);
    }
}
