//! Sub-move submission and pacing.
//!
//! The coordinator owns no motion state of its own: it drives the
//! external executor one sub-move at a time, re-reading the scaling
//! output before each submission so feedrate changes land with latency
//! proportional to segment length. Pacing uses the executor's lookahead
//! callback: the reported next-move time minus a configured overlap
//! margin becomes the wake time of a cooperative pause, which bounds
//! how far ahead of real execution the queue can run.

use std::sync::{Arc, Mutex};

use kerf_common::config::{ConfigError, FeedConfig, FeedRange};
use thiserror::Error;
use tracing::{debug, trace};

use crate::motion::segment::{self, Position, SubMove};

/// Fault reported by the motion executor for a single submitted move.
///
/// Carries the executor's own message verbatim so the operator sees
/// exactly what the executor rejected.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ExecutorError(String);

impl ExecutorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// External motion executor boundary.
///
/// The executor queues moves, performs kinematic limit checking, and
/// owns the real clock. `pause_until` is a cooperative yield back to
/// the host scheduler, during which sensor callbacks may still fire.
///
/// The clock is never read through this trait: every timestamp the
/// control core consumes originates at the executor and arrives
/// already stamped on the data, either as a lookahead completion time
/// or as the `now` the sensor drivers attach to each sample.
pub trait MotionExecutor {
    /// Queue a move to `end` at `speed` [mm/s]. `accel` [mm/s²]
    /// overrides the executor's default when given.
    fn submit_move(
        &mut self,
        end: Position,
        speed: f64,
        accel: Option<f64>,
    ) -> Result<(), ExecutorError>;

    /// Register a one-shot callback that receives the completion time
    /// of the most recently queued move [s] once lookahead resolves it.
    fn register_lookahead_callback(&mut self, callback: Box<dyn FnOnce(f64) + Send>);

    /// Force the lookahead queue to resolve immediately, firing any
    /// registered callbacks.
    fn flush_lookahead(&mut self);

    /// Cooperatively yield until the given monotonic time [s].
    fn pause_until(&mut self, wake_time: f64);

    /// Current commanded position.
    fn position(&self) -> Position;
}

/// Feedrate band, acceleration, and pacing parameters for scaled moves.
#[derive(Debug, Clone)]
pub struct Coordinator {
    feed_range: FeedRange,
    adjustment_accel: f64,
    segment_length: f64,
    overlap_time: f64,
    verbose: bool,
}

impl Coordinator {
    pub fn from_config(feed: &FeedConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            feed_range: feed.feed_range()?,
            adjustment_accel: feed.adjustment_accel,
            segment_length: feed.segment_length,
            overlap_time: feed.overlap_time,
            verbose: feed.verbose_move_scaling,
        })
    }

    /// Replace the feedrate band used for subsequent scaled sub-moves.
    pub fn set_feed_range(&mut self, range: FeedRange) {
        self.feed_range = range;
    }

    /// Current feedrate band [mm/min].
    pub fn feed_range(&self) -> FeedRange {
        self.feed_range
    }

    /// Map a scaling output ∈ [0,1] to an executor speed [mm/s].
    pub fn scaled_speed(&self, output: f64) -> f64 {
        // Feed range is in mm/min, the executor wants mm/s.
        self.feed_range.interpolate(output) / 60.0
    }

    /// Execute one move request.
    ///
    /// With `scaling` absent the request is forwarded to the executor
    /// as a single unmodified call. With `scaling` present the move is
    /// split into segments and each is submitted at the speed derived
    /// from the scaling output current at submission time. An executor
    /// error aborts the remaining segments; traversed geometry stays.
    pub fn move_to<E: MotionExecutor>(
        &self,
        executor: &mut E,
        end: Position,
        speed: f64,
        scaling: Option<&mut dyn FnMut() -> f64>,
    ) -> Result<(), ExecutorError> {
        match scaling {
            None => executor.submit_move(end, speed, None),
            Some(output) => {
                let start = executor.position();
                let segments = segment::split_move(start, end, speed, self.segment_length);
                debug!(
                    segments = segments.len(),
                    ?end,
                    "executing scaled move"
                );
                self.execute_segments(executor, &segments, output)
            }
        }
    }

    fn execute_segments<E: MotionExecutor>(
        &self,
        executor: &mut E,
        segments: &[SubMove],
        output: &mut dyn FnMut() -> f64,
    ) -> Result<(), ExecutorError> {
        for sub in segments {
            let speed = self.scaled_speed(output());
            if self.verbose {
                debug!(end = ?sub.end, speed, "submitting sub-move");
            } else {
                trace!(end = ?sub.end, speed, "submitting sub-move");
            }
            executor.submit_move(sub.end, speed, Some(self.adjustment_accel))?;

            // The callback may fire during flush (immediately) or not at
            // all if lookahead has nothing to report; only pause when a
            // wake time actually arrived.
            let wake = Arc::new(Mutex::new(None));
            let slot = Arc::clone(&wake);
            let overlap = self.overlap_time;
            executor.register_lookahead_callback(Box::new(move |next_move_time| {
                if let Ok(mut s) = slot.lock() {
                    *s = Some(next_move_time - overlap);
                }
            }));
            executor.flush_lookahead();

            let wake_time = wake.lock().ok().and_then(|mut s| s.take());
            if let Some(t) = wake_time {
                executor.pause_until(t);
            }
        }
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
