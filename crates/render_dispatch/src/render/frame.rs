//! # Frame Controller
//!
//! Owns the per-frame pipeline: `begin_frame` → any number of `submit` calls
//! → `render_frame`, which orders, dispatches and resets for the next frame.
//!
//! ```text
//! Idle ──submit──▶ Collecting ──submit──▶ Collecting
//!   ▲                                         │
//!   └────────── reset ◀── Rendering ◀──render_frame
//! ```
//!
//! `render_frame` holds the controller mutably for the whole dispatch, so the
//! borrow checker rules out submissions while `Rendering`.

use thiserror::Error;

use crate::config::ConfigError;
use crate::core::DispatchConfig;
use crate::foundation::collections::ObjectHandle;
use crate::render::depth_key::{DepthKeyCalculator, FrameView, KeyVerdict, RejectReason};
use crate::render::dispatch::{DispatchTable, Dispatcher};
use crate::render::kinds::{DrawableDesc, DrawableKind, DrawableSource};
use crate::render::ordering::Orderer;
use crate::render::projection::Projector;
use crate::render::submission::{SubmissionBuffer, SubmissionEntry};

/// Frame lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Buffer empty, waiting for submissions
    Idle,
    /// At least one submission received this frame
    Collecting,
    /// Ordering and dispatch in progress
    Rendering,
}

/// Frame-level usage errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// `submit` called with no frame begun since the last `render_frame`
    #[error("submit called before begin_frame")]
    FrameNotBegun,
}

/// What happened to one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Queued at the given buffer slot
    Queued {
        /// Slot in the submission buffer
        slot: usize,
    },
    /// Failed the kind's clip test
    Rejected {
        /// Cause of the rejection
        reason: RejectReason,
        /// The object's selection-box marker must be cleared
        suppress_selection_box: bool,
    },
    /// Accepted but the fixed-capacity buffer was full
    Dropped,
}

/// Counters for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Index of the frame, counting from zero
    pub frame_number: u64,
    /// `submit` calls
    pub submitted: usize,
    /// Submissions that passed the clip test
    pub accepted: usize,
    /// Submissions that failed the clip test
    pub rejected: usize,
    /// Accepted submissions lost to a full buffer
    pub dropped: usize,
    /// Render callbacks invoked
    pub dispatched: usize,
    /// Render callbacks that failed
    pub failed: usize,
    /// Texture page switches during dispatch
    pub state_changes: usize,
    /// Smallest queued key
    pub nearest_key: Option<f32>,
    /// Largest queued key
    pub farthest_key: Option<f32>,
}

/// Per-frame depth-ordered render dispatcher
pub struct FrameController<P: Projector> {
    projector: P,
    calculator: DepthKeyCalculator,
    buffer: SubmissionBuffer,
    orderer: Orderer,
    frame: Option<FrameView>,
    state: FrameState,
    stats: FrameStats,
    last_stats: FrameStats,
}

impl<P: Projector> FrameController<P> {
    /// Create a controller; fails if `config` does not validate
    pub fn new(projector: P, config: DispatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        log::debug!(
            "Frame controller: {:?} ordering, {:?} capacity",
            config.ordering,
            config.capacity
        );

        Ok(Self {
            projector,
            buffer: SubmissionBuffer::new(config.capacity),
            orderer: Orderer::new(config.ordering, config.depth_range),
            calculator: DepthKeyCalculator::new(config),
            frame: None,
            state: FrameState::Idle,
            stats: FrameStats::default(),
            last_stats: FrameStats::default(),
        })
    }

    /// Start a frame against `frame`'s camera, discarding anything queued
    pub fn begin_frame(&mut self, frame: FrameView) {
        self.buffer.reset();
        self.frame = Some(frame);
        self.state = FrameState::Idle;
        self.stats = FrameStats {
            frame_number: self.stats.frame_number,
            ..FrameStats::default()
        };
    }

    /// Key `handle` through `source` and queue it, clearing its selection
    /// marker on rejection where the kind has one
    pub fn submit<S>(&mut self, source: &mut S, kind: DrawableKind, handle: ObjectHandle) -> Result<SubmitOutcome, FrameError>
    where
        S: DrawableSource + ?Sized,
    {
        let outcome = match source.describe(kind, handle) {
            Some(desc) => self.submit_desc(kind, handle, &desc)?,
            None => {
                log::trace!("{:?} {:?} has no description; rejected", kind, handle);
                self.record_rejection(kind, RejectReason::Undescribed)?
            }
        };

        if let SubmitOutcome::Rejected { suppress_selection_box: true, .. } = outcome {
            source.clear_selection_marker(kind, handle);
        }
        Ok(outcome)
    }

    /// Key an already-described object and queue it
    ///
    /// Does not touch the domain object. A `Rejected` outcome with
    /// `suppress_selection_box` set obliges the caller to clear the object's
    /// selection-box marker.
    pub fn submit_desc(&mut self, kind: DrawableKind, handle: ObjectHandle, desc: &DrawableDesc) -> Result<SubmitOutcome, FrameError> {
        let frame = self.frame.ok_or(FrameError::FrameNotBegun)?;

        match self.calculator.evaluate(&self.projector, &frame, kind, desc) {
            KeyVerdict::Accepted { key, tier, state } => {
                self.note_submission();
                self.stats.accepted += 1;
                let entry = SubmissionEntry {
                    kind,
                    handle,
                    key,
                    tier,
                    render_state: state,
                    sequence: 0,
                };
                Ok(match self.buffer.push(entry) {
                    Some(slot) => {
                        log::trace!("Queued {:?} {:?} at key {}", kind, handle, key.value());
                        SubmitOutcome::Queued { slot }
                    }
                    None => SubmitOutcome::Dropped,
                })
            }
            KeyVerdict::Rejected { reason, .. } => self.record_rejection(kind, reason),
        }
    }

    fn record_rejection(&mut self, kind: DrawableKind, reason: RejectReason) -> Result<SubmitOutcome, FrameError> {
        if self.frame.is_none() {
            return Err(FrameError::FrameNotBegun);
        }
        self.note_submission();
        self.stats.rejected += 1;
        Ok(SubmitOutcome::Rejected {
            reason,
            suppress_selection_box: kind.carries_selection_marker(),
        })
    }

    fn note_submission(&mut self) {
        self.stats.submitted += 1;
        self.state = FrameState::Collecting;
    }

    /// Order and dispatch the frame, then reset for the next one
    ///
    /// Every callback receives the view transform passed to
    /// [`begin_frame`](Self::begin_frame), the one the keys were computed
    /// against. Returns the frame's statistics. Without a begun frame nothing
    /// is dispatched.
    pub fn render_frame(&mut self, table: &mut DispatchTable<'_>) -> FrameStats {
        let Some(frame) = self.frame.take() else {
            log::debug!("render_frame without begin_frame; nothing to dispatch");
            return FrameStats::default();
        };

        self.state = FrameState::Rendering;
        self.orderer.order(&mut self.buffer);

        let mut stats = self.stats;
        stats.dropped = self.buffer.dropped();
        if let Some((near, far)) = self.buffer.key_range() {
            stats.nearest_key = Some(near.value());
            stats.farthest_key = Some(far.value());
        }

        let report = Dispatcher::dispatch(self.buffer.entries(), &frame.view, table);
        stats.dispatched = report.dispatched;
        stats.failed = report.failed;
        stats.state_changes = report.state_changes;

        if stats.dropped > 0 {
            log::warn!(
                "Frame {}: submission buffer full, dropped {} drawables",
                stats.frame_number,
                stats.dropped
            );
        }
        log::debug!(
            "Frame {}: {} submitted, {} accepted, {} rejected, {} dispatched, {} failed, {} state changes",
            stats.frame_number,
            stats.submitted,
            stats.accepted,
            stats.rejected,
            stats.dispatched,
            stats.failed,
            stats.state_changes
        );

        self.buffer.reset();
        self.state = FrameState::Idle;
        self.last_stats = stats;
        self.stats = FrameStats {
            frame_number: stats.frame_number + 1,
            ..FrameStats::default()
        };
        stats
    }

    /// Current lifecycle state
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Whether a frame has been begun and not yet rendered
    pub fn frame_open(&self) -> bool {
        self.frame.is_some()
    }

    /// Entries queued so far this frame, in submission order
    pub fn pending(&self) -> &[SubmissionEntry] {
        self.buffer.entries()
    }

    /// Submissions dropped so far this frame
    pub fn dropped(&self) -> usize {
        self.buffer.dropped()
    }

    /// Statistics of the last rendered frame
    pub fn last_stats(&self) -> &FrameStats {
        &self.last_stats
    }

    /// Depth-key rules in use
    pub fn calculator(&self) -> &DepthKeyCalculator {
        &self.calculator
    }

    /// Projection collaborator
    pub fn projector(&self) -> &P {
        &self.projector
    }

    /// Projection collaborator, e.g. to follow a viewport resize between frames
    pub fn projector_mut(&mut self) -> &mut P {
        &mut self.projector
    }
}

impl<P: Projector + std::fmt::Debug> std::fmt::Debug for FrameController<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameController")
            .field("projector", &self.projector)
            .field("state", &self.state)
            .field("pending", &self.buffer.len())
            .field("ordering", &self.orderer.strategy())
            .finish()
    }
}
