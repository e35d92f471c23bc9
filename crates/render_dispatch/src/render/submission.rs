//! # Submission Buffer
//!
//! Per-frame storage for accepted drawables. The buffer lives as long as the
//! frame controller and is cleared, not reallocated, at the start of every
//! frame, so steady-state frames do not allocate.
//!
//! A fixed-capacity buffer never grows past its limit: pushes beyond it are
//! dropped and counted, and [`SubmissionBuffer::dropped`] reports how many were
//! lost this frame.

use crate::core::{CapacityPolicy, MAX_CAPACITY};
use crate::foundation::collections::ObjectHandle;
use crate::render::depth_key::DepthKey;
use crate::render::kinds::{DrawableKind, OrderingTier};

/// One drawable queued for this frame
///
/// Holds a non-owning handle; the entry is meaningless once the frame has
/// been dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionEntry {
    /// Kind, selects the render callback
    pub kind: DrawableKind,
    /// Host object reference
    pub handle: ObjectHandle,
    /// Sort key; larger is further back
    pub key: DepthKey,
    /// Tier the key was derived for
    pub tier: OrderingTier,
    /// Render state bound when the entry is drawn, used for state-change accounting
    pub render_state: u32,
    /// Position in submission order, the ordering tie-break
    pub sequence: u32,
}

/// Per-frame entry arena
#[derive(Debug)]
pub struct SubmissionBuffer {
    entries: Vec<SubmissionEntry>,
    limit: Option<usize>,
    dropped: usize,
}

impl SubmissionBuffer {
    /// Create a buffer following the given storage policy
    ///
    /// At most [`MAX_CAPACITY`] entries are reserved up front; a larger
    /// fixed limit is reached by growing on demand.
    pub fn new(policy: CapacityPolicy) -> Self {
        match policy {
            CapacityPolicy::Unbounded { reserve } => Self {
                entries: Vec::with_capacity(reserve.min(MAX_CAPACITY)),
                limit: None,
                dropped: 0,
            },
            CapacityPolicy::Fixed { limit } => Self {
                entries: Vec::with_capacity(limit.min(MAX_CAPACITY)),
                limit: Some(limit),
                dropped: 0,
            },
        }
    }

    /// Clear all entries and the dropped counter
    ///
    /// Leaves the buffer in the same observable state as after construction.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.dropped = 0;
    }

    /// Append an entry, returning its slot, or `None` if the buffer is full
    ///
    /// The entry's `sequence` is overwritten with its submission position.
    pub fn push(&mut self, mut entry: SubmissionEntry) -> Option<usize> {
        if self.limit.is_some_and(|limit| self.entries.len() >= limit) {
            self.dropped += 1;
            return None;
        }

        let slot = self.entries.len();
        entry.sequence = u32::try_from(slot).unwrap_or(u32::MAX);
        self.entries.push(entry);
        Some(slot)
    }

    /// Entries in their current order
    pub fn entries(&self) -> &[SubmissionEntry] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Vec<SubmissionEntry> {
        &mut self.entries
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Submissions dropped for lack of capacity since the last reset
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Hard entry limit, if any
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Smallest and largest key currently queued
    pub fn key_range(&self) -> Option<(DepthKey, DepthKey)> {
        self.entries.iter().fold(None, |range, entry| match range {
            None => Some((entry.key, entry.key)),
            Some((lo, hi)) => Some((lo.min(entry.key), hi.max(entry.key))),
        })
    }
}

impl Default for SubmissionBuffer {
    fn default() -> Self {
        Self::new(CapacityPolicy::default())
    }
}
