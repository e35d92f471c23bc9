//! # Orderer
//!
//! Arranges the submission buffer far to near. Two strategies share one
//! interface:
//!
//! - [`OrderStrategy::FullSort`]: descending key, ties by submission order.
//! - [`OrderStrategy::Buckets`]: keys quantized over `depth_range` into a
//!   fixed number of buckets, buckets walked from the last to the first,
//!   submission order kept within a bucket. Linear time; precision is limited
//!   to the bucket width.
//!
//! Both produce the same order for identical input on every frame, and
//! neither allocates once its scratch space has grown to the frame's size.

use crate::core::OrderStrategy;
use crate::render::submission::{SubmissionBuffer, SubmissionEntry};

/// Orders a submission buffer in place
#[derive(Debug)]
pub struct Orderer {
    strategy: OrderStrategy,
    depth_range: f32,
    bucket_starts: Vec<usize>,
    scratch: Vec<SubmissionEntry>,
}

impl Orderer {
    /// Create an orderer; `depth_range` is the key span buckets cover
    pub fn new(strategy: OrderStrategy, depth_range: f32) -> Self {
        Self {
            strategy,
            depth_range,
            bucket_starts: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Strategy in use
    pub fn strategy(&self) -> OrderStrategy {
        self.strategy
    }

    /// Sort `buffer` into dispatch order
    pub fn order(&mut self, buffer: &mut SubmissionBuffer) {
        match self.strategy {
            OrderStrategy::FullSort => Self::full_sort(buffer.entries_mut()),
            OrderStrategy::Buckets { count } => self.bucket_sort(buffer.entries_mut(), count),
        }
    }

    fn full_sort(entries: &mut [SubmissionEntry]) {
        // Unstable sort with an explicit tie-break stays deterministic without
        // the merge buffer a stable sort would allocate.
        entries.sort_unstable_by(|a, b| b.key.cmp(&a.key).then(a.sequence.cmp(&b.sequence)));
    }

    /// Bucket index for `key`, clamped into `0..count`
    fn bucket_of(&self, key: f32, count: usize) -> usize {
        let scaled = (key * count as f32 / self.depth_range).floor();
        // Saturating float-to-int cast maps NaN and negatives to 0
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let bucket = scaled as usize;
        bucket.min(count.saturating_sub(1))
    }

    fn bucket_sort(&mut self, entries: &mut Vec<SubmissionEntry>, count: usize) {
        if entries.len() < 2 || count == 0 {
            return;
        }

        // Counting sort with buckets laid out far (high index) to near
        self.bucket_starts.clear();
        self.bucket_starts.resize(count + 1, 0);
        for entry in entries.iter() {
            let slot = count - 1 - self.bucket_of(entry.key.value(), count);
            self.bucket_starts[slot + 1] += 1;
        }
        for slot in 1..=count {
            self.bucket_starts[slot] += self.bucket_starts[slot - 1];
        }

        self.scratch.clear();
        self.scratch.resize(entries.len(), entries[0]);
        for entry in entries.iter() {
            let slot = count - 1 - self.bucket_of(entry.key.value(), count);
            self.scratch[self.bucket_starts[slot]] = *entry;
            self.bucket_starts[slot] += 1;
        }

        std::mem::swap(entries, &mut self.scratch);
    }
}
