//! Cursor-based batch streams.
//!
//! Every stream hands out full batches only: a request that runs past the
//! end of the data yields the exhaustion signal (`Ok(None)`), moves the
//! cursor to the end and discards the unread tail. Callers poll
//! [`InstanceStream::has_more_instances`] to decide whether to keep going.
pub mod data_stream;
pub mod iter_stream;

use std::ops::Range;

pub use data_stream::DataStream;
pub use iter_stream::{IterStream, Row};

use crate::data_handling::Batch;
use crate::error::{Result, StreamLearnError};

/// A source of sequential batches of labeled samples.
pub trait InstanceStream {
    /// Samples not yet consumed. Never negative.
    fn estimated_remaining_instances(&self) -> usize;

    fn has_more_instances(&self) -> bool {
        self.estimated_remaining_instances() > 0
    }

    /// Retrieve the next `batch_size` samples.
    ///
    /// Returns `Ok(None)` once the stream cannot supply a full batch.
    fn next_instance(&mut self, batch_size: usize) -> Result<Option<Batch>>;

    /// The batch returned by the most recent `next_instance`, if any.
    fn last_instance(&self) -> Option<&Batch>;

    fn is_restartable(&self) -> bool;

    /// Rewind to the first sample. Replays the same data in the same order.
    fn restart(&mut self) -> Result<()>;

    /// Current cursor position.
    fn sample_index(&self) -> usize;

    fn n_features(&self) -> usize;

    fn n_targets(&self) -> usize;

    /// Sorted set of label values the stream can produce.
    fn class_labels(&self) -> &[i64];

    /// Short display name.
    fn name(&self) -> &str;

    /// Human readable descriptor of the stream and its parameters.
    fn info(&self) -> String;
}

/// Result of [`Cursor::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The whole requested window fits; read these rows.
    Full(Range<usize>),
    /// The window ran past the end. The cursor now sits at the end.
    Overrun,
}

/// Read position over `total` samples. Only `advance` and `reset` move it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    position: usize,
    total: usize,
}

impl Cursor {
    pub fn new(total: usize) -> Self {
        Cursor { position: 0, total }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.total - self.position
    }

    /// Move forward by `by`, clamping at the end.
    pub fn advance(&mut self, by: usize) -> Advance {
        let start = self.position;
        match start.checked_add(by) {
            Some(end) if end <= self.total => {
                self.position = end;
                Advance::Full(start..end)
            }
            _ => {
                self.position = self.total;
                Advance::Overrun
            }
        }
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }
}

pub(crate) fn check_batch_size(batch_size: usize) -> Result<()> {
    if batch_size == 0 {
        return Err(StreamLearnError::InvalidConfig(
            "batch_size must be at least 1".to_string(),
        ));
    }
    Ok(())
}
