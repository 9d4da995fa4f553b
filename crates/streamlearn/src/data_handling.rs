//! In-memory datasets and the batches sliced out of them.
//!
//! `Dataset` holds the immutable feature/label matrices a stream serves from.
//! `Batch` is one retrieval: a 2-D feature block plus labels whose shape
//! depends on the number of targets (see [`Labels`]).
use std::collections::BTreeSet;

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{Result, StreamLearnError};

/// Labels of a batch.
///
/// Single-target data (`n_targets < 2`) is flattened to one label per row;
/// multi-target data keeps one column per target.
#[derive(Debug, Clone, PartialEq)]
pub enum Labels {
    Single(Array1<i64>),
    Multi(Array2<i64>),
}

impl Labels {
    pub fn nrows(&self) -> usize {
        match self {
            Labels::Single(y) => y.len(),
            Labels::Multi(y) => y.nrows(),
        }
    }

    pub fn ncols(&self) -> usize {
        match self {
            Labels::Single(_) => 1,
            Labels::Multi(y) => y.ncols(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    pub fn is_single(&self) -> bool {
        matches!(self, Labels::Single(_))
    }

    pub fn as_single(&self) -> Option<ArrayView1<'_, i64>> {
        match self {
            Labels::Single(y) => Some(y.view()),
            Labels::Multi(_) => None,
        }
    }

    pub fn as_multi(&self) -> Option<ArrayView2<'_, i64>> {
        match self {
            Labels::Single(_) => None,
            Labels::Multi(y) => Some(y.view()),
        }
    }
}

/// One retrieval's worth of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub x: Array2<f64>,
    pub y: Labels,
}

impl Batch {
    /// Build a batch, rejecting feature/label row count disagreement.
    pub fn new(x: Array2<f64>, y: Labels) -> Result<Self> {
        let batch = Batch { x, y };
        batch.validate()?;
        Ok(batch)
    }

    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.x.nrows() == 0
    }

    pub fn validate(&self) -> Result<()> {
        if self.x.nrows() != self.y.nrows() {
            return Err(StreamLearnError::shape(
                "batch labels",
                (self.x.nrows(), self.y.ncols()),
                self.y.shape(),
            ));
        }
        Ok(())
    }
}

/// A fully materialized, immutable dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    x: Array2<f64>,
    y: Array2<i64>,
    classes: Vec<i64>,
}

impl Dataset {
    /// Wrap a feature matrix and a label matrix (one column per target).
    pub fn new(x: Array2<f64>, y: Array2<i64>) -> Result<Self> {
        if x.nrows() != y.nrows() {
            return Err(StreamLearnError::shape(
                "dataset labels",
                (x.nrows(), y.ncols()),
                y.dim(),
            ));
        }
        if y.ncols() == 0 {
            return Err(StreamLearnError::InvalidConfig(
                "a dataset needs at least one target column".to_string(),
            ));
        }
        let classes = y.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        Ok(Dataset { x, y, classes })
    }

    /// Single-target convenience constructor.
    pub fn from_single_target(x: Array2<f64>, y: Array1<i64>) -> Result<Self> {
        Dataset::new(x, y.insert_axis(Axis(1)))
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn n_targets(&self) -> usize {
        self.y.ncols()
    }

    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView2<'_, i64> {
        self.y.view()
    }

    /// Sorted distinct label values.
    pub fn class_labels(&self) -> &[i64] {
        &self.classes
    }

    /// Copy rows `[start, end)` into a batch, flattening single-target labels.
    ///
    /// Callers guarantee `start <= end <= n_samples`.
    pub fn batch(&self, start: usize, end: usize) -> Batch {
        let x = self.x.slice(s![start..end, ..]).to_owned();
        let y = if self.n_targets() < 2 {
            Labels::Single(self.y.slice(s![start..end, 0]).to_owned())
        } else {
            Labels::Multi(self.y.slice(s![start..end, ..]).to_owned())
        };
        Batch { x, y }
    }
}
