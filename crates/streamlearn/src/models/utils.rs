use std::collections::BTreeSet;

use ndarray::{ArrayView1, ArrayView2};

use crate::error::{Result, StreamLearnError};

/// Input width and label set a model has committed to.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    n_features: usize,
    classes: Vec<i64>,
}

impl ModelSchema {
    /// Start a schema from a (first) training batch.
    pub fn from_fit(
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, i64>,
        classes: Option<&[i64]>,
    ) -> Result<Self> {
        check_rows(x, y)?;
        let mut schema = ModelSchema {
            n_features: x.ncols(),
            classes: Vec::new(),
        };
        schema.merge_classes(y, classes);
        if schema.classes.is_empty() {
            return Err(StreamLearnError::Model(
                "cannot fit without any labels or declared classes".to_string(),
            ));
        }
        Ok(schema)
    }

    /// Accept another training batch, growing the class set.
    pub fn absorb(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, i64>,
        classes: Option<&[i64]>,
    ) -> Result<()> {
        check_rows(x, y)?;
        self.check_query(x)?;
        self.merge_classes(y, classes);
        Ok(())
    }

    pub fn check_query(&self, x: ArrayView2<'_, f64>) -> Result<()> {
        if x.ncols() != self.n_features {
            return Err(StreamLearnError::shape(
                "classifier input",
                (x.nrows(), self.n_features),
                x.dim(),
            ));
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn merge_classes(&mut self, y: ArrayView1<'_, i64>, declared: Option<&[i64]>) {
        let mut set: BTreeSet<i64> = self.classes.iter().copied().collect();
        set.extend(y.iter().copied());
        if let Some(declared) = declared {
            set.extend(declared.iter().copied());
        }
        self.classes = set.into_iter().collect();
    }
}

pub fn check_rows(x: ArrayView2<'_, f64>, y: ArrayView1<'_, i64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(StreamLearnError::shape(
            "training labels",
            (x.nrows(), 1),
            (y.len(), 1),
        ));
    }
    Ok(())
}

/// Number of positions where `predicted` equals `truth`.
pub fn count_correct(predicted: ArrayView1<'_, i64>, truth: ArrayView1<'_, i64>) -> Result<usize> {
    if predicted.len() != truth.len() {
        return Err(StreamLearnError::shape(
            "predicted labels",
            (truth.len(), 1),
            (predicted.len(), 1),
        ));
    }
    Ok(predicted
        .iter()
        .zip(truth.iter())
        .filter(|(p, t)| p == t)
        .count())
}

/// Fraction of positions where `predicted` equals `truth`.
pub fn accuracy(predicted: ArrayView1<'_, i64>, truth: ArrayView1<'_, i64>) -> Result<f64> {
    let correct = count_correct(predicted, truth)?;
    if truth.is_empty() {
        return Ok(0.0);
    }
    Ok(correct as f64 / truth.len() as f64)
}
