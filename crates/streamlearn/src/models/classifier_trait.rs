use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::Result;
use crate::models::utils::accuracy;

/// Contract for classifiers that learn incrementally from a stream.
///
/// `x` has one row per sample; `y` holds one class label per row. When
/// `classes` is given it declares the full label set, which may include
/// classes absent from `y`; implementations must honor it.
///
/// Queries (`predict`, `predict_proba`, `score`) on a model that was never
/// fit return [`crate::StreamLearnError::UnfitModel`].
pub trait Classifier {
    /// First exposure to data. Classes seen or declared here become the
    /// known label set for later incremental updates.
    fn first_fit(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, i64>,
        classes: Option<&[i64]>,
    ) -> Result<()> {
        self.fit(x, y, classes)
    }

    /// Train from scratch, discarding any previous state.
    fn fit(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, i64>,
        classes: Option<&[i64]>,
    ) -> Result<()>;

    /// Update the model with one more batch. The known class set may grow.
    fn partial_fit(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, i64>,
        classes: Option<&[i64]>,
    ) -> Result<()>;

    /// One predicted label per row of `x`.
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<i64>>;

    /// Per-class probabilities; columns follow [`Classifier::classes`].
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>>;

    /// Mean accuracy of `predict(x)` against `y`.
    fn score(&self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, i64>) -> Result<f64> {
        let predictions = self.predict(x)?;
        accuracy(predictions.view(), y)
    }

    /// Known classes in ascending order. Empty before the first fit.
    fn classes(&self) -> &[i64];

    fn is_fitted(&self) -> bool;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
