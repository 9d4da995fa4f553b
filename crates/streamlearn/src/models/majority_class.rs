use std::collections::HashMap;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{Result, StreamLearnError};
use crate::models::classifier_trait::Classifier;
use crate::models::utils::ModelSchema;

/// Predicts the most frequent class seen so far.
///
/// Ties go to the smallest label. Probabilities are the observed class
/// frequencies; declared classes that were never observed get zero.
#[derive(Debug, Clone, Default)]
pub struct MajorityClassClassifier {
    schema: Option<ModelSchema>,
    counts: HashMap<i64, u64>,
}

impl MajorityClassClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema(&self) -> Result<&ModelSchema> {
        self.schema.as_ref().ok_or_else(|| StreamLearnError::UnfitModel {
            model: self.name().to_string(),
        })
    }

    fn count(&mut self, y: ArrayView1<'_, i64>) {
        for &label in y.iter() {
            *self.counts.entry(label).or_insert(0) += 1;
        }
    }

    fn count_of(&self, label: i64) -> u64 {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    fn majority(&self, schema: &ModelSchema) -> i64 {
        let mut best = schema.classes()[0];
        for &class in schema.classes() {
            if self.count_of(class) > self.count_of(best) {
                best = class;
            }
        }
        best
    }
}

impl Classifier for MajorityClassClassifier {
    fn fit(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, i64>,
        classes: Option<&[i64]>,
    ) -> Result<()> {
        let schema = ModelSchema::from_fit(x, y, classes)?;
        self.counts.clear();
        self.schema = Some(schema);
        self.count(y);
        Ok(())
    }

    fn partial_fit(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, i64>,
        classes: Option<&[i64]>,
    ) -> Result<()> {
        match self.schema.as_mut() {
            Some(schema) => schema.absorb(x, y, classes)?,
            None => self.schema = Some(ModelSchema::from_fit(x, y, classes)?),
        }
        self.count(y);
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<i64>> {
        let schema = self.schema()?;
        schema.check_query(x)?;
        Ok(Array1::from_elem(x.nrows(), self.majority(schema)))
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let schema = self.schema()?;
        schema.check_query(x)?;
        let classes = schema.classes();
        let total: u64 = classes.iter().map(|&c| self.count_of(c)).sum();
        let row: Vec<f64> = if total == 0 {
            vec![1.0 / classes.len() as f64; classes.len()]
        } else {
            classes
                .iter()
                .map(|&c| self.count_of(c) as f64 / total as f64)
                .collect()
        };
        Ok(Array2::from_shape_fn((x.nrows(), classes.len()), |(_, c)| row[c]))
    }

    fn classes(&self) -> &[i64] {
        self.schema.as_ref().map(|s| s.classes()).unwrap_or(&[])
    }

    fn is_fitted(&self) -> bool {
        self.schema.is_some()
    }

    fn name(&self) -> &str {
        "MajorityClassClassifier"
    }
}
