use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{Result, StreamLearnError};
use crate::models::classifier_trait::Classifier;
use crate::models::utils::ModelSchema;

/// Predicts the most recently seen label for every sample.
///
/// A strong baseline on streams with temporal label dependence.
#[derive(Debug, Clone, Default)]
pub struct NoChangeClassifier {
    schema: Option<ModelSchema>,
    last_label: Option<i64>,
}

impl NoChangeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn prediction(&self) -> Result<(&ModelSchema, i64)> {
        let schema = self.schema.as_ref().ok_or_else(|| StreamLearnError::UnfitModel {
            model: self.name().to_string(),
        })?;
        // schema never holds an empty class set
        let label = self.last_label.unwrap_or(schema.classes()[0]);
        Ok((schema, label))
    }
}

impl Classifier for NoChangeClassifier {
    fn fit(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, i64>,
        classes: Option<&[i64]>,
    ) -> Result<()> {
        self.schema = Some(ModelSchema::from_fit(x, y, classes)?);
        self.last_label = y.iter().next_back().copied();
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
        if let Some(&label) = y.iter().next_back() {
            self.last_label = Some(label);
        }
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<i64>> {
        let (schema, label) = self.prediction()?;
        schema.check_query(x)?;
        Ok(Array1::from_elem(x.nrows(), label))
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let (schema, label) = self.prediction()?;
        schema.check_query(x)?;
        let classes = schema.classes();
        Ok(Array2::from_shape_fn((x.nrows(), classes.len()), |(_, c)| {
            if classes[c] == label {
                1.0
            } else {
                0.0
            }
        }))
    }

    fn classes(&self) -> &[i64] {
        self.schema.as_ref().map(|s| s.classes()).unwrap_or(&[])
    }

    fn is_fitted(&self) -> bool {
        self.schema.is_some()
    }

    fn name(&self) -> &str {
        "NoChangeClassifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn predicts_last_label() {
        let mut model = NoChangeClassifier::new();
        let x = Array2::<f64>::zeros((3, 2));
        model.first_fit(x.view(), array![0, 1, 2].view(), None).unwrap();
        assert_eq!(model.predict(x.view()).unwrap(), array![2, 2, 2]);
        model.partial_fit(x.slice(ndarray::s![..1, ..]), array![1].view(), None).unwrap();
        assert_eq!(model.predict(x.view()).unwrap(), array![1, 1, 1]);
    }

    #[test]
    fn proba_is_one_hot_over_declared_classes() {
        let mut model = NoChangeClassifier::new();
        let x = Array2::<f64>::zeros((2, 1));
        model.fit(x.view(), array![3, 1].view(), Some(&[1, 2, 3][..])).unwrap();
        let proba = model.predict_proba(x.view()).unwrap();
        assert_eq!(proba, array![[1.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
    }

    #[test]
    fn unfit_model_is_rejected() {
        let model = NoChangeClassifier::new();
        let x = Array2::<f64>::zeros((1, 1));
        let err = model.predict(x.view()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "NoChangeClassifier has not been fit yet; call fit, first_fit or partial_fit first"
        );
    }

    #[test]
    fn score_is_accuracy() {
        let mut model = NoChangeClassifier::new();
        let x = Array2::<f64>::zeros((4, 1));
        assert!(model.fit(x.view(), array![0, 1].view(), None).is_err());
        model.fit(x.view(), array![0, 0, 1, 1].view(), None).unwrap();
        let score = model.score(x.view(), array![1, 0, 1, 1].view()).unwrap();
        assert!((score - 0.75).abs() < 1e-12);
    }
}
