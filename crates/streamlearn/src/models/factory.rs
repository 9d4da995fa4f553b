use crate::config::ModelType;
use crate::models::classifier_trait::Classifier;
use crate::models::majority_class::MajorityClassClassifier;
use crate::models::no_change::NoChangeClassifier;

/// Build a boxed, untrained classifier from a `ModelType`.
pub fn build_model(model_type: ModelType) -> Box<dyn Classifier> {
    match model_type {
        ModelType::MajorityClass => Box::new(MajorityClassClassifier::new()),
        ModelType::NoChange => Box::new(NoChangeClassifier::new()),
    }
}
