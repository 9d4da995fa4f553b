pub mod classifier_trait;
pub mod factory;
pub mod majority_class;
pub mod no_change;
pub mod utils;

pub use classifier_trait::Classifier;
pub use majority_class::MajorityClassClassifier;
pub use no_change::NoChangeClassifier;
