//! Dataset generators.
//!
//! A generator materializes a whole [`Dataset`] in one call; wrap it with
//! [`crate::stream::DataStream::from_generator`] to stream over the result.
pub mod multilabel;

pub use multilabel::MultilabelGenerator;

use crate::data_handling::Dataset;
use crate::error::Result;

pub trait Generator {
    fn generate(&mut self) -> Result<Dataset>;

    fn name(&self) -> &str;

    fn info(&self) -> String;
}
