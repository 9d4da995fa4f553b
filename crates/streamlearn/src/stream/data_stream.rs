use crate::data_handling::{Batch, Dataset};
use crate::error::Result;
use crate::generators::Generator;
use crate::stream::{check_batch_size, Advance, Cursor, InstanceStream};

/// A restartable stream over a fully materialized [`Dataset`].
#[derive(Debug, Clone)]
pub struct DataStream {
    dataset: Dataset,
    cursor: Cursor,
    last_batch: Option<Batch>,
    name: String,
    info: String,
}

impl DataStream {
    pub fn new(dataset: Dataset, name: impl Into<String>) -> Self {
        let name = name.into();
        let info = format!(
            "{}: n_samples: {} - n_features: {} - n_targets: {}",
            name,
            dataset.n_samples(),
            dataset.n_features(),
            dataset.n_targets()
        );
        DataStream {
            cursor: Cursor::new(dataset.n_samples()),
            dataset,
            last_batch: None,
            name,
            info,
        }
    }

    /// Materialize a generator's dataset once and stream over it.
    pub fn from_generator<G: Generator + ?Sized>(generator: &mut G) -> Result<Self> {
        let dataset = generator.generate()?;
        log::debug!(
            "[StreamLearn::Stream] Generated {} samples with {}",
            dataset.n_samples(),
            generator.info()
        );
        let mut stream = DataStream::new(dataset, generator.name());
        stream.info = generator.info();
        Ok(stream)
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn n_samples(&self) -> usize {
        self.dataset.n_samples()
    }
}

impl InstanceStream for DataStream {
    fn estimated_remaining_instances(&self) -> usize {
        self.cursor.remaining()
    }

    fn next_instance(&mut self, batch_size: usize) -> Result<Option<Batch>> {
        check_batch_size(batch_size)?;
        self.last_batch = match self.cursor.advance(batch_size) {
            Advance::Full(rows) => Some(self.dataset.batch(rows.start, rows.end)),
            Advance::Overrun => {
                log::trace!(
                    "[StreamLearn::Stream] {}: request for {} samples ran past the end",
                    self.name,
                    batch_size
                );
                None
            }
        };
        Ok(self.last_batch.clone())
    }

    fn last_instance(&self) -> Option<&Batch> {
        self.last_batch.as_ref()
    }

    fn is_restartable(&self) -> bool {
        true
    }

    fn restart(&mut self) -> Result<()> {
        self.cursor.reset();
        self.last_batch = None;
        Ok(())
    }

    fn sample_index(&self) -> usize {
        self.cursor.position()
    }

    fn n_features(&self) -> usize {
        self.dataset.n_features()
    }

    fn n_targets(&self) -> usize {
        self.dataset.n_targets()
    }

    fn class_labels(&self) -> &[i64] {
        self.dataset.class_labels()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> String {
        self.info.clone()
    }
}
