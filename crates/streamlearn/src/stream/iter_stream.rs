use ndarray::{Array1, Array2};

use crate::data_handling::{Batch, Labels};
use crate::error::{Result, StreamLearnError};
use crate::stream::{check_batch_size, InstanceStream};

/// One sample: feature values and one label per target.
pub type Row = (Vec<f64>, Vec<i64>);

/// A single-pass stream that pulls rows from an iterator on demand.
///
/// Nothing is materialized up front, so the stream cannot be restarted and
/// the class set has to be declared by the caller. Exhaustion follows the
/// same full-batch-only rule as [`crate::stream::DataStream`].
pub struct IterStream<I: Iterator<Item = Row>> {
    rows: I,
    next_row: Option<Row>,
    consumed: usize,
    n_features: usize,
    n_targets: usize,
    classes: Vec<i64>,
    last_batch: Option<Batch>,
    name: String,
}

impl<I: Iterator<Item = Row>> IterStream<I> {
    pub fn new(
        rows: I,
        n_features: usize,
        n_targets: usize,
        classes: Vec<i64>,
        name: impl Into<String>,
    ) -> Result<Self> {
        if n_targets == 0 {
            return Err(StreamLearnError::InvalidConfig(
                "n_targets must be at least 1".to_string(),
            ));
        }
        let mut classes = classes;
        classes.sort_unstable();
        classes.dedup();
        let mut rows = rows;
        let next_row = rows.next();
        Ok(IterStream {
            rows,
            next_row,
            consumed: 0,
            n_features,
            n_targets,
            classes,
            last_batch: None,
            name: name.into(),
        })
    }

    fn pull(&mut self) -> Option<Row> {
        let row = self.next_row.take()?;
        self.next_row = self.rows.next();
        self.consumed += 1;
        Some(row)
    }

    fn check_row(&self, index: usize, row: &Row) -> Result<()> {
        let (x, y) = row;
        if x.len() != self.n_features || y.len() != self.n_targets {
            return Err(StreamLearnError::shape(
                format!("row {} of {}", index, self.name),
                (self.n_features, self.n_targets),
                (x.len(), y.len()),
            ));
        }
        if let Some(label) = y.iter().find(|&&l| self.classes.binary_search(&l).is_err()) {
            return Err(StreamLearnError::InvalidConfig(format!(
                "row {} of {} has label {} outside the declared classes {:?}",
                index, self.name, label, self.classes
            )));
        }
        Ok(())
    }
}

impl<I: Iterator<Item = Row>> InstanceStream for IterStream<I> {
    fn estimated_remaining_instances(&self) -> usize {
        match self.next_row {
            Some(_) => 1 + self.rows.size_hint().0,
            None => 0,
        }
    }

    fn next_instance(&mut self, batch_size: usize) -> Result<Option<Batch>> {
        check_batch_size(batch_size)?;
        self.last_batch = None;

        let mut features = Vec::new();
        let mut labels = Vec::new();
        let mut taken = 0;
        while taken < batch_size {
            let index = self.consumed;
            let Some(row) = self.pull() else { break };
            self.check_row(index, &row)?;
            features.extend(row.0);
            labels.extend(row.1);
            taken += 1;
        }
        if taken < batch_size {
            log::trace!(
                "[StreamLearn::Stream] {}: discarded a tail of {} samples",
                self.name,
                taken
            );
            return Ok(None);
        }

        let x = Array2::from_shape_vec((batch_size, self.n_features), features)
            .map_err(|e| StreamLearnError::Model(e.to_string()))?;
        let y = if self.n_targets < 2 {
            Labels::Single(Array1::from_vec(labels))
        } else {
            Labels::Multi(
                Array2::from_shape_vec((batch_size, self.n_targets), labels)
                    .map_err(|e| StreamLearnError::Model(e.to_string()))?,
            )
        };
        let batch = Batch::new(x, y)?;
        self.last_batch = Some(batch.clone());
        Ok(Some(batch))
    }

    fn last_instance(&self) -> Option<&Batch> {
        self.last_batch.as_ref()
    }

    fn is_restartable(&self) -> bool {
        false
    }

    fn restart(&mut self) -> Result<()> {
        Err(StreamLearnError::NotRestartable {
            stream: self.name.clone(),
        })
    }

    fn sample_index(&self) -> usize {
        self.consumed
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_targets(&self) -> usize {
        self.n_targets
    }

    fn class_labels(&self) -> &[i64] {
        &self.classes
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> String {
        format!(
            "{}: lazy - n_features: {} - n_targets: {}",
            self.name, self.n_features, self.n_targets
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> impl Iterator<Item = Row> {
        (0..n).map(|i| (vec![i as f64, 1.0], vec![(i % 2) as i64]))
    }

    #[test]
    fn serves_full_batches_lazily() {
        let mut stream = IterStream::new(rows(4), 2, 1, vec![1, 0], "lazy").unwrap();
        assert_eq!(stream.class_labels(), &[0, 1]);
        assert_eq!(stream.estimated_remaining_instances(), 4);
        let batch = stream.next_instance(2).unwrap().unwrap();
        assert_eq!(batch.x.dim(), (2, 2));
        assert_eq!(batch.y.as_single().unwrap().to_vec(), vec![0, 1]);
        assert_eq!(stream.sample_index(), 2);
        assert!(stream.has_more_instances());
    }

    #[test]
    fn short_tail_is_exhaustion() {
        let mut stream = IterStream::new(rows(3), 2, 1, vec![0, 1], "lazy").unwrap();
        assert!(stream.next_instance(2).unwrap().is_some());
        assert!(stream.next_instance(2).unwrap().is_none());
        assert!(!stream.has_more_instances());
        assert_eq!(stream.estimated_remaining_instances(), 0);
        assert!(stream.next_instance(1).unwrap().is_none());
    }

    #[test]
    fn restart_is_refused() {
        let mut stream = IterStream::new(rows(1), 2, 1, vec![0, 1], "lazy").unwrap();
        assert!(!stream.is_restartable());
        let err = stream.restart().unwrap_err();
        assert!(matches!(err, StreamLearnError::NotRestartable { ref stream } if stream == "lazy"));
    }

    #[test]
    fn malformed_row_is_a_shape_mismatch() {
        let bad = vec![(vec![1.0], vec![0])].into_iter();
        let mut stream = IterStream::new(bad, 2, 1, vec![0], "bad").unwrap();
        let err = stream.next_instance(1).unwrap_err();
        assert!(matches!(
            err,
            StreamLearnError::ShapeMismatch { expected: (2, 1), actual: (1, 1), .. }
        ));
    }

    #[test]
    fn undeclared_label_is_rejected() {
        let odd = vec![(vec![1.0], vec![7])].into_iter();
        let mut stream = IterStream::new(odd, 1, 1, vec![0, 1], "odd").unwrap();
        assert!(stream.next_instance(1).is_err());
    }
}
