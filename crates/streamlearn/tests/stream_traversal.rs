//! Integration tests for stream traversal, exhaustion and restart.

use streamlearn::config::MultilabelConfig;
use streamlearn::data_handling::Labels;
use streamlearn::generators::MultilabelGenerator;
use streamlearn::stream::{DataStream, InstanceStream};

fn generated(n_samples: usize, n_features: usize, n_targets: usize, n_labels: usize) -> DataStream {
    let config = MultilabelConfig::new(n_samples, n_features, n_targets, n_labels).with_seed(2024);
    let mut generator = MultilabelGenerator::new(config).expect("valid generator config");
    DataStream::from_generator(&mut generator).expect("generation succeeds")
}

// ---------------------------------------------------------------------------
// Exhaustion
// ---------------------------------------------------------------------------

#[test]
fn even_batches_cover_the_dataset_exactly() {
    for batch_size in [1, 2, 5, 10, 20] {
        let mut stream = generated(20, 3, 2, 1);
        let mut sizes = Vec::new();
        while let Some(batch) = stream.next_instance(batch_size).unwrap() {
            assert!(!batch.is_empty());
            sizes.push(batch.len());
        }
        assert_eq!(sizes.len(), 20 / batch_size);
        assert_eq!(sizes.iter().sum::<usize>(), 20);
        assert!(stream.next_instance(batch_size).unwrap().is_none());
    }
}

#[test]
fn single_steps_over_ten_samples() {
    let mut stream = generated(10, 4, 1, 1);
    for call in 1..=10 {
        let batch = stream.next_instance(1).unwrap();
        assert!(batch.is_some(), "call {} should return a batch", call);
        if call < 10 {
            assert!(stream.has_more_instances(), "more instances after call {}", call);
        } else {
            assert!(!stream.has_more_instances());
        }
    }
    assert!(stream.next_instance(1).unwrap().is_none());
}

#[test]
fn has_more_matches_remaining_at_every_cursor() {
    let mut stream = generated(23, 2, 3, 2);
    loop {
        assert_eq!(
            stream.has_more_instances(),
            stream.estimated_remaining_instances() > 0
        );
        if stream.next_instance(4).unwrap().is_none() {
            break;
        }
    }
    assert_eq!(
        stream.has_more_instances(),
        stream.estimated_remaining_instances() > 0
    );
    assert_eq!(stream.sample_index(), 23);
}

#[test]
fn straddling_the_end_discards_the_tail() {
    let mut stream = generated(50, 2, 1, 1);
    let mut served = 0;
    while let Some(batch) = stream.next_instance(7).unwrap() {
        assert_eq!(batch.len(), 7);
        served += batch.len();
    }
    assert_eq!(served, 49);
    assert_eq!(stream.estimated_remaining_instances(), 0);
}

// ---------------------------------------------------------------------------
// Restart
// ---------------------------------------------------------------------------

#[test]
fn restart_replays_the_first_batch() {
    let mut stream = generated(30, 5, 3, 2);
    assert!(stream.is_restartable());
    let first = stream.next_instance(6).unwrap().unwrap();
    while stream.next_instance(6).unwrap().is_some() {}
    stream.restart().unwrap();
    assert_eq!(stream.sample_index(), 0);
    assert!(stream.has_more_instances());
    let replay = stream.next_instance(6).unwrap().unwrap();
    assert_eq!(first, replay);
}

// ---------------------------------------------------------------------------
// Label shape and metadata
// ---------------------------------------------------------------------------

#[test]
fn single_target_labels_are_flat() {
    let mut stream = generated(10, 4, 1, 1);
    let batch = stream.next_instance(5).unwrap().unwrap();
    match batch.y {
        Labels::Single(y) => assert_eq!(y.len(), 5),
        Labels::Multi(_) => panic!("single-target labels must be flattened"),
    }
}

#[test]
fn multilabel_batch_has_fixed_density() {
    let mut stream = generated(40, 6, 4, 2);
    let batch = stream.next_instance(3).unwrap().unwrap();
    let y = batch.y.as_multi().expect("multi-target labels stay 2-D");
    assert_eq!(y.dim(), (3, 4));
    for row in y.rows() {
        assert_eq!(row.iter().filter(|&&v| v != 0).count(), 2);
    }
    assert_eq!(batch.x.dim(), (3, 6));
}

#[test]
fn metadata_describes_the_generator() {
    let stream = generated(40, 6, 4, 2);
    assert_eq!(stream.n_features(), 6);
    assert_eq!(stream.n_targets(), 4);
    assert_eq!(stream.class_labels(), &[0, 1]);
    assert_eq!(stream.name(), "Multilabel dataset");
    assert_eq!(
        stream.info(),
        "MultilabelGenerator: n_samples: 40 - n_features: 6 - n_targets: 4 - n_labels: 2"
    );
}

#[test]
fn last_instance_tracks_latest_batch() {
    let mut stream = generated(8, 2, 2, 1);
    let batch = stream.next_instance(4).unwrap().unwrap();
    assert_eq!(stream.last_instance(), Some(&batch));
    assert_eq!(stream.sample_index(), 4);
    stream.next_instance(5).unwrap();
    assert!(stream.last_instance().is_none());
}
