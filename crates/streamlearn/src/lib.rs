//! streamlearn: batch streams, incremental classifiers and an evaluation harness.
//!
//! A stream owns a fully materialized dataset and a read cursor and hands it out
//! in fixed-size batches. Classifiers implement a small incremental-learning
//! contract, and the evaluation harness drives a stream (optionally through a
//! classifier) under an instance/time budget, reporting throughput and accuracy.
//!
//! Concrete data sources (a multilabel generator and a delimited-text reader)
//! and two baseline classifiers are included so the contracts can be exercised
//! end to end.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod evaluation;
pub mod generators;
pub mod io;
pub mod models;
pub mod stream;

pub use error::{Result, StreamLearnError};
