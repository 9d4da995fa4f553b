//! Evaluation harness and its report.
pub mod harness;
pub mod report;

pub use harness::{EvaluationHarness, HarnessState, StopHandle};
pub use report::{Checkpoint, EvaluationReport, Outcome, StopReason};
