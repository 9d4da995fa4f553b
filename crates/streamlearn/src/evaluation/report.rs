use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Why a run ended normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    InstanceLimit,
    TimeLimit,
    StreamExhausted,
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::InstanceLimit => "instance limit reached",
            StopReason::TimeLimit => "time limit reached",
            StopReason::StreamExhausted => "stream exhausted",
            StopReason::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Completed { reason: StopReason },
    Failed { error: String },
}

/// Periodic partial report taken every `report_interval` instances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Checkpoint {
    pub instances_processed: usize,
    #[serde(rename = "elapsed_secs", serialize_with = "duration_secs")]
    pub elapsed: Duration,
    pub throughput: f64,
    pub accuracy: Option<f64>,
}

/// Summary of one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub stream: String,
    pub model: Option<String>,
    pub started_at: DateTime<Utc>,
    pub instances_processed: usize,
    pub batches_processed: usize,
    #[serde(rename = "elapsed_secs", serialize_with = "duration_secs")]
    pub elapsed: Duration,
    /// Instances per second over the whole run.
    pub throughput: f64,
    pub predictions: usize,
    pub correct_predictions: usize,
    /// `correct_predictions / predictions`; `None` without a classifier or
    /// before anything was scored.
    pub accuracy: Option<f64>,
    pub outcome: Outcome,
    pub checkpoints: Vec<Checkpoint>,
}

impl EvaluationReport {
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self.outcome {
            Outcome::Completed { reason } => Some(reason),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stream: {}", self.stream)?;
        if let Some(model) = &self.model {
            writeln!(f, "Model: {}", model)?;
        }
        writeln!(
            f,
            "Processed {} instances in {} batches over {:.3}s ({:.1} instances/s)",
            self.instances_processed,
            self.batches_processed,
            self.elapsed.as_secs_f64(),
            self.throughput
        )?;
        if let Some(accuracy) = self.accuracy {
            writeln!(
                f,
                "Accuracy: {:.4} ({}/{})",
                accuracy, self.correct_predictions, self.predictions
            )?;
        }
        match &self.outcome {
            Outcome::Completed { reason } => write!(f, "Stopped: {}", reason),
            Outcome::Failed { error } => write!(f, "Failed: {}", error),
        }
    }
}

/// Instances per second. Zero when no time has elapsed.
pub fn throughput(instances: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        instances as f64 / secs
    } else {
        0.0
    }
}

fn duration_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
