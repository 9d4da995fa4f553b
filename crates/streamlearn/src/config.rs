use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, StreamLearnError};

/// Parameters of the synthetic multilabel generator.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MultilabelConfig {
    /// Total number of samples materialized up front.
    pub n_samples: usize,
    pub n_features: usize,
    /// Number of label columns.
    pub n_targets: usize,
    /// Active labels per sample. Must lie in `1..=n_targets`.
    pub n_labels: usize,
    /// Mean number of feature draws per sample.
    pub length: f64,
    /// Seed for reproducible data. `None` draws from entropy.
    pub random_state: Option<u64>,
}

impl Default for MultilabelConfig {
    fn default() -> Self {
        Self {
            n_samples: 40000,
            n_features: 20,
            n_targets: 5,
            n_labels: 2,
            length: 50.0,
            random_state: None,
        }
    }
}

impl MultilabelConfig {
    pub fn new(n_samples: usize, n_features: usize, n_targets: usize, n_labels: usize) -> Self {
        Self {
            n_samples,
            n_features,
            n_targets,
            n_labels,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(StreamLearnError::InvalidConfig(msg));
        if self.n_samples == 0 {
            return invalid("n_samples must be at least 1".to_string());
        }
        if self.n_features == 0 {
            return invalid("n_features must be at least 1".to_string());
        }
        if self.n_targets == 0 {
            return invalid("n_targets must be at least 1".to_string());
        }
        if self.n_labels == 0 || self.n_labels > self.n_targets {
            return invalid(format!(
                "n_labels ({}) must lie between 1 and n_targets ({})",
                self.n_labels, self.n_targets
            ));
        }
        if !self.length.is_finite() || self.length <= 0.0 {
            return invalid(format!("length must be positive, got {}", self.length));
        }
        Ok(())
    }
}

/// Baseline classifiers available through [`crate::models::factory::build_model`].
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    #[default]
    MajorityClass,
    NoChange,
}

impl ModelType {
    pub fn name(&self) -> &'static str {
        match self {
            ModelType::MajorityClass => "majority",
            ModelType::NoChange => "no-change",
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "majority" | "majority-class" => Ok(ModelType::MajorityClass),
            "no-change" | "nochange" => Ok(ModelType::NoChange),
            _ => Err(format!(
                "Unknown model type: {}. Expected one of: majority, no-change",
                s
            )),
        }
    }
}

/// Order of prediction and update for each batch when a classifier is attached.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// Predict on the batch, score, then learn from it (prequential).
    #[default]
    TestThenTrain,
    /// Learn from the batch first, then predict and score on it.
    TrainThenTest,
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "test-then-train" | "prequential" => Ok(Protocol::TestThenTrain),
            "train-then-test" => Ok(Protocol::TrainThenTest),
            _ => Err(format!(
                "Unknown protocol: {}. Expected test-then-train or train-then-test",
                s
            )),
        }
    }
}

/// Budget and batching for an evaluation run.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Stop after this many instances. `None` means unbounded.
    pub max_instances: Option<usize>,
    /// Stop after this many seconds of wall-clock time. `None` means unbounded.
    pub max_time_secs: Option<f64>,
    pub batch_size: usize,
    /// Emit a checkpoint every this many instances.
    pub report_interval: Option<usize>,
    pub protocol: Protocol,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_instances: None,
            max_time_secs: None,
            batch_size: 1,
            report_interval: None,
            protocol: Protocol::default(),
        }
    }
}

impl EvaluationConfig {
    pub fn new(
        max_instances: Option<usize>,
        max_time: Option<Duration>,
        batch_size: usize,
    ) -> Self {
        Self {
            max_instances,
            max_time_secs: max_time.map(|d| d.as_secs_f64()),
            batch_size,
            ..Default::default()
        }
    }

    pub fn with_report_interval(mut self, interval: usize) -> Self {
        self.report_interval = Some(interval);
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn max_time(&self) -> Option<Duration> {
        self.max_time_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(StreamLearnError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if let Some(secs) = self.max_time_secs {
            if !secs.is_finite() || secs < 0.0 {
                return Err(StreamLearnError::InvalidConfig(format!(
                    "max_time_secs must be a finite, non-negative number, got {}",
                    secs
                )));
            }
        }
        if self.report_interval == Some(0) {
            return Err(StreamLearnError::InvalidConfig(
                "report_interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
