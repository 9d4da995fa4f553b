use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use ndarray::{ArrayView1, ArrayView2};

use crate::config::{EvaluationConfig, Protocol};
use crate::data_handling::Batch;
use crate::error::{Result, StreamLearnError};
use crate::evaluation::report::{throughput, Checkpoint, EvaluationReport, Outcome, StopReason};
use crate::models::utils::count_correct;
use crate::models::Classifier;
use crate::stream::InstanceStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessState {
    Idle,
    Running,
    Stopped,
}

/// Cancels a run at the next iteration boundary. Cheap to clone and `Send`.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
struct Tally {
    instances: usize,
    batches: usize,
    predictions: usize,
    correct: usize,
    checkpoints: Vec<Checkpoint>,
}

impl Tally {
    fn accuracy(&self) -> Option<f64> {
        if self.predictions == 0 {
            None
        } else {
            Some(self.correct as f64 / self.predictions as f64)
        }
    }

    fn checkpoint(&self, elapsed: Duration) -> Checkpoint {
        Checkpoint {
            instances_processed: self.instances,
            elapsed,
            throughput: throughput(self.instances, elapsed),
            accuracy: self.accuracy(),
        }
    }
}

/// Drives a stream, optionally through a classifier, under an
/// instance/time budget and reports throughput and accuracy.
///
/// The stopping conditions (cancellation, instance budget, time budget,
/// stream exhaustion) are checked once per batch, before the batch is
/// pulled. A batch in flight is always finished, so the instance count can
/// exceed `max_instances` by up to `batch_size - 1`.
pub struct EvaluationHarness {
    config: EvaluationConfig,
    max_time: Option<Duration>,
    state: HarnessState,
    stop: StopHandle,
    last_report: Option<EvaluationReport>,
}

impl EvaluationHarness {
    pub fn new(config: EvaluationConfig) -> Result<Self> {
        config.validate()?;
        let max_time = config.max_time();
        Ok(Self {
            config,
            max_time,
            state: HarnessState::Idle,
            stop: StopHandle::default(),
            last_report: None,
        })
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn state(&self) -> HarnessState {
        self.state
    }

    /// Handle for cancelling the run from elsewhere (another thread or a
    /// classifier callback).
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Report of the most recent run, including failed ones.
    pub fn last_report(&self) -> Option<&EvaluationReport> {
        self.last_report.as_ref()
    }

    /// Run one evaluation to completion.
    ///
    /// Errors from the stream, the batch shape checks or the classifier end
    /// the run: the harness stops, keeps a failure-tagged report in
    /// [`EvaluationHarness::last_report`] and returns the error.
    pub fn run(
        &mut self,
        stream: &mut (dyn InstanceStream + '_),
        mut classifier: Option<&mut (dyn Classifier + '_)>,
    ) -> Result<EvaluationReport> {
        self.state = HarnessState::Running;
        let model_name = classifier.as_ref().map(|m| m.name().to_string());
        log::info!(
            "[StreamLearn::Evaluation] Evaluating {} (model: {}, batch size: {}, protocol: {:?})",
            stream.info(),
            model_name.as_deref().unwrap_or("none"),
            self.config.batch_size,
            self.config.protocol
        );

        let started_at = Utc::now();
        let start = Instant::now();
        let mut tally = Tally::default();
        let result = self.drive(stream, &mut classifier, start, &mut tally);
        let elapsed = start.elapsed();

        let outcome = match &result {
            Ok(reason) => Outcome::Completed { reason: *reason },
            Err(e) => Outcome::Failed {
                error: e.to_string(),
            },
        };
        let report = EvaluationReport {
            stream: stream.name().to_string(),
            model: model_name,
            started_at,
            instances_processed: tally.instances,
            batches_processed: tally.batches,
            elapsed,
            throughput: throughput(tally.instances, elapsed),
            predictions: tally.predictions,
            correct_predictions: tally.correct,
            accuracy: tally.accuracy(),
            outcome,
            checkpoints: tally.checkpoints,
        };

        self.stop.clear();
        self.state = HarnessState::Stopped;
        self.last_report = Some(report.clone());

        match result {
            Ok(reason) => {
                log::info!(
                    "[StreamLearn::Evaluation] Stopped ({}): {} instances in {:.3}s, {:.1} instances/s",
                    reason,
                    report.instances_processed,
                    report.elapsed.as_secs_f64(),
                    report.throughput
                );
                Ok(report)
            }
            Err(e) => {
                log::warn!(
                    "[StreamLearn::Evaluation] Run failed after {} instances: {}",
                    report.instances_processed,
                    e
                );
                Err(e)
            }
        }
    }

    fn drive(
        &self,
        stream: &mut (dyn InstanceStream + '_),
        classifier: &mut Option<&mut (dyn Classifier + '_)>,
        start: Instant,
        tally: &mut Tally,
    ) -> Result<StopReason> {
        let batch_size = self.config.batch_size;
        let mut next_checkpoint = self.config.report_interval;

        loop {
            if let Some(reason) = self.should_stop(stream, start, tally) {
                return Ok(reason);
            }

            let Some(batch) = stream.next_instance(batch_size)? else {
                return Ok(StopReason::StreamExhausted);
            };
            check_batch(&batch, stream.n_features())?;

            // Counts land in the tally only once the whole batch succeeded.
            if let Some(model) = classifier.as_mut() {
                let scored = self.process(&mut **model, &batch, stream.class_labels())?;
                if let Some(scored) = scored {
                    tally.predictions += scored.predictions;
                    tally.correct += scored.correct;
                }
            }

            tally.instances += batch.len();
            tally.batches += 1;
            log::trace!(
                "[StreamLearn::Evaluation] Batch {} done, {} instances so far",
                tally.batches,
                tally.instances
            );

            if let (Some(at), Some(interval)) = (next_checkpoint, self.config.report_interval) {
                if tally.instances >= at {
                    let checkpoint = tally.checkpoint(start.elapsed());
                    log::info!(
                        "[StreamLearn::Evaluation] {} instances, {:.1} instances/s, accuracy: {}",
                        checkpoint.instances_processed,
                        checkpoint.throughput,
                        checkpoint
                            .accuracy
                            .map(|a| format!("{:.4}", a))
                            .unwrap_or_else(|| "n/a".to_string())
                    );
                    tally.checkpoints.push(checkpoint);
                    next_checkpoint = Some((tally.instances / interval + 1) * interval);
                }
            }
        }
    }

    fn should_stop(
        &self,
        stream: &(dyn InstanceStream + '_),
        start: Instant,
        tally: &Tally,
    ) -> Option<StopReason> {
        if self.stop.is_cancelled() {
            return Some(StopReason::Cancelled);
        }
        if let Some(max) = self.config.max_instances {
            if tally.instances >= max {
                return Some(StopReason::InstanceLimit);
            }
        }
        if let Some(max) = self.max_time {
            if start.elapsed() >= max {
                return Some(StopReason::TimeLimit);
            }
        }
        if !stream.has_more_instances() {
            return Some(StopReason::StreamExhausted);
        }
        None
    }

    /// Route one batch through the model. Returns the batch's scores, or
    /// `None` when the protocol leaves it unscored.
    fn process(
        &self,
        model: &mut (dyn Classifier + '_),
        batch: &Batch,
        classes: &[i64],
    ) -> Result<Option<Scored>> {
        let y = batch.y.as_single().ok_or_else(|| {
            StreamLearnError::shape("classifier labels", (batch.len(), 1), batch.y.shape())
        })?;
        let x = batch.x.view();

        if !model.is_fitted() {
            model.first_fit(x, y, Some(classes))?;
            return match self.config.protocol {
                Protocol::TestThenTrain => Ok(None),
                Protocol::TrainThenTest => Scored::of(&*model, x, y).map(Some),
            };
        }

        let scored = match self.config.protocol {
            Protocol::TestThenTrain => {
                let scored = Scored::of(&*model, x, y)?;
                model.partial_fit(x, y, Some(classes))?;
                scored
            }
            Protocol::TrainThenTest => {
                model.partial_fit(x, y, Some(classes))?;
                Scored::of(&*model, x, y)?
            }
        };
        Ok(Some(scored))
    }
}

/// Prediction counts for a single batch.
#[derive(Debug, Clone, Copy)]
struct Scored {
    predictions: usize,
    correct: usize,
}

impl Scored {
    fn of(
        model: &(dyn Classifier + '_),
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, i64>,
    ) -> Result<Self> {
        let predicted = model.predict(x)?;
        Ok(Scored {
            predictions: y.len(),
            correct: count_correct(predicted.view(), y)?,
        })
    }
}

fn check_batch(batch: &Batch, n_features: usize) -> Result<()> {
    batch.validate()?;
    if batch.x.ncols() != n_features {
        return Err(StreamLearnError::shape(
            "batch features",
            (batch.len(), n_features),
            batch.x.dim(),
        ));
    }
    Ok(())
}
