use std::io::Write;

use anyhow::{Context, Result};

use streamlearn::evaluation::{EvaluationHarness, EvaluationReport};
use streamlearn::generators::MultilabelGenerator;
use streamlearn::io::open_file_stream;
use streamlearn::models::factory::build_model;
use streamlearn::stream::{DataStream, InstanceStream};

use crate::evaluate::input::{RunConfig, SourceConfig};

/// Materialize the configured source as a stream.
pub fn build_stream(source: &SourceConfig) -> Result<DataStream> {
    match source {
        SourceConfig::Generator(config) => {
            let mut generator =
                MultilabelGenerator::new(config.clone()).context("Invalid generator settings")?;
            DataStream::from_generator(&mut generator).context("Failed to generate dataset")
        }
        SourceConfig::File(options) => open_file_stream(options),
    }
}

/// Run one evaluation described by `config`.
///
/// A failed run still leaves its partial report in the log before the
/// error is returned.
pub fn run_evaluation(config: &RunConfig) -> Result<EvaluationReport> {
    let mut stream = build_stream(&config.source)?;
    log::info!("[StreamLearn::CLI] Source: {}", stream.info());

    let mut harness =
        EvaluationHarness::new(config.evaluation.clone()).context("Invalid evaluation settings")?;

    let result = match config.model {
        Some(model_type) => {
            let mut model = build_model(model_type);
            harness.run(&mut stream, Some(model.as_mut()))
        }
        None => harness.run(&mut stream, None),
    };

    match result {
        Ok(report) => Ok(report),
        Err(e) => {
            if let Some(report) = harness.last_report() {
                log::error!("[StreamLearn::CLI] Partial report:\n{}", report);
            }
            Err(e).context("Evaluation failed")
        }
    }
}

/// Write the report as pretty JSON followed by a newline.
pub fn write_report<W: Write>(report: &EvaluationReport, mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, report).context("Failed to serialize report")?;
    writeln!(out).context("Failed to write report")?;
    Ok(())
}
