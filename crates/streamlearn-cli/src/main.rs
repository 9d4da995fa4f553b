use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use streamlearn_cli::evaluate::input::RunConfig;
use streamlearn_cli::evaluate::runner::{run_evaluation, write_report};

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(
            env_logger::Env::default().filter_or("STREAMLEARN_LOG", "error,streamlearn=info"),
        )
        .init();

    let matches = Command::new("streamlearn")
        .version(clap::crate_version!())
        .about("Drive data streams through the streamlearn evaluation harness")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("speed")
                .about("Measure stream generation speed without a classifier")
                .args(source_args())
                .args(evaluation_args()),
        )
        .subcommand(
            Command::new("prequential")
                .about("Evaluate a baseline classifier batch by batch")
                .args(source_args())
                .args(evaluation_args())
                .arg(
                    Arg::new("model")
                        .short('m')
                        .long("model")
                        .help("Baseline classifier. Overrides the model in the configuration file.")
                        .value_parser(["majority", "no-change"])
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("protocol")
                        .long("protocol")
                        .help("Whether each batch is scored before or after the model learns from it.")
                        .value_parser(["test-then-train", "train-then-test"])
                        .value_hint(ValueHint::Other),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("speed", sub_m)) => handle_run(sub_m, false),
        Some(("prequential", sub_m)) => handle_run(sub_m, true),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_run(matches: &ArgMatches, with_model: bool) -> Result<()> {
    if let Some(config_path) = matches.get_one::<PathBuf>("config") {
        log::info!("[StreamLearn::CLI] Using config: {:?}", config_path);
    }
    let config = RunConfig::from_arguments(matches, with_model)?;
    log::debug!(
        "[StreamLearn::CLI] Run config:\n{}",
        serde_json::to_string_pretty(&config).unwrap_or_default()
    );

    match run_evaluation(&config) {
        Ok(report) => write_report(&report, std::io::stdout().lock()),
        Err(e) => {
            log::error!("Evaluation failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn source_args() -> Vec<Arg> {
    vec![
        Arg::new("config")
            .help("Path to a JSON run configuration file")
            .required(false)
            .value_parser(clap::value_parser!(PathBuf))
            .value_hint(ValueHint::FilePath),
        Arg::new("file")
            .short('f')
            .long("file")
            .help("Read instances from a CSV/TSV file instead of the synthetic generator")
            .value_parser(clap::value_parser!(PathBuf))
            .value_hint(ValueHint::FilePath),
        Arg::new("format")
            .long("format")
            .help("Delimiter of --file. Defaults to the file extension.")
            .value_parser(["csv", "tsv"]),
        Arg::new("target_index")
            .long("target-index")
            .help("Zero-based column of the first target in --file. Defaults to the last columns.")
            .value_parser(clap::value_parser!(usize)),
        Arg::new("no_headers")
            .long("no-headers")
            .help("Treat the first row of --file as data")
            .action(ArgAction::SetTrue),
        Arg::new("targets")
            .short('t')
            .long("targets")
            .help("Number of target columns")
            .value_parser(clap::value_parser!(usize)),
        Arg::new("samples")
            .short('n')
            .long("samples")
            .help("Samples produced by the synthetic generator")
            .value_parser(clap::value_parser!(usize)),
        Arg::new("features")
            .long("features")
            .help("Features produced by the synthetic generator")
            .value_parser(clap::value_parser!(usize)),
        Arg::new("labels")
            .short('l')
            .long("labels")
            .help("Active labels per sample for the synthetic generator")
            .value_parser(clap::value_parser!(usize)),
        Arg::new("seed")
            .long("seed")
            .help("Random seed for the synthetic generator")
            .value_parser(clap::value_parser!(u64)),
    ]
}

fn evaluation_args() -> Vec<Arg> {
    vec![
        Arg::new("max_instances")
            .long("max-instances")
            .help("Stop after this many instances")
            .value_parser(clap::value_parser!(usize)),
        Arg::new("max_time")
            .long("max-time")
            .help("Stop after this many seconds")
            .value_parser(clap::value_parser!(f64)),
        Arg::new("batch_size")
            .short('b')
            .long("batch-size")
            .help("Instances requested per batch")
            .value_parser(clap::value_parser!(usize)),
        Arg::new("report_interval")
            .long("report-interval")
            .help("Log a checkpoint every this many instances")
            .value_parser(clap::value_parser!(usize)),
    ]
}
