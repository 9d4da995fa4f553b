use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use streamlearn::config::{EvaluationConfig, ModelType, MultilabelConfig, Protocol};
use streamlearn::io::{FileFormat, FileOptions};

/// Where the evaluated instances come from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Generator(MultilabelConfig),
    File(FileOptions),
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Generator(MultilabelConfig::default())
    }
}

/// Everything one `speed` or `prequential` invocation needs.
///
/// Fields left out of a partial `evaluation` object take the values of
/// `RunConfig::default()`, the same ones used when the object is missing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub source: SourceConfig,
    #[serde(deserialize_with = "evaluation_over_run_defaults")]
    pub evaluation: EvaluationConfig,
    /// Classifier for `prequential`. Ignored by `speed`.
    pub model: Option<ModelType>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            evaluation: EvaluationConfig::new(Some(100_000), None, 5),
            model: None,
        }
    }
}

impl RunConfig {
    /// Defaults for the `prequential` command: a single-target generator
    /// and the majority-class baseline.
    pub fn prequential() -> Self {
        Self {
            source: SourceConfig::Generator(MultilabelConfig::new(40_000, 20, 1, 1)),
            model: Some(ModelType::default()),
            ..Self::default()
        }
    }

    /// Build the run configuration from an optional JSON file and the
    /// subcommand's flags. Flags win over the file.
    pub fn from_arguments(matches: &ArgMatches, with_model: bool) -> Result<Self> {
        let mut config = match matches.get_one::<PathBuf>("config") {
            Some(path) => load_run_config(path)?,
            None if with_model => RunConfig::prequential(),
            None => RunConfig::default(),
        };

        if let Some(path) = matches.get_one::<PathBuf>("file") {
            let format = match matches.get_one::<String>("format") {
                Some(format) => format.parse::<FileFormat>().map_err(anyhow::Error::msg)?,
                None => format_from_extension(path),
            };
            config.source = SourceConfig::File(FileOptions::new(path, format));
        }

        match &mut config.source {
            SourceConfig::Generator(generator) => {
                if let Some(&n) = matches.get_one::<usize>("samples") {
                    generator.n_samples = n;
                }
                if let Some(&n) = matches.get_one::<usize>("features") {
                    generator.n_features = n;
                }
                if let Some(&n) = matches.get_one::<usize>("targets") {
                    generator.n_targets = n;
                }
                if let Some(&n) = matches.get_one::<usize>("labels") {
                    generator.n_labels = n;
                }
                if let Some(&seed) = matches.get_one::<u64>("seed") {
                    generator.random_state = Some(seed);
                }
                if matches.contains_id("target_index") {
                    bail!("--target-index only applies to file sources");
                }
            }
            SourceConfig::File(options) => {
                for flag in ["samples", "features", "labels", "seed"] {
                    if matches.contains_id(flag) {
                        bail!("--{} only applies to the synthetic generator", flag);
                    }
                }
                if let Some(format) = matches.get_one::<String>("format") {
                    options.format = format.parse::<FileFormat>().map_err(anyhow::Error::msg)?;
                }
                if let Some(&index) = matches.get_one::<usize>("target_index") {
                    options.target_index = Some(index);
                }
                if let Some(&n) = matches.get_one::<usize>("targets") {
                    options.n_targets = n;
                }
                if matches.get_flag("no_headers") {
                    options.has_headers = false;
                }
            }
        }

        let evaluation = &mut config.evaluation;
        if let Some(&n) = matches.get_one::<usize>("max_instances") {
            evaluation.max_instances = Some(n);
        }
        if let Some(&secs) = matches.get_one::<f64>("max_time") {
            evaluation.max_time_secs = Some(secs);
        }
        if let Some(&n) = matches.get_one::<usize>("batch_size") {
            evaluation.batch_size = n;
        }
        if let Some(&n) = matches.get_one::<usize>("report_interval") {
            evaluation.report_interval = Some(n);
        }

        if with_model {
            if let Some(model) = matches.get_one::<String>("model") {
                config.model = Some(model.parse::<ModelType>().map_err(anyhow::Error::msg)?);
            }
            if let Some(protocol) = matches.get_one::<String>("protocol") {
                evaluation.protocol = protocol.parse::<Protocol>().map_err(anyhow::Error::msg)?;
            }
            config.model.get_or_insert_with(ModelType::default);
        } else {
            config.model = None;
        }

        Ok(config)
    }
}

/// Load a run configuration from a JSON file.
pub fn load_run_config<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: RunConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

fn evaluation_over_run_defaults<'de, D>(
    deserializer: D,
) -> std::result::Result<EvaluationConfig, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let given = Map::<String, Value>::deserialize(deserializer)?;
    let mut merged = match serde_json::to_value(RunConfig::default().evaluation) {
        Ok(Value::Object(defaults)) => defaults,
        Ok(_) => Map::new(),
        Err(e) => return Err(D::Error::custom(e)),
    };
    merged.extend(given);
    serde_json::from_value(Value::Object(merged)).map_err(D::Error::custom)
}

fn format_from_extension(path: &Path) -> FileFormat {
    match path.extension().and_then(|s| s.to_str()).map(|s| s.to_lowercase()) {
        Some(ext) if ext == "tsv" => FileFormat::Tsv,
        _ => FileFormat::Csv,
    }
}
