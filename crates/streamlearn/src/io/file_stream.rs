//! Delimited-text datasets (CSV / TSV) served as streams.
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::data_handling::Dataset;
use crate::stream::DataStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    #[default]
    Csv,
    Tsv,
}

impl FileFormat {
    fn delimiter(&self) -> u8 {
        match self {
            FileFormat::Csv => b',',
            FileFormat::Tsv => b'\t',
        }
    }
}

impl std::str::FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "tsv" => Ok(FileFormat::Tsv),
            _ => Err(format!("Unknown file format: {}. Expected csv or tsv", s)),
        }
    }
}

/// Where to find a dataset file and which columns hold the targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOptions {
    pub path: PathBuf,
    #[serde(default)]
    pub format: FileFormat,
    /// Whether the first row is a header.
    #[serde(default = "default_true")]
    pub has_headers: bool,
    /// First target column. `None` places the targets in the last columns.
    #[serde(default)]
    pub target_index: Option<usize>,
    /// Number of consecutive target columns.
    #[serde(default = "default_n_targets")]
    pub n_targets: usize,
}

fn default_true() -> bool {
    true
}

fn default_n_targets() -> usize {
    1
}

impl FileOptions {
    pub fn new<P: AsRef<Path>>(path: P, format: FileFormat) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format,
            has_headers: true,
            target_index: None,
            n_targets: 1,
        }
    }

    pub fn with_target_index(mut self, index: usize) -> Self {
        self.target_index = Some(index);
        self
    }

    pub fn with_n_targets(mut self, n_targets: usize) -> Self {
        self.n_targets = n_targets;
        self
    }

    pub fn without_headers(mut self) -> Self {
        self.has_headers = false;
        self
    }
}

/// Read the whole file into a [`Dataset`].
pub fn read_dataset(options: &FileOptions) -> Result<Dataset> {
    if options.n_targets == 0 {
        bail!("n_targets must be at least 1");
    }
    let path = &options.path;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.format.delimiter())
        .has_headers(options.has_headers)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open dataset file: {}", path.display()))?;

    let mut features = Vec::new();
    let mut labels = Vec::new();
    let mut n_columns: Option<usize> = None;
    let mut target_range = 0..0;

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| {
            format!("Failed to read row {} of {}", row_idx + 1, path.display())
        })?;

        let width = match n_columns {
            Some(width) => width,
            None => {
                let width = record.len();
                target_range = resolve_targets(options, width)?;
                n_columns = Some(width);
                width
            }
        };
        if record.len() != width {
            bail!(
                "Row {} of {} has {} columns, expected {}",
                row_idx + 1,
                path.display(),
                record.len(),
                width
            );
        }

        for (col_idx, value) in record.iter().enumerate() {
            if target_range.contains(&col_idx) {
                labels.push(parse_label(value).with_context(|| {
                    format!("Invalid label in column {} at row {}", col_idx, row_idx + 1)
                })?);
            } else {
                let parsed = value.parse::<f64>().with_context(|| {
                    format!(
                        "Invalid feature '{}' in column {} at row {}",
                        value,
                        col_idx,
                        row_idx + 1
                    )
                })?;
                features.push(parsed);
            }
        }
    }

    let width =
        n_columns.ok_or_else(|| anyhow!("Dataset file {} has no data rows", path.display()))?;
    let n_samples = labels.len() / options.n_targets;
    let n_features = width - options.n_targets;
    let x = Array2::from_shape_vec((n_samples, n_features), features)
        .context("Failed to build feature matrix")?;
    let y = Array2::from_shape_vec((n_samples, options.n_targets), labels)
        .context("Failed to build label matrix")?;

    log::debug!(
        "[StreamLearn::IO] Loaded {} samples, {} features, {} targets from {}",
        n_samples,
        n_features,
        options.n_targets,
        path.display()
    );
    Ok(Dataset::new(x, y)?)
}

/// Read a dataset file and wrap it in a restartable stream.
pub fn open_file_stream(options: &FileOptions) -> Result<DataStream> {
    let dataset = read_dataset(options)?;
    let name = options
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let info = format!(
        "FileStream: filename: {} - n_samples: {} - n_features: {} - n_targets: {}",
        options.path.display(),
        dataset.n_samples(),
        dataset.n_features(),
        dataset.n_targets()
    );
    Ok(DataStream::new(dataset, name).with_info(info))
}

fn resolve_targets(options: &FileOptions, width: usize) -> Result<std::ops::Range<usize>> {
    if options.n_targets >= width {
        bail!(
            "{} target columns leave no features in a file with {} columns",
            options.n_targets,
            width
        );
    }
    let start = options.target_index.unwrap_or(width - options.n_targets);
    let end = start + options.n_targets;
    if end > width {
        bail!(
            "Target columns {}..{} exceed the {} columns of the file",
            start,
            end,
            width
        );
    }
    Ok(start..end)
}

fn parse_label(value: &str) -> Result<i64> {
    if let Ok(label) = value.parse::<i64>() {
        return Ok(label);
    }
    let float = value
        .parse::<f64>()
        .with_context(|| format!("'{}' is not a number", value))?;
    if float.fract() != 0.0 || !float.is_finite() {
        bail!("'{}' is not an integral class label", value);
    }
    // i64::MAX rounds up to 2^63 as f64, so that bound is exclusive.
    if float < i64::MIN as f64 || float >= i64::MAX as f64 {
        bail!("class label '{}' is out of range", value);
    }
    Ok(float as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_accept_integral_floats_only() {
        assert_eq!(parse_label("3").unwrap(), 3);
        assert_eq!(parse_label("-1.0").unwrap(), -1);
        assert!(parse_label("1.5").is_err());
        assert!(parse_label("yes").is_err());
    }

    #[test]
    fn labels_outside_i64_are_rejected() {
        assert!(parse_label("1e300").is_err());
        assert!(parse_label("-1e19").is_err());
        assert!(parse_label("9223372036854775808.0").is_err());
        assert_eq!(parse_label("1e3").unwrap(), 1000);
    }

    #[test]
    fn default_targets_are_the_last_columns() {
        let options = FileOptions::new("unused.csv", FileFormat::Csv).with_n_targets(2);
        assert_eq!(resolve_targets(&options, 5).unwrap(), 3..5);
        let options = options.with_target_index(0);
        assert_eq!(resolve_targets(&options, 5).unwrap(), 0..2);
        let options = FileOptions::new("unused.csv", FileFormat::Csv).with_target_index(4);
        assert!(resolve_targets(&options, 4).is_err());
    }
}
