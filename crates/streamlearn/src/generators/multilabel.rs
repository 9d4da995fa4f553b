use ndarray::Array2;
use rand::distributions::WeightedIndex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson};

use crate::config::MultilabelConfig;
use crate::data_handling::Dataset;
use crate::error::{Result, StreamLearnError};
use crate::generators::Generator;

/// Synthetic multilabel classification data.
///
/// Every target owns a random categorical distribution over the features.
/// Each sample activates exactly `n_labels` targets, then draws a
/// Poisson(`length`) number of feature tokens, each from the distribution of
/// one of its active targets. Features are the resulting token counts.
///
/// ```
/// use streamlearn::config::MultilabelConfig;
/// use streamlearn::generators::MultilabelGenerator;
/// use streamlearn::stream::{DataStream, InstanceStream};
///
/// let config = MultilabelConfig::new(100, 10, 4, 2).with_seed(7);
/// let mut generator = MultilabelGenerator::new(config).unwrap();
/// let mut stream = DataStream::from_generator(&mut generator).unwrap();
/// let batch = stream.next_instance(10).unwrap().unwrap();
/// assert_eq!(batch.y.shape(), (10, 4));
/// assert_eq!(stream.estimated_remaining_instances(), 90);
/// ```
#[derive(Debug, Clone)]
pub struct MultilabelGenerator {
    config: MultilabelConfig,
    rng: StdRng,
}

impl MultilabelGenerator {
    pub fn new(config: MultilabelConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &MultilabelConfig {
        &self.config
    }
}

impl Generator for MultilabelGenerator {
    fn generate(&mut self) -> Result<Dataset> {
        let n_samples = self.config.n_samples;
        let n_features = self.config.n_features;
        let n_targets = self.config.n_targets;
        let n_labels = self.config.n_labels;
        let rng = &mut self.rng;

        // (0, 1] keeps every weight strictly positive.
        let mut feature_dists = Vec::with_capacity(n_targets);
        for _ in 0..n_targets {
            let weights: Vec<f64> = (0..n_features).map(|_| 1.0 - rng.gen::<f64>()).collect();
            let dist = WeightedIndex::new(&weights)
                .map_err(|e| StreamLearnError::InvalidConfig(e.to_string()))?;
            feature_dists.push(dist);
        }
        let length = Poisson::new(self.config.length)
            .map_err(|e| StreamLearnError::InvalidConfig(e.to_string()))?;

        let targets: Vec<usize> = (0..n_targets).collect();
        let mut x = Array2::<f64>::zeros((n_samples, n_features));
        let mut y = Array2::<i64>::zeros((n_samples, n_targets));

        for row in 0..n_samples {
            let active: Vec<usize> = targets.choose_multiple(rng, n_labels).copied().collect();
            for &target in &active {
                y[[row, target]] = 1;
            }

            let draws = (length.sample(rng) as usize).max(1);
            for _ in 0..draws {
                let target = active[rng.gen_range(0..active.len())];
                let feature = feature_dists[target].sample(rng);
                x[[row, feature]] += 1.0;
            }
        }

        log::trace!(
            "[StreamLearn::Generator] Materialized {}x{} features, {}x{} labels",
            n_samples,
            n_features,
            n_samples,
            n_targets
        );
        Dataset::new(x, y)
    }

    fn name(&self) -> &str {
        "Multilabel dataset"
    }

    fn info(&self) -> String {
        format!(
            "MultilabelGenerator: n_samples: {} - n_features: {} - n_targets: {} - n_labels: {}",
            self.config.n_samples,
            self.config.n_features,
            self.config.n_targets,
            self.config.n_labels
        )
    }
}
