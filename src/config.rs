use serde::{Deserialize, Serialize};

/// Hyper-parameters for the random forest.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ForestConfig {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum number of rows required to attempt a split.
    pub min_samples_split: usize,
    /// Base seed; each tree derives its own deterministic seed from it.
    pub seed: u64,
    /// Reweight samples inversely to class frequency to compensate skewed
    /// label distributions.
    pub balanced_class_weights: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            seed: 42,
            balanced_class_weights: true,
        }
    }
}

/// Training configuration for the classifier pipeline.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TrainConfig {
    /// Fraction of rows held out for accuracy evaluation.
    pub test_fraction: f64,
    /// Seed for the stratified train/test split.
    pub split_seed: u64,
    pub forest: ForestConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            split_seed: 42,
            forest: ForestConfig::default(),
        }
    }
}
