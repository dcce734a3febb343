//! Bagged random forest classifier.
//!
//! Bootstrap-sampled CART trees trained in parallel. Probabilities are the
//! average of per-tree leaf class distributions; feature importances are the
//! average of per-tree normalized impurity decreases. Each tree derives its
//! own seed from the configured base seed, so training is deterministic for a
//! given input and configuration regardless of thread scheduling.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::config::ForestConfig;
use crate::error::ClassifierError;
use crate::math::Matrix;
use crate::models::tree::{DecisionTree, TreeSettings};

#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_classes: usize,
    n_features: usize,
}

impl RandomForest {
    /// Fit a forest on encoded class labels in `0..n_classes`.
    pub fn fit(
        x: &Matrix,
        y: &[usize],
        n_classes: usize,
        config: &ForestConfig,
    ) -> Result<RandomForest, ClassifierError> {
        let n = x.nrows();
        if n == 0 || y.len() != n {
            return Err(ClassifierError::Precondition(format!(
                "feature matrix has {} rows but {} labels were given",
                n,
                y.len()
            )));
        }
        if let Some(&bad) = y.iter().find(|&&class| class >= n_classes) {
            return Err(ClassifierError::Precondition(format!(
                "label {} is out of range for {} classes",
                bad, n_classes
            )));
        }

        let weights = sample_weights(y, n_classes, config.balanced_class_weights);
        let settings = TreeSettings {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            n_subfeatures: ((x.ncols() as f64).sqrt().round() as usize).max(1),
            n_classes,
        };

        let trees: Vec<DecisionTree> = (0..config.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(tree_idx as u64));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(x, y, &weights, &bootstrap, &settings, &mut rng)
            })
            .collect();

        Ok(RandomForest {
            trees,
            n_classes,
            n_features: x.ncols(),
        })
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Per-row class probability distributions, averaged over all trees.
    pub fn predict_proba(&self, x: &Matrix) -> Vec<Vec<f64>> {
        let n_trees = self.trees.len() as f64;
        (0..x.nrows())
            .map(|r| {
                let row = x.row(r);
                let mut acc = vec![0.0; self.n_classes];
                for tree in &self.trees {
                    for (slot, p) in acc.iter_mut().zip(tree.predict_dist(row)) {
                        *slot += p;
                    }
                }
                for slot in acc.iter_mut() {
                    *slot /= n_trees;
                }
                acc
            })
            .collect()
    }

    /// Predicted class index per row (highest probability, first on ties).
    pub fn predict(&self, x: &Matrix) -> Vec<usize> {
        self.predict_proba(x)
            .into_iter()
            .map(|dist| argmax(&dist))
            .collect()
    }

    /// Mean-decrease-in-impurity importances, one per feature, summing to 1
    /// whenever any tree made a split.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (slot, v) in totals.iter_mut().zip(tree.importances()) {
                *slot += v;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            for v in totals.iter_mut() {
                *v /= sum;
            }
        }
        totals
    }
}

/// Index of the largest value, first on ties.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (idx, &value) in values.iter().enumerate() {
        if value > values[best] {
            best = idx;
        }
    }
    best
}

/// Per-sample weights. Balanced weighting assigns `n / (k * n_c)` to class
/// `c`, so rare classes carry as much total weight as common ones.
fn sample_weights(y: &[usize], n_classes: usize, balanced: bool) -> Vec<f64> {
    if !balanced {
        return vec![1.0; y.len()];
    }
    let mut counts = vec![0usize; n_classes];
    for &class in y {
        counts[class] += 1;
    }
    let n = y.len() as f64;
    let k = counts.iter().filter(|&&c| c > 0).count() as f64;
    y.iter()
        .map(|&class| n / (k * counts[class] as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_blob_data() -> (Matrix, Vec<usize>) {
        let mut cells = Vec::new();
        let mut y = Vec::new();
        for i in 0..10 {
            cells.extend_from_slice(&[i as f64 * 0.1, 0.0]);
            y.push(0);
        }
        for i in 0..10 {
            cells.extend_from_slice(&[10.0 + i as f64 * 0.1, 0.0]);
            y.push(1);
        }
        for i in 0..10 {
            cells.extend_from_slice(&[20.0 + i as f64 * 0.1, 0.0]);
            y.push(2);
        }
        (Matrix::from_shape_vec((30, 2), cells).unwrap(), y)
    }

    fn small_config() -> ForestConfig {
        ForestConfig {
            n_trees: 25,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn forest_learns_separable_blobs() {
        let (x, y) = three_blob_data();
        let forest = RandomForest::fit(&x, &y, 3, &small_config()).unwrap();
        let predicted = forest.predict(&x);
        let correct = predicted.iter().zip(&y).filter(|(p, t)| p == t).count();
        assert!(correct >= 28, "only {correct}/30 correct");
    }

    #[test]
    fn probabilities_sum_to_one() {
        let (x, y) = three_blob_data();
        let forest = RandomForest::fit(&x, &y, 3, &small_config()).unwrap();
        for dist in forest.predict_proba(&x) {
            assert_eq!(dist.len(), 3);
            let total: f64 = dist.iter().sum();
            assert!((total - 1.0).abs() < 1e-9);
            assert!(dist.iter().all(|&p| p >= 0.0));
        }
    }

    #[test]
    fn importances_are_normalized_and_informative() {
        let (x, y) = three_blob_data();
        let forest = RandomForest::fit(&x, &y, 3, &small_config()).unwrap();
        let importances = forest.feature_importances();
        assert_eq!(importances.len(), 2);
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        // the second feature is constant and carries no signal
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn training_is_deterministic_for_a_fixed_seed() {
        let (x, y) = three_blob_data();
        let a = RandomForest::fit(&x, &y, 3, &small_config()).unwrap();
        let b = RandomForest::fit(&x, &y, 3, &small_config()).unwrap();
        assert_eq!(a.predict_proba(&x), b.predict_proba(&x));
    }

    #[test]
    fn out_of_range_labels_are_rejected() {
        let x = Matrix::from_shape_vec((2, 1), vec![1.0, 2.0]).unwrap();
        let err = RandomForest::fit(&x, &[0, 5], 2, &small_config()).unwrap_err();
        assert!(matches!(err, ClassifierError::Precondition(_)));
    }

    #[test]
    fn balanced_weights_equalize_class_mass() {
        let y = vec![0, 0, 0, 0, 1];
        let weights = sample_weights(&y, 2, true);
        let class0: f64 = weights[..4].iter().sum();
        let class1 = weights[4];
        assert!((class0 - class1).abs() < 1e-12);
    }
}
