//! CART decision tree with weighted Gini splits.
//!
//! Building block for the random forest: depth-limited binary trees over
//! numeric features, trained on a bootstrap sample with per-sample weights
//! and a random feature subset considered at every split.
use rand::seq::SliceRandom;
use rand::Rng;

use crate::math::Matrix;

/// Per-tree training settings, derived from the forest configuration.
#[derive(Debug, Clone)]
pub(crate) struct TreeSettings {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Number of features considered at each split.
    pub n_subfeatures: usize,
    pub n_classes: usize,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        /// Class probabilities from the weighted class distribution at the leaf.
        dist: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    root: Node,
    importances: Vec<f64>,
}

impl DecisionTree {
    /// Grow a tree on the rows named by `indices` (a bootstrap sample, so
    /// duplicates are expected).
    pub(crate) fn fit<R: Rng>(
        x: &Matrix,
        y: &[usize],
        weights: &[f64],
        indices: &[usize],
        settings: &TreeSettings,
        rng: &mut R,
    ) -> DecisionTree {
        let total_weight: f64 = indices.iter().map(|&i| weights[i]).sum();
        let mut importances = vec![0.0; x.ncols()];
        let root = grow(
            x,
            y,
            weights,
            indices.to_vec(),
            0,
            settings,
            rng,
            total_weight,
            &mut importances,
        );

        // Normalize so importances are comparable across trees.
        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            for v in importances.iter_mut() {
                *v /= sum;
            }
        }

        DecisionTree { root, importances }
    }

    /// Class probability distribution for one sample row.
    pub fn predict_dist(&self, row: &[f64]) -> &[f64] {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { dist } => return dist,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Normalized mean-decrease-in-impurity scores, one per feature.
    pub fn importances(&self) -> &[f64] {
        &self.importances
    }
}

fn class_weight_sums(y: &[usize], weights: &[f64], indices: &[usize], n_classes: usize) -> Vec<f64> {
    let mut sums = vec![0.0; n_classes];
    for &i in indices {
        sums[y[i]] += weights[i];
    }
    sums
}

fn gini(class_weights: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    let sum_sq: f64 = class_weights
        .iter()
        .map(|&w| (w / total) * (w / total))
        .sum();
    1.0 - sum_sq
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

#[allow(clippy::too_many_arguments)]
fn grow<R: Rng>(
    x: &Matrix,
    y: &[usize],
    weights: &[f64],
    indices: Vec<usize>,
    depth: usize,
    settings: &TreeSettings,
    rng: &mut R,
    total_weight: f64,
    importances: &mut [f64],
) -> Node {
    let node_class_weights = class_weight_sums(y, weights, &indices, settings.n_classes);
    let node_weight: f64 = node_class_weights.iter().sum();
    let node_impurity = gini(&node_class_weights, node_weight);

    let make_leaf = |class_weights: &[f64], weight: f64| Node::Leaf {
        dist: if weight > 0.0 {
            class_weights.iter().map(|&w| w / weight).collect()
        } else {
            vec![1.0 / settings.n_classes as f64; settings.n_classes]
        },
    };

    if depth >= settings.max_depth
        || indices.len() < settings.min_samples_split
        || node_impurity == 0.0
    {
        return make_leaf(&node_class_weights, node_weight);
    }

    let Some(split) = find_best_split(
        x,
        y,
        weights,
        &indices,
        settings,
        rng,
        &node_class_weights,
        node_weight,
        node_impurity,
    ) else {
        return make_leaf(&node_class_weights, node_weight);
    };

    importances[split.feature] += (node_weight / total_weight) * split.gain;

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&i| x[(i, split.feature)] <= split.threshold);

    let left = grow(
        x,
        y,
        weights,
        left_idx,
        depth + 1,
        settings,
        rng,
        total_weight,
        importances,
    );
    let right = grow(
        x,
        y,
        weights,
        right_idx,
        depth + 1,
        settings,
        rng,
        total_weight,
        importances,
    );

    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[allow(clippy::too_many_arguments)]
fn find_best_split<R: Rng>(
    x: &Matrix,
    y: &[usize],
    weights: &[f64],
    indices: &[usize],
    settings: &TreeSettings,
    rng: &mut R,
    node_class_weights: &[f64],
    node_weight: f64,
    node_impurity: f64,
) -> Option<BestSplit> {
    let mut features: Vec<usize> = (0..x.ncols()).collect();
    features.shuffle(rng);
    features.truncate(settings.n_subfeatures.max(1));

    let mut best: Option<BestSplit> = None;

    for &feature in &features {
        let mut ordered: Vec<usize> = indices.to_vec();
        ordered.sort_by(|&a, &b| {
            x[(a, feature)]
                .partial_cmp(&x[(b, feature)])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_weights = vec![0.0; settings.n_classes];
        let mut left_total = 0.0;

        for pair in 0..ordered.len() - 1 {
            let i = ordered[pair];
            left_weights[y[i]] += weights[i];
            left_total += weights[i];

            let value = x[(i, feature)];
            let next_value = x[(ordered[pair + 1], feature)];
            if next_value <= value {
                continue;
            }

            let right_total = node_weight - left_total;
            let right_weights: Vec<f64> = node_class_weights
                .iter()
                .zip(&left_weights)
                .map(|(&all, &left)| all - left)
                .collect();

            let weighted_child_impurity = (left_total / node_weight)
                * gini(&left_weights, left_total)
                + (right_total / node_weight) * gini(&right_weights, right_total);
            let gain = node_impurity - weighted_child_impurity;

            if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                best = Some(BestSplit {
                    feature,
                    threshold: (value + next_value) / 2.0,
                    gain,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn settings(n_classes: usize, n_features: usize) -> TreeSettings {
        TreeSettings {
            max_depth: 10,
            min_samples_split: 2,
            n_subfeatures: n_features,
            n_classes,
        }
    }

    #[test]
    fn separable_data_is_split_perfectly() {
        let x = Matrix::from_shape_vec(
            (6, 2),
            vec![1.0, 5.0, 2.0, 5.0, 3.0, 5.0, 10.0, 5.0, 11.0, 5.0, 12.0, 5.0],
        )
        .unwrap();
        let y = vec![0, 0, 0, 1, 1, 1];
        let weights = vec![1.0; 6];
        let indices: Vec<usize> = (0..6).collect();

        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::fit(&x, &y, &weights, &indices, &settings(2, 2), &mut rng);

        assert_eq!(tree.predict_dist(&[2.0, 5.0]), &[1.0, 0.0]);
        assert_eq!(tree.predict_dist(&[11.0, 5.0]), &[0.0, 1.0]);
    }

    #[test]
    fn importances_land_on_the_informative_feature() {
        let x = Matrix::from_shape_vec(
            (6, 2),
            vec![1.0, 5.0, 2.0, 5.0, 3.0, 5.0, 10.0, 5.0, 11.0, 5.0, 12.0, 5.0],
        )
        .unwrap();
        let y = vec![0, 0, 0, 1, 1, 1];
        let weights = vec![1.0; 6];
        let indices: Vec<usize> = (0..6).collect();

        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::fit(&x, &y, &weights, &indices, &settings(2, 2), &mut rng);

        assert!(tree.importances()[0] > 0.99);
        assert!(tree.importances()[1] < 1e-9);
    }

    #[test]
    fn pure_nodes_become_leaves_immediately() {
        let x = Matrix::from_shape_vec((3, 1), vec![1.0, 2.0, 3.0]).unwrap();
        let y = vec![1, 1, 1];
        let weights = vec![1.0; 3];
        let indices: Vec<usize> = (0..3).collect();

        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::fit(&x, &y, &weights, &indices, &settings(2, 1), &mut rng);
        assert_eq!(tree.predict_dist(&[2.0]), &[0.0, 1.0]);
        assert!(tree.importances().iter().all(|&v| v == 0.0));
    }
}
