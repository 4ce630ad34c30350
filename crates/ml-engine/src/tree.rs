//! CART regression trees (squared-error splits).
//!
//! Trees are stored as a flat node array in pre-order. A node with
//! `feature == -1` is a leaf; otherwise rows with `row[feature] <= threshold`
//! (or NaN) go to `left`, the rest to `right`. Every node carries the mean
//! label of the rows that reached it during fitting.

use crate::error::{MLError, MLResult};
use crate::model::{validate_training_data, Regressor};
use serde::{Deserialize, Serialize};

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub feature: i32,
    pub threshold: f64,
    pub left: i32,
    pub right: i32,
    pub value: f64,
}

impl TreeNode {
    fn leaf(value: f64) -> Self {
        Self {
            feature: -1,
            threshold: 0.0,
            left: -1,
            right: -1,
            value,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature < 0
    }
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Fit on the rows named by `indices` (duplicates allowed, for bootstrap samples).
    /// Inputs are assumed validated by the caller.
    pub fn fit(x: &[Vec<f64>], y: &[f64], indices: &[usize], params: &TreeParams) -> Self {
        if indices.is_empty() {
            return Self::default();
        }
        let mut builder = TreeBuilder {
            x,
            y,
            params,
            nodes: Vec::new(),
        };
        let mut working = indices.to_vec();
        builder.grow(&mut working, 0);
        Self {
            nodes: builder.nodes,
        }
    }

    /// Rebuild a tree from stored nodes, checking that every child index and
    /// feature index is in range.
    pub fn from_nodes(nodes: Vec<TreeNode>, n_features: usize) -> MLResult<Self> {
        let tree = Self { nodes };
        tree.validate(n_features)?;
        Ok(tree)
    }

    pub fn validate(&self, n_features: usize) -> MLResult<()> {
        let n_nodes = self.nodes.len();
        if n_nodes == 0 {
            return Err(MLError::InvalidArtifact("tree has no nodes".to_string()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if !node.value.is_finite() {
                return Err(MLError::InvalidArtifact(format!(
                    "node {} has non-finite value",
                    i
                )));
            }
            if node.is_leaf() {
                continue;
            }
            if node.feature as usize >= n_features {
                return Err(MLError::InvalidArtifact(format!(
                    "node {} splits on feature {} but model has {}",
                    i, node.feature, n_features
                )));
            }
            // Pre-order layout: children always come after their parent.
            for child in [node.left, node.right] {
                if child <= i as i32 || child as usize >= n_nodes {
                    return Err(MLError::InvalidArtifact(format!(
                        "node {} has invalid child {}",
                        i, child
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            let node = &nodes[idx];
            if node.is_leaf() {
                0
            } else {
                1 + walk(nodes, node.left as usize).max(walk(nodes, node.right as usize))
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    #[inline]
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                return node.value;
            }
            let v = row.get(node.feature as usize).copied().unwrap_or(f64::NAN);
            idx = if goes_left(v, node.threshold) {
                node.left as usize
            } else {
                node.right as usize
            };
        }
    }
}

#[inline]
fn goes_left(value: f64, threshold: f64) -> bool {
    !(value > threshold)
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    params: &'a TreeParams,
    nodes: Vec<TreeNode>,
}

impl<'a> TreeBuilder<'a> {
    fn grow(&mut self, indices: &mut [usize], depth: usize) -> usize {
        let n = indices.len();
        let sum: f64 = indices.iter().map(|&i| self.y[i]).sum();
        let node_idx = self.nodes.len();
        self.nodes.push(TreeNode::leaf(sum / n as f64));

        let min_leaf = self.params.min_samples_leaf.max(1);
        let depth_exhausted = self.params.max_depth.is_some_and(|d| depth >= d);
        if depth_exhausted || n < self.params.min_samples_split.max(2) || n < 2 * min_leaf {
            return node_idx;
        }

        let Some(split) = self.best_split(indices, sum, min_leaf) else {
            return node_idx;
        };

        let x = self.x;
        let mid = partition_in_place(indices, |i| goes_left(x[i][split.feature], split.threshold));
        if mid == 0 || mid == n {
            return node_idx;
        }

        let (left_rows, right_rows) = indices.split_at_mut(mid);
        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);

        let node = &mut self.nodes[node_idx];
        node.feature = split.feature as i32;
        node.threshold = split.threshold;
        node.left = left as i32;
        node.right = right as i32;
        node_idx
    }

    /// Exhaustive search for the split that most reduces squared error.
    fn best_split(&self, indices: &[usize], total: f64, min_leaf: usize) -> Option<Split> {
        let n = indices.len();
        let n_features = self.x[indices[0]].len();
        let parent_score = total * total / n as f64;
        let mut best: Option<Split> = None;
        let mut order: Vec<usize> = indices.to_vec();

        for feature in 0..n_features {
            order.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let mut left_sum = 0.0;
            for left_count in 1..n {
                left_sum += self.y[order[left_count - 1]];
                let right_count = n - left_count;
                if left_count < min_leaf || right_count < min_leaf {
                    continue;
                }

                let lo = self.x[order[left_count - 1]][feature];
                let hi = self.x[order[left_count]][feature];
                if !(lo < hi) {
                    continue;
                }

                let right_sum = total - left_sum;
                let score = left_sum * left_sum / left_count as f64
                    + right_sum * right_sum / right_count as f64;
                let gain = score - parent_score;

                if gain > 1e-12 && best.map_or(true, |b| gain > b.gain) {
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(Split {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}

/// Move rows satisfying `goes_left` to the front; returns how many there are.
fn partition_in_place(indices: &mut [usize], mut goes_left: impl FnMut(usize) -> bool) -> usize {
    let mut store = 0;
    for k in 0..indices.len() {
        if goes_left(indices[k]) {
            indices.swap(store, k);
            store += 1;
        }
    }
    store
}

/// A single regression tree as a standalone model.
#[derive(Debug, Clone, Default)]
pub struct DecisionTreeRegressor {
    params: TreeParams,
    tree: RegressionTree,
}

impl DecisionTreeRegressor {
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            tree: RegressionTree::default(),
        }
    }
}

impl Regressor for DecisionTreeRegressor {
    fn name(&self) -> &str {
        "Decision Tree"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> MLResult<()> {
        validate_training_data(x, y)?;
        let indices: Vec<usize> = (0..x.len()).collect();
        self.tree = RegressionTree::fit(x, y, &indices, &self.params);
        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        self.tree.predict_row(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        // y = 1 when x0 > 5, else -1; x1 is noise
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, ((i * 7) % 3) as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| if i > 5 { 1.0 } else { -1.0 }).collect();
        (x, y)
    }

    #[test]
    fn test_single_split_on_step() {
        let (x, y) = step_data();
        let indices: Vec<usize> = (0..x.len()).collect();
        let params = TreeParams {
            max_depth: Some(1),
            ..TreeParams::default()
        };
        let tree = RegressionTree::fit(&x, &y, &indices, &params);

        assert_eq!(tree.nodes().len(), 3);
        let root = &tree.nodes()[0];
        assert_eq!(root.feature, 0);
        assert!((root.threshold - 5.5).abs() < 1e-12);
        assert_eq!(tree.predict_row(&[2.0, 0.0]), -1.0);
        assert_eq!(tree.predict_row(&[8.0, 0.0]), 1.0);
    }

    #[test]
    fn test_constant_labels_make_single_leaf() {
        let x: Vec<Vec<f64>> = (0..5).map(|i| vec![i as f64]).collect();
        let y = vec![3.0; 5];
        let tree = RegressionTree::fit(&x, &y, &[0, 1, 2, 3, 4], &TreeParams::default());
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.predict_row(&[100.0]), 3.0);
    }

    #[test]
    fn test_max_depth_is_respected() {
        let x: Vec<Vec<f64>> = (0..64).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..64).map(|i| (i * i) as f64).collect();
        let indices: Vec<usize> = (0..64).collect();
        let params = TreeParams {
            max_depth: Some(3),
            ..TreeParams::default()
        };
        let tree = RegressionTree::fit(&x, &y, &indices, &params);
        assert!(tree.depth() <= 3);
        assert!(tree.n_leaves() <= 8);
    }

    #[test]
    fn test_min_samples_leaf() {
        let (x, y) = step_data();
        let indices: Vec<usize> = (0..x.len()).collect();
        let params = TreeParams {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 4,
        };
        let tree = RegressionTree::fit(&x, &y, &indices, &params);
        // every leaf must have been reached by >= 4 rows; 10 rows allow at most 2 leaves
        assert!(tree.n_leaves() <= 2);
    }

    #[test]
    fn test_nan_goes_left() {
        let (x, y) = step_data();
        let indices: Vec<usize> = (0..x.len()).collect();
        let params = TreeParams {
            max_depth: Some(1),
            ..TreeParams::default()
        };
        let tree = RegressionTree::fit(&x, &y, &indices, &params);
        assert_eq!(tree.predict_row(&[f64::NAN, 0.0]), -1.0);
    }

    #[test]
    fn test_unbounded_tree_interpolates_training_rows() {
        let x: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64, (i % 4) as f64]).collect();
        let y: Vec<f64> = (0..30).map(|i| ((i * 13) % 7) as f64).collect();
        let mut model = DecisionTreeRegressor::new(TreeParams::default());
        model.fit(&x, &y).unwrap();
        for (row, label) in x.iter().zip(y.iter()) {
            assert!((model.predict_row(row) - label).abs() < 1e-12);
        }
    }

    #[test]
    fn test_validate_rejects_bad_children() {
        let nodes = vec![
            TreeNode { feature: 0, threshold: 1.0, left: 1, right: 5, value: 0.0 },
            TreeNode::leaf(1.0),
        ];
        assert!(RegressionTree::from_nodes(nodes, 1).is_err());

        let nodes = vec![
            TreeNode { feature: 3, threshold: 1.0, left: 1, right: 2, value: 0.0 },
            TreeNode::leaf(1.0),
            TreeNode::leaf(2.0),
        ];
        assert!(RegressionTree::from_nodes(nodes, 2).is_err());
    }

    #[test]
    fn test_empty_tree_predicts_zero() {
        assert_eq!(RegressionTree::default().predict_row(&[1.0]), 0.0);
    }
}
