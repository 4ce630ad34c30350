//! Bagged regression trees, one of the comparison candidates.

use crate::error::{MLError, MLResult};
use crate::model::{validate_training_data, Regressor};
use crate::tree::{RegressionTree, TreeParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    n_trees: usize,
    params: TreeParams,
    seed: u64,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    pub fn new(n_trees: usize, params: TreeParams, seed: u64) -> Self {
        Self {
            n_trees,
            params,
            seed,
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(100, TreeParams::default(), 42)
    }
}

impl Regressor for RandomForestRegressor {
    fn name(&self) -> &str {
        "Random Forest"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> MLResult<()> {
        validate_training_data(x, y)?;
        if self.n_trees == 0 {
            return Err(MLError::InvalidData("forest needs at least one tree".to_string()));
        }

        let n = x.len();
        let params = self.params;
        let seed = self.seed;

        // Each tree gets its own RNG so the result does not depend on thread scheduling.
        self.trees = (0..self.n_trees)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(x, y, &sample, &params)
            })
            .collect();
        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        sum / self.trees.len() as f64
    }
}
