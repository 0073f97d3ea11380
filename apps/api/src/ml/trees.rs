//! Least-squares regression tree used as the weak learner of the boosted model.

use serde::{Deserialize, Serialize};

const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Nodes are stored in an arena; index 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

fn mean(indices: &[usize], y: &[f64]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

fn sse(sum: f64, sum_sq: f64, n: f64) -> f64 {
    sum_sq - sum * sum / n
}

fn best_split(x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Option<SplitCandidate> {
    let n = indices.len();
    if n < 2 {
        return None;
    }
    let total: f64 = indices.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
    let parent = sse(total, total_sq, n as f64);

    let width = x[indices[0]].len();
    let mut best: Option<(usize, f64, f64)> = None;
    let mut sorted = indices.to_vec();

    for feature in 0..width {
        sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for k in 1..n {
            let prev = sorted[k - 1];
            left_sum += y[prev];
            left_sq += y[prev] * y[prev];

            let (lo, hi) = (x[prev][feature], x[sorted[k]][feature]);
            if lo >= hi {
                continue;
            }
            let left_n = k as f64;
            let right_n = (n - k) as f64;
            let children = sse(left_sum, left_sq, left_n)
                + sse(total - left_sum, total_sq - left_sq, right_n);
            let gain = parent - children;
            if gain > MIN_GAIN && best.map_or(true, |(_, _, g)| gain > g) {
                best = Some((feature, (lo + hi) / 2.0, gain));
            }
        }
    }

    best.map(|(feature, threshold, gain)| {
        let (left, right) = indices
            .iter()
            .copied()
            .partition(|&i| x[i][feature] <= threshold);
        SplitCandidate {
            feature,
            threshold,
            gain,
            left,
            right,
        }
    })
}

impl RegressionTree {
    /// Fits `y` on the rows of `x` selected by `indices`, growing at most
    /// `max_depth` levels. Impurity decrease per feature is added to
    /// `importances`.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        indices: &[usize],
        max_depth: usize,
        importances: &mut [f64],
    ) -> Self {
        let mut tree = RegressionTree { nodes: Vec::new() };
        tree.grow(x, y, indices.to_vec(), max_depth, importances);
        tree
    }

    fn grow(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        indices: Vec<usize>,
        depth_left: usize,
        importances: &mut [f64],
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: mean(&indices, y),
        });

        if depth_left == 0 {
            return id;
        }
        let Some(split) = best_split(x, y, &indices) else {
            return id;
        };

        if let Some(slot) = importances.get_mut(split.feature) {
            *slot += split.gain;
        }
        let left = self.grow(x, y, split.left, depth_left - 1, importances);
        let right = self.grow(x, y, split.right, depth_left - 1, importances);
        self.nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes.get(id) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let v = row.get(*feature).copied().unwrap_or(0.0);
                    id = if v <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match nodes.get(id) {
                Some(Node::Split { left, right, .. }) => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }
}
