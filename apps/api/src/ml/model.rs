//! Scoring models: a single trait with a boosted-tree backend and a linear
//! fallback, selected at construction time.
//!
//! Both backends standardize features, clamp predictions to `[0, 100]`, and
//! persist to a self-describing JSON artifact.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::ml::features::{FEATURE_GROUPS, FEATURE_NAMES};
use crate::ml::storage::{read_json, write_json_atomic};
use crate::ml::trees::RegressionTree;

pub const MIN_TRAINING_SAMPLES: usize = 10;
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

const MIN_ADJUSTMENT: f64 = 0.7;
const MAX_ADJUSTMENT: f64 = 1.3;

// ────────────────────────────────────────────────────────────────────────────
// Shared data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelBackend {
    BoostedTrees,
    Linear,
}

impl FromStr for ModelBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "boosted_trees" | "boosted" | "gbm" => Ok(ModelBackend::BoostedTrees),
            "linear" => Ok(ModelBackend::Linear),
            other => Err(format!("unknown model backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
    pub feature_importances: BTreeMap<String, f64>,
    pub n_samples: usize,
    pub trained_at: DateTime<Utc>,
}

/// Per-feature standardization. Constant features keep unit scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl StandardScaler {
    fn fit(x: &[Vec<f64>]) -> Self {
        let n = x.len().max(1) as f64;
        let width = x.first().map_or(0, Vec::len);
        let mut mean = vec![0.0; width];
        let mut std = vec![0.0; width];
        for j in 0..width {
            mean[j] = x.iter().map(|row| row[j]).sum::<f64>() / n;
            let var = x.iter().map(|row| (row[j] - mean[j]).powi(2)).sum::<f64>() / n;
            std[j] = if var.sqrt() < 1e-6 { 1.0 } else { var.sqrt() };
        }
        Self { mean, std }
    }

    fn width(&self) -> usize {
        self.mean.len()
    }

    fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }

    fn transform(&self, x: &[Vec<f64>]) -> Vec<Vec<f64>> {
        x.iter().map(|row| self.transform_row(row)).collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The scoring model contract. Callers never branch on the backend.
pub trait ScoringModel {
    /// Fits the model and returns evaluation metrics.
    fn train(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<ModelMetrics, AppError>;

    /// Predicted scores in `[0, 100]`.
    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, AppError>;

    fn metrics(&self) -> Option<&ModelMetrics>;

    fn backend(&self) -> ModelBackend;

    fn is_trained(&self) -> bool {
        self.metrics().is_some()
    }

    fn predict_single(&self, features: &[f64]) -> Result<f64, AppError> {
        let predictions = self.predict(&[features.to_vec()])?;
        predictions.first().copied().ok_or(AppError::ModelNotTrained)
    }

    /// Multiplier in `[0.7, 1.3]` nudging a rule-based score toward the
    /// model's prediction. Scores below 1 are left alone.
    fn get_adjustment_factor(&self, features: &[f64], base_score: f64) -> Result<f64, AppError> {
        if base_score < 1.0 {
            return Ok(1.0);
        }
        let predicted = self.predict_single(features)?;
        if !predicted.is_finite() {
            return Ok(1.0);
        }
        Ok((predicted / base_score).clamp(MIN_ADJUSTMENT, MAX_ADJUSTMENT))
    }

    /// Feature-group importance relative to an even split (1.0 = as expected).
    fn get_weight_adjustments(&self) -> BTreeMap<String, f64> {
        let Some(metrics) = self.metrics() else {
            return BTreeMap::new();
        };
        let expected = 1.0 / FEATURE_GROUPS.len() as f64;
        let mut offset = 0;
        FEATURE_GROUPS
            .iter()
            .map(|(group, len)| {
                let importance: f64 = FEATURE_NAMES[offset..offset + len]
                    .iter()
                    .filter_map(|name| metrics.feature_importances.get(*name))
                    .sum();
                offset += len;
                let adjustment = if importance > 0.0 {
                    importance / expected
                } else {
                    1.0
                };
                (group.to_string(), adjustment)
            })
            .collect()
    }
}

fn validate_training_set(x: &[Vec<f64>], y: &[f64]) -> Result<usize, AppError> {
    if x.len() != y.len() {
        return Err(AppError::Validation(format!(
            "feature rows ({}) and targets ({}) differ in length",
            x.len(),
            y.len()
        )));
    }
    if x.len() < MIN_TRAINING_SAMPLES {
        return Err(AppError::InsufficientSamples {
            required: MIN_TRAINING_SAMPLES,
            actual: x.len(),
        });
    }
    let width = x[0].len();
    if width == 0 || x.iter().any(|row| row.len() != width) {
        return Err(AppError::Validation(
            "feature rows must share a non-zero width".to_string(),
        ));
    }
    Ok(width)
}

fn check_width(scaler: &StandardScaler, x: &[Vec<f64>]) -> Result<(), AppError> {
    match x.iter().find(|row| row.len() != scaler.width()) {
        Some(row) => Err(AppError::Validation(format!(
            "expected {} features, got {}",
            scaler.width(),
            row.len()
        ))),
        None => Ok(()),
    }
}

fn clamp_score(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

fn regression_metrics(predicted: &[f64], actual: &[f64]) -> (f64, f64, f64) {
    let n = actual.len().max(1) as f64;
    let mae = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).abs())
        .sum::<f64>()
        / n;
    let ss_res: f64 = predicted.iter().zip(actual).map(|(p, a)| (p - a).powi(2)).sum();
    let mean = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let rmse = (ss_res / n).sqrt();
    let r2 = 1.0 - ss_res / ss_tot.max(1e-6);
    (mae, rmse, r2)
}

fn named_importances(raw: &[f64]) -> BTreeMap<String, f64> {
    let total: f64 = raw.iter().sum();
    raw.iter()
        .enumerate()
        .map(|(i, v)| {
            let name = FEATURE_NAMES
                .get(i)
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("feature_{i}"));
            let share = if total > 0.0 { v / total } else { 0.0 };
            (name, share)
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Boosted trees
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostingConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 4,
            learning_rate: 0.1,
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Gradient-boosted regression trees on squared error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedTreesModel {
    config: BoostingConfig,
    scaler: Option<StandardScaler>,
    base_prediction: f64,
    trees: Vec<RegressionTree>,
    metrics: Option<ModelMetrics>,
}

impl BoostedTreesModel {
    pub fn new(config: BoostingConfig) -> Self {
        Self {
            config,
            scaler: None,
            base_prediction: 0.0,
            trees: Vec::new(),
            metrics: None,
        }
    }

    fn raw_predict(&self, row: &[f64]) -> f64 {
        let boost: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        self.base_prediction + self.config.learning_rate * boost
    }
}

impl ScoringModel for BoostedTreesModel {
    fn train(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<ModelMetrics, AppError> {
        let width = validate_training_set(x, y)?;

        // Seeded shuffle, then hold out the first ⌈n · test_fraction⌉ rows.
        let mut order: Vec<usize> = (0..x.len()).collect();
        order.shuffle(&mut StdRng::seed_from_u64(self.config.seed));
        let n_test = ((x.len() as f64) * self.config.test_fraction).ceil() as usize;
        let n_test = n_test.clamp(1, x.len() - 1);
        let (test_idx, train_idx) = order.split_at(n_test);

        let train_x: Vec<Vec<f64>> = train_idx.iter().map(|&i| x[i].clone()).collect();
        let train_y: Vec<f64> = train_idx.iter().map(|&i| y[i]).collect();

        let scaler = StandardScaler::fit(&train_x);
        let scaled = scaler.transform(&train_x);
        let rows: Vec<usize> = (0..scaled.len()).collect();

        let base = train_y.iter().sum::<f64>() / train_y.len() as f64;
        let mut current = vec![base; train_y.len()];
        let mut importances = vec![0.0; width];
        let mut trees = Vec::with_capacity(self.config.n_trees);

        for _ in 0..self.config.n_trees {
            let residuals: Vec<f64> = train_y.iter().zip(&current).map(|(t, c)| t - c).collect();
            let tree = RegressionTree::fit(
                &scaled,
                &residuals,
                &rows,
                self.config.max_depth,
                &mut importances,
            );
            for (c, row) in current.iter_mut().zip(&scaled) {
                *c += self.config.learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        self.scaler = Some(scaler);
        self.base_prediction = base;
        self.trees = trees;

        let test_x: Vec<Vec<f64>> = test_idx.iter().map(|&i| x[i].clone()).collect();
        let test_y: Vec<f64> = test_idx.iter().map(|&i| y[i]).collect();
        let predicted = self.predict_unchecked(&test_x);
        let (mae, rmse, r2) = regression_metrics(&predicted, &test_y);

        let metrics = ModelMetrics {
            mae,
            rmse,
            r2,
            feature_importances: named_importances(&importances),
            n_samples: x.len(),
            trained_at: Utc::now(),
        };
        info!(
            backend = "boosted_trees",
            samples = x.len(),
            mae, rmse, r2, "Model trained"
        );
        self.metrics = Some(metrics.clone());
        Ok(metrics)
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, AppError> {
        let scaler = self.scaler.as_ref().ok_or(AppError::ModelNotTrained)?;
        check_width(scaler, x)?;
        Ok(self.predict_unchecked(x))
    }

    fn metrics(&self) -> Option<&ModelMetrics> {
        self.metrics.as_ref()
    }

    fn backend(&self) -> ModelBackend {
        ModelBackend::BoostedTrees
    }
}

impl BoostedTreesModel {
    fn predict_unchecked(&self, x: &[Vec<f64>]) -> Vec<f64> {
        match &self.scaler {
            Some(scaler) => x
                .iter()
                .map(|row| clamp_score(self.raw_predict(&scaler.transform_row(row))))
                .collect(),
            None => Vec::new(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Linear fallback
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConfig {
    pub iterations: usize,
    pub learning_rate: f64,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            learning_rate: 0.01,
        }
    }
}

/// Linear regression fitted by batch gradient descent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    config: LinearConfig,
    scaler: Option<StandardScaler>,
    weights: Vec<f64>,
    bias: f64,
    metrics: Option<ModelMetrics>,
}

impl LinearModel {
    pub fn new(config: LinearConfig) -> Self {
        Self {
            config,
            scaler: None,
            weights: Vec::new(),
            bias: 0.0,
            metrics: None,
        }
    }

    fn raw_predict(&self, row: &[f64]) -> f64 {
        self.bias + row.iter().zip(&self.weights).map(|(v, w)| v * w).sum::<f64>()
    }
}

impl ScoringModel for LinearModel {
    fn train(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<ModelMetrics, AppError> {
        let width = validate_training_set(x, y)?;
        let n = x.len() as f64;

        let scaler = StandardScaler::fit(x);
        let scaled = scaler.transform(x);

        self.weights = vec![0.0; width];
        self.bias = y.iter().sum::<f64>() / n;

        for _ in 0..self.config.iterations {
            let mut grad_w = vec![0.0; width];
            let mut grad_b = 0.0;
            for (row, target) in scaled.iter().zip(y) {
                let err = self.raw_predict(row) - target;
                for (g, v) in grad_w.iter_mut().zip(row) {
                    *g += err * v;
                }
                grad_b += err;
            }
            for (w, g) in self.weights.iter_mut().zip(&grad_w) {
                *w -= self.config.learning_rate * g / n;
            }
            self.bias -= self.config.learning_rate * grad_b / n;
        }

        self.scaler = Some(scaler);
        let predicted: Vec<f64> = scaled.iter().map(|r| clamp_score(self.raw_predict(r))).collect();
        let (mae, rmse, r2) = regression_metrics(&predicted, y);
        let magnitudes: Vec<f64> = self.weights.iter().map(|w| w.abs()).collect();

        let metrics = ModelMetrics {
            mae,
            rmse,
            r2,
            feature_importances: named_importances(&magnitudes),
            n_samples: x.len(),
            trained_at: Utc::now(),
        };
        info!(backend = "linear", samples = x.len(), mae, rmse, r2, "Model trained");
        self.metrics = Some(metrics.clone());
        Ok(metrics)
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, AppError> {
        let scaler = self.scaler.as_ref().ok_or(AppError::ModelNotTrained)?;
        check_width(scaler, x)?;
        Ok(x.iter()
            .map(|row| clamp_score(self.raw_predict(&scaler.transform_row(row))))
            .collect())
    }

    fn metrics(&self) -> Option<&ModelMetrics> {
        self.metrics.as_ref()
    }

    fn backend(&self) -> ModelBackend {
        ModelBackend::Linear
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Backend selection and persistence
// ────────────────────────────────────────────────────────────────────────────

/// A model of either backend. Tagged so the artifact names its own backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum AnyModel {
    BoostedTrees(BoostedTreesModel),
    Linear(LinearModel),
}

impl AnyModel {
    pub fn new(backend: ModelBackend) -> Self {
        match backend {
            ModelBackend::BoostedTrees => {
                AnyModel::BoostedTrees(BoostedTreesModel::new(BoostingConfig::default()))
            }
            ModelBackend::Linear => AnyModel::Linear(LinearModel::new(LinearConfig::default())),
        }
    }

    fn inner(&self) -> &dyn ScoringModel {
        match self {
            AnyModel::BoostedTrees(m) => m,
            AnyModel::Linear(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ScoringModel {
        match self {
            AnyModel::BoostedTrees(m) => m,
            AnyModel::Linear(m) => m,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if !self.is_trained() {
            return Err(AppError::ModelNotTrained);
        }
        let artifact = ModelArtifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            model: self.clone(),
        };
        write_json_atomic(path, &artifact)?;
        info!(path = %path.display(), "Model saved");
        Ok(())
    }

    /// Loads a saved model. Missing, corrupt, foreign-format or untrained
    /// artifacts are rejected.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let artifact: ModelArtifact = read_json(path)?;
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(AppError::Validation(format!(
                "unsupported model format version {}",
                artifact.format_version
            )));
        }
        if artifact.feature_names.len() != FEATURE_NAMES.len()
            || artifact
                .feature_names
                .iter()
                .zip(FEATURE_NAMES)
                .any(|(a, b)| a != b)
        {
            return Err(AppError::Validation(
                "model was trained on a different feature layout".to_string(),
            ));
        }
        if !artifact.model.is_trained() {
            return Err(AppError::ModelNotTrained);
        }
        info!(path = %path.display(), "Model loaded");
        Ok(artifact.model)
    }
}

impl ScoringModel for AnyModel {
    fn train(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<ModelMetrics, AppError> {
        self.inner_mut().train(x, y)
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, AppError> {
        self.inner().predict(x)
    }

    fn metrics(&self) -> Option<&ModelMetrics> {
        self.inner().metrics()
    }

    fn backend(&self) -> ModelBackend {
        self.inner().backend()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ModelArtifact {
    format_version: u32,
    feature_names: Vec<String>,
    model: AnyModel,
}
