//! ML pipeline. Owns the active model and the feedback store, and ties
//! feature extraction, training and retraining together.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::AppError;
use crate::ml::feedback::{
    FeedbackEntry, FeedbackStatistics, FeedbackStore, NewFeedback, FEEDBACK_FILE,
};
use crate::ml::features::FeatureExtractor;
use crate::ml::model::{AnyModel, ModelBackend, ModelMetrics, ScoringModel, MIN_TRAINING_SAMPLES};
use crate::ml::storage::{read_json, write_json_atomic};
use crate::ml::synthetic::{self, SyntheticGenerator, TrainingSample};
use crate::models::cv::CvRecord;
use crate::models::sector::SectorCatalog;

pub const MODEL_FILE: &str = "scoring_model.json";
pub const DEFAULT_SYNTHETIC_SAMPLES: usize = 200;

// File names inside an exported state directory.
pub const EXPORT_MODEL_FILE: &str = "model.json";
pub const EXPORT_STATUS_FILE: &str = "pipeline_status.json";
pub const EXPORT_TRAINING_FILE: &str = "training_export.json";

const SYNTHETIC_SEED: u64 = 42;
/// Feedback rows are duplicated this many times when blended with synthetic data.
const FEEDBACK_WEIGHT: usize = 2;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub model_dir: PathBuf,
    pub feedback_dir: PathBuf,
    pub training_dir: PathBuf,
    pub backend: ModelBackend,
    pub min_samples_for_training: usize,
    pub retrain_threshold: f64,
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            model_dir: config.model_dir.clone(),
            feedback_dir: config.feedback_dir.clone(),
            training_dir: config.training_dir.clone(),
            backend: config.ml_backend,
            min_samples_for_training: config.min_samples_for_training,
            retrain_threshold: config.retrain_threshold,
        }
    }
}

/// Rule score next to its ML-adjusted counterpart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MlAnalysis {
    pub sector: String,
    pub rule_based_score: f64,
    pub ml_prediction: Option<f64>,
    pub adjustment_factor: f64,
    pub adjusted_score: f64,
    pub ml_applied: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MlStatus {
    pub model_trained: bool,
    pub backend: Option<ModelBackend>,
    pub metrics: Option<ModelMetrics>,
    pub feedback_count: usize,
    pub should_retrain: bool,
    pub feedback_stats: FeedbackStatistics,
    pub weight_recommendations: BTreeMap<String, f64>,
}

/// What an export or import moved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateTransfer {
    pub dir: PathBuf,
    pub model: bool,
    pub feedback_entries: usize,
    pub training_rows: usize,
}

pub struct MlPipeline {
    config: PipelineConfig,
    catalog: Arc<SectorCatalog>,
    model: Option<AnyModel>,
    feedback: FeedbackStore,
}

impl MlPipeline {
    /// Opens the pipeline from disk. A missing model or feedback file starts
    /// empty; a file that exists but cannot be read is an error.
    pub fn open(config: PipelineConfig, catalog: Arc<SectorCatalog>) -> Result<Self, AppError> {
        let model_path = config.model_dir.join(MODEL_FILE);
        let model = if model_path.exists() {
            Some(AnyModel::load(&model_path)?)
        } else {
            info!(path = %model_path.display(), "No saved model, ML adjustment unavailable");
            None
        };

        let feedback = if config.feedback_dir.join(FEEDBACK_FILE).exists() {
            FeedbackStore::load(&config.feedback_dir)?
        } else {
            info!(dir = %config.feedback_dir.display(), "No feedback file, starting empty");
            FeedbackStore::empty(&config.feedback_dir)
        };

        Ok(Self {
            config,
            catalog,
            model,
            feedback,
        })
    }

    pub fn is_trained(&self) -> bool {
        self.model.as_ref().is_some_and(|m| m.is_trained())
    }

    fn trained_model(&self) -> Result<&AnyModel, AppError> {
        self.model
            .as_ref()
            .filter(|m| m.is_trained())
            .ok_or(AppError::ModelNotTrained)
    }

    pub fn extract_features(&self, cv: &CvRecord, sector: &str) -> Vec<f64> {
        FeatureExtractor::new(&self.catalog).extract(cv, sector)
    }

    fn features_and_targets(&self, samples: &[TrainingSample]) -> (Vec<Vec<f64>>, Vec<f64>) {
        let extractor = FeatureExtractor::new(&self.catalog);
        samples
            .iter()
            .map(|s| (extractor.extract(&s.cv, &s.sector), s.expected_score))
            .unzip()
    }

    fn persist_model(&self, model: &AnyModel) -> Result<(), AppError> {
        let active = self.config.model_dir.join(MODEL_FILE);
        if active.exists() {
            let stamp = Utc::now().format("%Y%m%d_%H%M%S");
            let backup = self.config.model_dir.join(format!("scoring_model_{stamp}.json"));
            std::fs::copy(&active, &backup)?;
            info!(backup = %backup.display(), "Previous model backed up");
        }
        model.save(&active)
    }

    /// Generates `n` synthetic samples, trains a fresh model on them and
    /// makes it active.
    pub fn train_initial_model(&mut self, n: usize) -> Result<ModelMetrics, AppError> {
        info!(samples = n, backend = ?self.config.backend, "Training initial model");
        let samples = SyntheticGenerator::new(SYNTHETIC_SEED).generate(n, &synthetic::template_sectors());
        synthetic::save_samples(&self.config.training_dir, &samples)?;

        let (x, y) = self.features_and_targets(&samples);
        let mut model = AnyModel::new(self.config.backend);
        let metrics = model.train(&x, &y)?;

        self.persist_model(&model)?;
        self.model = Some(model);
        Ok(metrics)
    }

    pub fn predict_score(&self, cv: &CvRecord, sector: &str) -> Result<f64, AppError> {
        let model = self.trained_model()?;
        model.predict_single(&self.extract_features(cv, sector))
    }

    /// `base × factor` clamped to `[0, 100]`, or `base` unchanged without a
    /// trained model.
    pub fn adjusted_score(&self, cv: &CvRecord, sector: &str, base: f64) -> Result<f64, AppError> {
        Ok(self.analyze(cv, sector, base)?.adjusted_score)
    }

    pub fn analyze(&self, cv: &CvRecord, sector: &str, base: f64) -> Result<MlAnalysis, AppError> {
        let Ok(model) = self.trained_model() else {
            return Ok(MlAnalysis {
                sector: sector.to_string(),
                rule_based_score: base,
                ml_prediction: None,
                adjustment_factor: 1.0,
                adjusted_score: base,
                ml_applied: false,
            });
        };

        let features = self.extract_features(cv, sector);
        let prediction = model.predict_single(&features)?;
        let factor = model.get_adjustment_factor(&features, base)?;
        Ok(MlAnalysis {
            sector: sector.to_string(),
            rule_based_score: base,
            ml_prediction: Some(prediction).filter(|p| p.is_finite()),
            adjustment_factor: factor,
            adjusted_score: (base * factor).clamp(0.0, 100.0),
            ml_applied: true,
        })
    }

    /// Appends a feedback entry for `(cv, sector)` and saves the store.
    #[allow(clippy::too_many_arguments)]
    pub fn record_feedback(
        &mut self,
        cv: &CvRecord,
        sector: &str,
        predicted_score: f64,
        actual_score: Option<f64>,
        was_hired: Option<bool>,
        user_rating: Option<u8>,
        notes: String,
    ) -> Result<FeedbackEntry, AppError> {
        let features = self.extract_features(cv, sector);
        let entry = self
            .feedback
            .add(NewFeedback {
                cv_hash: cv.identity_hash(),
                sector: sector.to_string(),
                predicted_score,
                actual_score,
                was_hired,
                user_rating,
                notes,
                features,
            })?
            .clone();
        self.feedback.save()?;
        info!(cv_hash = %entry.cv_hash, sector, "Feedback recorded");
        Ok(entry)
    }

    pub fn record_outcome(
        &mut self,
        cv_hash: &str,
        sector: &str,
        was_hired: bool,
        actual_score: Option<f64>,
    ) -> Result<FeedbackEntry, AppError> {
        let entry = self
            .feedback
            .record_outcome(cv_hash, sector, was_hired, actual_score)
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!("No feedback for candidate {cv_hash} in {sector}"))
            })?;
        self.feedback.save()?;
        info!(cv_hash, sector, was_hired, "Outcome recorded");
        Ok(entry)
    }

    pub fn should_retrain(&self) -> bool {
        let corrected = self
            .feedback
            .entries()
            .iter()
            .filter(|e| e.actual_score.is_some())
            .count();
        corrected >= self.config.min_samples_for_training
            && self.feedback.recent_error(self.config.min_samples_for_training)
                > self.config.retrain_threshold
    }

    /// Retrains on stored synthetic data plus weighted feedback rows, backs
    /// up the previous artifact and swaps the new model in.
    pub fn retrain_with_feedback(&mut self) -> Result<ModelMetrics, AppError> {
        let (feedback_x, feedback_y) = self.feedback.training_data();
        if feedback_x.len() < MIN_TRAINING_SAMPLES {
            return Err(AppError::InsufficientSamples {
                required: MIN_TRAINING_SAMPLES,
                actual: feedback_x.len(),
            });
        }

        let training_file = self.config.training_dir.join(synthetic::TRAINING_FILE);
        let samples = if training_file.exists() {
            synthetic::load_samples(&self.config.training_dir)?
        } else {
            warn!(path = %training_file.display(), "No synthetic training data, retraining on feedback only");
            Vec::new()
        };

        let (mut x, mut y) = self.features_and_targets(&samples);
        for (row, target) in feedback_x.iter().zip(&feedback_y) {
            for _ in 0..FEEDBACK_WEIGHT {
                x.push(row.clone());
                y.push(*target);
            }
        }
        info!(
            samples = x.len(),
            feedback = feedback_x.len(),
            "Retraining with feedback"
        );

        let mut model = AnyModel::new(self.config.backend);
        let metrics = model.train(&x, &y)?;
        self.persist_model(&model)?;
        self.model = Some(model);
        Ok(metrics)
    }

    /// Writes the trained model (if any), the feedback log, a feedback
    /// training matrix and the current status into `dir`.
    pub fn export_state(&self, dir: &Path) -> Result<StateTransfer, AppError> {
        std::fs::create_dir_all(dir)?;

        let model = match self.trained_model() {
            Ok(model) => {
                model.save(&dir.join(EXPORT_MODEL_FILE))?;
                true
            }
            Err(_) => false,
        };
        write_json_atomic(&dir.join(FEEDBACK_FILE), &self.feedback.entries())?;
        let training_rows = self.feedback.export_for_training(&dir.join(EXPORT_TRAINING_FILE))?;
        write_json_atomic(&dir.join(EXPORT_STATUS_FILE), &self.status())?;

        info!(dir = %dir.display(), model, feedback = self.feedback.len(), "Pipeline state exported");
        Ok(StateTransfer {
            dir: dir.to_path_buf(),
            model,
            feedback_entries: self.feedback.len(),
            training_rows,
        })
    }

    /// Installs an exported model and feedback log as the active state.
    /// Both files are read and validated before anything is replaced, so a
    /// corrupt export leaves the running pipeline untouched.
    pub fn import_state(&mut self, dir: &Path) -> Result<StateTransfer, AppError> {
        if !dir.is_dir() {
            return Err(AppError::NotFound(format!(
                "No exported state at {}",
                dir.display()
            )));
        }

        let model_path = dir.join(EXPORT_MODEL_FILE);
        let model = if model_path.exists() {
            Some(AnyModel::load(&model_path)?)
        } else {
            None
        };
        let feedback_path = dir.join(FEEDBACK_FILE);
        let entries: Option<Vec<FeedbackEntry>> = if feedback_path.exists() {
            Some(read_json(&feedback_path)?)
        } else {
            None
        };
        if model.is_none() && entries.is_none() {
            return Err(AppError::NotFound(format!(
                "No model or feedback to import in {}",
                dir.display()
            )));
        }

        let imported_model = model.is_some();
        if let Some(model) = model {
            self.persist_model(&model)?;
            self.model = Some(model);
        }
        if let Some(entries) = entries {
            self.feedback.replace_entries(entries);
            self.feedback.save()?;
        }

        info!(dir = %dir.display(), model = imported_model, feedback = self.feedback.len(), "Pipeline state imported");
        Ok(StateTransfer {
            dir: dir.to_path_buf(),
            model: imported_model,
            feedback_entries: self.feedback.len(),
            training_rows: self.feedback.training_data().0.len(),
        })
    }

    pub fn status(&self) -> MlStatus {
        let trained = self.trained_model().ok();
        MlStatus {
            model_trained: trained.is_some(),
            backend: trained.map(|m| m.backend()),
            metrics: trained.and_then(|m| m.metrics().cloned()),
            feedback_count: self.feedback.len(),
            should_retrain: self.should_retrain(),
            feedback_stats: self.feedback.statistics(),
            weight_recommendations: trained
                .map(|m| m.get_weight_adjustments())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config(root: &Path, backend: ModelBackend) -> PipelineConfig {
        PipelineConfig {
            model_dir: root.join("models"),
            feedback_dir: root.join("feedback"),
            training_dir: root.join("training"),
            backend,
            min_samples_for_training: 3,
            retrain_threshold: 15.0,
        }
    }

    fn pipeline(root: &Path) -> MlPipeline {
        let catalog = Arc::new(SectorCatalog::builtin().unwrap());
        MlPipeline::open(config(root, ModelBackend::Linear), catalog).unwrap()
    }

    fn candidate(name: &str) -> CvRecord {
        CvRecord {
            first_name: name.to_string(),
            last_name: "Tester".to_string(),
            computer_skills: "python, sql, linux".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_untrained_pipeline_passes_score_through() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path());
        assert!(!pipeline.is_trained());

        let analysis = pipeline.analyze(&candidate("A"), "Computers_ICT", 42.0).unwrap();
        assert!(!analysis.ml_applied);
        assert_eq!(analysis.adjusted_score, 42.0);
        assert_eq!(analysis.adjustment_factor, 1.0);
        assert_eq!(pipeline.adjusted_score(&candidate("A"), "Healthcare", 17.5).unwrap(), 17.5);
        assert!(matches!(
            pipeline.predict_score(&candidate("A"), "Computers_ICT"),
            Err(AppError::ModelNotTrained)
        ));
    }

    #[test]
    fn test_initial_training_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = pipeline(dir.path());
        let metrics = first.train_initial_model(60).unwrap();
        assert_eq!(metrics.n_samples, 60);
        assert!(dir.path().join("models").join(MODEL_FILE).exists());
        assert!(dir.path().join("training").join(synthetic::TRAINING_FILE).exists());

        let cv = candidate("B");
        let before = first.predict_score(&cv, "Computers_ICT").unwrap();
        let reopened = pipeline(dir.path());
        assert!(reopened.is_trained());
        assert_eq!(reopened.predict_score(&cv, "Computers_ICT").unwrap(), before);

        let analysis = reopened.analyze(&cv, "Computers_ICT", 50.0).unwrap();
        assert!(analysis.ml_applied);
        assert!((0.7..=1.3).contains(&analysis.adjustment_factor));
        assert!((0.0..=100.0).contains(&analysis.adjusted_score));
        assert_eq!(
            reopened.adjusted_score(&cv, "Computers_ICT", 50.0).unwrap(),
            analysis.adjusted_score
        );
    }

    #[test]
    fn test_corrupt_model_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let models = dir.path().join("models");
        std::fs::create_dir_all(&models).unwrap();
        std::fs::write(models.join(MODEL_FILE), "not a model").unwrap();

        let catalog = Arc::new(SectorCatalog::builtin().unwrap());
        assert!(MlPipeline::open(config(dir.path(), ModelBackend::Linear), catalog).is_err());
    }

    #[test]
    fn test_feedback_outcome_and_retrain_trigger() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(dir.path());

        for (i, actual) in [90.0, 85.0, 95.0].into_iter().enumerate() {
            pipeline
                .record_feedback(
                    &candidate(&format!("C{i}")),
                    "Computers_ICT",
                    40.0,
                    Some(actual),
                    None,
                    Some(2),
                    String::new(),
                )
                .unwrap();
        }
        assert!(pipeline.should_retrain(), "three corrections off by 45+ points");

        let cv = candidate("D");
        pipeline
            .record_feedback(&cv, "Healthcare", 30.0, None, None, None, String::new())
            .unwrap();
        let updated = pipeline
            .record_outcome(&cv.identity_hash(), "Healthcare", true, None)
            .unwrap();
        assert_eq!(updated.was_hired, Some(true));
        assert!(matches!(
            pipeline.record_outcome("unknown", "Healthcare", false, None),
            Err(AppError::NotFound(_))
        ));

        let status = pipeline.status();
        assert_eq!(status.feedback_count, 4);
        assert!(status.weight_recommendations.is_empty());
        assert!(FeedbackStore::load(&dir.path().join("feedback")).unwrap().len() == 4);
    }

    #[test]
    fn test_retrain_needs_enough_feedback() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(dir.path());
        pipeline
            .record_feedback(&candidate("E"), "Healthcare", 30.0, Some(60.0), None, None, String::new())
            .unwrap();
        assert!(matches!(
            pipeline.retrain_with_feedback(),
            Err(AppError::InsufficientSamples {
                required: 10,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_non_finite_cv_field_keeps_state_reloadable() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = pipeline(dir.path());
        first.train_initial_model(40).unwrap();

        let cv = CvRecord {
            years_studied: "NaN".to_string(),
            ..candidate("N")
        };
        let analysis = first.analyze(&cv, "Computers_ICT", 60.0).unwrap();
        assert!((0.7..=1.3).contains(&analysis.adjustment_factor));
        assert!(analysis.adjusted_score.is_finite());

        let entry = first
            .record_feedback(&cv, "Computers_ICT", 60.0, Some(70.0), None, None, String::new())
            .unwrap();
        assert!(entry.features.iter().all(|v| v.is_finite()));

        let reopened = pipeline(dir.path());
        assert_eq!(reopened.status().feedback_count, 1);
    }

    #[test]
    fn test_export_then_import_into_fresh_pipeline() {
        let source_dir = tempfile::tempdir().unwrap();
        let mut source = pipeline(source_dir.path());
        source.train_initial_model(40).unwrap();
        let cv = candidate("G");
        source
            .record_feedback(&cv, "Computers_ICT", 55.0, Some(70.0), None, Some(4), String::new())
            .unwrap();
        source
            .record_feedback(&candidate("H"), "Healthcare", 30.0, None, None, None, String::new())
            .unwrap();

        let export_dir = source_dir.path().join("export");
        let exported = source.export_state(&export_dir).unwrap();
        assert!(exported.model);
        assert_eq!(exported.feedback_entries, 2);
        assert_eq!(exported.training_rows, 1);
        for file in [EXPORT_MODEL_FILE, FEEDBACK_FILE, EXPORT_STATUS_FILE, EXPORT_TRAINING_FILE] {
            assert!(export_dir.join(file).exists(), "{file}");
        }

        let target_dir = tempfile::tempdir().unwrap();
        let mut target = pipeline(target_dir.path());
        assert!(!target.is_trained());
        let imported = target.import_state(&export_dir).unwrap();
        assert!(imported.model);
        assert_eq!(imported.feedback_entries, 2);

        assert_eq!(
            target.predict_score(&cv, "Computers_ICT").unwrap(),
            source.predict_score(&cv, "Computers_ICT").unwrap()
        );
        // The import is installed at the active locations and survives a restart.
        let reopened = pipeline(target_dir.path());
        assert!(reopened.is_trained());
        assert_eq!(reopened.status().feedback_count, 2);
    }

    #[test]
    fn test_export_without_model_skips_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path());
        let exported = pipeline.export_state(&dir.path().join("export")).unwrap();
        assert!(!exported.model);
        assert_eq!(exported.training_rows, 0);
        assert!(!dir.path().join("export").join(EXPORT_MODEL_FILE).exists());
        assert!(dir.path().join("export").join(FEEDBACK_FILE).exists());
    }

    #[test]
    fn test_import_fails_closed_on_corrupt_files() {
        let source_dir = tempfile::tempdir().unwrap();
        let mut source = pipeline(source_dir.path());
        source.train_initial_model(40).unwrap();
        let export_dir = source_dir.path().join("export");
        source.export_state(&export_dir).unwrap();
        std::fs::write(export_dir.join(FEEDBACK_FILE), "[{\"cv_hash\": ").unwrap();

        let target_dir = tempfile::tempdir().unwrap();
        let mut target = pipeline(target_dir.path());
        target
            .record_feedback(&candidate("I"), "Healthcare", 30.0, None, None, None, String::new())
            .unwrap();

        assert!(matches!(
            target.import_state(&export_dir),
            Err(AppError::Serialization(_))
        ));
        assert!(!target.is_trained(), "model must not be installed from a partial import");
        assert!(!target_dir.path().join("models").join(MODEL_FILE).exists());
        assert_eq!(target.status().feedback_count, 1);

        std::fs::write(export_dir.join(EXPORT_MODEL_FILE), "{}").unwrap();
        assert!(target.import_state(&export_dir).is_err());
        assert!(matches!(
            target.import_state(&source_dir.path().join("missing")),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_retrain_backs_up_previous_model() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(dir.path());
        pipeline.train_initial_model(40).unwrap();

        for i in 0..12 {
            pipeline
                .record_feedback(
                    &candidate(&format!("F{i}")),
                    "Computers_ICT",
                    50.0,
                    Some(50.0 + i as f64),
                    None,
                    None,
                    String::new(),
                )
                .unwrap();
        }
        let metrics = pipeline.retrain_with_feedback().unwrap();
        assert_eq!(metrics.n_samples, 40 + 12 * FEEDBACK_WEIGHT);

        let backups = std::fs::read_dir(dir.path().join("models"))
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with("scoring_model_"))
            .count();
        assert_eq!(backups, 1);
        assert!(pipeline.status().model_trained);
    }
}
