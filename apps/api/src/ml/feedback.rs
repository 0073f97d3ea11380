//! Append-only feedback log backing retraining.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::ml::storage::{read_json, write_json_atomic};

pub const FEEDBACK_FILE: &str = "feedback.json";

/// Proxy targets used when only a hire outcome is known.
const HIRED_FLOOR: f64 = 80.0;
const REJECTED_CEILING: f64 = 40.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub cv_hash: String,
    pub sector: String,
    pub predicted_score: f64,
    pub actual_score: Option<f64>,
    pub was_hired: Option<bool>,
    pub user_rating: Option<u8>,
    #[serde(default)]
    pub notes: String,
    pub features: Vec<f64>,
}

/// Everything a caller supplies when recording feedback.
#[derive(Debug, Clone, Default)]
pub struct NewFeedback {
    pub cv_hash: String,
    pub sector: String,
    pub predicted_score: f64,
    pub actual_score: Option<f64>,
    pub was_hired: Option<bool>,
    pub user_rating: Option<u8>,
    pub notes: String,
    pub features: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackStatistics {
    pub total_entries: usize,
    pub entries_with_actual_score: usize,
    pub entries_with_outcome: usize,
    pub candidates_hired: usize,
    pub average_prediction_error: f64,
    pub sector_distribution: BTreeMap<String, usize>,
}

/// Feedback rows flattened into a ready-to-train matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExport {
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
    pub num_samples: usize,
    pub export_date: DateTime<Utc>,
}

#[derive(Debug)]
pub struct FeedbackStore {
    path: PathBuf,
    entries: Vec<FeedbackEntry>,
}

impl FeedbackStore {
    pub fn empty(dir: &Path) -> Self {
        Self {
            path: dir.join(FEEDBACK_FILE),
            entries: Vec::new(),
        }
    }

    /// Reads `dir/feedback.json`. A missing file is an error here; callers
    /// decide whether absence means "start empty".
    pub fn load(dir: &Path) -> Result<Self, AppError> {
        let path = dir.join(FEEDBACK_FILE);
        let entries: Vec<FeedbackEntry> = read_json(&path)?;
        info!(path = %path.display(), entries = entries.len(), "Feedback loaded");
        Ok(Self { path, entries })
    }

    pub fn save(&self) -> Result<(), AppError> {
        write_json_atomic(&self.path, &self.entries)?;
        debug!(path = %self.path.display(), entries = self.entries.len(), "Feedback saved");
        Ok(())
    }

    pub fn entries(&self) -> &[FeedbackEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Swaps in a new entry list, e.g. from an imported backup. Not saved.
    pub fn replace_entries(&mut self, entries: Vec<FeedbackEntry>) {
        self.entries = entries;
    }

    /// Writes [`training_data`](Self::training_data) to `path`. Nothing is
    /// written when no entry is usable; returns the number of rows.
    pub fn export_for_training(&self, path: &Path) -> Result<usize, AppError> {
        let (features, targets) = self.training_data();
        if features.is_empty() {
            debug!(path = %path.display(), "No usable feedback, training export skipped");
            return Ok(0);
        }
        let export = TrainingExport {
            num_samples: features.len(),
            features,
            targets,
            export_date: Utc::now(),
        };
        write_json_atomic(path, &export)?;
        info!(path = %path.display(), rows = export.num_samples, "Feedback exported for training");
        Ok(export.num_samples)
    }

    pub fn add(&mut self, feedback: NewFeedback) -> Result<&FeedbackEntry, AppError> {
        if let Some(rating) = feedback.user_rating {
            if !(1..=5).contains(&rating) {
                return Err(AppError::Validation(format!(
                    "user_rating must be between 1 and 5, got {rating}"
                )));
            }
        }
        if feedback.sector.trim().is_empty() {
            return Err(AppError::Validation("sector is required".to_string()));
        }

        self.entries.push(FeedbackEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            cv_hash: feedback.cv_hash,
            sector: feedback.sector,
            predicted_score: feedback.predicted_score,
            actual_score: feedback.actual_score,
            was_hired: feedback.was_hired,
            user_rating: feedback.user_rating,
            notes: feedback.notes,
            features: feedback.features,
        });
        let entry = &self.entries[self.entries.len() - 1];
        Ok(entry)
    }

    /// Attaches a delayed outcome to the most recent entry for
    /// `(cv_hash, sector)`. Returns the updated entry, if any matched.
    pub fn record_outcome(
        &mut self,
        cv_hash: &str,
        sector: &str,
        was_hired: bool,
        actual_score: Option<f64>,
    ) -> Option<&FeedbackEntry> {
        let entry = self
            .entries
            .iter_mut()
            .rev()
            .find(|e| e.cv_hash == cv_hash && e.sector == sector)?;
        entry.was_hired = Some(was_hired);
        if actual_score.is_some() {
            entry.actual_score = actual_score;
        }
        Some(&*entry)
    }

    /// Feature rows and targets for entries that carry a corrected score or
    /// an outcome. The corrected score wins over the outcome.
    pub fn training_data(&self) -> (Vec<Vec<f64>>, Vec<f64>) {
        self.entries
            .iter()
            .filter(|e| !e.features.is_empty())
            .filter_map(|e| {
                let target = match (e.actual_score, e.was_hired) {
                    (Some(actual), _) => actual,
                    (None, Some(true)) => e.predicted_score.max(HIRED_FLOOR),
                    (None, Some(false)) => e.predicted_score.min(REJECTED_CEILING),
                    (None, None) => return None,
                };
                Some((e.features.clone(), target))
            })
            .unzip()
    }

    pub fn statistics(&self) -> FeedbackStatistics {
        let mut sector_distribution = BTreeMap::new();
        for entry in &self.entries {
            *sector_distribution.entry(entry.sector.clone()).or_insert(0) += 1;
        }
        let errors: Vec<f64> = self
            .entries
            .iter()
            .filter_map(|e| e.actual_score.map(|a| (e.predicted_score - a).abs()))
            .collect();

        FeedbackStatistics {
            total_entries: self.entries.len(),
            entries_with_actual_score: errors.len(),
            entries_with_outcome: self.entries.iter().filter(|e| e.was_hired.is_some()).count(),
            candidates_hired: self
                .entries
                .iter()
                .filter(|e| e.was_hired == Some(true))
                .count(),
            average_prediction_error: mean_or_zero(&errors),
            sector_distribution,
        }
    }

    /// Mean absolute error over the last `window` entries with a corrected
    /// score.
    pub fn recent_error(&self, window: usize) -> f64 {
        let errors: Vec<f64> = self
            .entries
            .iter()
            .rev()
            .filter_map(|e| e.actual_score.map(|a| (e.predicted_score - a).abs()))
            .take(window)
            .collect();
        mean_or_zero(&errors)
    }
}

fn mean_or_zero(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
