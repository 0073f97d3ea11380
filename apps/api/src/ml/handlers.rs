use std::path::{Path, PathBuf};

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::ml::feedback::FeedbackEntry;
use crate::ml::model::ModelMetrics;
use crate::ml::pipeline::{MlStatus, StateTransfer, DEFAULT_SYNTHETIC_SAMPLES};
use crate::models::cv::CvRecord;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TrainRequest {
    pub samples: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub cv: CvRecord,
    pub sector: String,
    pub predicted_score: f64,
    pub actual_score: Option<f64>,
    pub was_hired: Option<bool>,
    pub user_rating: Option<u8>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct OutcomeRequest {
    pub cv_hash: String,
    pub sector: String,
    pub was_hired: bool,
    pub actual_score: Option<f64>,
}

/// Names a state directory below the configured export root.
#[derive(Debug, Deserialize)]
pub struct StateRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct FeedbackResponse {
    pub entry: FeedbackEntry,
    pub should_retrain: bool,
}

/// POST /api/v1/ml/train
pub async fn handle_train(
    State(state): State<AppState>,
    Json(req): Json<TrainRequest>,
) -> Result<Json<ModelMetrics>, AppError> {
    let samples = req.samples.unwrap_or(DEFAULT_SYNTHETIC_SAMPLES);
    let mut ml = state.ml.write().await;
    let metrics = ml.train_initial_model(samples)?;
    Ok(Json(metrics))
}

/// POST /api/v1/ml/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>), AppError> {
    req.cv.validate()?;
    if state.catalog.get(&req.sector).is_none() {
        return Err(AppError::NotFound(format!("Unknown sector '{}'", req.sector)));
    }

    let mut ml = state.ml.write().await;
    let entry = ml.record_feedback(
        &req.cv,
        &req.sector,
        req.predicted_score,
        req.actual_score,
        req.was_hired,
        req.user_rating,
        req.notes,
    )?;
    Ok((
        StatusCode::CREATED,
        Json(FeedbackResponse {
            entry,
            should_retrain: ml.should_retrain(),
        }),
    ))
}

/// POST /api/v1/ml/outcome
pub async fn handle_outcome(
    State(state): State<AppState>,
    Json(req): Json<OutcomeRequest>,
) -> Result<Json<FeedbackEntry>, AppError> {
    let mut ml = state.ml.write().await;
    let entry = ml.record_outcome(&req.cv_hash, &req.sector, req.was_hired, req.actual_score)?;
    Ok(Json(entry))
}

/// POST /api/v1/ml/retrain
pub async fn handle_retrain(
    State(state): State<AppState>,
) -> Result<Json<ModelMetrics>, AppError> {
    let mut ml = state.ml.write().await;
    Ok(Json(ml.retrain_with_feedback()?))
}

/// GET /api/v1/ml/status
pub async fn handle_status(State(state): State<AppState>) -> Json<MlStatus> {
    Json(state.ml.read().await.status())
}

/// Resolves a client-supplied state name to a single directory below `root`.
fn state_dir(root: &Path, name: &str) -> Result<PathBuf, AppError> {
    let name = name.trim();
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid {
        return Err(AppError::Validation(format!(
            "state name must be a plain directory name, got '{name}'"
        )));
    }
    Ok(root.join(name))
}

/// POST /api/v1/ml/export
pub async fn handle_export(
    State(state): State<AppState>,
    Json(req): Json<StateRequest>,
) -> Result<(StatusCode, Json<StateTransfer>), AppError> {
    let dir = state_dir(&state.config.export_dir, &req.name)?;
    let ml = state.ml.read().await;
    Ok((StatusCode::CREATED, Json(ml.export_state(&dir)?)))
}

/// POST /api/v1/ml/import
pub async fn handle_import(
    State(state): State<AppState>,
    Json(req): Json<StateRequest>,
) -> Result<Json<StateTransfer>, AppError> {
    let dir = state_dir(&state.config.export_dir, &req.name)?;
    let mut ml = state.ml.write().await;
    Ok(Json(ml.import_state(&dir)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_dir_accepts_plain_names_only() {
        let root = Path::new("/srv/exports");
        assert_eq!(
            state_dir(root, " backup-2024_01.v2 ").unwrap(),
            root.join("backup-2024_01.v2")
        );
        for bad in ["", "..", ".hidden", "../etc", "a/b", "a\\b", "/abs"] {
            assert!(
                matches!(state_dir(root, bad), Err(AppError::Validation(_))),
                "{bad:?}"
            );
        }
    }
}
