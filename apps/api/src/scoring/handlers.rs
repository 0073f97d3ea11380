use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::ml::pipeline::MlAnalysis;
use crate::models::cv::CvRecord;
use crate::scoring::job_scorer::{
    filter_candidates, CandidateCriteria, JobScorer, ScoreBreakdown, SectorScore, SkillGapReport,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SectorRequest {
    pub cv: CvRecord,
    pub sector: String,
}

#[derive(Debug, Deserialize)]
pub struct CvRequest {
    pub cv: CvRecord,
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub candidates: Vec<CvRecord>,
    #[serde(default)]
    pub criteria: CandidateCriteria,
}

#[derive(Serialize)]
pub struct SectorListResponse {
    pub sectors: Vec<String>,
}

#[derive(Serialize)]
pub struct ScoreResponse {
    pub sector: String,
    pub score: f64,
    /// Present when ML adjustment is enabled and a model is trained.
    pub ml: Option<MlAnalysis>,
}

#[derive(Serialize)]
pub struct BreakdownResponse {
    pub sector: String,
    pub breakdown: Option<ScoreBreakdown>,
}

#[derive(Serialize)]
pub struct FilterResponse {
    pub count: usize,
    pub candidates: Vec<CvRecord>,
}

/// GET /api/v1/sectors
pub async fn handle_list_sectors(State(state): State<AppState>) -> Json<SectorListResponse> {
    Json(SectorListResponse {
        sectors: state.catalog.names().map(str::to_string).collect(),
    })
}

/// POST /api/v1/score
pub async fn handle_score(
    State(state): State<AppState>,
    Json(req): Json<SectorRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    req.cv.validate()?;
    let score = JobScorer::new(&state.catalog).score(&req.cv, &req.sector);
    if state.catalog.get(&req.sector).is_none() {
        warn!(sector = %req.sector, "Scoring against unknown sector");
    }

    let ml = if state.config.ml_enabled {
        let pipeline = state.ml.read().await;
        if pipeline.is_trained() {
            Some(pipeline.analyze(&req.cv, &req.sector, score)?)
        } else {
            debug!("ML enabled but no model is trained");
            None
        }
    } else {
        None
    };

    Ok(Json(ScoreResponse {
        sector: req.sector,
        score,
        ml,
    }))
}

/// POST /api/v1/breakdown
pub async fn handle_breakdown(
    State(state): State<AppState>,
    Json(req): Json<SectorRequest>,
) -> Result<Json<BreakdownResponse>, AppError> {
    req.cv.validate()?;
    let breakdown = JobScorer::new(&state.catalog).breakdown(&req.cv, &req.sector);
    Ok(Json(BreakdownResponse {
        sector: req.sector,
        breakdown,
    }))
}

/// POST /api/v1/rank
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(req): Json<CvRequest>,
) -> Result<Json<Vec<SectorScore>>, AppError> {
    req.cv.validate()?;
    Ok(Json(JobScorer::new(&state.catalog).rank_all_sectors(&req.cv)))
}

/// POST /api/v1/skill-gaps
pub async fn handle_skill_gaps(
    State(state): State<AppState>,
    Json(req): Json<SectorRequest>,
) -> Result<Json<SkillGapReport>, AppError> {
    req.cv.validate()?;
    Ok(Json(JobScorer::new(&state.catalog).skill_gaps(&req.cv, &req.sector)))
}

/// POST /api/v1/filter
pub async fn handle_filter(Json(req): Json<FilterRequest>) -> Result<Json<FilterResponse>, AppError> {
    for cv in &req.candidates {
        cv.validate()?;
    }
    let candidates: Vec<CvRecord> = filter_candidates(&req.candidates, &req.criteria)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(FilterResponse {
        count: candidates.len(),
        candidates,
    }))
}
