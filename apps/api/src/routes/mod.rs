pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ml::handlers as ml;
use crate::personality::handlers as personality;
use crate::scoring::handlers as scoring;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Rule-based scoring
        .route("/api/v1/sectors", get(scoring::handle_list_sectors))
        .route("/api/v1/score", post(scoring::handle_score))
        .route("/api/v1/breakdown", post(scoring::handle_breakdown))
        .route("/api/v1/rank", post(scoring::handle_rank))
        .route("/api/v1/skill-gaps", post(scoring::handle_skill_gaps))
        .route("/api/v1/filter", post(scoring::handle_filter))
        // Personality
        .route("/api/v1/personality", post(personality::handle_personality))
        .route("/api/v1/analyze", post(personality::handle_analyze))
        // ML adjustment layer
        .route("/api/v1/ml/train", post(ml::handle_train))
        .route("/api/v1/ml/feedback", post(ml::handle_feedback))
        .route("/api/v1/ml/outcome", post(ml::handle_outcome))
        .route("/api/v1/ml/retrain", post(ml::handle_retrain))
        .route("/api/v1/ml/status", get(ml::handle_status))
        .route("/api/v1/ml/export", post(ml::handle_export))
        .route("/api/v1/ml/import", post(ml::handle_import))
        .with_state(state)
}
