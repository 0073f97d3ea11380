use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::ml::pipeline::MlAnalysis;
use crate::models::cv::CvRecord;
use crate::models::sector::SectorCatalog;
use crate::personality::{classifier, domains};
use crate::scoring::{JobScorer, SectorScore};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PersonalityRequest {
    pub cv: CvRecord,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub cv: CvRecord,
}

#[derive(Serialize)]
pub struct PersonalityResponse {
    pub label: String,
    pub type_name: Option<&'static str>,
    /// Sectors suited to the type.
    pub careers: Vec<String>,
    pub percentages: BTreeMap<String, f64>,
    pub big_five: BTreeMap<String, f64>,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    /// The submitted CV with `PersonalityTypeMB` and `Score` filled in.
    pub cv: CvRecord,
    pub personality: PersonalityResponse,
    pub ranking: Vec<SectorScore>,
    pub best_sector: Option<SectorScore>,
    /// ML view of the best sector, when enabled and trained.
    pub ml: Option<MlAnalysis>,
}

/// Builds the personality view around an already inferred `label`.
fn personality_of(cv: &CvRecord, label: String, catalog: &SectorCatalog) -> PersonalityResponse {
    PersonalityResponse {
        type_name: domains::type_name(&label),
        careers: catalog
            .sectors_for_personality(&label)
            .into_iter()
            .map(str::to_string)
            .collect(),
        percentages: classifier::percentages(cv),
        big_five: classifier::big_five(cv),
        label,
    }
}

/// POST /api/v1/personality
pub async fn handle_personality(
    State(state): State<AppState>,
    Json(req): Json<PersonalityRequest>,
) -> Result<Json<PersonalityResponse>, AppError> {
    req.cv.validate()?;
    let label = classifier::classify(&req.cv);
    Ok(Json(personality_of(&req.cv, label, &state.catalog)))
}

/// POST /api/v1/analyze
/// Classifies the candidate, ranks every sector with the inferred label and
/// writes both results back into the returned CV.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    req.cv.validate()?;
    let mut cv = req.cv;
    let label = classifier::classify_and_record(&mut cv);
    let personality = personality_of(&cv, label, &state.catalog);

    let ranking = JobScorer::new(&state.catalog).rank_all_sectors(&cv);
    let best_sector = ranking.first().cloned();
    cv.score = best_sector.as_ref().map_or(0.0, |b| b.score);

    let ml = match &best_sector {
        Some(best) if state.config.ml_enabled => {
            let pipeline = state.ml.read().await;
            if pipeline.is_trained() {
                Some(pipeline.analyze(&cv, &best.sector, best.score)?)
            } else {
                None
            }
        }
        _ => None,
    };

    info!(
        label = %cv.personality_type_mb,
        best = best_sector.as_ref().map(|b| b.sector.as_str()).unwrap_or("-"),
        "CV analyzed"
    );
    Ok(Json(AnalyzeResponse {
        cv,
        personality,
        ranking,
        best_sector,
        ml,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personality_view_uses_given_label() {
        let catalog = SectorCatalog::builtin().unwrap();
        let mut cv = CvRecord {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            short_description: "logical, analytical, introverted and organized".to_string(),
            ..Default::default()
        };
        let label = classifier::classify_and_record(&mut cv);
        let view = personality_of(&cv, label.clone(), &catalog);
        assert_eq!(view.label, cv.personality_type_mb);
        assert_eq!(view.type_name, domains::type_name(&label));

        // The view reports the label it was given rather than classifying again.
        let forced = personality_of(&cv, "ESFP".to_string(), &catalog);
        assert_eq!(forced.label, "ESFP");
        assert_eq!(forced.type_name, Some("Entertainer"));
        assert!(forced.careers.contains(&"Food_Beverages".to_string()));
        assert_eq!(forced.percentages, view.percentages);
    }
}
