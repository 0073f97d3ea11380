use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::ml::MlPipeline;
use crate::models::sector::SectorCatalog;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Read-only sector keyword catalog.
    pub catalog: Arc<SectorCatalog>,
    /// Active model and feedback store. Writers: training, retraining and feedback.
    pub ml: Arc<RwLock<MlPipeline>>,
}
