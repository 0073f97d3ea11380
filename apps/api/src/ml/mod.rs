pub mod features;
pub mod feedback;
pub mod handlers;
pub mod model;
pub mod pipeline;
pub mod storage;
pub mod synthetic;
pub mod trees;

pub use model::ModelBackend;
pub use pipeline::{MlPipeline, PipelineConfig};
