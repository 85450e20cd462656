use std::sync::Arc;

use crate::{config::Config, services::RecommendationPipeline};

/// Shared application state
///
/// Holds only the pipeline settings; every request trains its own model.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RecommendationPipeline>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            pipeline: Arc::new(RecommendationPipeline::new(&config)),
        }
    }
}
