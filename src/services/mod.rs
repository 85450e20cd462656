pub mod dataset;
pub mod evaluation;
pub mod model;
pub mod model_store;
pub mod recommendation;

pub use model::{RatingModel, TrainingOptions};
pub use model_store::{ModelSnapshot, ModelStore};
pub use recommendation::RecommendationPipeline;
