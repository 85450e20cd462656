mod query;
mod rating;
mod recommendation;

pub use query::RecommendationQuery;
pub use rating::{MovieRating, RatingPrediction, RegressionMetrics};
pub use recommendation::{Recommendation, RecommendationOutcome};
