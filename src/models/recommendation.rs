use serde::Serialize;

use super::{RecommendationQuery, RegressionMetrics};

/// Outcome of thresholding one prediction
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Recommendation {
    pub user_id: u32,
    pub movie_id: u32,
    pub score: f32,
    pub recommended: bool,
}

impl Recommendation {
    /// Applies the threshold rule: the score, rounded to one decimal place,
    /// must be strictly greater than `threshold`.
    pub fn from_score(query: RecommendationQuery, score: f32, threshold: f32) -> Self {
        let rounded = (score * 10.0).round() / 10.0;
        Self {
            user_id: query.user_id,
            movie_id: query.movie_id,
            score,
            recommended: rounded > threshold,
        }
    }

    /// Text returned to the caller
    pub fn message(&self) -> String {
        if self.recommended {
            format!(
                "Movie {} is recommended for user {}",
                self.movie_id, self.user_id
            )
        } else {
            format!(
                "Movie {} is not recommended for user {}",
                self.movie_id, self.user_id
            )
        }
    }
}

/// Everything a single pipeline run produced
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationOutcome {
    pub recommendation: Recommendation,
    pub metrics: RegressionMetrics,
    /// False when the user or movie never appeared in the training data
    pub known_pair: bool,
}
