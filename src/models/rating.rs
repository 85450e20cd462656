use serde::{Deserialize, Serialize};

/// One row of a ratings CSV file
///
/// Files carry a `userId,movieId,rating,timestamp` header; the timestamp
/// column is optional and never used for training.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MovieRating {
    #[serde(rename = "userId")]
    pub user_id: u32,
    #[serde(rename = "movieId")]
    pub movie_id: u32,
    /// Explicit rating, used as the training label
    pub rating: f32,
}

impl MovieRating {
    pub fn new(user_id: u32, movie_id: u32, rating: f32) -> Self {
        Self {
            user_id,
            movie_id,
            rating,
        }
    }
}

/// Model output for a single user/movie pair
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct RatingPrediction {
    /// Known rating for the pair, if any
    pub label: Option<f32>,
    /// Predicted rating
    pub score: f32,
}

/// Regression quality of a fitted model measured on held-out ratings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RegressionMetrics {
    pub rmse: f64,
    pub r_squared: f64,
    pub mae: f64,
    pub mse: f64,
    /// Number of ratings the metrics were computed over
    pub count: usize,
}
