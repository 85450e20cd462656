use discorec::{Dataset, Recommender, RecommenderBuilder};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{MovieRating, RatingPrediction},
};

/// Hyperparameters for matrix factorization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainingOptions {
    /// Approximation rank of the user and movie factor matrices
    pub factors: u32,
    pub iterations: u32,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            factors: 100,
            iterations: 20,
        }
    }
}

/// Explicit-feedback matrix factorization model over user and movie ids
///
/// Id-to-key encoding and the factorization itself are handled by `discorec`.
pub struct RatingModel {
    recommender: Recommender<u32, u32>,
    options: TrainingOptions,
}

impl RatingModel {
    /// Fits a model on the given ratings
    pub fn train(ratings: &[MovieRating], options: &TrainingOptions) -> AppResult<Self> {
        if ratings.is_empty() {
            return Err(AppError::Training(
                "Cannot train on an empty ratings set".to_string(),
            ));
        }

        let dataset = to_dataset(ratings);
        let recommender = RecommenderBuilder::new()
            .factors(options.factors)
            .iterations(options.iterations)
            .fit_explicit(&dataset);

        Ok(Self {
            recommender,
            options: *options,
        })
    }

    /// Predicted rating for a pair
    ///
    /// Users or movies absent from the training data score the global mean.
    pub fn predict(&self, user_id: u32, movie_id: u32) -> RatingPrediction {
        RatingPrediction {
            label: None,
            score: self.recommender.predict(&user_id, &movie_id),
        }
    }

    /// Prediction carrying the observed rating as its label
    pub fn predict_rating(&self, rating: &MovieRating) -> RatingPrediction {
        RatingPrediction {
            label: Some(rating.rating),
            ..self.predict(rating.user_id, rating.movie_id)
        }
    }

    /// Root-mean-squared error over the given ratings
    pub fn rmse(&self, ratings: &[MovieRating]) -> f32 {
        self.recommender.rmse(&to_dataset(ratings))
    }

    /// True when both the user and the movie were seen during training
    pub fn is_known(&self, user_id: u32, movie_id: u32) -> bool {
        self.recommender.user_factors(&user_id).is_some()
            && self.recommender.item_factors(&movie_id).is_some()
    }

    pub fn global_mean(&self) -> f32 {
        self.recommender.global_mean()
    }

    pub fn user_count(&self) -> usize {
        self.recommender.user_ids().len()
    }

    pub fn movie_count(&self) -> usize {
        self.recommender.item_ids().len()
    }

    pub fn options(&self) -> &TrainingOptions {
        &self.options
    }

    /// Learned factor vector of every user, sorted by id
    pub fn user_factors(&self) -> Vec<(u32, Vec<f32>)> {
        let mut ids = self.recommender.user_ids().clone();
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| {
                self.recommender
                    .user_factors(&id)
                    .map(|factors| (id, factors.to_vec()))
            })
            .collect()
    }

    /// Learned factor vector of every movie, sorted by id
    pub fn movie_factors(&self) -> Vec<(u32, Vec<f32>)> {
        let mut ids = self.recommender.item_ids().clone();
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| {
                self.recommender
                    .item_factors(&id)
                    .map(|factors| (id, factors.to_vec()))
            })
            .collect()
    }
}

fn to_dataset(ratings: &[MovieRating]) -> Dataset<u32, u32> {
    let mut dataset = Dataset::with_capacity(ratings.len());
    for rating in ratings {
        dataset.push(rating.user_id, rating.movie_id, rating.rating);
    }
    dataset
}
