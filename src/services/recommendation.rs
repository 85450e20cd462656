use std::{path::PathBuf, time::Instant};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{Recommendation, RecommendationOutcome, RecommendationQuery},
    services::{
        dataset::load_ratings,
        evaluation::evaluate,
        model::{RatingModel, TrainingOptions},
        model_store::{ModelSnapshot, ModelStore},
    },
};

/// Load, train, evaluate, predict and save, once per call
///
/// Nothing is kept between runs: each call trains a fresh model from the
/// configured CSV files and overwrites the stored model.
#[derive(Debug, Clone)]
pub struct RecommendationPipeline {
    train_data_path: PathBuf,
    test_data_path: PathBuf,
    options: TrainingOptions,
    threshold: f32,
    store: ModelStore,
}

impl RecommendationPipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            train_data_path: config.train_data_path.clone(),
            test_data_path: config.test_data_path.clone(),
            options: config.training_options(),
            threshold: config.recommendation_threshold,
            store: ModelStore::new(config.model_path.clone()),
        }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Runs the pipeline on the blocking thread pool
    pub async fn run_async(&self, query: RecommendationQuery) -> AppResult<RecommendationOutcome> {
        let pipeline = self.clone();
        tokio::task::spawn_blocking(move || pipeline.run(query))
            .await
            .map_err(|e| AppError::Internal(format!("Training task failed: {e}")))?
    }

    /// Runs every stage synchronously
    pub fn run(&self, query: RecommendationQuery) -> AppResult<RecommendationOutcome> {
        let started = Instant::now();

        let train = load_ratings(&self.train_data_path)?;
        let test = load_ratings(&self.test_data_path)?;
        tracing::info!(
            train_rows = train.len(),
            test_rows = test.len(),
            "Ratings loaded"
        );

        let model = RatingModel::train(&train, &self.options)?;
        tracing::info!(
            users = model.user_count(),
            movies = model.movie_count(),
            factors = self.options.factors,
            iterations = self.options.iterations,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Model trained"
        );

        let metrics = evaluate(&model, &test)?;
        tracing::info!(
            rmse = metrics.rmse,
            r_squared = metrics.r_squared,
            mae = metrics.mae,
            "Model evaluated"
        );

        let known_pair = model.is_known(query.user_id, query.movie_id);
        if !known_pair {
            tracing::warn!(%query, "User or movie not in training data, using global mean");
        }
        let prediction = model.predict(query.user_id, query.movie_id);
        let recommendation = Recommendation::from_score(query, prediction.score, self.threshold);

        self.store.save(&ModelSnapshot::from_model(&model, metrics))?;

        tracing::info!(
            %query,
            score = prediction.score,
            recommended = recommendation.recommended,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recommendation computed"
        );

        Ok(RecommendationOutcome {
            recommendation,
            metrics,
            known_pair,
        })
    }
}
