use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::RecommendationQuery,
    services::model_store::ModelSummary,
};

use super::AppState;

/// `?data=userId:movieId`, or the same field in a JSON body
#[derive(Debug, Default, Deserialize)]
pub struct RecommendParams {
    pub data: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// GET /api/recommend?data=6:10
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    params: Result<Query<RecommendParams>, QueryRejection>,
) -> AppResult<String> {
    let Query(params) = params.map_err(invalid_query)?;
    run_recommendation(&state, &request_id, params.data.as_deref()).await
}

/// POST /api/recommend, query parameter first, then `{"data": "6:10"}`
pub async fn recommend_post(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    params: Result<Query<RecommendParams>, QueryRejection>,
    body: Option<Json<RecommendParams>>,
) -> AppResult<String> {
    let Query(params) = params.map_err(invalid_query)?;
    let data = params
        .data
        .or_else(|| body.and_then(|Json(body)| body.data));
    run_recommendation(&state, &request_id, data.as_deref()).await
}

fn invalid_query(rejection: QueryRejection) -> AppError {
    AppError::InvalidInput(rejection.body_text())
}

async fn run_recommendation(
    state: &AppState,
    request_id: &RequestId,
    data: Option<&str>,
) -> AppResult<String> {
    let raw = data.ok_or_else(|| {
        AppError::InvalidInput(
            "Please pass data=userId:movieId on the query string or in the request body"
                .to_string(),
        )
    })?;
    let query = RecommendationQuery::parse(raw)?;

    tracing::info!(
        request_id = %request_id,
        user_id = query.user_id,
        movie_id = query.movie_id,
        "Processing recommendation request"
    );

    let outcome = state.pipeline.run_async(query).await?;

    tracing::info!(
        request_id = %request_id,
        recommended = outcome.recommendation.recommended,
        rmse = outcome.metrics.rmse,
        r_squared = outcome.metrics.r_squared,
        "Recommendation completed"
    );

    Ok(outcome.recommendation.message())
}

/// Describes the most recently saved model
pub async fn model_summary(State(state): State<AppState>) -> AppResult<Json<ModelSummary>> {
    let store = state.pipeline.store().clone();
    let snapshot = tokio::task::spawn_blocking(move || store.load())
        .await
        .map_err(|e| AppError::Internal(format!("Model read task failed: {e}")))??;
    Ok(Json(snapshot.summary()))
}
