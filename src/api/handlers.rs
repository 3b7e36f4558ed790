use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{NewRecommendation, Recommendation},
};

use super::AppState;

const YOUTUBE_PREFIXES: [&str; 4] = [
    "www.youtube.com/",
    "youtube.com/",
    "m.youtube.com/",
    "youtu.be/",
];

// Request types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecommendationRequest {
    pub name: String,
    pub youtube_link: String,
}

impl CreateRecommendationRequest {
    /// Checks the body against the accepted schema
    pub fn validate(self) -> AppResult<NewRecommendation> {
        if self.name.trim().is_empty() {
            return Err(AppError::InvalidInput("name must not be empty".to_string()));
        }
        if !is_youtube_link(&self.youtube_link) {
            return Err(AppError::InvalidInput(
                "youtubeLink must be a YouTube URL".to_string(),
            ));
        }
        Ok(NewRecommendation::new(self.name, self.youtube_link))
    }
}

fn is_youtube_link(link: &str) -> bool {
    let rest = link
        .strip_prefix("https://")
        .or_else(|| link.strip_prefix("http://"));

    match rest {
        Some(rest) => YOUTUBE_PREFIXES
            .iter()
            .filter_map(|prefix| rest.strip_prefix(prefix))
            .any(|path| !path.is_empty() && !path.chars().any(char::is_whitespace)),
        None => false,
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

fn positive_id(path: Result<Path<i64>, PathRejection>) -> AppResult<i64> {
    let Path(id) = path?;
    if id <= 0 {
        return Err(AppError::InvalidInput("id must be a positive integer".to_string()));
    }
    Ok(id)
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Create a new recommendation
pub async fn create_recommendation(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<CreateRecommendationRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Recommendation>)> {
    let Json(request) = payload?;
    let new = request.validate()?;

    tracing::info!(request_id = %request_id, name = %new.name, "Creating recommendation");

    let created = state.recommendations.insert(new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Most recent recommendations
pub async fn list_recommendations(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let Query(query) = query?;
    if query.limit == Some(0) {
        return Err(AppError::InvalidInput("limit must be positive".to_string()));
    }

    let recommendations = state.recommendations.list(query.limit).await?;
    Ok(Json(recommendations))
}

/// Weighted random recommendation
pub async fn random_recommendation(
    State(state): State<AppState>,
) -> AppResult<Json<Recommendation>> {
    let recommendation = state.recommendations.get_random().await?;
    Ok(Json(recommendation))
}

/// Highest scored recommendations
pub async fn top_recommendations(
    State(state): State<AppState>,
    amount: Result<Path<u32>, PathRejection>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let Path(amount) = amount?;
    if amount == 0 {
        return Err(AppError::InvalidInput("amount must be positive".to_string()));
    }

    let recommendations = state.recommendations.get_top(amount).await?;
    Ok(Json(recommendations))
}

pub async fn get_recommendation(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Recommendation>> {
    let id = positive_id(id)?;
    let recommendation = state.recommendations.get_by_id(id).await?;
    Ok(Json(recommendation))
}

pub async fn upvote(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Recommendation>> {
    let id = positive_id(id)?;
    let updated = state.recommendations.upvote(id).await?;

    tracing::info!(request_id = %request_id, id, score = updated.score, "Upvoted recommendation");

    Ok(Json(updated))
}

pub async fn downvote(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Recommendation>> {
    let id = positive_id(id)?;
    let updated = state.recommendations.downvote(id).await?;

    tracing::info!(request_id = %request_id, id, score = updated.score, "Downvoted recommendation");

    Ok(Json(updated))
}

/// Deletes every recommendation; only routed when test routes are enabled
pub async fn reset(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<StatusCode> {
    let removed = state.recommendations.reset().await?;
    tracing::info!(request_id = %request_id, removed, "Reset recommendations");
    Ok(StatusCode::OK)
}
