use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{PointsRequest, PointsResponse};
use crate::{
    auth::{dto::MessageResponse, extractors::AuthUser},
    error::AppResult,
    state::AppState,
};

pub fn points_routes() -> Router<AppState> {
    Router::new()
        .route("/user/points", get(get_points).post(update_points))
        .route("/user/points/add", post(add_points))
}

#[instrument(skip(state))]
pub async fn get_points(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PointsResponse>> {
    let points = state.ledger.get(user_id).await?;
    Ok(Json(PointsResponse { points }))
}

/// Overwrites the caller's balance.
#[instrument(skip(state, body))]
pub async fn update_points(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<PointsRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(body) = body?;
    state.ledger.set(user_id, body.points).await?;
    info!(user_id = %user_id, points = body.points, "points set");
    Ok(Json(MessageResponse {
        message: "User points updated successfully",
    }))
}

#[instrument(skip(state, body))]
pub async fn add_points(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<PointsRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(body) = body?;
    state.ledger.add(user_id, body.points).await?;
    info!(user_id = %user_id, amount = body.points, "points added");
    Ok(Json(MessageResponse {
        message: "User points added successfully",
    }))
}
