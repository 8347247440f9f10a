//! Rating endpoints
//!
//! A new rating always belongs to the authenticated caller; the payload only
//! names the book and the score. A second rating for the same book by the
//! same caller is answered with 409 Conflict.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use shelf_common::db::{ratings, Rating, RatingInput};
use tracing::info;

use super::auth::CurrentUser;
use crate::{ApiResult, AppState};

pub async fn list_ratings(State(state): State<AppState>) -> ApiResult<Json<Vec<Rating>>> {
    Ok(Json(ratings::list_ratings(&state.db).await?))
}

pub async fn create_rating(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<RatingInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Rating>)> {
    let Json(input) = payload?;
    let rating = ratings::create_rating(&state.db, user.id, &input).await?;
    info!(
        "User '{}' rated book {} with {}",
        user.username, rating.book_id, rating.score
    );
    Ok((StatusCode::CREATED, Json(rating)))
}

pub async fn get_rating(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Rating>> {
    Ok(Json(ratings::get_rating(&state.db, id).await?))
}

pub async fn replace_rating(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<RatingInput>, JsonRejection>,
) -> ApiResult<Json<Rating>> {
    let Json(input) = payload?;
    Ok(Json(ratings::replace_rating(&state.db, id, &input).await?))
}

pub async fn delete_rating(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    ratings::delete_rating(&state.db, id).await?;
    info!("Deleted rating {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub fn rating_routes() -> Router<AppState> {
    Router::new()
        .route("/api/ratings", get(list_ratings).post(create_rating))
        .route(
            "/api/ratings/:id",
            get(get_rating).put(replace_rating).delete(delete_rating),
        )
}
