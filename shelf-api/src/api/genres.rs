//! Genre endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shelf_common::db::{genres, Genre, GenreInput};
use tracing::info;

use crate::{ApiResult, AppState};

pub async fn list_genres(State(state): State<AppState>) -> ApiResult<Json<Vec<Genre>>> {
    Ok(Json(genres::list_genres(&state.db).await?))
}

pub async fn create_genre(
    State(state): State<AppState>,
    payload: Result<Json<GenreInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Genre>)> {
    let Json(input) = payload?;
    let genre = genres::create_genre(&state.db, &input).await?;
    info!("Created genre {} ({})", genre.id, genre.name);
    Ok((StatusCode::CREATED, Json(genre)))
}

pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Genre>> {
    Ok(Json(genres::get_genre(&state.db, id).await?))
}

pub async fn replace_genre(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<GenreInput>, JsonRejection>,
) -> ApiResult<Json<Genre>> {
    let Json(input) = payload?;
    Ok(Json(genres::replace_genre(&state.db, id, &input).await?))
}

pub async fn delete_genre(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    genres::delete_genre(&state.db, id).await?;
    info!("Deleted genre {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub fn genre_routes() -> Router<AppState> {
    Router::new()
        .route("/api/genres", get(list_genres).post(create_genre))
        .route(
            "/api/genres/:id",
            get(get_genre).put(replace_genre).delete(delete_genre),
        )
}
