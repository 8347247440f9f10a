//! Author endpoints
//!
//! GET/POST /api/authors, GET/PUT/DELETE /api/authors/:id

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shelf_common::db::{authors, Author, AuthorInput};
use tracing::info;

use crate::{ApiResult, AppState};

pub async fn list_authors(State(state): State<AppState>) -> ApiResult<Json<Vec<Author>>> {
    Ok(Json(authors::list_authors(&state.db).await?))
}

pub async fn create_author(
    State(state): State<AppState>,
    payload: Result<Json<AuthorInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Author>)> {
    let Json(input) = payload?;
    let author = authors::create_author(&state.db, &input).await?;
    info!("Created author {} ({})", author.id, author.name);
    Ok((StatusCode::CREATED, Json(author)))
}

pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Author>> {
    Ok(Json(authors::get_author(&state.db, id).await?))
}

pub async fn replace_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<AuthorInput>, JsonRejection>,
) -> ApiResult<Json<Author>> {
    let Json(input) = payload?;
    Ok(Json(authors::replace_author(&state.db, id, &input).await?))
}

pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    authors::delete_author(&state.db, id).await?;
    info!("Deleted author {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub fn author_routes() -> Router<AppState> {
    Router::new()
        .route("/api/authors", get(list_authors).post(create_author))
        .route(
            "/api/authors/:id",
            get(get_author).put(replace_author).delete(delete_author),
        )
}
