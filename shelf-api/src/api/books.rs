//! Book endpoints
//!
//! Books must reference an existing author and genre; unresolved ids come
//! back as field validation errors, not 404s.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shelf_common::db::{books, Book, BookInput};
use tracing::info;

use crate::{ApiResult, AppState};

pub async fn list_books(State(state): State<AppState>) -> ApiResult<Json<Vec<Book>>> {
    Ok(Json(books::list_books(&state.db).await?))
}

pub async fn create_book(
    State(state): State<AppState>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let Json(input) = payload?;
    let book = books::create_book(&state.db, &input).await?;
    info!("Created book {} ({})", book.id, book.title);
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Book>> {
    Ok(Json(books::get_book(&state.db, id).await?))
}

pub async fn replace_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> ApiResult<Json<Book>> {
    let Json(input) = payload?;
    Ok(Json(books::replace_book(&state.db, id, &input).await?))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    books::delete_book(&state.db, id).await?;
    info!("Deleted book {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/api/books", get(list_books).post(create_book))
        .route(
            "/api/books/:id",
            get(get_book).put(replace_book).delete(delete_book),
        )
}
