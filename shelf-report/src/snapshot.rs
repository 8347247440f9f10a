//! Immutable in-memory copy of the catalog taken at job start

use shelf_common::db::{Author, Genre, Rating, User};
use sqlx::{FromRow, SqlitePool};
use tracing::info;

use crate::ReportResult;

/// Book row with the release date left as stored text
///
/// Dates are parsed by the views that need them, so a bad value only fails
/// the views that read it.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BookRow {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    pub genre_id: i64,
    pub release_date: Option<String>,
}

/// Full contents of the entity collections, each ordered by id
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub ratings: Vec<Rating>,
    pub books: Vec<BookRow>,
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
    pub users: Vec<User>,
}

impl Snapshot {
    /// Read every table once
    pub async fn load(pool: &SqlitePool) -> ReportResult<Self> {
        let ratings =
            sqlx::query_as::<_, Rating>("SELECT id, book_id, user_id, score FROM ratings ORDER BY id")
                .fetch_all(pool)
                .await?;
        let books = sqlx::query_as::<_, BookRow>(
            "SELECT id, title, author_id, genre_id, release_date FROM books ORDER BY id",
        )
        .fetch_all(pool)
        .await?;
        let authors = sqlx::query_as::<_, Author>("SELECT id, name FROM authors ORDER BY id")
            .fetch_all(pool)
            .await?;
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY id")
            .fetch_all(pool)
            .await?;
        let users = sqlx::query_as::<_, User>("SELECT id, username FROM users ORDER BY id")
            .fetch_all(pool)
            .await?;

        info!(
            "Snapshot loaded: {} ratings, {} books, {} authors, {} genres, {} users",
            ratings.len(),
            books.len(),
            authors.len(),
            genres.len(),
            users.len()
        );

        Ok(Self {
            ratings,
            books,
            authors,
            genres,
            users,
        })
    }

    /// True when there is nothing to report on
    pub fn is_insufficient(&self) -> bool {
        self.ratings.is_empty() || self.books.is_empty()
    }
}
