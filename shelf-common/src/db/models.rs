//! Database models and request payloads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    pub genre_id: i64,
    pub release_date: Option<NaiveDate>,
}

/// A user's score for one book
///
/// The owning user is stored but never serialized: clients only see the
/// book and the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Rating {
    pub id: i64,
    pub book_id: i64,
    #[serde(skip)]
    pub user_id: i64,
    pub score: f64,
}

/// Account identity without credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// Create/replace payload for an author
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorInput {
    pub name: String,
}

/// Create/replace payload for a genre
#[derive(Debug, Clone, Deserialize)]
pub struct GenreInput {
    pub name: String,
}

/// Create/replace payload for a book
#[derive(Debug, Clone, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub author_id: i64,
    pub genre_id: i64,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
}

/// Create/replace payload for a rating (user comes from the caller)
#[derive(Debug, Clone, Deserialize)]
pub struct RatingInput {
    pub book_id: i64,
    pub score: f64,
}
