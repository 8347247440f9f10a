//! Author persistence

use sqlx::SqlitePool;

use super::models::{Author, AuthorInput};
use crate::validation::{check_name, ValidationErrors};
use crate::{Error, Result};

fn validate(input: &AuthorInput) -> Result<()> {
    let mut errors = ValidationErrors::new();
    check_name(&mut errors, "name", &input.name);
    errors.into_result().map_err(Error::from)
}

/// All authors in id order
pub async fn list_authors(pool: &SqlitePool) -> Result<Vec<Author>> {
    let authors = sqlx::query_as::<_, Author>("SELECT id, name FROM authors ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(authors)
}

pub async fn get_author(pool: &SqlitePool, id: i64) -> Result<Author> {
    sqlx::query_as::<_, Author>("SELECT id, name FROM authors WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("author {}", id)))
}

pub async fn create_author(pool: &SqlitePool, input: &AuthorInput) -> Result<Author> {
    validate(input)?;

    let id = sqlx::query("INSERT INTO authors (name) VALUES (?)")
        .bind(input.name.trim())
        .execute(pool)
        .await?
        .last_insert_rowid();

    get_author(pool, id).await
}

pub async fn replace_author(pool: &SqlitePool, id: i64, input: &AuthorInput) -> Result<Author> {
    get_author(pool, id).await?;
    validate(input)?;

    sqlx::query("UPDATE authors SET name = ? WHERE id = ?")
        .bind(input.name.trim())
        .bind(id)
        .execute(pool)
        .await?;

    get_author(pool, id).await
}

/// Delete an author together with its books and their ratings
pub async fn delete_author(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM authors WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("author {}", id)));
    }
    Ok(())
}

pub async fn author_exists(pool: &SqlitePool, id: i64) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM authors WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}
