//! Genre persistence

use sqlx::SqlitePool;

use super::models::{Genre, GenreInput};
use crate::validation::{check_name, ValidationErrors};
use crate::{Error, Result};

fn validate(input: &GenreInput) -> Result<()> {
    let mut errors = ValidationErrors::new();
    check_name(&mut errors, "name", &input.name);
    errors.into_result().map_err(Error::from)
}

pub async fn list_genres(pool: &SqlitePool) -> Result<Vec<Genre>> {
    let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(genres)
}

/// Look up a genre, `None` when the id is unknown
pub async fn find_genre(pool: &SqlitePool, id: i64) -> Result<Option<Genre>> {
    let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(genre)
}

pub async fn get_genre(pool: &SqlitePool, id: i64) -> Result<Genre> {
    find_genre(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("genre {}", id)))
}

pub async fn create_genre(pool: &SqlitePool, input: &GenreInput) -> Result<Genre> {
    validate(input)?;

    let id = sqlx::query("INSERT INTO genres (name) VALUES (?)")
        .bind(input.name.trim())
        .execute(pool)
        .await?
        .last_insert_rowid();

    get_genre(pool, id).await
}

pub async fn replace_genre(pool: &SqlitePool, id: i64, input: &GenreInput) -> Result<Genre> {
    get_genre(pool, id).await?;
    validate(input)?;

    sqlx::query("UPDATE genres SET name = ? WHERE id = ?")
        .bind(input.name.trim())
        .bind(id)
        .execute(pool)
        .await?;

    get_genre(pool, id).await
}

pub async fn delete_genre(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM genres WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("genre {}", id)));
    }
    Ok(())
}
