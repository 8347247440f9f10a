//! Book persistence

use sqlx::SqlitePool;

use super::authors::author_exists;
use super::genres::find_genre;
use super::models::{Book, BookInput};
use crate::validation::{check_name, ValidationErrors};
use crate::{Error, Result};

const SELECT_BOOK: &str = "SELECT id, title, author_id, genre_id, release_date FROM books";

fn missing_pk(id: i64) -> String {
    format!("invalid pk \"{}\" - object does not exist", id)
}

/// Field checks plus author/genre existence
async fn validate(pool: &SqlitePool, input: &BookInput) -> Result<()> {
    let mut errors = ValidationErrors::new();
    check_name(&mut errors, "title", &input.title);

    if !author_exists(pool, input.author_id).await? {
        errors.add("author_id", missing_pk(input.author_id));
    }
    if find_genre(pool, input.genre_id).await?.is_none() {
        errors.add("genre_id", missing_pk(input.genre_id));
    }

    errors.into_result().map_err(Error::from)
}

pub async fn list_books(pool: &SqlitePool) -> Result<Vec<Book>> {
    let books = sqlx::query_as::<_, Book>(&format!("{} ORDER BY id", SELECT_BOOK))
        .fetch_all(pool)
        .await?;
    Ok(books)
}

pub async fn get_book(pool: &SqlitePool, id: i64) -> Result<Book> {
    sqlx::query_as::<_, Book>(&format!("{} WHERE id = ?", SELECT_BOOK))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("book {}", id)))
}

pub async fn book_exists(pool: &SqlitePool, id: i64) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM books WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub async fn create_book(pool: &SqlitePool, input: &BookInput) -> Result<Book> {
    validate(pool, input).await?;

    let id = sqlx::query(
        "INSERT INTO books (title, author_id, genre_id, release_date) VALUES (?, ?, ?, ?)",
    )
    .bind(input.title.trim())
    .bind(input.author_id)
    .bind(input.genre_id)
    .bind(input.release_date)
    .execute(pool)
    .await?
    .last_insert_rowid();

    get_book(pool, id).await
}

pub async fn replace_book(pool: &SqlitePool, id: i64, input: &BookInput) -> Result<Book> {
    get_book(pool, id).await?;
    validate(pool, input).await?;

    sqlx::query(
        "UPDATE books SET title = ?, author_id = ?, genre_id = ?, release_date = ? WHERE id = ?",
    )
    .bind(input.title.trim())
    .bind(input.author_id)
    .bind(input.genre_id)
    .bind(input.release_date)
    .bind(id)
    .execute(pool)
    .await?;

    get_book(pool, id).await
}

/// Delete a book and its ratings
pub async fn delete_book(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("book {}", id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::authors::create_author;
    use crate::db::genres::create_genre;
    use crate::db::models::{AuthorInput, GenreInput};
    use crate::db::init_memory_database;
    use chrono::NaiveDate;

    async fn seed(pool: &SqlitePool) -> (i64, i64) {
        let author = create_author(
            pool,
            &AuthorInput {
                name: "N. K. Jemisin".to_string(),
            },
        )
        .await
        .unwrap();
        let genre = create_genre(
            pool,
            &GenreInput {
                name: "Fantasy".to_string(),
            },
        )
        .await
        .unwrap();
        (author.id, genre.id)
    }

    #[tokio::test]
    async fn test_create_book_with_release_date() {
        let pool = init_memory_database().await.unwrap();
        let (author_id, genre_id) = seed(&pool).await;

        let book = create_book(
            &pool,
            &BookInput {
                title: "The Fifth Season".to_string(),
                author_id,
                genre_id,
                release_date: NaiveDate::from_ymd_opt(2015, 8, 4),
            },
        )
        .await
        .unwrap();

        let loaded = get_book(&pool, book.id).await.unwrap();
        assert_eq!(loaded.release_date, NaiveDate::from_ymd_opt(2015, 8, 4));
        assert_eq!(list_books(&pool).await.unwrap(), vec![loaded]);
    }

    #[tokio::test]
    async fn test_unknown_author_and_genre_reported_together() {
        let pool = init_memory_database().await.unwrap();

        let result = create_book(
            &pool,
            &BookInput {
                title: "".to_string(),
                author_id: 99,
                genre_id: 98,
                release_date: None,
            },
        )
        .await;

        match result {
            Err(Error::Validation(errors)) => {
                assert!(errors.field("title").is_some());
                assert!(errors.field("author_id").is_some());
                assert!(errors.field("genre_id").is_some());
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_deleting_author_cascades_to_books() {
        let pool = init_memory_database().await.unwrap();
        let (author_id, genre_id) = seed(&pool).await;

        let book = create_book(
            &pool,
            &BookInput {
                title: "The Obelisk Gate".to_string(),
                author_id,
                genre_id,
                release_date: None,
            },
        )
        .await
        .unwrap();

        crate::db::authors::delete_author(&pool, author_id).await.unwrap();
        assert!(!book_exists(&pool, book.id).await.unwrap());
    }
}
