//! Rating persistence
//!
//! A user may rate a book once. The `UNIQUE (book_id, user_id)` constraint is
//! the source of truth; violations surface as [`Error::Conflict`].

use sqlx::SqlitePool;

use super::books::book_exists;
use super::models::{Rating, RatingInput};
use crate::error::is_unique_violation;
use crate::validation::{check_score, ValidationErrors};
use crate::{Error, Result};

const SELECT_RATING: &str = "SELECT id, book_id, user_id, score FROM ratings";
const DUPLICATE_RATING: &str = "you have already rated this book";

async fn validate(pool: &SqlitePool, input: &RatingInput) -> Result<()> {
    let mut errors = ValidationErrors::new();
    check_score(&mut errors, "score", input.score);

    if !book_exists(pool, input.book_id).await? {
        errors.add(
            "book_id",
            format!("invalid pk \"{}\" - object does not exist", input.book_id),
        );
    }

    errors.into_result().map_err(Error::from)
}

fn map_write_error(err: sqlx::Error) -> Error {
    if is_unique_violation(&err) {
        Error::Conflict(DUPLICATE_RATING.to_string())
    } else {
        Error::Database(err)
    }
}

pub async fn list_ratings(pool: &SqlitePool) -> Result<Vec<Rating>> {
    let ratings = sqlx::query_as::<_, Rating>(&format!("{} ORDER BY id", SELECT_RATING))
        .fetch_all(pool)
        .await?;
    Ok(ratings)
}

pub async fn get_rating(pool: &SqlitePool, id: i64) -> Result<Rating> {
    sqlx::query_as::<_, Rating>(&format!("{} WHERE id = ?", SELECT_RATING))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("rating {}", id)))
}

/// Record `user_id`'s score for a book
pub async fn create_rating(pool: &SqlitePool, user_id: i64, input: &RatingInput) -> Result<Rating> {
    validate(pool, input).await?;

    let id = sqlx::query("INSERT INTO ratings (book_id, user_id, score) VALUES (?, ?, ?)")
        .bind(input.book_id)
        .bind(user_id)
        .bind(input.score)
        .execute(pool)
        .await
        .map_err(map_write_error)?
        .last_insert_rowid();

    get_rating(pool, id).await
}

/// Replace book and score; the owning user never changes
pub async fn replace_rating(pool: &SqlitePool, id: i64, input: &RatingInput) -> Result<Rating> {
    get_rating(pool, id).await?;
    validate(pool, input).await?;

    sqlx::query("UPDATE ratings SET book_id = ?, score = ? WHERE id = ?")
        .bind(input.book_id)
        .bind(input.score)
        .bind(id)
        .execute(pool)
        .await
        .map_err(map_write_error)?;

    get_rating(pool, id).await
}

pub async fn delete_rating(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM ratings WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("rating {}", id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::authors::create_author;
    use crate::db::books::create_book;
    use crate::db::genres::create_genre;
    use crate::db::init_memory_database;
    use crate::db::models::{AuthorInput, BookInput, GenreInput};
    use crate::db::users::create_user;

    async fn seed_book(pool: &SqlitePool, title: &str) -> i64 {
        let author = create_author(
            pool,
            &AuthorInput {
                name: format!("Author of {}", title),
            },
        )
        .await
        .unwrap();
        let genre = create_genre(
            pool,
            &GenreInput {
                name: "Essays".to_string(),
            },
        )
        .await
        .unwrap();
        create_book(
            pool,
            &BookInput {
                title: title.to_string(),
                author_id: author.id,
                genre_id: genre.id,
                release_date: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_duplicate_rating_conflicts_other_user_succeeds() {
        let pool = init_memory_database().await.unwrap();
        let book_id = seed_book(&pool, "Silent Spring").await;
        let alice = create_user(&pool, "alice", "pw").await.unwrap();
        let bob = create_user(&pool, "bob", "pw").await.unwrap();

        let input = RatingInput { book_id, score: 4.0 };
        create_rating(&pool, alice.id, &input).await.unwrap();

        let duplicate = create_rating(&pool, alice.id, &RatingInput { book_id, score: 2.0 }).await;
        assert!(matches!(duplicate, Err(Error::Conflict(_))));

        let other = create_rating(&pool, bob.id, &input).await.unwrap();
        assert_eq!(other.user_id, bob.id);
        assert_eq!(list_ratings(&pool).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_score_bounds_enforced() {
        let pool = init_memory_database().await.unwrap();
        let book_id = seed_book(&pool, "Walden").await;
        let user = create_user(&pool, "carol", "pw").await.unwrap();

        let too_high = create_rating(&pool, user.id, &RatingInput { book_id, score: 5.5 }).await;
        assert!(matches!(too_high, Err(Error::Validation(_))));

        let low = create_rating(&pool, user.id, &RatingInput { book_id, score: 1.0 })
            .await
            .unwrap();
        assert_eq!(low.score, 1.0);

        let high = replace_rating(&pool, low.id, &RatingInput { book_id, score: 5.0 })
            .await
            .unwrap();
        assert_eq!(high.score, 5.0);
    }

    #[tokio::test]
    async fn test_replace_into_existing_pair_conflicts() {
        let pool = init_memory_database().await.unwrap();
        let first = seed_book(&pool, "Cosmos").await;
        let second = seed_book(&pool, "Contact").await;
        let user = create_user(&pool, "dave", "pw").await.unwrap();

        create_rating(&pool, user.id, &RatingInput { book_id: first, score: 3.0 })
            .await
            .unwrap();
        let other = create_rating(&pool, user.id, &RatingInput { book_id: second, score: 3.0 })
            .await
            .unwrap();

        let moved = replace_rating(&pool, other.id, &RatingInput { book_id: first, score: 4.0 }).await;
        assert!(matches!(moved, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unknown_book_is_validation_error() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "erin", "pw").await.unwrap();

        let result = create_rating(&pool, user.id, &RatingInput { book_id: 7, score: 3.0 }).await;
        match result {
            Err(Error::Validation(errors)) => assert!(errors.field("book_id").is_some()),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
