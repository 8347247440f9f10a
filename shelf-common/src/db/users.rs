//! User account persistence

use sqlx::SqlitePool;

use super::models::User;
use crate::auth::{generate_salt, hash_password, verify_password};
use crate::error::is_unique_violation;
use crate::validation::{check_name, ValidationErrors};
use crate::{Error, Result};

/// Register a user with a freshly salted password hash
pub async fn create_user(pool: &SqlitePool, username: &str, password: &str) -> Result<User> {
    let mut errors = ValidationErrors::new();
    check_name(&mut errors, "username", username);
    if password.is_empty() {
        errors.add("password", "this field may not be blank");
    }
    errors.into_result()?;

    let username = username.trim();
    let salt = generate_salt();
    let hash = hash_password(password, &salt);

    let result = sqlx::query(
        "INSERT INTO users (username, password_hash, password_salt) VALUES (?, ?, ?)",
    )
    .bind(username)
    .bind(&hash)
    .bind(&salt)
    .execute(pool)
    .await;

    match result {
        Ok(done) => Ok(User {
            id: done.last_insert_rowid(),
            username: username.to_string(),
        }),
        Err(e) if is_unique_violation(&e) => Err(Error::Conflict(format!(
            "username '{}' is already taken",
            username
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Return the user when the credentials match, `None` otherwise
pub async fn verify_credentials(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Option<User>> {
    let row: Option<(i64, String, String, String)> = sqlx::query_as(
        "SELECT id, username, password_hash, password_salt FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(row.and_then(|(id, username, hash, salt)| {
        verify_password(password, &salt, &hash).then_some(User { id, username })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;

    #[tokio::test]
    async fn test_create_and_verify_user() {
        let pool = init_memory_database().await.unwrap();

        let user = create_user(&pool, "reader", "s3cret").await.unwrap();
        assert_eq!(user.username, "reader");

        let ok = verify_credentials(&pool, "reader", "s3cret").await.unwrap();
        assert_eq!(ok, Some(user));

        let bad = verify_credentials(&pool, "reader", "wrong").await.unwrap();
        assert!(bad.is_none());

        let unknown = verify_credentials(&pool, "ghost", "s3cret").await.unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let pool = init_memory_database().await.unwrap();

        create_user(&pool, "reader", "a").await.unwrap();
        let again = create_user(&pool, "reader", "b").await;
        assert!(matches!(again, Err(Error::Conflict(_))));
    }
}
