//! Authentication middleware for shelf-api
//!
//! Validates HTTP Basic credentials against the `users` table and stores the
//! resolved [`CurrentUser`] in request extensions for handlers.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use shelf_common::db::users::verify_credentials;
use tracing::{debug, warn};

use crate::{ApiError, AppState};

/// Identity of the authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// Split a `Basic <base64(user:password)>` header value
pub fn parse_basic_credentials(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?.trim();
    let decoded = STANDARD.decode(encoded).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (username, password) = text.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Authentication middleware
///
/// Returns 401 Unauthorized when the header is missing, malformed or the
/// credentials do not match.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("authentication credentials were not provided".to_string()))?;

    let (username, password) = parse_basic_credentials(header_value)
        .ok_or_else(|| ApiError::Unauthorized("malformed Basic credentials".to_string()))?;

    let user = verify_credentials(&state.db, &username, &password)
        .await?
        .ok_or_else(|| {
            warn!("Rejected credentials for user '{}'", username);
            ApiError::Unauthorized("invalid username or password".to_string())
        })?;

    debug!("Authenticated user '{}'", user.username);
    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_credentials() {
        // "reader:s3cret"
        let parsed = parse_basic_credentials("Basic cmVhZGVyOnMzY3JldA==");
        assert_eq!(parsed, Some(("reader".to_string(), "s3cret".to_string())));
    }

    #[test]
    fn test_password_may_contain_colon() {
        let value = format!("Basic {}", STANDARD.encode("reader:a:b"));
        assert_eq!(
            parse_basic_credentials(&value),
            Some(("reader".to_string(), "a:b".to_string()))
        );
    }

    #[test]
    fn test_rejects_other_schemes_and_garbage() {
        assert!(parse_basic_credentials("Bearer abc").is_none());
        assert!(parse_basic_credentials("Basic !!!").is_none());
        // "nocolon"
        assert!(parse_basic_credentials("Basic bm9jb2xvbg==").is_none());
    }
}
