//! HTTP API handlers for shelf-api

pub mod auth;
pub mod authors;
pub mod books;
pub mod genres;
pub mod health;
pub mod ratings;

pub use auth::{auth_middleware, CurrentUser};
pub use authors::author_routes;
pub use books::book_routes;
pub use genres::genre_routes;
pub use health::health_routes;
pub use ratings::rating_routes;
