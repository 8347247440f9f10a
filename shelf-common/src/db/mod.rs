//! Database models and queries

pub mod authors;
pub mod books;
pub mod genres;
pub mod init;
pub mod models;
pub mod ratings;
pub mod users;

pub use init::{connect_readonly, create_schema, init_database, init_memory_database};
pub use models::*;
