//! # Shelf Common Library
//!
//! Shared code for the Shelf binaries including:
//! - Database initialization, entity models and repositories
//! - Payload validation
//! - User accounts and password hashing
//! - Configuration loading

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod validation;

pub use error::{Error, Result};
pub use validation::ValidationErrors;
