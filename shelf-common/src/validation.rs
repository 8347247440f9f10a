//! Payload validation
//!
//! Validators collect every failing field before returning, so a client
//! sees the complete list of problems in one response.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Lowest accepted rating score (inclusive)
pub const MIN_SCORE: f64 = 1.0;

/// Highest accepted rating score (inclusive)
pub const MAX_SCORE: f64 = 5.0;

/// Field name → list of messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages recorded for one field
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Ok when nothing was recorded
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join("; ")))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Validate a rating score against the closed interval [1.0, 5.0]
///
/// NaN is rejected.
///
/// ```
/// use shelf_common::validation::validate_score;
///
/// assert!(validate_score(1.0).is_ok());
/// assert!(validate_score(5.0).is_ok());
/// assert!(validate_score(5.01).is_err());
/// ```
pub fn validate_score(score: f64) -> Result<(), String> {
    if (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(())
    } else {
        Err(format!(
            "score must be between {:.1} and {:.1}",
            MIN_SCORE, MAX_SCORE
        ))
    }
}

/// Reject blank text fields
pub fn validate_name(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err("this field may not be blank".to_string())
    } else {
        Ok(())
    }
}

/// Check a text field and record the failure under `field`
pub fn check_name(errors: &mut ValidationErrors, field: &str, value: &str) {
    if let Err(message) = validate_name(value) {
        errors.add(field, message);
    }
}

/// Check a score and record the failure under `field`
pub fn check_score(errors: &mut ValidationErrors, field: &str, score: f64) {
    if let Err(message) = validate_score(score) {
        errors.add(field, message);
    }
}
