//! Row outcome and failure classification model.
//!
//! Every dispatched request resolves to exactly one [`Outcome`]. Rows that
//! never reach the network carry a [`ValidationFailure`] instead. Both map
//! onto a [`FailureMarker`] that is written into the row's output slots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal marker written into every output slot of a failed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureMarker {
    /// A required input field was empty; no request was sent.
    MissingRequiredFields,
    /// The service understood the request but found no usable result.
    NoMatchFound,
    /// The service answered with a non-success status.
    ApiError,
    /// Anything else: connection failure, timeout, malformed body.
    Error,
}

impl FailureMarker {
    /// Marker text as it appears in output files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingRequiredFields => "MISSING_REQUIRED_FIELDS",
            Self::NoMatchFound => "NO_MATCH_FOUND",
            Self::ApiError => "API_ERROR",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for FailureMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Required fields that were empty on a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("missing required field(s): {}", .missing.join(", "))]
pub struct ValidationFailure {
    pub missing: Vec<String>,
}

impl ValidationFailure {
    #[must_use]
    pub fn new(missing: Vec<String>) -> Self {
        Self { missing }
    }

    /// Single missing field.
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            missing: vec![name.into()],
        }
    }
}

/// Classified result of one dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// 2xx response with a parsed JSON body.
    Success { body: serde_json::Value },
    /// Service-level rejection recognized as "no result".
    DomainError { code: String, message: String },
    /// Non-success HTTP status without a recognized domain code.
    TransportError { status: u16, body: String },
    /// Any failure outside the HTTP status model.
    UnexpectedError { description: String },
}

impl Outcome {
    #[must_use]
    pub fn success(body: serde_json::Value) -> Self {
        Self::Success { body }
    }

    #[must_use]
    pub fn unexpected(description: impl Into<String>) -> Self {
        Self::UnexpectedError {
            description: description.into(),
        }
    }

    /// Marker for a failed outcome; `None` on success.
    #[must_use]
    pub fn failure_marker(&self) -> Option<FailureMarker> {
        match self {
            Self::Success { .. } => None,
            Self::DomainError { .. } => Some(FailureMarker::NoMatchFound),
            Self::TransportError { .. } => Some(FailureMarker::ApiError),
            Self::UnexpectedError { .. } => Some(FailureMarker::Error),
        }
    }

    /// Human-readable diagnostic for logs and failure reports.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Success { .. } => String::new(),
            Self::DomainError { code, message } => format!("{code}: {message}"),
            Self::TransportError { status, body } => format!("HTTP {status}: {body}"),
            Self::UnexpectedError { description } => description.clone(),
        }
    }

    /// The service's own error message, when the failure carried one.
    #[must_use]
    pub fn service_message(&self) -> Option<String> {
        match self {
            Self::DomainError { message, .. } => Some(message.clone()),
            Self::TransportError { body, .. } => serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                .or_else(|| (!body.trim().is_empty()).then(|| body.clone())),
            Self::UnexpectedError { description } => Some(description.clone()),
            Self::Success { .. } => None,
        }
    }
}

/// What the result merger receives for one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowResult {
    /// Row failed validation and was never dispatched.
    MissingRequired(ValidationFailure),
    /// Row was dispatched and produced an outcome.
    Dispatched(Outcome),
}

impl RowResult {
    #[must_use]
    pub fn failure_marker(&self) -> Option<FailureMarker> {
        match self {
            Self::MissingRequired(_) => Some(FailureMarker::MissingRequiredFields),
            Self::Dispatched(outcome) => outcome.failure_marker(),
        }
    }

    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::MissingRequired(failure) => failure.to_string(),
            Self::Dispatched(outcome) => outcome.detail(),
        }
    }
}

impl From<Outcome> for RowResult {
    fn from(outcome: Outcome) -> Self {
        Self::Dispatched(outcome)
    }
}

impl From<ValidationFailure> for RowResult {
    fn from(failure: ValidationFailure) -> Self {
        Self::MissingRequired(failure)
    }
}
