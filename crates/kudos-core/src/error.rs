//! Unified application error types for Kudos Cards.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested card is missing or inactive.
    NotFound,
    /// The requested card exists but is past its expiry time.
    Expired,
    /// The caller does not own the card. Messages must not reveal
    /// whether the card exists.
    AccessDenied,
    /// The originating domain record is missing or ineligible.
    SourceNotFound,
    /// A generation quota (total or daily) was exhausted.
    LimitExceeded,
    /// Card creation failed inside the transaction; the whole create
    /// was rolled back and no partial card exists.
    Generation,
    /// A guarded dependency is failing and its circuit is open.
    CircuitOpen,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate entry, concurrent modification, etc.).
    Conflict,
    /// A database error occurred.
    Database,
    /// A cache error occurred.
    Cache,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// A configuration error occurred.
    Configuration,
    /// An internal server error occurred.
    Internal,
    /// The service is temporarily unavailable.
    ServiceUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Expired => write!(f, "EXPIRED"),
            Self::AccessDenied => write!(f, "ACCESS_DENIED"),
            Self::SourceNotFound => write!(f, "SOURCE_NOT_FOUND"),
            Self::LimitExceeded => write!(f, "LIMIT_EXCEEDED"),
            Self::Generation => write!(f, "GENERATION_FAILED"),
            Self::CircuitOpen => write!(f, "CIRCUIT_OPEN"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Database => write!(f, "DATABASE"),
            Self::Cache => write!(f, "CACHE"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::ServiceUnavailable => write!(f, "SERVICE_UNAVAILABLE"),
        }
    }
}

/// Which generation quota was exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitScope {
    /// The lifetime per-owner card cap.
    Total,
    /// The rolling 24-hour per-owner card cap.
    Daily,
}

impl fmt::Display for LimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Total => write!(f, "total"),
            Self::Daily => write!(f, "daily"),
        }
    }
}

/// The unified application error used throughout Kudos Cards.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Retry hint attached to circuit-open errors.
    pub retry_after: Option<Duration>,
    /// Which quota scope was exhausted, for limit-exceeded errors.
    pub limit_scope: Option<LimitScope>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
            retry_after: None,
            limit_scope: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
            retry_after: None,
            limit_scope: None,
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an expired error.
    pub fn expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Expired, message)
    }

    /// Create an access-denied error.
    ///
    /// The message is shown to unauthorized callers and therefore must be
    /// indistinguishable from a not-found message.
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccessDenied, message)
    }

    /// Create a source-not-found error.
    pub fn source_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SourceNotFound, message)
    }

    /// Create a limit-exceeded error carrying the exhausted scope.
    pub fn limit_exceeded(scope: LimitScope) -> Self {
        let mut err = Self::new(
            ErrorKind::LimitExceeded,
            format!("Card generation limit reached ({scope})"),
        );
        err.limit_scope = Some(scope);
        err
    }

    /// Create a generation error. Always implies the transaction was
    /// rolled back and no partial card exists.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Generation, message)
    }

    /// Create a circuit-open error carrying the dependency name and a
    /// retry-after hint.
    pub fn circuit_open(dependency: impl Into<String>, retry_after: Duration) -> Self {
        let dependency = dependency.into();
        let mut err = Self::new(
            ErrorKind::CircuitOpen,
            format!(
                "Dependency '{dependency}' is unavailable, retry in {}s",
                retry_after.as_secs()
            ),
        );
        err.retry_after = Some(retry_after);
        err
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
            retry_after: self.retry_after,
            limit_scope: self.limit_scope,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_exceeded_carries_scope() {
        let err = AppError::limit_exceeded(LimitScope::Daily);
        assert_eq!(err.kind, ErrorKind::LimitExceeded);
        assert_eq!(err.limit_scope, Some(LimitScope::Daily));
        assert!(err.message.contains("daily"));
    }

    #[test]
    fn test_circuit_open_carries_retry_hint() {
        let err = AppError::circuit_open("source_fetcher", Duration::from_secs(30));
        assert_eq!(err.kind, ErrorKind::CircuitOpen);
        assert_eq!(err.retry_after, Some(Duration::from_secs(30)));
        assert!(err.message.contains("source_fetcher"));
    }

    #[test]
    fn test_clone_drops_source() {
        let inner = std::io::Error::other("boom");
        let err = AppError::with_source(ErrorKind::Cache, "cache down", inner);
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Cache);
        assert!(cloned.source.is_none());
    }
}
