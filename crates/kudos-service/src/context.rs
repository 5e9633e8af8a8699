//! Request context carrying the authenticated user and client metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current request.
///
/// Extracted by the transport layer and passed into service methods so
/// that every operation knows *who* is acting and from *where*.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// IP address of the request origin, when known.
    pub ip_address: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            user_id,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// The identifier used for view deduplication, when one is available.
    pub fn client_identifier(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }
}
