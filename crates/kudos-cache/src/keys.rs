//! Cache key builders for all Kudos cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

use uuid::Uuid;

/// Prefix applied to all Kudos cache keys.
const PREFIX: &str = "kudos";

// ── Card keys ──────────────────────────────────────────────

/// Cache key for a card entity by ID.
pub fn card_by_id(card_id: Uuid) -> String {
    format!("{PREFIX}:card:{card_id}")
}

/// Cache key for a public card entity by share code.
pub fn card_by_share_code(share_code: &str) -> String {
    format!("{PREFIX}:card:code:{share_code}")
}

/// Refresh lock for a card-by-id cache entry.
pub fn card_lock(card_id: Uuid) -> String {
    format!("{PREFIX}:lock:card:{card_id}")
}

/// Refresh lock for a public share-page cache entry.
pub fn share_code_lock(share_code: &str) -> String {
    format!("{PREFIX}:lock:code:{share_code}")
}

// ── Metrics keys ───────────────────────────────────────────

/// Cache key for an owner's aggregate engagement metrics.
pub fn owner_metrics(owner_id: Uuid) -> String {
    format!("{PREFIX}:metrics:{owner_id}")
}

/// Refresh lock for an owner's aggregate metrics entry.
pub fn owner_metrics_lock(owner_id: Uuid) -> String {
    format!("{PREFIX}:lock:metrics:{owner_id}")
}

// ── View dedup keys ────────────────────────────────────────

/// Tracking entry blocking duplicate views of a card by one client.
pub fn view_dedup(card_id: Uuid, client_identifier: &str) -> String {
    format!("{PREFIX}:view:{card_id}:{client_identifier}")
}

// ── Circuit breaker keys ───────────────────────────────────

/// Persisted circuit breaker state for a dependency.
pub fn breaker_state(dependency: &str) -> String {
    format!("{PREFIX}:breaker:{dependency}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_key() {
        let id = Uuid::nil();
        assert_eq!(
            card_by_id(id),
            "kudos:card:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_view_dedup_key() {
        let id = Uuid::nil();
        assert_eq!(
            view_dedup(id, "203.0.113.9"),
            "kudos:view:00000000-0000-0000-0000-000000000000:203.0.113.9"
        );
    }

    #[test]
    fn test_lock_and_entry_keys_are_disjoint() {
        let id = Uuid::nil();
        assert_ne!(card_by_id(id), card_lock(id));
        assert_ne!(owner_metrics(id), owner_metrics_lock(id));
    }
}
