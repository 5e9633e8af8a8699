//! Repository implementations for all Kudos Cards entities.

pub mod card;
pub mod metrics;
pub mod share_record;

pub use card::CardRepository;
pub use metrics::MetricsRepository;
pub use share_record::ShareRecordRepository;

use kudos_core::error::{AppError, ErrorKind};

/// Map a write error, surfacing unique-constraint violations as typed
/// conflicts so callers can distinguish "raced a duplicate" from plain
/// database failure.
pub(crate) fn map_write_err(context: &str, e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique constraint");
            return AppError::conflict(format!("{context}: duplicate value ({constraint})"));
        }
    }
    AppError::with_source(ErrorKind::Database, context.to_string(), e)
}
