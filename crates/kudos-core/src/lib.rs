//! # kudos-core
//!
//! Core crate for Kudos Cards. Contains traits, configuration schemas,
//! domain events and the event bus, pagination types, the operational
//! metrics registry, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Kudos crates.

pub mod config;
pub mod error;
pub mod events;
pub mod metrics;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind, LimitScope};
pub use result::AppResult;
