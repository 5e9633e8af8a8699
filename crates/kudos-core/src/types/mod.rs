//! Core type definitions used across the Kudos Cards workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
