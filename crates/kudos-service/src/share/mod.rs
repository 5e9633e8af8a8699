//! Share recording and signup attribution.

pub mod service;

pub use service::ShareService;
