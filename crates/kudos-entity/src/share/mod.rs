//! Share domain entities.

pub mod model;
pub mod platform;

pub use model::{CreateShareRecord, ShareRecord};
pub use platform::SharePlatform;
