//! Core traits defined in `kudos-core` and implemented by other crates.

pub mod cache;
pub mod events;

pub use cache::CacheProvider;
pub use events::EventSink;
