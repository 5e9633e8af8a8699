//! Card generation, read, and view-counting services.

pub mod codes;
pub mod coordinator;
pub mod idempotency;
pub mod service;
pub mod views;

pub use codes::{CodeNamespace, UniqueCodeGenerator};
pub use coordinator::{GenerateCardRequest, GenerationCoordinator};
pub use idempotency::IdempotencyGuard;
pub use service::CardService;
pub use views::ViewService;
