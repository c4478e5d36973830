// Host layer - the content platform side of the contract.
// Owns the concrete record type and the lifecycle that runs interceptors.

#[path = "content_record.rs"]
pub mod content_record;

#[path = "lifecycle.rs"]
pub mod lifecycle;

pub use content_record::ContentRecord;
pub use lifecycle::{EntityLifecycle, EntityRepository, InMemoryRepository, SaveReport};
