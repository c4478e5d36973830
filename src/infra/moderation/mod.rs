// Implementations of the moderation ports.

pub mod in_memory;
pub mod json_role_directory;
pub mod mail_transport;
pub mod mustache_renderer;
pub mod sqlite_notification_store;

// Re-export for convenience
pub use in_memory::{AccessControlFlag, InMemoryNotificationStore};
pub use json_role_directory::{JsonRoleDirectory, RoleSnapshot};
pub use mail_transport::{LogMailTransport, OutboxMailTransport};
pub use mustache_renderer::MustacheRenderer;
pub use sqlite_notification_store::{SqliteNotificationStore, StoredNotification};
