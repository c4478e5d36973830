// The core module contains all moderation logic.
// Nothing in here knows about the host's storage, mail or templates.

#[path = "moderation/mod.rs"]
pub mod moderation;
