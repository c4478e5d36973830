// Core moderation module - term-based spam detection for user content.
// Leaves first: normalizer, matcher, policy, then the gate and dispatcher.

pub mod event_gate;
pub mod moderation_config;
pub mod moderation_models;
pub mod moderation_policy;
pub mod moderation_ports;
pub mod notification_dispatcher;
pub mod term_matcher;
pub mod text_normalizer;

pub use event_gate::*;
pub use moderation_config::*;
pub use moderation_models::*;
pub use moderation_policy::*;
pub use moderation_ports::*;
pub use notification_dispatcher::*;
pub use term_matcher::TermMatcher;
pub use text_normalizer::normalize;
