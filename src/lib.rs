// Spam detector for user-generated content.
//
// - `core/` = detection, policy and notification logic (host-agnostic)
// - `infra/` = implementations of the core ports (SQLite, mail, templates, env config)
// - `host/` = a reference host: the content record and its save lifecycle

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
pub mod core;
#[path = "host/host_layer.rs"]
pub mod host;
#[path = "infra/infra_layer.rs"]
pub mod infra;
