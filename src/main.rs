// Demo host for the spam detector.
//
// Loads the configuration from the environment, wires the infra
// implementations into the event gate, then saves every JSON content record
// passed on the command line and prints what moderation did to it.
//
//   spam_detector data/records/agent.json data/records/event.json

use anyhow::{Context, Result};
use spam_detector::core::moderation::{
    Actor, EventGate, IdentityTranslator, ModerationPorts, PUBLISH_CAPABILITY,
};
use spam_detector::host::{ContentRecord, EntityLifecycle, InMemoryRepository};
use spam_detector::infra::config::load_from_env;
use spam_detector::infra::moderation::{
    AccessControlFlag, JsonRoleDirectory, MustacheRenderer, OutboxMailTransport,
    SqliteNotificationStore,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = load_from_env().context("Invalid spam detector configuration")?;

    // Keep runtime files in a dedicated folder so the repo root stays tidy.
    let data_dir = std::env::var("SPAM_DETECTOR_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    let notifications = SqliteNotificationStore::connect(&format!("{}/notifications.db", data_dir))
        .await
        .context("Failed to open notification database")?;
    let roles = JsonRoleDirectory::load(format!("{}/roles.json", data_dir))
        .context("Failed to load role directory")?;

    let ports = ModerationPorts {
        roles: Arc::new(roles),
        notifications: Arc::new(notifications),
        mailer: Arc::new(OutboxMailTransport::new(format!("{}/outbox.jsonl", data_dir))),
        templates: Arc::new(MustacheRenderer::new()),
        translator: Arc::new(IdentityTranslator),
        access: Arc::new(AccessControlFlag::new()),
    };

    let gate = Arc::new(EventGate::new(config, ports).context("Invalid spam detector configuration")?);
    let mut lifecycle = EntityLifecycle::new(InMemoryRepository::new());
    gate.register(&mut lifecycle);

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        tracing::warn!("No content records given; pass one or more JSON files");
        return Ok(());
    }

    for path in paths {
        let raw = std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))?;
        let mut record: ContentRecord =
            serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path))?;

        let report = lifecycle.save(&mut record).await?;
        let owner_can_publish =
            lifecycle.can_user(&record, &Actor::user(record.owner_user_id), PUBLISH_CAPABILITY);

        println!(
            "{} {} '{}': status={:?} spam_block={} owner_can_publish={}",
            record.kind.display_label(),
            record.id,
            record.name,
            record.status,
            record.spam_block,
            owner_can_publish
        );
        for outcome in &report.post_save {
            for detection in &outcome.detections {
                println!("  {}: {}", detection.field, detection.terms.join(", "));
            }
            println!(
                "  admins notified: {}, emails sent: {}, owner notified: {}, failures: {}",
                outcome.admins_notified, outcome.emails_sent, outcome.owner_notified, outcome.failures
            );
        }
    }

    Ok(())
}
