// Mail transports for development and single-node deployments.
//
// - LogMailTransport: writes the email to the log and drops it
// - OutboxMailTransport: appends each email as a JSON line to a file that a
//   separate relay can pick up

use crate::core::moderation::{MailMessage, MailTransport, ModerationError};
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::Mutex;

#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), ModerationError> {
        tracing::info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body_len = message.body.len(),
            "Email dispatched to log transport"
        );
        Ok(())
    }
}

pub struct OutboxMailTransport {
    path: PathBuf,
    // Serializes appends so lines never interleave.
    write_lock: Mutex<()>,
}

impl OutboxMailTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Every email in the outbox, oldest first.
    pub fn read_all(&self) -> Result<Vec<MailMessage>, ModerationError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| ModerationError::MailError(e.to_string()))?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| ModerationError::MailError(e.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl MailTransport for OutboxMailTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), ModerationError> {
        if message.to.trim().is_empty() {
            return Err(ModerationError::MailError("empty recipient".to_string()));
        }

        let line =
            serde_json::to_string(message).map_err(|e| ModerationError::MailError(e.to_string()))?;

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ModerationError::MailError(e.to_string()))?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ModerationError::MailError(e.to_string()))?;
        writeln!(file, "{}", line).map_err(|e| ModerationError::MailError(e.to_string()))?;

        tracing::debug!(to = %message.to, path = %self.path.display(), "Email queued in outbox");
        Ok(())
    }
}
