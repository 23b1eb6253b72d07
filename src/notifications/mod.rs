// Outbound side-effect collaborators: the push transport behind the
// approval notification and the out-of-band delivery of reset tokens.

use async_trait::async_trait;

pub mod handler;

pub use handler::NotificationHandler;

/// Push-notification transport. Production wires a real provider (FCM);
/// everything in this crate only depends on this contract.
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, device_token: &str, title: &str, body: &str) -> anyhow::Result<()>;
}

/// Transport used when no push provider is configured: logs the payload
/// that would have been delivered.
#[derive(Debug, Default)]
pub struct LoggingPushSender;

#[async_trait]
impl PushSender for LoggingPushSender {
    async fn send(&self, device_token: &str, title: &str, body: &str) -> anyhow::Result<()> {
        tracing::info!(device_token, title, body, "push notification (logging transport)");
        Ok(())
    }
}

/// Out-of-band delivery channel for password-reset tokens. The real
/// deployment hands the token to a mailer service.
#[async_trait]
pub trait ResetTokenDelivery: Send + Sync {
    async fn deliver(&self, email: &str, reset_token: &str) -> anyhow::Result<()>;
}

/// Email stand-in: logs the token it would have mailed.
#[derive(Debug, Default)]
pub struct LoggingResetDelivery;

#[async_trait]
impl ResetTokenDelivery for LoggingResetDelivery {
    async fn deliver(&self, email: &str, reset_token: &str) -> anyhow::Result<()> {
        tracing::info!(email, reset_token, "password reset token (logging delivery)");
        Ok(())
    }
}
