use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use super::{Notifier, OutboundEmail};
use crate::{Result, StorefrontError};

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender address; defaults to the username
    pub from: Option<String>,
}

/// Sends mail through an implicit-TLS SMTP relay
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let from = config
            .from
            .as_deref()
            .unwrap_or(&config.username)
            .parse::<Mailbox>()
            .map_err(|e| StorefrontError::Notification(format!("invalid sender address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| StorefrontError::Notification(format!("smtp relay {}: {}", config.host, e)))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let to = email.to.parse::<Mailbox>().map_err(|e| {
            StorefrontError::Notification(format!("invalid recipient {}: {}", email.to, e))
        })?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone())
            .map_err(|e| StorefrontError::Notification(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| StorefrontError::Notification(e.to_string()))?;

        info!("Email sent successfully to: {}", email.to);
        Ok(())
    }
}
