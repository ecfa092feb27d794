//! Ticket email notifications.

mod smtp;
mod templates;

pub use smtp::{SmtpConfig, SmtpNotifier};
pub use templates::escape_html;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{Result, SupportTicket, TicketStatus};

/// A rendered email ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Outbound mail sender
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<()>;
}

/// Which of the three ticket emails to send
///
/// A single email is exactly one kind; the caller picks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationKind {
    Receipt,
    Reply { reply_message: String },
    StatusUpdate { new_status: TicketStatus },
}

impl NotificationKind {
    /// Resolve the loose flag combination accepted by the email endpoint.
    /// A status update wins over a reply when both are flagged.
    pub fn from_flags(
        is_reply: bool,
        reply_message: Option<String>,
        is_status_update: bool,
        new_status: Option<TicketStatus>,
    ) -> Self {
        if is_status_update {
            if let Some(new_status) = new_status {
                return NotificationKind::StatusUpdate { new_status };
            }
        }
        if is_reply {
            return NotificationKind::Reply {
                reply_message: reply_message.unwrap_or_default(),
            };
        }
        NotificationKind::Receipt
    }
}

/// Template context for a ticket email
#[derive(Debug, Clone)]
pub struct TicketEmail {
    pub to: String,
    pub subject: String,
    pub ticket_id: Uuid,
    pub customer_name: String,
    pub message: String,
    pub kind: NotificationKind,
}

impl TicketEmail {
    /// Email about `ticket`, filled from its stored fields
    pub fn for_ticket(ticket: &SupportTicket, kind: NotificationKind) -> Self {
        Self {
            to: ticket.email.clone(),
            subject: ticket.subject.clone(),
            ticket_id: ticket.id,
            customer_name: ticket.name.clone(),
            message: ticket.message.clone(),
            kind,
        }
    }

    pub fn render(&self) -> OutboundEmail {
        templates::render(self)
    }
}

/// Logs emails instead of delivering them
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        info!(to = %email.to, subject = %email.subject, "Email delivery disabled, not sending");
        Ok(())
    }
}
