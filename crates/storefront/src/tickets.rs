/// Support ticket lifecycle
/// new -> open -> resolved, with open and resolved switchable by an admin
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::notify::{NotificationKind, Notifier, TicketEmail};
use crate::store::RecordStore;
use crate::{
    NewTicket, NewTicketReply, Outcome, Result, StorefrontError, SupportTicket, TicketReply,
    TicketStatus, Warning,
};

/// A ticket with its replies in conversation order
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub ticket: SupportTicket,
    pub replies: Vec<TicketReply>,
}

/// Result of [`TicketManager::reply`]
#[derive(Debug, Clone, Serialize)]
pub struct ReplyReceipt {
    pub reply: TicketReply,
    /// Ticket state after any chained status change
    pub ticket: SupportTicket,
}

pub struct TicketManager {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
}

impl TicketManager {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Open a ticket from the public support form and email a receipt
    pub async fn submit(&self, ticket: NewTicket) -> Result<Outcome<SupportTicket>> {
        let ticket = NewTicket {
            name: required("name", ticket.name)?,
            email: required("email", ticket.email)?,
            subject: required("subject", ticket.subject)?,
            message: required("message", ticket.message)?,
            app_id: ticket.app_id,
        };
        if !looks_like_email(&ticket.email) {
            return Err(StorefrontError::Validation(format!(
                "'{}' is not a valid email address",
                ticket.email
            )));
        }

        let ticket = self.store.insert_ticket(ticket).await?;
        info!(ticket_id = %ticket.id, "Support ticket submitted");

        let mut outcome = Outcome::new(ticket);
        self.notify(&mut outcome, NotificationKind::Receipt).await;
        Ok(outcome)
    }

    /// Tickets, newest first
    pub async fn list(&self) -> Result<Vec<SupportTicket>> {
        self.store.list_tickets().await
    }

    pub async fn conversation(&self, ticket_id: Uuid) -> Result<Conversation> {
        let ticket = self.load(ticket_id).await?;
        let replies = self.store.list_replies(ticket_id).await?;
        Ok(Conversation { ticket, replies })
    }

    /// Persist `new_status`, then tell the customer.
    ///
    /// The status write is the primary effect; a failed email never undoes it.
    pub async fn change_status(
        &self,
        ticket_id: Uuid,
        new_status: TicketStatus,
    ) -> Result<Outcome<SupportTicket>> {
        let ticket = self.store.update_ticket_status(ticket_id, new_status).await?;
        info!(ticket_id = %ticket_id, status = %new_status, "Ticket status changed");

        let mut outcome = Outcome::new(ticket);
        self.notify(&mut outcome, NotificationKind::StatusUpdate { new_status })
            .await;
        Ok(outcome)
    }

    /// Append a staff reply and email it to the customer.
    ///
    /// Compound operation: when the ticket is still `new`, this also runs
    /// [`change_status`](Self::change_status) to `open` after the reply is
    /// stored. The reply is kept even if that second step fails; the failure
    /// shows up as a warning.
    pub async fn reply(
        &self,
        ticket_id: Uuid,
        message: &str,
        replied_by: Option<Uuid>,
    ) -> Result<Outcome<ReplyReceipt>> {
        if message.trim().is_empty() {
            return Err(StorefrontError::Validation(
                "reply message must not be empty".to_string(),
            ));
        }

        let ticket = self.load(ticket_id).await?;
        let reply = self
            .store
            .insert_reply(NewTicketReply {
                ticket_id,
                message: message.to_string(),
                replied_by,
            })
            .await?;
        info!(ticket_id = %ticket_id, reply_id = %reply.id, "Ticket reply saved");

        let mut outcome = Outcome::new(ticket);
        self.notify(
            &mut outcome,
            NotificationKind::Reply {
                reply_message: message.to_string(),
            },
        )
        .await;

        if outcome.value.status == TicketStatus::New {
            match self.change_status(ticket_id, TicketStatus::Open).await {
                Ok(opened) => {
                    let opened = outcome.absorb(opened);
                    outcome.value = opened;
                }
                Err(e) => {
                    error!(ticket_id = %ticket_id, error = %e, "Failed to open ticket after reply");
                    outcome.warn(Warning::StatusTransition(e.to_string()));
                }
            }
        }

        Ok(outcome.map(|ticket| ReplyReceipt { reply, ticket }))
    }

    async fn load(&self, ticket_id: Uuid) -> Result<SupportTicket> {
        self.store
            .get_ticket(ticket_id)
            .await?
            .ok_or(StorefrontError::TicketNotFound(ticket_id))
    }

    /// Best-effort email about the ticket held in `outcome`
    async fn notify(&self, outcome: &mut Outcome<SupportTicket>, kind: NotificationKind) {
        let email = TicketEmail::for_ticket(&outcome.value, kind).render();
        if let Err(e) = self.notifier.send(&email).await {
            warn!(ticket_id = %outcome.value.id, error = %e, "Email notification error");
            outcome.warn(Warning::Notification(e.to_string()));
        }
    }
}

fn required(field: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StorefrontError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !value.contains(' '),
        None => false,
    }
}
