//! Record store backends.

mod json;
mod postgrest;

pub use json::JsonRecordStore;
pub use postgrest::PostgrestRecordStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::*;
use crate::Result;

/// Relational store holding apps, versions, download logs, tickets, replies and roles
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Non-deleted apps matching the query
    async fn list_apps(&self, query: &AppQuery) -> Result<AppPage>;

    /// App by id, including soft-deleted rows
    async fn get_app(&self, id: Uuid) -> Result<Option<App>>;

    async fn insert_app(&self, app: NewApp) -> Result<App>;

    async fn mark_app_deleted(&self, id: Uuid) -> Result<()>;

    async fn find_version(&self, app_id: Uuid, version: &str) -> Result<Option<AppVersion>>;

    /// Versions of an app, newest upload first
    async fn list_versions(&self, app_id: Uuid) -> Result<Vec<AppVersion>>;

    async fn insert_version(&self, version: NewAppVersion) -> Result<AppVersion>;

    async fn insert_download_log(&self, log: NewDownloadLog) -> Result<DownloadLog>;

    /// Download logs of an app, newest first
    async fn list_download_logs(&self, app_id: Uuid) -> Result<Vec<DownloadLog>>;

    /// Atomically add one to `download_count`
    ///
    /// Implementations must not read the counter into the client and write it
    /// back; concurrent callers would lose updates.
    async fn increment_download_count(&self, app_id: Uuid) -> Result<()>;

    async fn insert_ticket(&self, ticket: NewTicket) -> Result<SupportTicket>;

    async fn get_ticket(&self, id: Uuid) -> Result<Option<SupportTicket>>;

    /// Tickets, newest first
    async fn list_tickets(&self) -> Result<Vec<SupportTicket>>;

    async fn update_ticket_status(&self, id: Uuid, status: TicketStatus) -> Result<SupportTicket>;

    async fn insert_reply(&self, reply: NewTicketReply) -> Result<TicketReply>;

    /// Replies of a ticket in conversation order
    async fn list_replies(&self, ticket_id: Uuid) -> Result<Vec<TicketReply>>;

    async fn has_role(&self, user_id: Uuid, role: Role) -> Result<bool>;

    async fn grant_role(&self, user_id: Uuid, role: Role) -> Result<()>;

    async fn stats(&self) -> Result<StoreStats>;
}

/// Keep apps whose title or short description contains the search term
pub(crate) fn matches_search(app: &App, term: &str) -> bool {
    let term = term.to_lowercase();
    app.title.to_lowercase().contains(&term)
        || app.short_description.to_lowercase().contains(&term)
}
