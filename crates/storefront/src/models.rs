/// Storefront Data Models
/// Rows of the record store plus the insert and query shapes used against it
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::StorefrontError;

/// App category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Productivity,
    Photography,
    Health,
    Entertainment,
    Utilities,
    Education,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Productivity,
        Category::Photography,
        Category::Health,
        Category::Entertainment,
        Category::Utilities,
        Category::Education,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Productivity => "productivity",
            Category::Photography => "photography",
            Category::Health => "health",
            Category::Entertainment => "entertainment",
            Category::Utilities => "utilities",
            Category::Education => "education",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = StorefrontError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| StorefrontError::Validation(format!("unknown category '{}'", s)))
    }
}

/// Support ticket lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    New,
    Open,
    Resolved,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::Open => "open",
            TicketStatus::Resolved => "resolved",
        }
    }

    /// Sentence shown to the customer when a ticket enters this state
    pub fn customer_message(&self) -> &'static str {
        match self {
            TicketStatus::New => "Your ticket has been received and is waiting for review.",
            TicketStatus::Open => {
                "Your ticket is now being actively worked on by our support team."
            }
            TicketStatus::Resolved => {
                "Your ticket has been resolved. If you need further assistance, please reply to this email."
            }
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = StorefrontError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(TicketStatus::New),
            "open" => Ok(TicketStatus::Open),
            "resolved" => Ok(TicketStatus::Resolved),
            other => Err(StorefrontError::Validation(format!(
                "unknown ticket status '{}'",
                other
            ))),
        }
    }
}

/// Authorization role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::User => f.write_str("user"),
        }
    }
}

/// Published app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    pub id: Uuid,

    /// URL-safe name derived from the title, not guaranteed unique
    pub slug: String,

    pub title: String,

    /// Platform package identifier (e.g. com.example.notes)
    pub package_name: String,

    pub category: Category,

    pub short_description: String,

    pub long_description: String,

    pub icon_url: Option<String>,

    #[serde(default)]
    pub screenshots: Option<Vec<String>>,

    /// Matches `AppVersion::version` of the release handed out on download
    pub current_version: String,

    /// Only ever changed through the store's atomic increment
    #[serde(default)]
    pub download_count: i64,

    /// Human readable size of the current binary
    pub file_size: Option<String>,

    pub min_os: String,

    #[serde(default)]
    pub deleted: bool,

    pub created_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Uploaded release binary of an app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppVersion {
    pub id: Uuid,
    pub app_id: Uuid,
    pub version: String,
    pub file_url: String,
    pub file_key: String,
    pub release_notes: Option<String>,
    /// SHA-256 of the binary, hex encoded
    #[serde(default)]
    pub checksum: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Audit row for one download
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadLog {
    pub id: Uuid,
    pub app_id: Uuid,
    pub version: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportTicket {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub app_id: Option<Uuid>,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SupportTicket {
    /// Short reference quoted to customers
    pub fn short_id(&self) -> String {
        short_id(&self.id)
    }
}

pub fn short_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketReply {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub message: String,
    pub replied_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    pub user_id: Uuid,
    pub role: Role,
}

/// App row to insert
#[derive(Debug, Clone, Serialize)]
pub struct NewApp {
    pub slug: String,
    pub title: String,
    pub package_name: String,
    pub category: Category,
    pub short_description: String,
    pub long_description: String,
    pub icon_url: Option<String>,
    pub screenshots: Option<Vec<String>>,
    pub current_version: String,
    pub file_size: Option<String>,
    pub min_os: String,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAppVersion {
    pub app_id: Uuid,
    pub version: String,
    pub file_url: String,
    pub file_key: String,
    pub release_notes: Option<String>,
    pub checksum: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewDownloadLog {
    pub app_id: Uuid,
    pub version: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTicket {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub app_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTicketReply {
    pub ticket_id: Uuid,
    pub message: String,
    pub replied_by: Option<Uuid>,
}

/// Catalog listing parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppQuery {
    pub q: Option<String>,             // Matches title or short description
    pub category: Option<Category>,    // Filter by category
    pub sort: Option<String>,          // "downloads", "recent", "title"
    pub page: Option<i64>,             // Page number (1-based)
    pub limit: Option<i64>,            // Results per page
}

impl AppQuery {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// One page of catalog results
#[derive(Debug, Serialize)]
pub struct AppPage {
    pub apps: Vec<App>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

impl AppPage {
    pub fn new(apps: Vec<App>, total: i64, query: &AppQuery) -> Self {
        let limit = query.limit();
        Self {
            apps,
            total,
            page: query.page(),
            pages: (total + limit - 1) / limit,
        }
    }
}

/// Admin dashboard figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total_apps: i64,
    pub total_downloads: i64,
    pub pending_tickets: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Photography".parse::<Category>().unwrap(), Category::Photography);
        assert!("games".parse::<Category>().is_err());
    }

    #[test]
    fn status_round_trips_through_serde() {
        let json = serde_json::to_string(&TicketStatus::Resolved).unwrap();
        assert_eq!(json, "\"resolved\"");
        let back: TicketStatus = serde_json::from_str("\"open\"").unwrap();
        assert_eq!(back, TicketStatus::Open);
    }

    #[test]
    fn query_limits_are_clamped() {
        let query = AppQuery {
            page: Some(0),
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 100);
        assert_eq!(query.offset(), 0);

        let query = AppQuery {
            page: Some(3),
            limit: Some(10),
            ..Default::default()
        };
        assert_eq!(query.offset(), 20);
    }

    #[test]
    fn short_id_is_first_eight_hex_chars() {
        let id = Uuid::parse_str("a1b2c3d4-0000-0000-0000-000000000000").unwrap();
        assert_eq!(short_id(&id), "a1b2c3d4");
    }
}
