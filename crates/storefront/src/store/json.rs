/// JSON-backed record store
/// Keeps every table in memory and rewrites a single file after each mutation
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::{matches_search, RecordStore};
use crate::models::*;
use crate::{Result, StorefrontError};

const RECORDS_FILE: &str = "records.json";
const RECORDS_TMP_FILE: &str = "records.json.tmp";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Tables {
    #[serde(default)]
    apps: HashMap<Uuid, App>,
    #[serde(default)]
    versions: Vec<AppVersion>,
    #[serde(default)]
    download_logs: Vec<DownloadLog>,
    #[serde(default)]
    tickets: HashMap<Uuid, SupportTicket>,
    /// Insertion order doubles as the tie-breaker for equal timestamps
    #[serde(default)]
    replies: Vec<TicketReply>,
    #[serde(default)]
    roles: Vec<UserRole>,
}

pub struct JsonRecordStore {
    storage_path: Option<PathBuf>,
    tables: RwLock<Tables>,
    /// Held by one mutation at a time, from reading the tables until the commit
    writer: Mutex<()>,
}

impl JsonRecordStore {
    /// Open (or create) a store persisted under `storage_path`
    pub fn open(storage_path: impl AsRef<Path>) -> Result<Self> {
        let storage_path = storage_path.as_ref().to_path_buf();
        fs::create_dir_all(&storage_path)?;

        let records_file = storage_path.join(RECORDS_FILE);
        let tables = if records_file.exists() {
            let data = fs::read_to_string(&records_file)?;
            serde_json::from_str(&data)?
        } else {
            Tables::default()
        };

        Ok(Self {
            storage_path: Some(storage_path),
            tables: RwLock::new(tables),
            writer: Mutex::new(()),
        })
    }

    /// Store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            storage_path: None,
            tables: RwLock::new(Tables::default()),
            writer: Mutex::new(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().apps.is_empty()
    }

    /// Apply `change` to a copy of the tables, persist the copy, then publish it.
    ///
    /// A failed change or a failed write leaves the visible state untouched.
    async fn mutate<T, F>(&self, change: F) -> Result<T>
    where
        F: FnOnce(&mut Tables) -> Result<T> + Send,
        T: Send,
    {
        let _writer = self.writer.lock().await;

        let mut next = self.tables.read().clone();
        let value = change(&mut next)?;
        self.save(&next).await?;

        *self.tables.write() = next;
        Ok(value)
    }

    async fn save(&self, tables: &Tables) -> Result<()> {
        let Some(path) = &self.storage_path else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(tables)?;

        // Write beside the live file and swap it in
        let tmp = path.join(RECORDS_TMP_FILE);
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path.join(RECORDS_FILE)).await?;

        debug!("Saved records to {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    async fn list_apps(&self, query: &AppQuery) -> Result<AppPage> {
        let mut apps: Vec<App> = self
            .tables
            .read()
            .apps
            .values()
            .filter(|a| !a.deleted)
            .cloned()
            .collect();

        // Filter by category
        if let Some(category) = query.category {
            apps.retain(|a| a.category == category);
        }

        // Search
        if let Some(term) = query.q.as_deref().filter(|t| !t.trim().is_empty()) {
            apps.retain(|a| matches_search(a, term.trim()));
        }

        // Sort
        match query.sort.as_deref() {
            Some("recent") => apps.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            Some("title") => apps.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase())),
            _ => apps.sort_by(|a, b| b.download_count.cmp(&a.download_count)),
        }

        let total = apps.len() as i64;
        let apps = apps
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect();

        Ok(AppPage::new(apps, total, query))
    }

    async fn get_app(&self, id: Uuid) -> Result<Option<App>> {
        Ok(self.tables.read().apps.get(&id).cloned())
    }

    async fn insert_app(&self, app: NewApp) -> Result<App> {
        let now = Utc::now();
        let app = App {
            id: Uuid::new_v4(),
            slug: app.slug,
            title: app.title,
            package_name: app.package_name,
            category: app.category,
            short_description: app.short_description,
            long_description: app.long_description,
            icon_url: app.icon_url,
            screenshots: app.screenshots,
            current_version: app.current_version,
            download_count: 0,
            file_size: app.file_size,
            min_os: app.min_os,
            deleted: false,
            created_by: app.created_by,
            created_at: now,
            updated_at: now,
        };

        self.mutate(move |tables| {
            tables.apps.insert(app.id, app.clone());
            Ok(app)
        })
        .await
    }

    async fn mark_app_deleted(&self, id: Uuid) -> Result<()> {
        self.mutate(|tables| {
            let app = tables
                .apps
                .get_mut(&id)
                .ok_or(StorefrontError::AppNotFound(id))?;
            app.deleted = true;
            app.updated_at = Utc::now();
            Ok(())
        })
        .await
    }

    async fn find_version(&self, app_id: Uuid, version: &str) -> Result<Option<AppVersion>> {
        Ok(self
            .tables
            .read()
            .versions
            .iter()
            .find(|v| v.app_id == app_id && v.version == version)
            .cloned())
    }

    async fn list_versions(&self, app_id: Uuid) -> Result<Vec<AppVersion>> {
        let mut versions: Vec<AppVersion> = self
            .tables
            .read()
            .versions
            .iter()
            .filter(|v| v.app_id == app_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(versions)
    }

    async fn insert_version(&self, version: NewAppVersion) -> Result<AppVersion> {
        self.mutate(move |tables| {
            if !tables.apps.contains_key(&version.app_id) {
                return Err(StorefrontError::AppNotFound(version.app_id));
            }

            let version = AppVersion {
                id: Uuid::new_v4(),
                app_id: version.app_id,
                version: version.version,
                file_url: version.file_url,
                file_key: version.file_key,
                release_notes: version.release_notes,
                checksum: version.checksum,
                uploaded_at: Utc::now(),
            };
            tables.versions.push(version.clone());
            Ok(version)
        })
        .await
    }

    async fn insert_download_log(&self, log: NewDownloadLog) -> Result<DownloadLog> {
        self.mutate(move |tables| {
            if !tables.apps.contains_key(&log.app_id) {
                return Err(StorefrontError::AppNotFound(log.app_id));
            }

            let log = DownloadLog {
                id: Uuid::new_v4(),
                app_id: log.app_id,
                version: log.version,
                ip_address: log.ip_address,
                user_agent: log.user_agent,
                created_at: Utc::now(),
            };
            tables.download_logs.push(log.clone());
            Ok(log)
        })
        .await
    }

    async fn list_download_logs(&self, app_id: Uuid) -> Result<Vec<DownloadLog>> {
        let mut logs: Vec<DownloadLog> = self
            .tables
            .read()
            .download_logs
            .iter()
            .filter(|l| l.app_id == app_id)
            .cloned()
            .collect();
        logs.reverse();
        Ok(logs)
    }

    async fn increment_download_count(&self, app_id: Uuid) -> Result<()> {
        // Read and write both happen inside one serialized mutation
        self.mutate(|tables| {
            let app = tables
                .apps
                .get_mut(&app_id)
                .ok_or(StorefrontError::AppNotFound(app_id))?;
            app.download_count += 1;
            Ok(())
        })
        .await
    }

    async fn insert_ticket(&self, ticket: NewTicket) -> Result<SupportTicket> {
        let now = Utc::now();
        let ticket = SupportTicket {
            id: Uuid::new_v4(),
            name: ticket.name,
            email: ticket.email,
            subject: ticket.subject,
            message: ticket.message,
            app_id: ticket.app_id,
            status: TicketStatus::New,
            created_at: now,
            updated_at: now,
        };

        self.mutate(move |tables| {
            tables.tickets.insert(ticket.id, ticket.clone());
            Ok(ticket)
        })
        .await
    }

    async fn get_ticket(&self, id: Uuid) -> Result<Option<SupportTicket>> {
        Ok(self.tables.read().tickets.get(&id).cloned())
    }

    async fn list_tickets(&self) -> Result<Vec<SupportTicket>> {
        let mut tickets: Vec<SupportTicket> = self.tables.read().tickets.values().cloned().collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }

    async fn update_ticket_status(&self, id: Uuid, status: TicketStatus) -> Result<SupportTicket> {
        self.mutate(|tables| {
            let ticket = tables
                .tickets
                .get_mut(&id)
                .ok_or(StorefrontError::TicketNotFound(id))?;
            ticket.status = status;
            ticket.updated_at = Utc::now();
            Ok(ticket.clone())
        })
        .await
    }

    async fn insert_reply(&self, reply: NewTicketReply) -> Result<TicketReply> {
        self.mutate(move |tables| {
            if !tables.tickets.contains_key(&reply.ticket_id) {
                return Err(StorefrontError::TicketNotFound(reply.ticket_id));
            }

            let reply = TicketReply {
                id: Uuid::new_v4(),
                ticket_id: reply.ticket_id,
                message: reply.message,
                replied_by: reply.replied_by,
                created_at: Utc::now(),
            };
            tables.replies.push(reply.clone());
            Ok(reply)
        })
        .await
    }

    async fn list_replies(&self, ticket_id: Uuid) -> Result<Vec<TicketReply>> {
        let mut replies: Vec<TicketReply> = self
            .tables
            .read()
            .replies
            .iter()
            .filter(|r| r.ticket_id == ticket_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps
        replies.sort_by_key(|r| r.created_at);
        Ok(replies)
    }

    async fn has_role(&self, user_id: Uuid, role: Role) -> Result<bool> {
        Ok(self
            .tables
            .read()
            .roles
            .iter()
            .any(|r| r.user_id == user_id && r.role == role))
    }

    async fn grant_role(&self, user_id: Uuid, role: Role) -> Result<()> {
        let grant = UserRole { user_id, role };
        let granted = self.tables.read().roles.contains(&grant);
        if granted {
            return Ok(());
        }
        self.mutate(move |tables| {
            if !tables.roles.contains(&grant) {
                tables.roles.push(grant);
            }
            Ok(())
        })
        .await
    }

    async fn stats(&self) -> Result<StoreStats> {
        let tables = self.tables.read();
        let live = tables.apps.values().filter(|a| !a.deleted);

        Ok(StoreStats {
            total_apps: live.clone().count() as i64,
            total_downloads: live.map(|a| a.download_count).sum(),
            pending_tickets: tables
                .tickets
                .values()
                .filter(|t| t.status == TicketStatus::New)
                .count() as i64,
        })
    }
}
