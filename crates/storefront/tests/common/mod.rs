//! Shared fixtures for the storefront integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

use storefront::notify::{Notifier, OutboundEmail};
use storefront::objects::{ObjectStore, StoredObject};
use storefront::store::{JsonRecordStore, RecordStore};
use storefront::*;

/// Collects every email instead of sending it
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingNotifier {
    pub fn subjects(&self) -> Vec<String> {
        self.sent.lock().iter().map(|e| e.subject.clone()).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        self.sent.lock().push(email.clone());
        Ok(())
    }
}

/// Mail relay that is always down
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _email: &OutboundEmail) -> Result<()> {
        Err(StorefrontError::Notification("connection refused".to_string()))
    }
}

/// In-memory bucket that remembers what was put
#[derive(Default)]
pub struct MemoryObjectStore {
    pub objects: Mutex<Vec<(String, Bytes)>>,
}

impl MemoryObjectStore {
    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, content: Bytes, _content_type: &str) -> Result<StoredObject> {
        let size = content.len() as u64;
        self.objects.lock().push((key.to_string(), content));
        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
            size,
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://cdn.example.com/{}", key)
    }
}

/// Bucket that rejects every upload
pub struct FailingObjectStore;

#[async_trait]
impl ObjectStore for FailingObjectStore {
    async fn put(&self, key: &str, _content: Bytes, _content_type: &str) -> Result<StoredObject> {
        Err(StorefrontError::ObjectStore(format!("bucket unavailable for {}", key)))
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://cdn.example.com/{}", key)
    }
}

/// In-memory record store with selected writes failing
pub struct FaultyStore {
    pub inner: JsonRecordStore,
    /// Download log inserts and counter increments fail
    pub fail_download_side_effects: bool,
    /// Ticket status updates fail
    pub fail_status_updates: bool,
}

impl FaultyStore {
    pub fn broken_download_side_effects() -> Self {
        Self {
            inner: JsonRecordStore::in_memory(),
            fail_download_side_effects: true,
            fail_status_updates: false,
        }
    }

    pub fn broken_status_updates() -> Self {
        Self {
            inner: JsonRecordStore::in_memory(),
            fail_download_side_effects: false,
            fail_status_updates: true,
        }
    }
}

#[async_trait]
impl RecordStore for FaultyStore {
    async fn list_apps(&self, query: &AppQuery) -> Result<AppPage> {
        self.inner.list_apps(query).await
    }

    async fn get_app(&self, id: Uuid) -> Result<Option<App>> {
        self.inner.get_app(id).await
    }

    async fn insert_app(&self, app: NewApp) -> Result<App> {
        self.inner.insert_app(app).await
    }

    async fn mark_app_deleted(&self, id: Uuid) -> Result<()> {
        self.inner.mark_app_deleted(id).await
    }

    async fn find_version(&self, app_id: Uuid, version: &str) -> Result<Option<AppVersion>> {
        self.inner.find_version(app_id, version).await
    }

    async fn list_versions(&self, app_id: Uuid) -> Result<Vec<AppVersion>> {
        self.inner.list_versions(app_id).await
    }

    async fn insert_version(&self, version: NewAppVersion) -> Result<AppVersion> {
        self.inner.insert_version(version).await
    }

    async fn insert_download_log(&self, log: NewDownloadLog) -> Result<DownloadLog> {
        if self.fail_download_side_effects {
            return Err(StorefrontError::RecordStore("download_logs unavailable".to_string()));
        }
        self.inner.insert_download_log(log).await
    }

    async fn list_download_logs(&self, app_id: Uuid) -> Result<Vec<DownloadLog>> {
        self.inner.list_download_logs(app_id).await
    }

    async fn increment_download_count(&self, app_id: Uuid) -> Result<()> {
        if self.fail_download_side_effects {
            return Err(StorefrontError::RecordStore("rpc timed out".to_string()));
        }
        self.inner.increment_download_count(app_id).await
    }

    async fn insert_ticket(&self, ticket: NewTicket) -> Result<SupportTicket> {
        self.inner.insert_ticket(ticket).await
    }

    async fn get_ticket(&self, id: Uuid) -> Result<Option<SupportTicket>> {
        self.inner.get_ticket(id).await
    }

    async fn list_tickets(&self) -> Result<Vec<SupportTicket>> {
        self.inner.list_tickets().await
    }

    async fn update_ticket_status(&self, id: Uuid, status: TicketStatus) -> Result<SupportTicket> {
        if self.fail_status_updates {
            return Err(StorefrontError::RecordStore("support_tickets update rejected".to_string()));
        }
        self.inner.update_ticket_status(id, status).await
    }

    async fn insert_reply(&self, reply: NewTicketReply) -> Result<TicketReply> {
        self.inner.insert_reply(reply).await
    }

    async fn list_replies(&self, ticket_id: Uuid) -> Result<Vec<TicketReply>> {
        self.inner.list_replies(ticket_id).await
    }

    async fn has_role(&self, user_id: Uuid, role: Role) -> Result<bool> {
        self.inner.has_role(user_id, role).await
    }

    async fn grant_role(&self, user_id: Uuid, role: Role) -> Result<()> {
        self.inner.grant_role(user_id, role).await
    }

    async fn stats(&self) -> Result<StoreStats> {
        self.inner.stats().await
    }
}

/// Storefront over an in-memory store, bucket and mailbox
pub struct Fixture {
    pub storefront: Storefront,
    pub store: Arc<JsonRecordStore>,
    pub objects: Arc<MemoryObjectStore>,
    pub mailbox: Arc<RecordingNotifier>,
}

pub fn fixture() -> Fixture {
    let store = Arc::new(JsonRecordStore::in_memory());
    let objects = Arc::new(MemoryObjectStore::default());
    let mailbox = Arc::new(RecordingNotifier::default());
    let storefront = Storefront::new(store.clone(), objects.clone(), mailbox.clone());
    Fixture {
        storefront,
        store,
        objects,
        mailbox,
    }
}

pub fn publish_request(title: &str, version: &str) -> PublishRequest {
    PublishRequest {
        title: title.to_string(),
        package_name: format!("com.example.{}", slugify(title).replace('-', "")),
        category: "productivity".to_string(),
        short_description: format!("{} in your pocket", title),
        long_description: format!("{} keeps everything organised.", title),
        version: version.to_string(),
        min_os: "Android 8.0".to_string(),
        release_notes: Some("Initial release".to_string()),
        icon_url: None,
        screenshots: None,
    }
}

pub fn package(file_name: &str, size: usize) -> PackageUpload {
    PackageUpload {
        file_name: file_name.to_string(),
        content_type: Some("application/vnd.android.package-archive".to_string()),
        data: Bytes::from(vec![7u8; size]),
    }
}

pub async fn publish(storefront: &Storefront, title: &str, version: &str) -> Uuid {
    storefront
        .uploads
        .publish(
            publish_request(title, version),
            package(&format!("{}.apk", slugify(title)), 2048),
            &RequestContext::anonymous(),
        )
        .await
        .unwrap()
}

pub fn new_ticket(name: &str) -> NewTicket {
    NewTicket {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        subject: "App crashes on start".to_string(),
        message: "It closes right after the splash screen.".to_string(),
        app_id: None,
    }
}
