/// Storefront core
/// Download, upload and support-ticket flows over pluggable record, object and mail services
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

mod models;
pub use models::*;

mod outcome;
pub use outcome::*;

mod context;
pub use context::*;

pub mod notify;
pub mod objects;
pub mod store;

mod catalog;
pub use catalog::*;

mod downloads;
pub use downloads::*;

mod tickets;
pub use tickets::*;

mod uploads;
pub use uploads::*;

use notify::Notifier;
use objects::ObjectStore;
use store::RecordStore;

#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error("app not found: {0}")]
    AppNotFound(Uuid),

    #[error("version {version} not found for app {app_id}")]
    VersionNotFound { app_id: Uuid, version: String },

    #[error("ticket not found: {0}")]
    TicketNotFound(Uuid),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthenticated,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("record store error: {0}")]
    RecordStore(String),

    #[error("object store error: {0}")]
    ObjectStore(String),

    #[error("notification error: {0}")]
    Notification(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorefrontError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AppNotFound(_) | Self::VersionNotFound { .. } | Self::TicketNotFound(_)
        )
    }

    /// Failures of the hosted collaborators rather than of the request itself
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::RecordStore(_) | Self::ObjectStore(_) | Self::Notification(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;

/// All storefront operations wired to one set of collaborators
pub struct Storefront {
    pub catalog: Catalog,
    pub downloads: DownloadOrchestrator,
    pub tickets: TicketManager,
    pub uploads: UploadCoordinator,
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
}

impl Storefront {
    pub fn new(
        store: Arc<dyn RecordStore>,
        objects: Arc<dyn ObjectStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            catalog: Catalog::new(store.clone()),
            downloads: DownloadOrchestrator::new(store.clone()),
            tickets: TicketManager::new(store.clone(), notifier.clone()),
            uploads: UploadCoordinator::new(store.clone(), objects),
            store,
            notifier,
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Resolve the caller as an admin, failing with `Unauthenticated` or `PermissionDenied`
    pub async fn require_admin(&self, ctx: &RequestContext) -> Result<Uuid> {
        require_role(self.store.as_ref(), ctx, Role::Admin).await
    }
}
