use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::store::RecordStore;
use crate::{App, AppPage, AppQuery, AppVersion, DownloadLog, Result, StoreStats, StorefrontError};

/// Read side of the store plus soft deletion
pub struct Catalog {
    store: Arc<dyn RecordStore>,
}

impl Catalog {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, query: &AppQuery) -> Result<AppPage> {
        self.store.list_apps(query).await
    }

    /// Live app by id; soft-deleted apps are reported as missing
    pub async fn get(&self, app_id: Uuid) -> Result<App> {
        self.store
            .get_app(app_id)
            .await?
            .filter(|app| !app.deleted)
            .ok_or(StorefrontError::AppNotFound(app_id))
    }

    pub async fn versions(&self, app_id: Uuid) -> Result<Vec<AppVersion>> {
        self.get(app_id).await?;
        self.store.list_versions(app_id).await
    }

    pub async fn download_logs(&self, app_id: Uuid) -> Result<Vec<DownloadLog>> {
        self.store.list_download_logs(app_id).await
    }

    /// Hide an app from listing and downloads. Rows are kept.
    pub async fn delete(&self, app_id: Uuid) -> Result<()> {
        self.get(app_id).await?;
        self.store.mark_app_deleted(app_id).await?;
        info!(app_id = %app_id, "App deleted");
        Ok(())
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        self.store.stats().await
    }
}
