/// Download orchestration
/// Resolves the current release of an app and records the download
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::store::RecordStore;
use crate::{NewDownloadLog, Outcome, RequestContext, Result, StorefrontError, Warning};

/// What the client needs to fetch the binary itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadGrant {
    pub app_id: Uuid,
    pub app_name: String,
    pub version: String,
    pub download_url: String,
}

pub struct DownloadOrchestrator {
    store: Arc<dyn RecordStore>,
}

impl DownloadOrchestrator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Hand out the current version's URL for `app_id`.
    ///
    /// Only the app and version lookups can fail the call. Writing the
    /// download log and bumping the counter happen afterwards and are
    /// reported as warnings when they fail.
    pub async fn request_download(
        &self,
        app_id: Uuid,
        ctx: &RequestContext,
    ) -> Result<Outcome<DownloadGrant>> {
        let app = self
            .store
            .get_app(app_id)
            .await?
            .filter(|app| !app.deleted)
            .ok_or(StorefrontError::AppNotFound(app_id))?;

        // Linked by version string, not by key
        let version = self
            .store
            .find_version(app.id, &app.current_version)
            .await?
            .ok_or_else(|| StorefrontError::VersionNotFound {
                app_id: app.id,
                version: app.current_version.clone(),
            })?;

        let mut outcome = Outcome::new(DownloadGrant {
            app_id: app.id,
            app_name: app.title,
            version: version.version,
            download_url: version.file_url,
        });

        let log = NewDownloadLog {
            app_id,
            version: Some(app.current_version),
            ip_address: Some(ctx.ip_address.clone()),
            user_agent: Some(ctx.user_agent.clone()),
        };
        if let Err(e) = self.store.insert_download_log(log).await {
            warn!(app_id = %app_id, error = %e, "Error logging download");
            outcome.warn(Warning::DownloadLog(e.to_string()));
        }

        if let Err(e) = self.store.increment_download_count(app_id).await {
            warn!(app_id = %app_id, error = %e, "Error incrementing download count");
            outcome.warn(Warning::DownloadCounter(e.to_string()));
        }

        info!(
            app_id = %app_id,
            version = %outcome.value.version,
            ip = %ctx.ip_address,
            "Download granted"
        );
        Ok(outcome)
    }
}
