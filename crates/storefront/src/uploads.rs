/// Package publishing
/// Binds an uploaded binary to a new app and its first version
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::objects::ObjectStore;
use crate::store::RecordStore;
use crate::{Category, NewApp, NewAppVersion, RequestContext, Result, StorefrontError};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Metadata entered when publishing an app
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishRequest {
    pub title: String,
    pub package_name: String,
    pub category: String,
    pub short_description: String,
    pub long_description: String,
    pub version: String,
    pub min_os: String,
    #[serde(default)]
    pub release_notes: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub screenshots: Option<Vec<String>>,
}

/// The package binary as received from the uploader
#[derive(Debug, Clone)]
pub struct PackageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

pub struct UploadCoordinator {
    store: Arc<dyn RecordStore>,
    objects: Arc<dyn ObjectStore>,
}

impl UploadCoordinator {
    pub fn new(store: Arc<dyn RecordStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { store, objects }
    }

    /// Store the binary, then create the app and its version. Returns the app id.
    ///
    /// Nothing is written anywhere if validation fails or the blob upload
    /// fails. A failed database insert after the upload leaves the blob behind.
    pub async fn publish(
        &self,
        request: PublishRequest,
        package: PackageUpload,
        ctx: &RequestContext,
    ) -> Result<Uuid> {
        let category = validate(&request, &package)?;

        let key = object_key(&package.file_name);
        let checksum = format!("{:x}", Sha256::digest(&package.data));
        let file_size = format_file_size(package.data.len() as u64);
        let content_type = package
            .content_type
            .as_deref()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let stored = self.objects.put(&key, package.data, &content_type).await?;
        info!("Uploaded package {} ({})", stored.key, file_size);

        let app = self
            .store
            .insert_app(NewApp {
                slug: slugify(&request.title),
                title: request.title.trim().to_string(),
                package_name: request.package_name.trim().to_string(),
                category,
                short_description: request.short_description,
                long_description: request.long_description,
                icon_url: request.icon_url,
                screenshots: request.screenshots,
                current_version: request.version.trim().to_string(),
                file_size: Some(file_size),
                min_os: request.min_os.trim().to_string(),
                created_by: ctx.user_id,
            })
            .await
            .map_err(|e| {
                error!(key = %stored.key, error = %e, "App insert failed after upload");
                e
            })?;

        self.store
            .insert_version(NewAppVersion {
                app_id: app.id,
                version: app.current_version.clone(),
                file_url: stored.url,
                file_key: stored.key.clone(),
                release_notes: request.release_notes,
                checksum: Some(checksum),
            })
            .await
            .map_err(|e| {
                error!(app_id = %app.id, key = %stored.key, error = %e, "Version insert failed after upload");
                e
            })?;

        info!(app_id = %app.id, slug = %app.slug, version = %app.current_version, "App published");
        Ok(app.id)
    }
}

fn validate(request: &PublishRequest, package: &PackageUpload) -> Result<Category> {
    let fields = [
        ("title", &request.title),
        ("package_name", &request.package_name),
        ("category", &request.category),
        ("short_description", &request.short_description),
        ("long_description", &request.long_description),
        ("version", &request.version),
        ("min_os", &request.min_os),
    ];
    if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(StorefrontError::Validation(format!("{} is required", name)));
    }
    if package.data.is_empty() {
        return Err(StorefrontError::Validation("package file is required".to_string()));
    }
    request.category.parse()
}

/// Timestamp-prefixed object key for an uploaded file, unique per call
pub fn object_key(file_name: &str) -> String {
    let cleaned: String = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    let name = if cleaned.is_empty() { "package" } else { cleaned };
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        name
    )
}

/// Lowercased title with whitespace runs replaced by hyphens
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Byte count as a short human readable string (base 1024)
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}
