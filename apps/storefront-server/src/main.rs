//! App Storefront Server
//! REST API for the app catalog, downloads, publishing and support tickets

mod api;
mod config;

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use storefront::notify::{Notifier, SmtpNotifier, TracingNotifier};
use storefront::objects::{FilesystemObjectStore, ObjectStore, SupabaseObjectStore};
use storefront::store::{JsonRecordStore, PostgrestRecordStore, RecordStore};
use storefront::{PackageUpload, PublishRequest, RequestContext, Role, Storefront};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    info!("Starting storefront server...");

    let notifier: Arc<dyn Notifier> = match config.smtp() {
        Some(smtp) => {
            info!("Email notifications via {}:{}", smtp.host, smtp.port);
            Arc::new(SmtpNotifier::new(&smtp)?)
        }
        None => {
            warn!("EMAIL_USER not set, ticket emails will only be logged");
            Arc::new(TracingNotifier)
        }
    };

    let (storefront, serve_files) = match config.hosted_backend() {
        Some((url, key)) => {
            info!("Using hosted backend at {}", url);
            let store: Arc<dyn RecordStore> = Arc::new(PostgrestRecordStore::new(url, key)?);
            let objects: Arc<dyn ObjectStore> =
                Arc::new(SupabaseObjectStore::new(url, key, &config.storage_bucket));
            (Storefront::new(store, objects, notifier), false)
        }
        None => {
            let store = Arc::new(JsonRecordStore::open(&config.data_dir)?);
            info!("Storage initialized at: {}", config.data_dir.display());
            let seed = config.seed && store.is_empty();
            let objects = Arc::new(FilesystemObjectStore::new(
                config.files_dir(),
                config.public_files_url.clone(),
            ));
            let storefront = Storefront::new(store, objects, notifier);
            if seed {
                info!("Seeding store with example apps...");
                seed_catalog(&storefront).await?;
            }
            (storefront, true)
        }
    };

    for user_id in &config.admin_users {
        storefront.store().grant_role(*user_id, Role::Admin).await?;
        info!("Granted admin role to {}", user_id);
    }

    let mut app = api::router(Arc::new(storefront));
    if serve_files {
        app = app.nest_service("/files", ServeDir::new(config.files_dir()));
    }
    let app = app.layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("Storefront server listening on http://{}", config.bind);
    info!("API endpoints:");
    info!("  POST   /api/download                     - Resolve and record a download");
    info!("  POST   /api/send-ticket-email            - Send a ticket email (admin)");
    info!("  GET    /api/apps                         - List apps");
    info!("  GET    /api/apps/:id                     - App details");
    info!("  GET    /api/apps/:id/versions            - App versions");
    info!("  POST   /api/tickets                      - Submit support ticket");
    info!("  POST   /api/admin/apps                   - Publish app");
    info!("  DELETE /api/admin/apps/:id               - Delete app");
    info!("  GET    /api/admin/apps/:id/downloads     - Download log");
    info!("  GET    /api/admin/tickets                - Ticket inbox");
    info!("  GET    /api/admin/tickets/:id            - Ticket conversation");
    info!("  POST   /api/admin/tickets/:id/status     - Change ticket status");
    info!("  POST   /api/admin/tickets/:id/replies    - Reply to ticket");
    info!("  GET    /api/admin/stats                  - Dashboard stats");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Publish a few example apps so a fresh local store has something to browse
async fn seed_catalog(storefront: &Storefront) -> anyhow::Result<()> {
    let apps = vec![
        (
            "Photo Editor Pro",
            "com.example.photoeditor",
            "photography",
            "Professional photo editing tools with AI enhancement",
        ),
        (
            "Task Manager",
            "com.example.tasks",
            "productivity",
            "Organize your tasks and boost productivity",
        ),
        (
            "Fitness Tracker",
            "com.example.fitness",
            "health",
            "Track workouts, calories, and health metrics",
        ),
        (
            "Music Player",
            "com.example.music",
            "entertainment",
            "High-quality audio player with equalizer",
        ),
        (
            "Weather Forecast",
            "com.example.weather",
            "utilities",
            "Accurate weather predictions and live radar",
        ),
    ];

    let apps_count = apps.len();
    let ctx = RequestContext::anonymous();

    for (title, package_name, category, description) in apps {
        let request = PublishRequest {
            title: title.to_string(),
            package_name: package_name.to_string(),
            category: category.to_string(),
            short_description: description.to_string(),
            long_description: format!("## {}\n\n{}", title, description),
            version: "1.0.0".to_string(),
            min_os: "Android 8.0".to_string(),
            release_notes: Some("Initial release".to_string()),
            icon_url: None,
            screenshots: None,
        };
        let package = PackageUpload {
            file_name: format!("{}.apk", package_name),
            content_type: None,
            data: bytes::Bytes::from(format!("placeholder package for {}", title)),
        };
        storefront.uploads.publish(request, package, &ctx).await?;
    }

    info!("Seeded {} example apps", apps_count);
    Ok(())
}
