/// REST API endpoints for the storefront
/// Public catalog, downloads and ticket submission plus the admin console
use axum::{
    async_trait,
    extract::{connect_info::ConnectInfo, DefaultBodyLimit, FromRequestParts, Path, Query, State},
    http::{header::USER_AGENT, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use storefront::notify::{NotificationKind, TicketEmail};
use storefront::{
    App, AppPage, AppQuery, AppVersion, Conversation, DownloadLog, NewTicket, Outcome,
    PackageUpload, PublishRequest, RequestContext, StoreStats, Storefront, StorefrontError,
    SupportTicket, TicketReply, TicketStatus,
};
use tracing::error;
use uuid::Uuid;

type SharedStorefront = Arc<Storefront>;

/// Base64 inflates packages by a third; leave room for that
const MAX_PUBLISH_BODY: usize = 256 * 1024 * 1024;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    NotFound(String),
    Internal(String),
}

impl From<StorefrontError> for ApiError {
    fn from(e: StorefrontError) -> Self {
        match e {
            StorefrontError::AppNotFound(_) => ApiError::NotFound("App not found".to_string()),
            StorefrontError::VersionNotFound { .. } => {
                ApiError::NotFound("App version not found".to_string())
            }
            StorefrontError::TicketNotFound(_) => ApiError::NotFound("Ticket not found".to_string()),
            StorefrontError::Validation(msg) => ApiError::BadRequest(msg),
            StorefrontError::Unauthenticated => ApiError::Unauthorized,
            StorefrontError::PermissionDenied(msg) => ApiError::Forbidden(msg),
            other => {
                error!("Request failed: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Per-request identity and client details
///
/// The identity provider's proxy authenticates the caller and forwards the
/// user id in `x-user-id`.
pub struct Caller(pub RequestContext);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let ip_address = header("x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|hop| hop.trim().to_string()))
            .or_else(|| header("x-real-ip"))
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());
        let user_agent = header(USER_AGENT.as_str()).unwrap_or_else(|| "unknown".to_string());

        let user_id = match header("x-user-id") {
            Some(raw) => Some(Uuid::parse_str(&raw).map_err(|_| ApiError::Unauthorized)?),
            None => None,
        };

        Ok(Caller(RequestContext {
            user_id,
            ip_address,
            user_agent,
        }))
    }
}

pub fn router(storefront: SharedStorefront) -> Router {
    Router::new()
        // Public endpoints
        .route("/api/download", post(request_download))
        .route("/api/apps", get(list_apps))
        .route("/api/apps/:id", get(get_app))
        .route("/api/apps/:id/versions", get(get_versions))
        .route("/api/tickets", post(submit_ticket))
        // Admin endpoints
        .route("/api/send-ticket-email", post(send_ticket_email))
        .route(
            "/api/admin/apps",
            post(publish_app).layer(DefaultBodyLimit::max(MAX_PUBLISH_BODY)),
        )
        .route("/api/admin/apps/:id", delete(delete_app))
        .route("/api/admin/apps/:id/downloads", get(get_download_logs))
        .route("/api/admin/tickets", get(list_tickets))
        .route("/api/admin/tickets/:id", get(get_ticket))
        .route("/api/admin/tickets/:id/status", post(change_ticket_status))
        .route("/api/admin/tickets/:id/replies", post(reply_to_ticket))
        .route("/api/admin/stats", get(get_stats))
        .with_state(storefront)
}

fn warning_messages<T>(outcome: &Outcome<T>) -> Vec<String> {
    outcome.warnings.iter().map(ToString::to_string).collect()
}

/// Ids that are not UUIDs cannot name a stored row
fn app_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::NotFound("App not found".to_string()))
}

fn ticket_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::NotFound("Ticket not found".to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    pub app_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub success: bool,
    pub download_url: String,
    pub app_name: String,
    pub version: String,
}

/// POST /api/download - Resolve the current version and record the download
pub async fn request_download(
    State(storefront): State<SharedStorefront>,
    Caller(ctx): Caller,
    Json(req): Json<DownloadRequest>,
) -> Result<Json<DownloadResponse>, ApiError> {
    let raw_id = req
        .app_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("App ID is required".to_string()))?;
    let app_id = app_id(&raw_id)?;

    // Log and counter failures stay out of the response
    let grant = storefront.downloads.request_download(app_id, &ctx).await?.value;

    Ok(Json(DownloadResponse {
        success: true,
        download_url: grant.download_url,
        app_name: grant.app_name,
        version: grant.version,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketEmailRequest {
    pub to: String,
    pub subject: String,
    pub ticket_id: Uuid,
    pub customer_name: String,
    pub message: String,
    #[serde(default)]
    pub is_reply: bool,
    pub reply_message: Option<String>,
    #[serde(default)]
    pub is_status_update: bool,
    pub new_status: Option<TicketStatus>,
}

/// POST /api/send-ticket-email - Send one ticket email (admin only)
pub async fn send_ticket_email(
    State(storefront): State<SharedStorefront>,
    Caller(ctx): Caller,
    Json(req): Json<TicketEmailRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    storefront.require_admin(&ctx).await?;

    let kind = NotificationKind::from_flags(
        req.is_reply,
        req.reply_message,
        req.is_status_update,
        req.new_status,
    );
    let email = TicketEmail {
        to: req.to,
        subject: req.subject,
        ticket_id: req.ticket_id,
        customer_name: req.customer_name,
        message: req.message,
        kind,
    }
    .render();

    storefront.notifier().send(&email).await.map_err(|e| {
        error!("Error in send-ticket-email: {}", e);
        ApiError::Internal(e.to_string())
    })?;

    Ok(Json(json!({ "success": true })))
}

/// GET /api/apps - List apps with optional search, category and pagination
pub async fn list_apps(
    State(storefront): State<SharedStorefront>,
    Query(query): Query<AppQuery>,
) -> Result<Json<AppPage>, ApiError> {
    Ok(Json(storefront.catalog.list(&query).await?))
}

/// GET /api/apps/:id - App details
pub async fn get_app(
    State(storefront): State<SharedStorefront>,
    Path(id): Path<String>,
) -> Result<Json<App>, ApiError> {
    let id = app_id(&id)?;
    Ok(Json(storefront.catalog.get(id).await?))
}

/// GET /api/apps/:id/versions - Release history
pub async fn get_versions(
    State(storefront): State<SharedStorefront>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AppVersion>>, ApiError> {
    let id = app_id(&id)?;
    Ok(Json(storefront.catalog.versions(id).await?))
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub ticket: SupportTicket,
    pub message: String,
    pub warnings: Vec<String>,
}

/// POST /api/tickets - Submit a support ticket
pub async fn submit_ticket(
    State(storefront): State<SharedStorefront>,
    Json(req): Json<NewTicket>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    let outcome = storefront.tickets.submit(req).await?;
    let message = format!(
        "We'll get back to you within 24 hours. Ticket ID: #{}",
        outcome.value.short_id()
    );
    let warnings = warning_messages(&outcome);

    Ok((
        StatusCode::CREATED,
        Json(TicketResponse {
            ticket: outcome.value,
            message,
            warnings,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct PublishAppRequest {
    #[serde(flatten)]
    pub metadata: PublishRequest,
    pub file_name: String,
    pub content_type: Option<String>,
    /// Base64-encoded package file
    pub file_data: String,
}

/// POST /api/admin/apps - Publish a new app
pub async fn publish_app(
    State(storefront): State<SharedStorefront>,
    Caller(ctx): Caller,
    Json(req): Json<PublishAppRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    storefront.require_admin(&ctx).await?;

    let data = base64::engine::general_purpose::STANDARD
        .decode(req.file_data.trim())
        .map_err(|_| ApiError::BadRequest("Invalid base64 file data".to_string()))?;

    let package = PackageUpload {
        file_name: req.file_name,
        content_type: req.content_type,
        data: data.into(),
    };
    let app_id = storefront.uploads.publish(req.metadata, package, &ctx).await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": app_id }))))
}

/// DELETE /api/admin/apps/:id - Soft delete an app
pub async fn delete_app(
    State(storefront): State<SharedStorefront>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    storefront.require_admin(&ctx).await?;
    let id = app_id(&id)?;
    storefront.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/apps/:id/downloads - Download audit trail
pub async fn get_download_logs(
    State(storefront): State<SharedStorefront>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> Result<Json<Vec<DownloadLog>>, ApiError> {
    storefront.require_admin(&ctx).await?;
    let id = app_id(&id)?;
    Ok(Json(storefront.catalog.download_logs(id).await?))
}

/// GET /api/admin/tickets - All tickets, newest first
pub async fn list_tickets(
    State(storefront): State<SharedStorefront>,
    Caller(ctx): Caller,
) -> Result<Json<Vec<SupportTicket>>, ApiError> {
    storefront.require_admin(&ctx).await?;
    Ok(Json(storefront.tickets.list().await?))
}

/// GET /api/admin/tickets/:id - Ticket with its replies
pub async fn get_ticket(
    State(storefront): State<SharedStorefront>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    storefront.require_admin(&ctx).await?;
    let id = ticket_id(&id)?;
    Ok(Json(storefront.tickets.conversation(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: TicketStatus,
}

/// POST /api/admin/tickets/:id/status - Change status and notify the customer
pub async fn change_ticket_status(
    State(storefront): State<SharedStorefront>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<TicketResponse>, ApiError> {
    storefront.require_admin(&ctx).await?;
    let id = ticket_id(&id)?;
    let outcome = storefront.tickets.change_status(id, req.status).await?;

    let message = if outcome.has_notification_failure() {
        format!("Ticket status changed to {} but email notification failed", req.status)
    } else {
        format!("Ticket status changed to {} and customer notified", req.status)
    };
    let warnings = warning_messages(&outcome);

    Ok(Json(TicketResponse {
        ticket: outcome.value,
        message,
        warnings,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub reply: TicketReply,
    pub ticket: SupportTicket,
    pub message: String,
    pub warnings: Vec<String>,
}

/// POST /api/admin/tickets/:id/replies - Reply, email the customer, open new tickets
pub async fn reply_to_ticket(
    State(storefront): State<SharedStorefront>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
    Json(req): Json<ReplyRequest>,
) -> Result<(StatusCode, Json<ReplyResponse>), ApiError> {
    let admin = storefront.require_admin(&ctx).await?;
    let id = ticket_id(&id)?;
    let outcome = storefront.tickets.reply(id, &req.message, Some(admin)).await?;

    let message = if outcome.has_notification_failure() {
        "Reply saved but email notification failed"
    } else {
        "Email notification sent to customer"
    };
    let warnings = warning_messages(&outcome);

    Ok((
        StatusCode::CREATED,
        Json(ReplyResponse {
            reply: outcome.value.reply,
            ticket: outcome.value.ticket,
            message: message.to_string(),
            warnings,
        }),
    ))
}

/// GET /api/admin/stats - Dashboard figures
pub async fn get_stats(
    State(storefront): State<SharedStorefront>,
    Caller(ctx): Caller,
) -> Result<Json<StoreStats>, ApiError> {
    storefront.require_admin(&ctx).await?;
    Ok(Json(storefront.catalog.stats().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use storefront::notify::{Notifier, OutboundEmail, TracingNotifier};
    use storefront::objects::FilesystemObjectStore;
    use storefront::store::{JsonRecordStore, RecordStore};
    use storefront::Role;
    use tower::ServiceExt;

    struct DownMail;

    #[async_trait]
    impl Notifier for DownMail {
        async fn send(&self, _email: &OutboundEmail) -> storefront::Result<()> {
            Err(StorefrontError::Notification("relay refused connection".to_string()))
        }
    }

    struct TestServer {
        app: Router,
        admin: Uuid,
        _files: tempfile::TempDir,
    }

    async fn server_with(notifier: Arc<dyn Notifier>) -> TestServer {
        let files = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonRecordStore::in_memory());
        let admin = Uuid::new_v4();
        store.grant_role(admin, Role::Admin).await.unwrap();
        let objects = Arc::new(FilesystemObjectStore::new(files.path(), "http://localhost/files"));
        let storefront = Arc::new(Storefront::new(store, objects, notifier));
        TestServer {
            app: router(storefront),
            admin,
            _files: files,
        }
    }

    async fn server() -> TestServer {
        server_with(Arc::new(TracingNotifier)).await
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        user: Option<Uuid>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .header("user-agent", "storefront-tests")
            .header("x-forwarded-for", "192.0.2.10, 10.0.0.1");
        if let Some(user) = user {
            builder = builder.header("x-user-id", user.to_string());
        }
        let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);

        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn publish(server: &TestServer, title: &str) -> String {
        let file_data = base64::engine::general_purpose::STANDARD.encode(b"PK\x03\x04 package bytes");
        let (status, body) = send(
            &server.app,
            "POST",
            "/api/admin/apps",
            Some(server.admin),
            Some(json!({
                "title": title,
                "package_name": "com.example.app",
                "category": "education",
                "short_description": "Learn things",
                "long_description": "Learn many things",
                "version": "1.0.0",
                "min_os": "Android 9",
                "file_name": "app.apk",
                "file_data": file_data,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_download_flow() {
        let server = server().await;
        let app_id = publish(&server, "Flash Cards").await;

        let (status, body) = send(
            &server.app,
            "POST",
            "/api/download",
            None,
            Some(json!({ "appId": app_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["appName"], "Flash Cards");
        assert_eq!(body["version"], "1.0.0");
        assert!(body["downloadUrl"]
            .as_str()
            .unwrap()
            .starts_with("http://localhost/files/"));

        let (status, logs) = send(
            &server.app,
            "GET",
            &format!("/api/admin/apps/{}/downloads", app_id),
            Some(server.admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(logs[0]["ip_address"], "192.0.2.10");
        assert_eq!(logs[0]["user_agent"], "storefront-tests");
    }

    #[tokio::test]
    async fn test_download_errors() {
        let server = server().await;

        let (status, body) = send(&server.app, "POST", "/api/download", None, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "App ID is required");

        let (status, body) = send(
            &server.app,
            "POST",
            "/api/download",
            None,
            Some(json!({ "appId": Uuid::new_v4() })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "App not found");
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin_role() {
        let server = server().await;

        let (status, _) = send(&server.app, "GET", "/api/admin/stats", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&server.app, "GET", "/api/admin/stats", Some(Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&server.app, "GET", "/api/admin/stats", Some(server.admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_apps"], 0);
    }

    #[tokio::test]
    async fn test_reply_reports_failed_email() {
        let server = server_with(Arc::new(DownMail)).await;

        let (status, created) = send(
            &server.app,
            "POST",
            "/api/tickets",
            None,
            Some(json!({
                "name": "Ada",
                "email": "ada@example.com",
                "subject": "Sync broken",
                "message": "Nothing syncs",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let ticket_id = created["ticket"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &server.app,
            "POST",
            &format!("/api/admin/tickets/{}/replies", ticket_id),
            Some(server.admin),
            Some(json!({ "message": "Please update to 2.1" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Reply saved but email notification failed");
        assert_eq!(body["ticket"]["status"], "open");
        assert_eq!(body["reply"]["replied_by"], server.admin.to_string());

        let (status, body) = send(
            &server.app,
            "POST",
            &format!("/api/admin/tickets/{}/replies", ticket_id),
            Some(server.admin),
            Some(json!({ "message": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn test_send_ticket_email_endpoint() {
        let server = server().await;
        let request = json!({
            "to": "ada@example.com",
            "subject": "Sync broken",
            "ticketId": Uuid::new_v4(),
            "customerName": "Ada",
            "message": "Nothing syncs",
            "isStatusUpdate": true,
            "newStatus": "resolved",
        });
        let (status, body) = send(
            &server.app,
            "POST",
            "/api/send-ticket-email",
            Some(server.admin),
            Some(request.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let down = server_with(Arc::new(DownMail)).await;
        let (status, body) = send(
            &down.app,
            "POST",
            "/api/send-ticket-email",
            Some(down.admin),
            Some(request),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("relay refused"));
    }

    #[tokio::test]
    async fn test_send_ticket_email_is_not_open_to_the_public() {
        let server = server().await;
        let request = json!({
            "to": "victim@example.com",
            "subject": "Free prize",
            "ticketId": Uuid::new_v4(),
            "customerName": "Victim",
            "message": "<a href=\"https://phish.example\">claim</a>",
        });

        let (status, body) = send(&server.app, "POST", "/api/send-ticket-email", None, Some(request.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Authentication required");

        let (status, _) = send(
            &server.app,
            "POST",
            "/api/send-ticket-email",
            Some(Uuid::new_v4()),
            Some(request),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_malformed_ids_get_json_not_found() {
        let server = server().await;

        let (status, body) = send(&server.app, "GET", "/api/apps/not-a-uuid", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "App not found");

        let (status, body) = send(&server.app, "GET", "/api/apps/42/versions", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "App not found");

        let (status, body) = send(
            &server.app,
            "GET",
            "/api/admin/tickets/not-a-uuid",
            Some(server.admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Ticket not found");

        // Authorization is checked before the id
        let (status, _) = send(&server.app, "GET", "/api/admin/tickets/not-a-uuid", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_deleted_app_disappears_from_catalog() {
        let server = server().await;
        let app_id = publish(&server, "Old Quiz").await;

        let (status, _) = send(
            &server.app,
            "DELETE",
            &format!("/api/admin/apps/{}", app_id),
            Some(server.admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&server.app, "GET", &format!("/api/apps/{}", app_id), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, page) = send(&server.app, "GET", "/api/apps", None, None).await;
        assert_eq!(page["total"], 0);
    }
}
