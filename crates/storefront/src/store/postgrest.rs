//! Record store on the hosted backend's PostgREST interface.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::RecordStore;
use crate::models::*;
use crate::{Result, StorefrontError};

/// Client for `<project>/rest/v1`, authenticated with a service key
pub struct PostgrestRecordStore {
    client: Client,
    rest_url: String,
}

impl PostgrestRecordStore {
    pub fn new(project_url: &str, service_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(service_key)?);
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", service_key))?);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(store_error)?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
        })
    }

    fn table(&self, name: &str) -> String {
        format!("{}/{}", self.rest_url, name)
    }

    async fn select<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Vec<T>> {
        let response = send(request).await?;
        response.json().await.map_err(store_error)
    }

    async fn select_one<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>> {
        Ok(self.select(request).await?.into_iter().next())
    }

    /// Insert one row and return it as stored
    async fn insert<B: Serialize + Sync, T: DeserializeOwned>(&self, table: &str, row: &B) -> Result<T> {
        let request = self
            .client
            .post(self.table(table))
            .header("Prefer", "return=representation")
            .json(row);
        self.select_one(request)
            .await?
            .ok_or_else(|| StorefrontError::RecordStore(format!("insert into {} returned no row", table)))
    }

    async fn rpc<B: Serialize + Sync>(&self, function: &str, args: &B) -> Result<Response> {
        let url = format!("{}/rpc/{}", self.rest_url, function);
        send(self.client.post(url).json(args)).await
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| StorefrontError::RecordStore(format!("invalid header value: {}", e)))
}

fn store_error(e: reqwest::Error) -> StorefrontError {
    StorefrontError::RecordStore(e.to_string())
}

async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await.map_err(store_error)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorefrontError::RecordStore(format!("{}: {}", status, body)))
}

/// Total row count from a `Content-Range: 0-19/57` header
fn total_from_content_range(value: Option<&HeaderValue>) -> Option<i64> {
    value?.to_str().ok()?.rsplit('/').next()?.parse().ok()
}

/// PostgREST `ilike` pattern with the filter syntax characters removed
fn ilike_pattern(term: &str) -> String {
    let cleaned: String = term
        .chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '*' | '%'))
        .collect();
    format!("*{}*", cleaned.trim())
}

fn sort_clause(sort: Option<&str>) -> &'static str {
    match sort {
        Some("recent") => "created_at.desc",
        Some("title") => "title.asc",
        _ => "download_count.desc",
    }
}

#[async_trait]
impl RecordStore for PostgrestRecordStore {
    async fn list_apps(&self, query: &AppQuery) -> Result<AppPage> {
        let mut params: Vec<(&str, String)> = vec![
            ("select", "*".to_string()),
            ("deleted", "eq.false".to_string()),
            ("order", sort_clause(query.sort.as_deref()).to_string()),
            ("limit", query.limit().to_string()),
            ("offset", query.offset().to_string()),
        ];
        if let Some(category) = query.category {
            params.push(("category", format!("eq.{}", category)));
        }
        if let Some(term) = query.q.as_deref().filter(|t| !t.trim().is_empty()) {
            let pattern = ilike_pattern(term);
            params.push((
                "or",
                format!("(title.ilike.{0},short_description.ilike.{0})", pattern),
            ));
        }

        let request = self
            .client
            .get(self.table("apps"))
            .query(&params)
            .header("Prefer", "count=exact");
        let response = send(request).await?;
        let total = total_from_content_range(response.headers().get(CONTENT_RANGE));
        let apps: Vec<App> = response.json().await.map_err(store_error)?;
        let total = total.unwrap_or(apps.len() as i64);

        Ok(AppPage::new(apps, total, query))
    }

    async fn get_app(&self, id: Uuid) -> Result<Option<App>> {
        let request = self
            .client
            .get(self.table("apps"))
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))]);
        self.select_one(request).await
    }

    async fn insert_app(&self, app: NewApp) -> Result<App> {
        self.insert("apps", &app).await
    }

    async fn mark_app_deleted(&self, id: Uuid) -> Result<()> {
        let request = self
            .client
            .patch(self.table("apps"))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&json!({ "deleted": true }));
        let updated: Vec<App> = self.select(request).await?;
        if updated.is_empty() {
            return Err(StorefrontError::AppNotFound(id));
        }
        Ok(())
    }

    async fn find_version(&self, app_id: Uuid, version: &str) -> Result<Option<AppVersion>> {
        let request = self.client.get(self.table("app_versions")).query(&[
            ("select", "*".to_string()),
            ("app_id", format!("eq.{}", app_id)),
            ("version", format!("eq.{}", version)),
        ]);
        self.select_one(request).await
    }

    async fn list_versions(&self, app_id: Uuid) -> Result<Vec<AppVersion>> {
        let request = self.client.get(self.table("app_versions")).query(&[
            ("select", "*".to_string()),
            ("app_id", format!("eq.{}", app_id)),
            ("order", "uploaded_at.desc".to_string()),
        ]);
        self.select(request).await
    }

    async fn insert_version(&self, version: NewAppVersion) -> Result<AppVersion> {
        self.insert("app_versions", &version).await
    }

    async fn insert_download_log(&self, log: NewDownloadLog) -> Result<DownloadLog> {
        self.insert("download_logs", &log).await
    }

    async fn list_download_logs(&self, app_id: Uuid) -> Result<Vec<DownloadLog>> {
        let request = self.client.get(self.table("download_logs")).query(&[
            ("select", "*".to_string()),
            ("app_id", format!("eq.{}", app_id)),
            ("order", "created_at.desc".to_string()),
        ]);
        self.select(request).await
    }

    async fn increment_download_count(&self, app_id: Uuid) -> Result<()> {
        self.rpc("increment_download_count", &json!({ "app_id_param": app_id }))
            .await?;
        debug!("Incremented download count for {}", app_id);
        Ok(())
    }

    async fn insert_ticket(&self, ticket: NewTicket) -> Result<SupportTicket> {
        self.insert("support_tickets", &ticket).await
    }

    async fn get_ticket(&self, id: Uuid) -> Result<Option<SupportTicket>> {
        let request = self
            .client
            .get(self.table("support_tickets"))
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))]);
        self.select_one(request).await
    }

    async fn list_tickets(&self) -> Result<Vec<SupportTicket>> {
        let request = self
            .client
            .get(self.table("support_tickets"))
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        self.select(request).await
    }

    async fn update_ticket_status(&self, id: Uuid, status: TicketStatus) -> Result<SupportTicket> {
        let request = self
            .client
            .patch(self.table("support_tickets"))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&json!({ "status": status }));
        self.select_one(request)
            .await?
            .ok_or(StorefrontError::TicketNotFound(id))
    }

    async fn insert_reply(&self, reply: NewTicketReply) -> Result<TicketReply> {
        self.insert("ticket_replies", &reply).await
    }

    async fn list_replies(&self, ticket_id: Uuid) -> Result<Vec<TicketReply>> {
        // `id` is not monotonic; created_at carries the ordering
        let request = self.client.get(self.table("ticket_replies")).query(&[
            ("select", "*".to_string()),
            ("ticket_id", format!("eq.{}", ticket_id)),
            ("order", "created_at.asc".to_string()),
        ]);
        self.select(request).await
    }

    async fn has_role(&self, user_id: Uuid, role: Role) -> Result<bool> {
        let response = self
            .rpc("has_role", &json!({ "_user_id": user_id, "_role": role }))
            .await?;
        response.json().await.map_err(store_error)
    }

    async fn grant_role(&self, user_id: Uuid, role: Role) -> Result<()> {
        let request = self
            .client
            .post(self.table("user_roles"))
            .header("Prefer", "resolution=ignore-duplicates")
            .json(&UserRole { user_id, role });
        send(request).await?;
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats> {
        #[derive(serde::Deserialize)]
        struct Counter {
            #[serde(default)]
            download_count: Option<i64>,
        }

        let request = self.client.get(self.table("apps")).query(&[
            ("select", "download_count"),
            ("deleted", "eq.false"),
        ]);
        let apps: Vec<Counter> = self.select(request).await?;

        let request = self
            .client
            .get(self.table("support_tickets"))
            .query(&[("select", "id"), ("status", "eq.new")])
            .header("Prefer", "count=exact")
            .header("Range", "0-0");
        let response = send(request).await?;
        let pending = total_from_content_range(response.headers().get(CONTENT_RANGE)).unwrap_or(0);

        Ok(StoreStats {
            total_apps: apps.len() as i64,
            total_downloads: apps.iter().filter_map(|a| a.download_count).sum(),
            pending_tickets: pending,
        })
    }
}
