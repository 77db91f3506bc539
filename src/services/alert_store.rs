use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::UpstreamError,
    models::ActiveAlerts,
    services::http::{endpoint, expect_success, read_json, trim_base},
};

const ALERT_COLUMNS: &str = "id,user_id,coin_id,coin_symbol,target_price,condition,is_active";

/// The hosted store holding alerts and user accounts.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// All alerts whose activity flag is set, oldest first. Fails only when
    /// the read itself fails; off-shape rows come back as rejected.
    async fn active_alerts(&self) -> Result<ActiveAlerts, UpstreamError>;

    /// Contact address of a user. `Ok(None)` when the account has none.
    async fn user_email(&self, user_id: &str) -> Result<Option<String>, UpstreamError>;

    /// Clears the activity flag of exactly one alert and stamps its trigger time.
    async fn mark_triggered(&self, alert_id: &str, at: DateTime<Utc>)
        -> Result<(), UpstreamError>;
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    #[serde(default)]
    email: Option<String>,
}

/// PostgREST-style REST adapter (`/rest/v1`) with the admin users endpoint
/// (`/auth/v1/admin/users`) for email lookups.
#[derive(Clone)]
pub struct RestAlertStore {
    http: Client,
    base_url: String,
    service_key: String,
}

impl RestAlertStore {
    pub fn new(http: Client, base_url: &str, service_key: String) -> Self {
        Self {
            http,
            base_url: trim_base(base_url),
            service_key,
        }
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

#[async_trait]
impl AlertStore for RestAlertStore {
    async fn active_alerts(&self) -> Result<ActiveAlerts, UpstreamError> {
        let url = format!("{}/rest/v1/price_alerts", self.base_url);
        let res = self
            .authorized(self.http.get(url))
            .query(&[
                ("select", ALERT_COLUMNS),
                ("is_active", "eq.true"),
                ("order", "created_at.asc"),
            ])
            .send()
            .await?;

        // Must be an array; each element is decoded separately.
        let items = read_json::<Vec<serde_json::Value>>(res).await?;
        Ok(ActiveAlerts::decode(items))
    }

    async fn user_email(&self, user_id: &str) -> Result<Option<String>, UpstreamError> {
        let url = endpoint(&self.base_url, &["auth", "v1", "admin", "users", user_id])?;
        let res = self.authorized(self.http.get(url)).send().await?;

        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let user = read_json::<UserRecord>(res).await?;
        Ok(user
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty()))
    }

    async fn mark_triggered(
        &self,
        alert_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), UpstreamError> {
        let url = format!("{}/rest/v1/price_alerts", self.base_url);
        let res = self
            .authorized(self.http.patch(url))
            .query(&[("id", format!("eq.{alert_id}"))])
            .header("Prefer", "return=minimal")
            .json(&json!({
                "is_active": false,
                "triggered_at": at.to_rfc3339_opts(SecondsFormat::Millis, true),
            }))
            .send()
            .await?;

        expect_success(res).await
    }
}
