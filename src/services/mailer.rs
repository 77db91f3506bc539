use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{error::UpstreamError, services::http::trim_base};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Transactional email provider.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// False when credentials are missing; callers must not attempt a send.
    fn is_configured(&self) -> bool;

    async fn send(&self, email: &OutgoingEmail) -> Result<(), UpstreamError>;
}

#[derive(Clone)]
pub struct ResendMailer {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    from: String,
}

impl ResendMailer {
    pub fn new(http: Client, base_url: &str, api_key: Option<String>, from: String) -> Self {
        Self {
            http,
            base_url: trim_base(base_url),
            api_key,
            from,
        }
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct ProviderError {
    #[serde(default)]
    message: Option<String>,
}

#[async_trait]
impl Mailer for ResendMailer {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), UpstreamError> {
        let Some(key) = &self.api_key else {
            return Err(UpstreamError::NotConfigured("EMAIL_API_KEY"));
        };

        let url = format!("{}/emails", self.base_url);
        let res = self
            .http
            .post(url)
            .bearer_auth(key)
            .json(&SendRequest {
                from: &self.from,
                to: [email.to.as_str()],
                subject: &email.subject,
                html: &email.html,
            })
            .send()
            .await?;

        let status = res.status();
        if status.is_success() {
            return Ok(());
        }

        // Prefer the provider's own message over the raw body.
        let body = res.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ProviderError>(&body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or(body);

        Err(UpstreamError::status(status, detail))
    }
}
