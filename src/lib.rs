//! Library entrypoint for alertwatch.
//!
//! Integration tests under `tests/` build the app state from in-memory
//! collaborators and drive the router directly.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;

#[path = "middleware/auth.rs"]
pub mod auth;

pub mod services;
pub mod templates;

pub mod controllers;
pub mod routes;

use services::{
    alert_store::RestAlertStore,
    clock::SystemClock,
    coingecko::CoinGeckoClient,
    http,
    mailer::ResendMailer,
    price_check::PriceChecker,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub checker: Arc<PriceChecker>,
}

impl AppState {
    /// Wires the HTTP-backed collaborators described by `settings`.
    pub fn from_settings(settings: config::Settings) -> Result<Self, String> {
        let client = http::build_client(settings.http_timeout_secs)
            .map_err(|e| format!("http client: {e}"))?;
        let hbs = templates::build_handlebars().map_err(|e| format!("email templates: {e}"))?;

        if settings.email_api_key.is_none() {
            tracing::warn!("EMAIL_API_KEY is not set, triggered alerts will stay active");
        }

        let store = RestAlertStore::new(
            client.clone(),
            &settings.repository_url,
            settings.repository_service_key.clone(),
        );
        let prices = CoinGeckoClient::new(
            client.clone(),
            &settings.price_api_url,
            settings.price_api_key.clone(),
            settings.vs_currency.clone(),
        );
        let mailer = ResendMailer::new(
            client,
            &settings.email_api_url,
            settings.email_api_key.clone(),
            settings.email_from.clone(),
        );

        let checker = PriceChecker::new(
            Arc::new(store),
            Arc::new(prices),
            Arc::new(mailer),
            Arc::new(SystemClock),
            hbs,
        )
        .with_concurrency(settings.notify_concurrency);

        Ok(Self {
            settings,
            checker: Arc::new(checker),
        })
    }
}
