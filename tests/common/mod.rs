#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use alertwatch::{
    config::Settings,
    error::UpstreamError,
    models::{ActiveAlerts, AlertRow, Condition, PriceQuotes, RejectedRow},
    services::{
        alert_store::AlertStore,
        clock::FixedClock,
        coingecko::PriceSource,
        mailer::{Mailer, OutgoingEmail},
        price_check::PriceChecker,
    },
    templates, AppState,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn row(id: &str, user: &str, coin: &str, symbol: &str, target: f64, condition: Condition) -> AlertRow {
    AlertRow {
        id: id.to_string(),
        user_id: user.to_string(),
        coin_id: coin.to_string(),
        coin_symbol: symbol.to_string(),
        target_price: target,
        condition,
        is_active: true,
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub rows: Vec<AlertRow>,
    pub rejected: Vec<RejectedRow>,
    pub emails: HashMap<String, String>,
    pub fail_read: bool,
    pub fail_patch_for: HashSet<String>,
    pub email_lookups: Mutex<Vec<String>>,
    pub patched: Mutex<Vec<(String, DateTime<Utc>)>>,
}

impl FakeStore {
    pub fn with_rows(rows: Vec<AlertRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn email(mut self, user: &str, email: &str) -> Self {
        self.emails.insert(user.to_string(), email.to_string());
        self
    }

    pub fn patched_ids(&self) -> Vec<String> {
        self.patched.lock().unwrap().iter().map(|(id, _)| id.clone()).collect()
    }
}

#[async_trait]
impl AlertStore for FakeStore {
    async fn active_alerts(&self) -> Result<ActiveAlerts, UpstreamError> {
        if self.fail_read {
            return Err(UpstreamError::Status {
                status: 503,
                body: "store down".to_string(),
            });
        }
        Ok(ActiveAlerts {
            rows: self.rows.clone(),
            rejected: self.rejected.clone(),
        })
    }

    async fn user_email(&self, user_id: &str) -> Result<Option<String>, UpstreamError> {
        self.email_lookups.lock().unwrap().push(user_id.to_string());
        match self.emails.get(user_id) {
            Some(e) => Ok(Some(e.clone())),
            None => Err(UpstreamError::Status {
                status: 404,
                body: "user not found".to_string(),
            }),
        }
    }

    async fn mark_triggered(&self, alert_id: &str, at: DateTime<Utc>) -> Result<(), UpstreamError> {
        if self.fail_patch_for.contains(alert_id) {
            return Err(UpstreamError::Status {
                status: 500,
                body: "write failed".to_string(),
            });
        }
        self.patched.lock().unwrap().push((alert_id.to_string(), at));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakePrices {
    pub quotes: PriceQuotes,
    pub fail: bool,
    pub calls: Mutex<Vec<Vec<String>>>,
}

impl FakePrices {
    pub fn with(pairs: &[(&str, f64)]) -> Self {
        Self {
            quotes: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PriceSource for FakePrices {
    async fn simple_price(&self, asset_ids: &[String]) -> Result<PriceQuotes, UpstreamError> {
        self.calls.lock().unwrap().push(asset_ids.to_vec());
        if self.fail {
            return Err(UpstreamError::Status {
                status: 429,
                body: "rate limited".to_string(),
            });
        }
        Ok(self
            .quotes
            .iter()
            .filter(|(k, _)| asset_ids.contains(k))
            .map(|(k, v)| (k.clone(), *v))
            .collect())
    }
}

pub struct FakeMailer {
    pub configured: bool,
    pub fail_for: HashSet<String>,
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

impl Default for FakeMailer {
    fn default() -> Self {
        Self {
            configured: true,
            fail_for: HashSet::new(),
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl FakeMailer {
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::default()
        }
    }

    pub fn failing_for(recipient: &str) -> Self {
        Self {
            fail_for: HashSet::from([recipient.to_string()]),
            ..Self::default()
        }
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|e| e.to.clone()).collect()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), UpstreamError> {
        if self.fail_for.contains(&email.to) {
            return Err(UpstreamError::Status {
                status: 422,
                body: "invalid recipient".to_string(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct Harness {
    pub store: Arc<FakeStore>,
    pub prices: Arc<FakePrices>,
    pub mailer: Arc<FakeMailer>,
    pub checker: Arc<PriceChecker>,
}

pub fn harness(store: FakeStore, prices: FakePrices, mailer: FakeMailer) -> Harness {
    let store = Arc::new(store);
    let prices = Arc::new(prices);
    let mailer = Arc::new(mailer);

    let checker = PriceChecker::new(
        store.clone(),
        prices.clone(),
        mailer.clone(),
        Arc::new(FixedClock(fixed_now())),
        templates::build_handlebars().unwrap(),
    )
    .with_concurrency(4);

    Harness {
        store,
        prices,
        mailer,
        checker: Arc::new(checker),
    }
}

pub fn test_settings() -> Settings {
    Settings {
        cron_secret: Some("test-secret".to_string()),
        ..Settings::default()
    }
}

pub fn test_state(h: &Harness) -> AppState {
    AppState {
        settings: test_settings(),
        checker: h.checker.clone(),
    }
}
