//! One pass of the price-alert pipeline:
//! read active alerts, fetch prices once, evaluate, notify and commit.
//!
//! Stage failures (store read, price fetch) abort the whole pass. Anything
//! that goes wrong for a single alert is recorded in its outcome and the
//! pass carries on with the rest.

use std::{collections::BTreeSet, sync::Arc};

use futures_util::{stream, StreamExt};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::{
    error::{AppError, FailureReason},
    models::{Condition, PriceAlert},
    services::{
        alert_store::AlertStore,
        clock::Clock,
        coingecko::PriceSource,
        evaluator::{self, Decision},
        mailer::Mailer,
    },
    templates::{self, Hbs},
};

/// What happened to one triggered alert.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerOutcome {
    pub alert_id: String,
    pub symbol: String,
    pub condition: Condition,
    pub target_price: f64,
    pub current_price: f64,
    pub delivered: bool,
    pub reason: Option<FailureReason>,
    // false when the send succeeded but clearing the flag did not
    pub persisted: bool,
}

/// Per-alert entry of the HTTP summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AlertResult {
    #[serde(rename_all = "camelCase")]
    Evaluated {
        alert_id: String,
        symbol: String,
        condition: Condition,
        target_price: f64,
        current_price: f64,
        email_sent: bool,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        alert_id: String,
        symbol: String,
        error: String,
    },
}

impl TriggerOutcome {
    pub fn to_result(&self) -> AlertResult {
        match &self.reason {
            Some(FailureReason::SendError(msg)) => AlertResult::Failed {
                alert_id: self.alert_id.clone(),
                symbol: self.symbol.clone(),
                error: msg.clone(),
            },
            _ => AlertResult::Evaluated {
                alert_id: self.alert_id.clone(),
                symbol: self.symbol.clone(),
                condition: self.condition,
                target_price: self.target_price,
                current_price: self.current_price,
                email_sent: self.delivered,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Active alerts read from the store, whatever happened to them.
    pub checked: usize,
    /// Alerts without a quote this run.
    pub skipped: usize,
    /// Rows read but unusable (off-shape, bad threshold); never evaluated.
    pub rejected: usize,
    pub outcomes: Vec<TriggerOutcome>,
}

impl RunSummary {
    pub fn triggered(&self) -> usize {
        self.outcomes.len()
    }

    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.delivered).count()
    }

    pub fn results(&self) -> Vec<AlertResult> {
        self.outcomes.iter().map(TriggerOutcome::to_result).collect()
    }

    pub fn response_body(&self) -> Value {
        if self.checked == 0 {
            return json!({
                "success": true,
                "message": "No active alerts to check",
                "checked": 0,
                "triggered": 0,
            });
        }

        json!({
            "success": true,
            "checked": self.checked,
            "triggered": self.triggered(),
            "results": self.results(),
        })
    }
}

pub struct PriceChecker {
    store: Arc<dyn AlertStore>,
    prices: Arc<dyn PriceSource>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
    hbs: Hbs,
    concurrency: usize,
    // serializes passes inside this process
    run_lock: Mutex<()>,
}

impl PriceChecker {
    pub fn new(
        store: Arc<dyn AlertStore>,
        prices: Arc<dyn PriceSource>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
        hbs: Hbs,
    ) -> Self {
        Self {
            store,
            prices,
            mailer,
            clock,
            hbs,
            concurrency: 1,
            run_lock: Mutex::new(()),
        }
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub async fn run(&self) -> Result<RunSummary, AppError> {
        let _guard = self.run_lock.lock().await;

        let (alerts, rejected) = self.read_alerts().await?;
        let mut summary = RunSummary {
            checked: alerts.len() + rejected,
            rejected,
            ..RunSummary::default()
        };

        if alerts.is_empty() {
            tracing::info!(rejected, "price check: nothing to evaluate");
            return Ok(summary);
        }

        let asset_ids = distinct_asset_ids(&alerts);
        let quotes = self
            .prices
            .simple_price(&asset_ids)
            .await
            .map_err(AppError::PriceProviderUnavailable)?;

        let mut triggered = Vec::new();
        for alert in alerts {
            match evaluator::evaluate(&alert, &quotes) {
                Decision::Trigger(price) => triggered.push((alert, price)),
                Decision::NoTrigger => {}
                Decision::Skip(reason) => {
                    summary.skipped += 1;
                    tracing::debug!(alert_id = %alert.id, asset = %alert.asset_id, ?reason, "skipping alert");
                }
            }
        }

        summary.outcomes = stream::iter(triggered)
            .map(|(alert, price)| self.notify(alert, price))
            .buffered(self.concurrency)
            .collect()
            .await;

        tracing::info!(
            checked = summary.checked,
            triggered = summary.triggered(),
            delivered = summary.delivered(),
            skipped = summary.skipped,
            rejected = summary.rejected,
            "price check finished"
        );

        Ok(summary)
    }

    /// Working set plus the number of rows that had to be dropped.
    async fn read_alerts(&self) -> Result<(Vec<PriceAlert>, usize), AppError> {
        let read = self
            .store
            .active_alerts()
            .await
            .map_err(AppError::RepositoryUnavailable)?;

        let mut rejected = read.rejected.len();
        for row in &read.rejected {
            tracing::warn!(
                alert_id = row.id.as_deref().unwrap_or("<unknown>"),
                "dropping undecodable alert row: {}",
                row.error
            );
        }

        let mut alerts = Vec::with_capacity(read.rows.len());
        for row in read.rows {
            let id = row.id.clone();
            match PriceAlert::from_row(row) {
                Ok(a) => alerts.push(a),
                Err(e) => {
                    rejected += 1;
                    tracing::warn!(alert_id = %id, "dropping alert row: {e}");
                }
            }
        }

        let store = &self.store;
        let alerts: Vec<PriceAlert> = stream::iter(alerts)
            .map(|mut alert| async move {
                match store.user_email(&alert.user_id).await {
                    Ok(email) => alert.owner_email = email,
                    Err(e) => {
                        tracing::warn!(alert_id = %alert.id, user_id = %alert.user_id, "owner email lookup failed: {e}");
                    }
                }
                alert
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        Ok((alerts, rejected))
    }

    async fn notify(&self, alert: PriceAlert, current_price: f64) -> TriggerOutcome {
        let mut outcome = TriggerOutcome {
            alert_id: alert.id.clone(),
            symbol: alert.symbol.clone(),
            condition: alert.condition,
            target_price: alert.target_price,
            current_price,
            delivered: false,
            reason: None,
            persisted: false,
        };

        if let Err(reason) = self.send_notification(&alert, current_price).await {
            tracing::warn!(alert_id = %alert.id, symbol = %alert.symbol, "notification failed: {reason}");
            outcome.reason = Some(reason);
            return outcome;
        }
        outcome.delivered = true;

        match self.store.mark_triggered(&alert.id, self.clock.now()).await {
            Ok(()) => outcome.persisted = true,
            Err(e) => {
                // Sent but still active: the owner may be notified again next run.
                tracing::warn!(alert_id = %alert.id, "persistence failed after send: {e}");
            }
        }

        outcome
    }

    async fn send_notification(
        &self,
        alert: &PriceAlert,
        current_price: f64,
    ) -> Result<(), FailureReason> {
        let Some(to) = alert.owner_email.as_deref() else {
            return Err(FailureReason::NoRecipient);
        };
        if !self.mailer.is_configured() {
            return Err(FailureReason::ProviderUnavailable);
        }

        let email =
            templates::render_alert_email(&self.hbs, to, alert, current_price, self.clock.now())
                .map_err(|e| FailureReason::SendError(e.to_string()))?;

        self.mailer
            .send(&email)
            .await
            .map_err(|e| FailureReason::SendError(e.to_string()))
    }
}

/// Unique asset ids of the working set, sorted so the batched query is stable.
pub fn distinct_asset_ids(alerts: &[PriceAlert]) -> Vec<String> {
    alerts
        .iter()
        .map(|a| a.asset_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
