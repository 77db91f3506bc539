use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    #[serde(alias = "ABOVE", alias = "Above")]
    Above,
    #[serde(alias = "BELOW", alias = "Below")]
    Below,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Above => "above",
            Condition::Below => "below",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row shape of the `price_alerts` table as returned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertRow {
    pub id: String,
    pub user_id: String,
    pub coin_id: String,
    pub coin_symbol: String,
    pub target_price: f64,
    pub condition: Condition,
    pub is_active: bool,
}

/// A store row that could not become a working-set alert.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub id: Option<String>,
    pub error: String,
}

/// Result of one active-alerts read: rows that decoded, and the ones
/// that did not. A bad row never hides the good ones.
#[derive(Debug, Clone, Default)]
pub struct ActiveAlerts {
    pub rows: Vec<AlertRow>,
    pub rejected: Vec<RejectedRow>,
}

impl ActiveAlerts {
    /// Decodes each element of the store's JSON array on its own.
    pub fn decode(items: Vec<Value>) -> Self {
        let mut out = ActiveAlerts::default();

        for item in items {
            let id = item.get("id").and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

            match serde_json::from_value::<AlertRow>(item) {
                Ok(row) => out.rows.push(row),
                Err(e) => out.rejected.push(RejectedRow {
                    id,
                    error: e.to_string(),
                }),
            }
        }

        out
    }
}

/// An active alert in the working set of one run.
///
/// `owner_email` is resolved at read time and stays `None` when the
/// lookup failed, in which case the alert can be evaluated but not notified.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceAlert {
    pub id: String,
    pub user_id: String,
    pub owner_email: Option<String>,

    // price-provider id ("bitcoin") and display symbol ("BTC")
    pub asset_id: String,
    pub symbol: String,

    pub target_price: f64,
    pub condition: Condition,
}

impl PriceAlert {
    /// Turns a decoded row into a working-set alert. Rows that are not
    /// active or carry an unusable threshold are rejected.
    pub fn from_row(row: AlertRow) -> Result<Self, String> {
        if !row.is_active {
            return Err(format!("alert {} is not active", row.id));
        }
        if !row.target_price.is_finite() || row.target_price <= 0.0 {
            return Err(format!(
                "alert {} has invalid target price {}",
                row.id, row.target_price
            ));
        }
        if row.coin_id.trim().is_empty() {
            return Err(format!("alert {} has no asset id", row.id));
        }

        Ok(PriceAlert {
            id: row.id,
            user_id: row.user_id,
            owner_email: None,
            asset_id: row.coin_id,
            symbol: row.coin_symbol.to_uppercase(),
            target_price: row.target_price,
            condition: row.condition,
        })
    }
}
