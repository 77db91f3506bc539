use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    error::UpstreamError,
    models::PriceQuotes,
    services::http::{read_json, trim_base},
};

/// Market-data provider answering many assets in one call.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Spot prices for `asset_ids`. Ids the provider does not know are
    /// simply missing from the result.
    async fn simple_price(&self, asset_ids: &[String]) -> Result<PriceQuotes, UpstreamError>;
}

#[derive(Clone)]
pub struct CoinGeckoClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    vs_currency: String,
}

impl CoinGeckoClient {
    pub fn new(http: Client, base_url: &str, api_key: Option<String>, vs_currency: String) -> Self {
        Self {
            http,
            base_url: trim_base(base_url),
            api_key,
            vs_currency,
        }
    }
}

// { "bitcoin": { "usd": 51000.0 }, ... }
type SimplePriceResponse = HashMap<String, HashMap<String, Option<f64>>>;

fn extract_quotes(body: SimplePriceResponse, vs_currency: &str) -> PriceQuotes {
    body.into_iter()
        .filter_map(|(id, by_currency)| {
            let price = by_currency.get(vs_currency).copied().flatten()?;
            (price.is_finite() && price > 0.0).then_some((id, price))
        })
        .collect()
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn simple_price(&self, asset_ids: &[String]) -> Result<PriceQuotes, UpstreamError> {
        if asset_ids.is_empty() {
            return Ok(PriceQuotes::new());
        }

        let url = format!("{}/simple/price", self.base_url);
        let ids = asset_ids.join(",");

        let mut req = self
            .http
            .get(url)
            .query(&[("ids", ids.as_str()), ("vs_currencies", self.vs_currency.as_str())]);
        if let Some(key) = &self.api_key {
            req = req.header("x-cg-demo-api-key", key);
        }

        let body = read_json::<SimplePriceResponse>(req.send().await?).await?;
        Ok(extract_quotes(body, &self.vs_currency))
    }
}
