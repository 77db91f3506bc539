//! Shared plumbing for the outbound HTTP adapters.

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::error::UpstreamError;

/// One client for every collaborator. The timeout bounds the whole request,
/// so a hung upstream surfaces as a transport error.
pub fn build_client(timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
}

/// Reads a response, turning non-2xx statuses and malformed bodies into
/// typed errors instead of letting untyped JSON leak into the pipeline.
pub async fn read_json<T: DeserializeOwned>(res: Response) -> Result<T, UpstreamError> {
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        return Err(UpstreamError::status(status, body));
    }

    serde_json::from_str::<T>(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
}

pub async fn expect_success(res: Response) -> Result<(), UpstreamError> {
    let status = res.status();
    if status.is_success() {
        return Ok(());
    }

    let body = res.text().await.unwrap_or_default();
    Err(UpstreamError::status(status, body))
}

pub fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// `base` followed by `segments`, each percent-encoded as a single path
/// segment so ids can never change the target resource.
pub fn endpoint(base: &str, segments: &[&str]) -> Result<Url, UpstreamError> {
    let mut url = Url::parse(base).map_err(|e| UpstreamError::InvalidUrl(format!("{base}: {e}")))?;

    url.path_segments_mut()
        .map_err(|_| UpstreamError::InvalidUrl(format!("{base}: cannot be a base")))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}
