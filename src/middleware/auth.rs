use axum::{
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{config::Settings, error::AppError, AppState};

fn has_scheduler_marker(headers: &HeaderMap, name: &str) -> bool {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = raw.trim().split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

// Compares every byte so timing does not reveal the matching prefix.
fn secrets_match(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}

/// Scheduler marker header, or a bearer token equal to the service secret.
pub fn is_authorized(headers: &HeaderMap, settings: &Settings) -> bool {
    if has_scheduler_marker(headers, &settings.scheduler_header) {
        return true;
    }

    match (bearer_token(headers), settings.cron_secret.as_deref()) {
        (Some(token), Some(secret)) => secrets_match(token, secret),
        _ => false,
    }
}

pub async fn require_scheduler_or_secret(
    State(state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if is_authorized(req.headers(), &state.settings) {
        return next.run(req).await;
    }

    tracing::warn!(path = %req.uri().path(), "rejected unauthorized trigger");
    AppError::Unauthorized.into_response()
}
