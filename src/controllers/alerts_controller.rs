use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{error::AppError, AppState};

// POST /api/check-price-alerts
pub async fn post_check_price_alerts(State(state): State<AppState>) -> Response {
    let checker = state.checker.clone();

    // Own task: a caller hanging up must not cut a notify/commit sequence short.
    let joined = tokio::spawn(async move { checker.run().await }).await;

    match joined {
        Ok(Ok(summary)) => (StatusCode::OK, Json(summary.response_body())).into_response(),
        Ok(Err(e)) => {
            tracing::error!("price check failed: {e}");
            e.into_response()
        }
        Err(e) => {
            tracing::error!("price check task aborted: {e}");
            AppError::Internal(format!("price check task aborted: {e}")).into_response()
        }
    }
}
