use axum::{Router, middleware::from_fn_with_state, routing::post};
use crate::{AppState, auth, controllers::alerts_controller};

pub fn add_routes(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    let check = post(alerts_controller::post_check_price_alerts)
        .route_layer(from_fn_with_state(state.clone(), auth::require_scheduler_or_secret));

    router.route("/api/check-price-alerts", check)
}
