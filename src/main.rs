use std::net::{IpAddr, SocketAddr};

use alertwatch::{config, routes, services::alert_monitor, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let settings = config::load();
    let state = AppState::from_settings(settings.clone())?;

    alert_monitor::spawn_price_alert_monitor(state.clone());

    let app = routes::app(state);

    let addr = SocketAddr::from((settings.host.parse::<IpAddr>()?, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
