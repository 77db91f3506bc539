pub mod http;
pub mod clock;
pub mod alert_store;
pub mod coingecko;
pub mod mailer;
pub mod evaluator;
pub mod price_check;
pub mod alert_monitor;
