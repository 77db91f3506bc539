use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub repository_url: String,
    pub repository_service_key: String,

    pub price_api_url: String,
    pub price_api_key: Option<String>,
    pub vs_currency: String,

    pub email_api_url: String,
    pub email_api_key: Option<String>,
    pub email_from: String,

    pub cron_secret: Option<String>,
    pub scheduler_header: String,

    pub http_timeout_secs: u64,
    pub check_interval_secs: u64,
    pub notify_concurrency: usize,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

// Empty values count as unset, so `EMAIL_API_KEY=` in a .env disables sending.
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|s| s.trim().parse::<T>().ok()).unwrap_or(default)
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let host = var_or("HOST", "127.0.0.1");
    let port = parse_or(env::var("PORT").ok(), 3000u16);

    let repository_url = var_or("REPOSITORY_URL", "http://localhost:54321");
    let repository_service_key = var_or("REPOSITORY_SERVICE_KEY", "");

    let price_api_url = var_or("PRICE_API_URL", "https://api.coingecko.com/api/v3");
    let price_api_key = optional_var("PRICE_API_KEY");
    let vs_currency = var_or("VS_CURRENCY", "usd").to_lowercase();

    let email_api_url = var_or("EMAIL_API_URL", "https://api.resend.com");
    let email_api_key = optional_var("EMAIL_API_KEY");
    let email_from = var_or("EMAIL_FROM", "Price Alerts <alerts@localhost>");

    let cron_secret = optional_var("CRON_SECRET");
    let scheduler_header = var_or("SCHEDULER_HEADER", "x-scheduled-run").to_lowercase();

    let http_timeout_secs = parse_or(env::var("HTTP_TIMEOUT_SECS").ok(), 10u64);
    let check_interval_secs = parse_or(env::var("ALERT_CHECK_INTERVAL_SECS").ok(), 0u64);
    let notify_concurrency = parse_or(env::var("NOTIFY_CONCURRENCY").ok(), 8usize).max(1);

    Settings {
        host,
        port,
        repository_url,
        repository_service_key,
        price_api_url,
        price_api_key,
        vs_currency,
        email_api_url,
        email_api_key,
        email_from,
        cron_secret,
        scheduler_header,
        http_timeout_secs,
        check_interval_secs,
        notify_concurrency,
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            host: "127.0.0.1".to_string(),
            port: 3000,
            repository_url: "http://localhost:54321".to_string(),
            repository_service_key: String::new(),
            price_api_url: "https://api.coingecko.com/api/v3".to_string(),
            price_api_key: None,
            vs_currency: "usd".to_string(),
            email_api_url: "https://api.resend.com".to_string(),
            email_api_key: None,
            email_from: "Price Alerts <alerts@localhost>".to_string(),
            cron_secret: None,
            scheduler_header: "x-scheduled-run".to_string(),
            http_timeout_secs: 10,
            check_interval_secs: 0,
            notify_concurrency: 8,
        }
    }
}
