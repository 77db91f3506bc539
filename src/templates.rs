use std::sync::Arc;

use chrono::{DateTime, Utc};
use handlebars::{Handlebars, RenderError, TemplateError};
use serde_json::json;

use crate::{models::PriceAlert, services::mailer::OutgoingEmail};

pub type Hbs = Arc<Handlebars<'static>>;

const PRICE_ALERT_EMAIL: &str = include_str!("../templates/emails/price_alert.hbs");

pub fn build_handlebars() -> Result<Hbs, TemplateError> {
    let mut hb = Handlebars::new();
    hb.set_strict_mode(true);

    hb.register_template_string("emails/price_alert", PRICE_ALERT_EMAIL)?;

    Ok(Arc::new(hb))
}

fn fmt2(x: f64) -> String {
    format!("{:.2}", x)
}

/// Builds the notification for a triggered alert. Values are HTML-escaped
/// by the template engine.
pub fn render_alert_email(
    hbs: &Handlebars<'static>,
    to: &str,
    alert: &PriceAlert,
    current_price: f64,
    triggered_at: DateTime<Utc>,
) -> Result<OutgoingEmail, RenderError> {
    let html = hbs.render(
        "emails/price_alert",
        &json!({
            "symbol": alert.symbol,
            "condition": alert.condition.as_str(),
            "target_price": fmt2(alert.target_price),
            "current_price": fmt2(current_price),
            "triggered_at": triggered_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        }),
    )?;

    Ok(OutgoingEmail {
        to: to.to_string(),
        subject: format!(
            "Price alert: {} is now {} ${}",
            alert.symbol,
            alert.condition,
            fmt2(alert.target_price)
        ),
        html,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::Condition;

    fn alert(symbol: &str) -> PriceAlert {
        PriceAlert {
            id: "a1".into(),
            user_id: "u1".into(),
            owner_email: Some("owner@example.com".into()),
            asset_id: "bitcoin".into(),
            symbol: symbol.into(),
            target_price: 50000.0,
            condition: Condition::Above,
        }
    }

    #[test]
    fn renders_subject_and_prices() {
        let hbs = build_handlebars().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();

        let email = render_alert_email(&hbs, "owner@example.com", &alert("BTC"), 51000.0, at).unwrap();

        assert_eq!(email.to, "owner@example.com");
        assert_eq!(email.subject, "Price alert: BTC is now above $50000.00");
        assert!(email.html.contains("$50000.00"));
        assert!(email.html.contains("$51000.00"));
        assert!(email.html.contains("2024-05-01 12:30 UTC"));
    }

    #[test]
    fn escapes_symbol_in_body() {
        let hbs = build_handlebars().unwrap();
        let email = render_alert_email(&hbs, "x@example.com", &alert("<b>"), 1.0, Utc::now()).unwrap();

        assert!(email.html.contains("&lt;b&gt;"));
        assert!(!email.html.contains("<b>"));
    }
}
