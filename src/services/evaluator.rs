use crate::models::{Condition, PriceAlert, PriceQuotes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoQuoteAvailable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Trigger(f64),
    NoTrigger,
    Skip(SkipReason),
}

/// Decides whether `alert` fires against this run's quotes.
/// Both bounds are inclusive: a price equal to the target fires.
pub fn evaluate(alert: &PriceAlert, quotes: &PriceQuotes) -> Decision {
    let Some(&price) = quotes.get(&alert.asset_id) else {
        return Decision::Skip(SkipReason::NoQuoteAvailable);
    };

    let hit = match alert.condition {
        Condition::Above => price >= alert.target_price,
        Condition::Below => price <= alert.target_price,
    };

    if hit {
        Decision::Trigger(price)
    } else {
        Decision::NoTrigger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(asset: &str, target: f64, condition: Condition) -> PriceAlert {
        PriceAlert {
            id: "a1".into(),
            user_id: "u1".into(),
            owner_email: Some("owner@example.com".into()),
            asset_id: asset.into(),
            symbol: asset.to_uppercase(),
            target_price: target,
            condition,
        }
    }

    fn quotes(pairs: &[(&str, f64)]) -> PriceQuotes {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn above_fires_at_or_over_target() {
        let a = alert("bitcoin", 50000.0, Condition::Above);

        for (price, expected) in [
            (51000.0, Decision::Trigger(51000.0)),
            (50000.0, Decision::Trigger(50000.0)),
            (49999.99, Decision::NoTrigger),
            (0.01, Decision::NoTrigger),
        ] {
            assert_eq!(evaluate(&a, &quotes(&[("bitcoin", price)])), expected, "price {price}");
        }
    }

    #[test]
    fn below_fires_at_or_under_target() {
        let a = alert("ethereum", 2000.0, Condition::Below);

        for (price, expected) in [
            (1500.0, Decision::Trigger(1500.0)),
            (2000.0, Decision::Trigger(2000.0)),
            (2000.01, Decision::NoTrigger),
            (1e9, Decision::NoTrigger),
        ] {
            assert_eq!(evaluate(&a, &quotes(&[("ethereum", price)])), expected, "price {price}");
        }
    }

    #[test]
    fn missing_quote_is_skipped_for_both_conditions() {
        let q = quotes(&[("bitcoin", 52000.0)]);

        for condition in [Condition::Above, Condition::Below] {
            let a = alert("ethereum", 1.0, condition);
            assert_eq!(evaluate(&a, &q), Decision::Skip(SkipReason::NoQuoteAvailable));
        }
        assert_eq!(
            evaluate(&alert("bitcoin", 1.0, Condition::Above), &PriceQuotes::new()),
            Decision::Skip(SkipReason::NoQuoteAvailable)
        );
    }

    #[test]
    fn only_own_asset_price_is_used() {
        let a = alert("bitcoin", 100.0, Condition::Above);
        let q = quotes(&[("ethereum", 1000.0), ("bitcoin", 50.0)]);
        assert_eq!(evaluate(&a, &q), Decision::NoTrigger);
    }
}
