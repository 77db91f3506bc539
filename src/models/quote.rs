use std::collections::HashMap;

/// Asset id -> spot price in the reference currency, valid for one run.
pub type PriceQuotes = HashMap<String, f64>;
