pub mod alert;
pub mod quote;

pub use alert::{ActiveAlerts, AlertRow, Condition, PriceAlert, RejectedRow};
pub use quote::PriceQuotes;
