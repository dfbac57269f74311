//! Portfolio holdings aggregated from trade records

mod calendar;
mod holdings;

pub use calendar::{business_days, is_business_day};
pub use holdings::{create_holdings, HoldingsBook};
