//! Portfolio performance statistics

mod period;
mod returns;

pub use period::{period_return, Period};
pub use returns::{annualized_return, cum_return, total_return, vami};
