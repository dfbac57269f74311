//! Reading and writing financial time series and trade blotters

mod loader;
mod writer;

pub use loader::{parse_date, read_trades_csv, read_ts_csv, CsvLoader};
pub use writer::{write_holdings, write_holdings_csv, write_ts, write_ts_csv};
