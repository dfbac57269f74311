//! CSV loaders for time series and trade blotters

use crate::data::{Action, TimeFrame, Trade};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const MISSING_TOKENS: &[&str] = &["", "nan", "na", "n/a", "null", "none", "#n/a"];

const TRADE_COLUMNS: [&str; 6] = ["date", "contract", "type", "price", "quantity", "action"];

/// Parse a calendar date, dropping any time component
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }

    bail!("Unrecognized date '{}'", s)
}

/// Parse a numeric cell, mapping missing-value markers to NaN
fn parse_value(s: &str) -> Option<f64> {
    let s = s.trim();
    if MISSING_TOKENS.contains(&s.to_lowercase().as_str()) {
        return Some(f64::NAN);
    }
    s.parse::<f64>().ok()
}

fn parse_decimal(s: &str) -> Result<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Loader for CSV files with a header row
#[derive(Debug, Clone)]
pub struct CsvLoader {
    delimiter: u8,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    fn reader<R: Read>(&self, rdr: R) -> csv::Reader<R> {
        csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(rdr)
    }

    /// Load a time series whose first column is the date index
    pub fn load_time_series<P: AsRef<Path>>(&self, path: P) -> Result<TimeFrame> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open time series file {}", path.display()))?;

        let frame = self
            .time_series_from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to read time series from {}", path.display()))?;

        info!(
            "Loaded {} rows x {} columns from {}",
            frame.len(),
            frame.columns().len(),
            path.display()
        );
        Ok(frame)
    }

    pub fn time_series_from_reader<R: Read>(&self, rdr: R) -> Result<TimeFrame> {
        let mut reader = self.reader(rdr);

        let headers = reader.headers().context("Failed to read CSV header")?.clone();
        if headers.is_empty() {
            bail!("CSV header is empty");
        }

        let columns: Vec<String> = headers.iter().skip(1).map(String::from).collect();
        let mut rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();

        for (i, result) in reader.records().enumerate() {
            let record = result.context("Failed to read CSV record")?;
            // Header is line 1
            let line = i + 2;

            if record.len() == 1 && record.get(0).map_or(true, str::is_empty) {
                continue;
            }

            if record.len() < headers.len() {
                bail!(
                    "Line {}: expected {} fields, found {}",
                    line,
                    headers.len(),
                    record.len()
                );
            }

            let date = parse_date(&record[0]).with_context(|| format!("Line {}: bad date index", line))?;

            let mut values = Vec::with_capacity(columns.len());
            for (j, name) in columns.iter().enumerate() {
                let cell = &record[j + 1];
                let value = parse_value(cell).with_context(|| {
                    format!("Line {}: column '{}' has non-numeric value '{}'", line, name, cell)
                })?;
                values.push(value);
            }

            rows.push((date, values));
        }

        // Stable, so duplicate dates keep file order
        rows.sort_by_key(|(date, _)| *date);

        let mut index = Vec::with_capacity(rows.len());
        let mut values = vec![Vec::with_capacity(rows.len()); columns.len()];
        for (date, row) in rows {
            index.push(date);
            for (column, value) in values.iter_mut().zip(row) {
                column.push(value);
            }
        }

        TimeFrame::new(index, columns, values)
    }

    /// Load a trade blotter with Date, Contract, Type, Price, Quantity and Action columns
    pub fn load_trades<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Trade>> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open trades file {}", path.display()))?;

        let trades = self
            .trades_from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to read trades from {}", path.display()))?;

        info!("Loaded {} trades from {}", trades.len(), path.display());
        Ok(trades)
    }

    pub fn trades_from_reader<R: Read>(&self, rdr: R) -> Result<Vec<Trade>> {
        let mut reader = self.reader(rdr);

        let headers = reader.headers().context("Failed to read CSV header")?.clone();
        let mut positions = [0usize; TRADE_COLUMNS.len()];
        for (slot, name) in positions.iter_mut().zip(TRADE_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .with_context(|| format!("Missing {} column", name))?;
        }
        let [date_col, contract_col, type_col, price_col, qty_col, action_col] = positions;
        let width = positions.iter().max().copied().unwrap_or(0) + 1;

        let mut trades = Vec::new();
        for (i, result) in reader.records().enumerate() {
            let record = result.context("Failed to read CSV record")?;
            let line = i + 2;

            if record.len() == 1 && record.get(0).map_or(true, str::is_empty) {
                continue;
            }

            if record.len() < width {
                bail!("Line {}: expected at least {} fields, found {}", line, width, record.len());
            }

            let trade = Trade {
                date: parse_date(&record[date_col]).with_context(|| format!("Line {}: bad Date", line))?,
                contract: record[contract_col].to_string(),
                asset_type: record[type_col].to_string(),
                price: parse_decimal(&record[price_col]).with_context(|| format!("Line {}: bad Price", line))?,
                quantity: parse_decimal(&record[qty_col])
                    .with_context(|| format!("Line {}: bad Quantity", line))?,
                action: Action::from(&record[action_col]),
            };

            if let Action::Other(ref action) = trade.action {
                debug!("Line {}: trade with action '{}' will not move holdings", line, action);
            }

            trades.push(trade);
        }

        trades.sort_by_key(|t| t.date);
        Ok(trades)
    }
}

/// Load a time series CSV with the default loader settings
pub fn read_ts_csv<P: AsRef<Path>>(path: P) -> Result<TimeFrame> {
    CsvLoader::new().load_time_series(path)
}

/// Load a trade blotter CSV with the default loader settings
pub fn read_trades_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Trade>> {
    CsvLoader::new().load_trades(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2015-07-16").unwrap(), date(2015, 7, 16));
        assert_eq!(parse_date("2015/07/16").unwrap(), date(2015, 7, 16));
        assert_eq!(parse_date("07/16/2015").unwrap(), date(2015, 7, 16));
        assert_eq!(parse_date("20150716").unwrap(), date(2015, 7, 16));
        assert_eq!(parse_date("2015-07-16 16:00:00").unwrap(), date(2015, 7, 16));
        assert_eq!(parse_date("2015-07-16T16:00:00+00:00").unwrap(), date(2015, 7, 16));
        assert!(parse_date("16th July").is_err());
    }

    #[test]
    fn test_time_series_from_reader() {
        let csv = "Date,Fund,Benchmark\n\
                   2015-07-17,0.045350,0.01\n\
                   2015-07-16,-0.012143,\n\
                   2015-07-20,0.030957,NaN\n\
                   2015-07-21,NA,N/A\n\
                   2015-07-22,null,0.02\n";

        let frame = CsvLoader::new().time_series_from_reader(csv.as_bytes()).unwrap();

        assert_eq!(frame.columns(), &["Fund".to_string(), "Benchmark".to_string()]);
        assert_eq!(
            frame.index(),
            &[
                date(2015, 7, 16),
                date(2015, 7, 17),
                date(2015, 7, 20),
                date(2015, 7, 21),
                date(2015, 7, 22)
            ]
        );

        let fund = frame.column("Fund").unwrap();
        assert_eq!(&fund[..3], &[-0.012143, 0.045350, 0.030957]);
        assert!(fund[3].is_nan());
        assert!(fund[4].is_nan());

        let bench = frame.column("Benchmark").unwrap();
        assert!(bench[0].is_nan());
        assert_eq!(bench[1], 0.01);
        assert!(bench[2].is_nan());
        assert!(bench[3].is_nan());
        assert_eq!(bench[4], 0.02);
    }

    #[test]
    fn test_time_series_errors() {
        let loader = CsvLoader::new();

        let bad_value = "Date,Fund\n2015-07-16,abc\n";
        let err = loader.time_series_from_reader(bad_value.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("Fund"));

        let bad_date = "Date,Fund\nyesterday,0.1\n";
        assert!(loader.time_series_from_reader(bad_date.as_bytes()).is_err());

        let short_row = "Date,Fund,Bench\n2015-07-16,0.1\n";
        assert!(loader.time_series_from_reader(short_row.as_bytes()).is_err());
    }

    #[test]
    fn test_custom_delimiter() {
        let csv = "Date;Fund\n2015-07-16;0.5\n";
        let frame = CsvLoader::new()
            .with_delimiter(b';')
            .time_series_from_reader(csv.as_bytes())
            .unwrap();
        assert_eq!(frame.column("Fund").unwrap(), &[0.5]);
    }

    #[test]
    fn test_trades_from_reader() {
        let csv = "date,Contract,Type,Price,Quantity,Action\n\
                   2024-01-03,MSFT,US Equity,370.5,5,Sell\n\
                   2024-01-02,AAPL,US Equity,185.25,10,Buy\n\
                   2024-01-02,EURUSD,FX,1.0942,100000,buy\n";

        let trades = CsvLoader::new().trades_from_reader(csv.as_bytes()).unwrap();

        assert_eq!(trades.len(), 3);
        assert_eq!(trades[0].contract, "AAPL");
        assert_eq!(trades[0].price, dec!(185.25));
        assert_eq!(trades[1].contract, "EURUSD");
        assert_eq!(trades[1].action, Action::Buy);
        assert_eq!(trades[2].action, Action::Sell);
        assert_eq!(trades[2].date, date(2024, 1, 3));
    }

    #[test]
    fn test_trades_missing_column() {
        let csv = "Date,Contract,Price,Quantity,Action\n2024-01-02,AAPL,1,1,Buy\n";
        let err = CsvLoader::new().trades_from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("type"));
    }

    #[test]
    fn test_read_ts_csv_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fund_return.csv");
        fs::write(&path, "Date,Fund\n2015-07-16,-0.012143\n2015-07-17,0.045350\n").unwrap();

        let frame = read_ts_csv(&path).unwrap();
        assert_eq!(frame.len(), 2);

        assert!(read_ts_csv(dir.path().join("missing.csv")).is_err());
    }
}
