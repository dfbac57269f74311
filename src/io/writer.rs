//! CSV writers for time series and holdings

use super::loader::CsvLoader;
use crate::data::{Holding, TimeFrame};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn writer<W: Write>(wtr: W, delimiter: u8) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(delimiter).from_writer(wtr)
}

/// Write a frame as `Date,<columns...>`; NaN becomes an empty cell
pub fn write_ts<W: Write>(frame: &TimeFrame, wtr: W, delimiter: u8) -> Result<()> {
    let mut out = writer(wtr, delimiter);

    let mut header = vec!["Date".to_string()];
    header.extend(frame.columns().iter().cloned());
    out.write_record(&header)?;

    for i in 0..frame.len() {
        let Some((date, row)) = frame.row(i) else {
            break;
        };

        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(date.format(DATE_FORMAT).to_string());
        record.extend(row.iter().map(|v| {
            if v.is_nan() {
                String::new()
            } else {
                v.to_string()
            }
        }));
        out.write_record(&record)?;
    }

    out.flush()?;
    Ok(())
}

pub fn write_ts_csv<P: AsRef<Path>>(frame: &TimeFrame, path: P) -> Result<()> {
    CsvLoader::new().save_time_series(frame, path)
}

pub fn write_holdings<W: Write>(holdings: &[Holding], wtr: W, delimiter: u8) -> Result<()> {
    let mut out = writer(wtr, delimiter);

    out.write_record(["Date", "Contract", "Type", "Average Cost", "Quantity"])?;
    for h in holdings {
        out.write_record([
            h.date.format(DATE_FORMAT).to_string(),
            h.contract.clone(),
            h.asset_type.clone(),
            h.average_cost.normalize().to_string(),
            h.quantity.normalize().to_string(),
        ])?;
    }

    out.flush()?;
    Ok(())
}

pub fn write_holdings_csv<P: AsRef<Path>>(holdings: &[Holding], path: P) -> Result<()> {
    CsvLoader::new().save_holdings(holdings, path)
}

/// Writers using the loader's delimiter, so saved files load back with the same settings
impl CsvLoader {
    pub fn save_time_series<P: AsRef<Path>>(&self, frame: &TimeFrame, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        write_ts(frame, file, self.delimiter())
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!("Wrote {} rows to {}", frame.len(), path.display());
        Ok(())
    }

    pub fn save_holdings<P: AsRef<Path>>(&self, holdings: &[Holding], path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        write_holdings(holdings, file, self.delimiter())
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!("Wrote {} holdings rows to {}", holdings.len(), path.display());
        Ok(())
    }
}
