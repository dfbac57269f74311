//! opat: Open Portfolio Analysis Tool
//!
//! Performance statistics, time series IO, trade-to-holdings aggregation and
//! Highcharts output for financial portfolios.

pub mod config;
pub mod data;
pub mod io;
pub mod plot;
pub mod portfolio;
pub mod stats;

pub use config::Config;
pub use data::{Action, Holding, TimeFrame, Trade};
