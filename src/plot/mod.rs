//! Highcharts output for time series

mod html;
mod series;

pub use html::{highstock_line, ChartOptions};
pub use series::{to_highchart_series, HighchartSeries};
