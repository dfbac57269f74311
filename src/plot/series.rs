use crate::data::TimeFrame;
use chrono::{NaiveTime, TimeZone, Utc};
use serde::Serialize;

/// One line in Highcharts series format: `{"name": ..., "data": [[ms, value], ...]}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighchartSeries {
    pub name: String,
    /// Epoch milliseconds at midnight UTC, and the value (`null` when missing)
    pub data: Vec<(i64, Option<f64>)>,
}

/// Convert every column of a frame to a Highcharts series
pub fn to_highchart_series(frame: &TimeFrame) -> Vec<HighchartSeries> {
    let timestamps: Vec<i64> = frame
        .index()
        .iter()
        .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::default())).timestamp_millis())
        .collect();

    frame
        .iter_columns()
        .map(|(name, column)| HighchartSeries {
            name: name.to_string(),
            data: timestamps
                .iter()
                .zip(column)
                .map(|(&ts, &v)| (ts, if v.is_nan() { None } else { Some(v) }))
                .collect(),
        })
        .collect()
}
