//! Calendar period aggregation of returns

use crate::data::TimeFrame;
use anyhow::{bail, Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Calendar period used to compound returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Monday to Sunday
    Week,
    Month,
    Quarter,
    Year,
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "week" | "weekly" | "w" => Ok(Period::Week),
            "month" | "monthly" | "m" => Ok(Period::Month),
            "quarter" | "quarterly" | "q" => Ok(Period::Quarter),
            "year" | "yearly" | "annual" | "y" | "a" => Ok(Period::Year),
            other => bail!("Unknown period '{}', expected week, month, quarter or year", other),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Week => write!(f, "week"),
            Period::Month => write!(f, "month"),
            Period::Quarter => write!(f, "quarter"),
            Period::Year => write!(f, "year"),
        }
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next?.pred_opt()
}

impl Period {
    /// Last calendar day of the period containing `date`
    pub fn end_of(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Period::Week => {
                let days_left = 6 - i64::from(date.weekday().num_days_from_monday());
                date.checked_add_signed(Duration::days(days_left))
            }
            Period::Month => last_day_of_month(date.year(), date.month()),
            Period::Quarter => {
                let quarter_end_month = date.month0() / 3 * 3 + 3;
                last_day_of_month(date.year(), quarter_end_month)
            }
            Period::Year => NaiveDate::from_ymd_opt(date.year(), 12, 31),
        }
    }
}

/// Compound returns within each calendar period.
///
/// The output is indexed by the last calendar day of every period that has
/// at least one observation. Missing returns count as no change.
pub fn period_return(returns: &TimeFrame, period: Period) -> Result<TimeFrame> {
    let width = returns.columns().len();
    let mut buckets: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();

    for (i, &date) in returns.index().iter().enumerate() {
        let label = period
            .end_of(date)
            .with_context(|| format!("No {} end for {}", period, date))?;
        let growth = buckets.entry(label).or_insert_with(|| vec![1.0; width]);

        for ((_, column), g) in returns.iter_columns().zip(growth.iter_mut()) {
            let r = column[i];
            if !r.is_nan() {
                *g *= 1.0 + r;
            }
        }
    }

    let mut index = Vec::with_capacity(buckets.len());
    let mut values = vec![Vec::with_capacity(buckets.len()); width];
    for (label, growth) in buckets {
        index.push(label);
        for (column, g) in values.iter_mut().zip(growth) {
            column.push(g - 1.0);
        }
    }

    TimeFrame::new(index, returns.columns().to_vec(), values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{} != {}", a, b);
    }

    #[test]
    fn test_parse_period() {
        assert_eq!("month".parse::<Period>().unwrap(), Period::Month);
        assert_eq!("Weekly".parse::<Period>().unwrap(), Period::Week);
        assert_eq!("Q".parse::<Period>().unwrap(), Period::Quarter);
        assert_eq!("annual".parse::<Period>().unwrap(), Period::Year);
        assert!("fortnight".parse::<Period>().is_err());
    }

    #[test]
    fn test_end_of() {
        // 2024-02-14 is a Wednesday
        let d = date(2024, 2, 14);
        assert_eq!(Period::Week.end_of(d), Some(date(2024, 2, 18)));
        assert_eq!(Period::Week.end_of(date(2024, 2, 18)), Some(date(2024, 2, 18)));
        assert_eq!(Period::Month.end_of(d), Some(date(2024, 2, 29)));
        assert_eq!(Period::Quarter.end_of(d), Some(date(2024, 3, 31)));
        assert_eq!(Period::Quarter.end_of(date(2024, 11, 2)), Some(date(2024, 12, 31)));
        assert_eq!(Period::Year.end_of(d), Some(date(2024, 12, 31)));
    }

    #[test]
    fn test_monthly_compounding() {
        let returns = TimeFrame::new(
            vec![date(2024, 1, 30), date(2024, 1, 31), date(2024, 2, 1), date(2024, 3, 15)],
            vec!["Fund".to_string()],
            vec![vec![0.10, -0.05, 0.02, f64::NAN]],
        )
        .unwrap();

        let monthly = period_return(&returns, Period::Month).unwrap();

        assert_eq!(monthly.index(), &[date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31)]);
        let fund = monthly.column("Fund").unwrap();
        assert_close(fund[0], 1.10 * 0.95 - 1.0);
        assert_close(fund[1], 0.02);
        assert_close(fund[2], 0.0);
    }

    #[test]
    fn test_weekly_and_yearly() {
        // Friday, following Monday, and a date in the next year
        let returns = TimeFrame::from_series(
            "Fund",
            vec![date(2024, 12, 27), date(2024, 12, 30), date(2025, 1, 2)],
            vec![0.01, 0.02, 0.03],
        )
        .unwrap();

        let weekly = period_return(&returns, Period::Week).unwrap();
        assert_eq!(weekly.index(), &[date(2024, 12, 29), date(2025, 1, 5)]);
        assert_close(weekly.column("Fund").unwrap()[1], 1.02 * 1.03 - 1.0);

        let yearly = period_return(&returns, Period::Year).unwrap();
        assert_eq!(yearly.index(), &[date(2024, 12, 31), date(2025, 12, 31)]);
        assert_close(yearly.column("Fund").unwrap()[0], 1.01 * 1.02 - 1.0);
        assert_close(yearly.column("Fund").unwrap()[1], 0.03);
    }

    #[test]
    fn test_empty_input() {
        let empty = TimeFrame::from_series("Fund", vec![], vec![]).unwrap();
        let out = period_return(&empty, Period::Quarter).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.columns(), &["Fund".to_string()]);
    }
}
