//! Cumulative return statistics over simple (non-cumulative) decimal returns

use crate::data::TimeFrame;
use tracing::debug;

/// Growth factor of one period; missing returns count as no change
fn growth(r: f64) -> f64 {
    if r.is_nan() {
        1.0
    } else {
        1.0 + r
    }
}

/// Running compounded return of every column.
///
/// ```text
/// 2015-07-16   -0.012143   ->   -0.012143
/// 2015-07-17    0.045350   ->    0.032656
/// ```
pub fn cum_return(returns: &TimeFrame) -> TimeFrame {
    if returns.is_empty() {
        return returns.clone();
    }

    returns.map_columns(|column| {
        let mut acc = 1.0;
        column
            .iter()
            .map(|&r| {
                acc *= growth(r);
                acc - 1.0
            })
            .collect()
    })
}

/// Value Added Monthly Index: the value of `starting_value` invested at the start
pub fn vami(returns: &TimeFrame, starting_value: f64) -> TimeFrame {
    cum_return(returns).map_columns(|column| column.iter().map(|c| (c + 1.0) * starting_value).collect())
}

/// Compounded return over the whole frame, per column
pub fn total_return(returns: &TimeFrame) -> Vec<(String, f64)> {
    returns
        .iter_columns()
        .map(|(name, column)| {
            let total = column.iter().map(|&r| growth(r)).product::<f64>() - 1.0;
            (name.to_string(), total)
        })
        .collect()
}

/// Geometric annualized return, per column.
///
/// Each row is one observation and `periods_per_year` of them make a year
/// (252 for daily trading data, 12 for monthly). An empty frame yields NaN.
pub fn annualized_return(returns: &TimeFrame, periods_per_year: f64) -> Vec<(String, f64)> {
    let n = returns.len();

    total_return(returns)
        .into_iter()
        .map(|(name, total)| {
            let annualized = if n == 0 {
                f64::NAN
            } else {
                (1.0 + total).powf(periods_per_year / n as f64) - 1.0
            };
            debug!("{}: total {:.6} over {} periods, annualized {:.6}", name, total, n, annualized);
            (name, annualized)
        })
        .collect()
}
