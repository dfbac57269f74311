//! Day-by-day holdings built by replaying a trade blotter

use super::calendar::business_days;
use crate::data::{Holding, Trade};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
struct HeldContract {
    contract: String,
    asset_type: String,
    average_cost: Decimal,
    quantity: Decimal,
}

impl HeldContract {
    /// Apply a signed quantity change at `price`, keeping the average cost of
    /// the open position.
    fn apply(&mut self, delta: Decimal, price: Decimal) {
        let old_qty = self.quantity;
        let new_qty = old_qty + delta;

        if old_qty.is_zero() {
            // Opening (or reopening) a position
            self.average_cost = price;
        } else if old_qty.is_sign_negative() == delta.is_sign_negative() {
            // Adding to the position
            self.average_cost =
                (self.average_cost * old_qty.abs() + price * delta.abs()) / new_qty.abs();
        } else if !new_qty.is_zero() && new_qty.is_sign_negative() != old_qty.is_sign_negative() {
            // Flipped through zero, the remainder was opened at this price
            self.average_cost = price;
        }

        self.quantity = new_qty;
    }
}

/// Current holdings, in order of first appearance
#[derive(Debug, Clone, Default)]
pub struct HoldingsBook {
    positions: Vec<HeldContract>,
}

impl HoldingsBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// `(average_cost, quantity)` of a contract
    pub fn get(&self, contract: &str) -> Option<(Decimal, Decimal)> {
        self.positions
            .iter()
            .find(|p| p.contract == contract)
            .map(|p| (p.average_cost, p.quantity))
    }

    /// Apply a trade. Returns false for actions that don't move holdings.
    pub fn apply(&mut self, trade: &Trade) -> bool {
        let Some(delta) = trade.delta_quantity() else {
            debug!(
                "Skipping {} {} on {}: action '{}' does not change holdings",
                trade.quantity, trade.contract, trade.date, trade.action
            );
            return false;
        };

        match self.positions.iter_mut().find(|p| p.contract == trade.contract) {
            Some(position) => position.apply(delta, trade.price),
            None => self.positions.push(HeldContract {
                contract: trade.contract.clone(),
                asset_type: trade.asset_type.clone(),
                average_cost: trade.price,
                quantity: delta,
            }),
        }

        debug!(
            "{} {} {} @ {} on {}",
            trade.action, trade.quantity, trade.contract, trade.price, trade.date
        );
        true
    }

    /// Holdings as of the close of `date`
    pub fn snapshot(&self, date: NaiveDate) -> Vec<Holding> {
        self.positions
            .iter()
            .map(|p| Holding {
                date,
                contract: p.contract.clone(),
                asset_type: p.asset_type.clone(),
                average_cost: p.average_cost,
                quantity: p.quantity,
            })
            .collect()
    }
}

/// Aggregate trades into holdings for every business day in `[start_date, end_date]`.
///
/// `start_date` defaults to the first trade date and `end_date` to today.
/// Trades dated before the start build the opening book, weekend trades land on
/// the next business day, and trades after the end are ignored.
pub fn create_holdings(
    trades: &[Trade],
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<Vec<Holding>> {
    let first_trade = trades.iter().map(|t| t.date).min();

    let Some(start) = start_date.or(first_trade) else {
        warn!("No trades and no start date, holdings are empty");
        return Ok(Vec::new());
    };
    let end = end_date.unwrap_or_else(|| Utc::now().date_naive());

    let days = business_days(start, end);
    if days.is_empty() {
        warn!("No business days between {} and {}", start, end);
        return Ok(Vec::new());
    }

    info!(
        "Building holdings from {} to {} ({} business days, {} trades)",
        start,
        end,
        days.len(),
        trades.len()
    );

    let mut ordered: Vec<&Trade> = trades.iter().collect();
    ordered.sort_by_key(|t| t.date);

    let mut book = HoldingsBook::new();
    let mut next = 0;
    let mut holdings = Vec::new();

    for day in days {
        while let Some(trade) = ordered.get(next) {
            if trade.date > day {
                break;
            }
            book.apply(trade);
            next += 1;
        }

        holdings.extend(book.snapshot(day));
    }

    let ignored = ordered.len() - next;
    if ignored > 0 {
        debug!("{} trades after {} were not applied", ignored, end);
    }

    info!("Created {} holdings rows for {} contracts", holdings.len(), book.len());
    Ok(holdings)
}
