use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    /// Anything else found in a blotter (dividends, transfers, ...)
    Other(String),
}

impl From<&str> for Action {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "buy" | "b" => Action::Buy,
            "sell" | "s" => Action::Sell,
            _ => Action::Other(s.trim().to_string()),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Buy => write!(f, "Buy"),
            Action::Sell => write!(f, "Sell"),
            Action::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A single executed trade from a blotter
#[derive(Debug, Clone)]
pub struct Trade {
    pub date: NaiveDate,
    pub contract: String,
    /// Product type, e.g. "US Equity" or "FX"
    pub asset_type: String,
    pub price: Decimal,
    pub quantity: Decimal,
    pub action: Action,
}

impl Trade {
    pub fn buy(date: NaiveDate, contract: &str, asset_type: &str, price: Decimal, quantity: Decimal) -> Self {
        Self {
            date,
            contract: contract.to_string(),
            asset_type: asset_type.to_string(),
            price,
            quantity,
            action: Action::Buy,
        }
    }

    pub fn sell(date: NaiveDate, contract: &str, asset_type: &str, price: Decimal, quantity: Decimal) -> Self {
        Self {
            action: Action::Sell,
            ..Self::buy(date, contract, asset_type, price, quantity)
        }
    }

    /// Signed change in held quantity, `None` for actions that don't move a position
    pub fn delta_quantity(&self) -> Option<Decimal> {
        match self.action {
            Action::Buy => Some(self.quantity),
            Action::Sell => Some(-self.quantity),
            Action::Other(_) => None,
        }
    }
}

/// A contract held at the close of a given date
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub date: NaiveDate,
    pub contract: String,
    pub asset_type: String,
    pub average_cost: Decimal,
    pub quantity: Decimal,
}

impl Holding {
    /// Cost basis of the position, negative for shorts
    pub fn cost_basis(&self) -> Decimal {
        self.average_cost * self.quantity
    }
}
