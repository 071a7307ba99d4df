use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::CoreError;

/// Number of fractional digits kept for quantities, prices and derived totals.
pub const DECIMAL_PLACES: u32 = 8;

/// Round to [`DECIMAL_PLACES`], half away from zero.
pub fn quantize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(alias = "buy", alias = "BUY")]
    Buy,
    #[serde(alias = "sell", alias = "SELL")]
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "Buy"),
            Side::Sell => write!(f, "Sell"),
        }
    }
}

impl FromStr for Side {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(CoreError::ValidationError(format!(
                "Unknown side '{other}' (expected Buy or Sell)"
            ))),
        }
    }
}

/// A single recorded trade.
///
/// On disk a trade is a positional row `[id, pair, side, date, quantity, price]`
/// with both decimals written as strings so no precision is lost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TradeRow", into = "TradeRow")]
pub struct TradeRecord {
    /// Unique identifier, assigned once at creation. The only join key
    /// between the base history and journal entries.
    pub id: Uuid,

    /// Trading pair, e.g. "BTC/USDT"
    pub pair: String,

    pub side: Side,

    /// Trade date (daily granularity)
    pub date: NaiveDate,

    pub quantity: Decimal,

    pub price: Decimal,
}

impl TradeRecord {
    pub fn new(
        pair: impl Into<String>,
        side: Side,
        date: NaiveDate,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), pair, side, date, quantity, price)
    }

    pub fn with_id(
        id: Uuid,
        pair: impl Into<String>,
        side: Side,
        date: NaiveDate,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            id,
            pair: pair.into(),
            side,
            date,
            quantity,
            price,
        }
    }

    /// Quantity × price rounded to 8 places. `None` on decimal overflow.
    pub fn value(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.price).map(quantize)
    }

    /// True when every field except `id` matches `other`.
    pub fn same_contents(&self, other: &TradeRecord) -> bool {
        self.pair == other.pair
            && self.side == other.side
            && self.date == other.date
            && self.quantity == other.quantity
            && self.price == other.price
    }
}

impl std::fmt::Display for TradeRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} @ {}",
            self.pair, self.side, self.date, self.quantity, self.price
        )
    }
}

#[derive(Serialize, Deserialize)]
struct TradeRow(
    Uuid,
    String,
    Side,
    NaiveDate,
    #[serde(with = "rust_decimal::serde::str")] Decimal,
    #[serde(with = "rust_decimal::serde::str")] Decimal,
);

impl From<TradeRow> for TradeRecord {
    fn from(row: TradeRow) -> Self {
        let TradeRow(id, pair, side, date, quantity, price) = row;
        Self {
            id,
            pair,
            side,
            date,
            quantity,
            price,
        }
    }
}

impl From<TradeRecord> for TradeRow {
    fn from(t: TradeRecord) -> Self {
        TradeRow(t.id, t.pair, t.side, t.date, t.quantity, t.price)
    }
}

/// Raw, user-entered trade fields as they come out of an add/edit form.
///
/// Validation happens here, before anything reaches the change log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeInput {
    pub pair: String,
    pub side: String,
    pub date: String,
    pub quantity: String,
    pub price: String,
}

impl TradeInput {
    pub fn new(
        pair: impl Into<String>,
        side: impl Into<String>,
        date: impl Into<String>,
        quantity: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            pair: pair.into(),
            side: side.into(),
            date: date.into(),
            quantity: quantity.into(),
            price: price.into(),
        }
    }

    /// Validate and convert into a new record with a freshly generated id.
    pub fn into_record(self) -> Result<TradeRecord, CoreError> {
        self.into_record_with_id(Uuid::new_v4())
    }

    /// Validate and convert, keeping an existing id (used by edits).
    pub fn into_record_with_id(self, id: Uuid) -> Result<TradeRecord, CoreError> {
        let pair = self.pair.trim().to_uppercase();
        if pair.is_empty() {
            return Err(CoreError::ValidationError("Pair must not be empty".into()));
        }
        let side: Side = self.side.parse()?;
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")?;
        let quantity = parse_amount("Quantity", &self.quantity)?;
        let price = parse_amount("Price", &self.price)?;

        Ok(TradeRecord::with_id(id, pair, side, date, quantity, price))
    }
}

/// Parse a positive decimal with at most [`DECIMAL_PLACES`] fractional digits.
/// Spaces (digit grouping) are ignored.
pub fn parse_amount(field: &str, raw: &str) -> Result<Decimal, CoreError> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(CoreError::ValidationError(format!("{field} must not be empty")));
    }
    let value = Decimal::from_str(&cleaned).map_err(|e| {
        CoreError::ValidationError(format!("{field} '{raw}' is not a valid number: {e}"))
    })?;
    if value.scale() > DECIMAL_PLACES {
        return Err(CoreError::ValidationError(format!(
            "{field} '{raw}' has more than {DECIMAL_PLACES} decimal places"
        )));
    }
    if value <= Decimal::ZERO {
        return Err(CoreError::ValidationError(format!("{field} must be positive")));
    }
    Ok(value)
}
