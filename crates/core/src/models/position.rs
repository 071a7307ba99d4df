use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregated position for one trading pair.
///
/// Quantity, average price and value are rounded to 8 places. A closed
/// position (nothing held) has no average price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSummary {
    pub pair: String,

    /// Quantity still held (buys minus sells)
    pub quantity: Decimal,

    /// Average cost of the held quantity; `None` once the position is closed
    pub average_price: Option<Decimal>,

    /// Cost basis of the held quantity
    pub total_value: Decimal,

    /// Profit/loss realized by sells against the running average cost
    pub realized_pnl: Decimal,
}

impl PositionSummary {
    pub fn is_open(&self) -> bool {
        self.quantity > Decimal::ZERO
    }
}
