use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::models::position::PositionSummary;
use crate::models::trade::{quantize, Side, TradeRecord};

/// Turns a flat trade list into per-pair positions using average-cost
/// accounting.
///
/// Pure business logic, no I/O. Feed it a projected history.
pub struct PositionService;

#[derive(Default)]
struct Running {
    quantity: Decimal,
    value: Decimal,
    pnl: Decimal,
}

impl PositionService {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate trades into one summary per pair, in order of each pair's
    /// first trade by date.
    ///
    /// Trades are replayed oldest first (stable for equal dates). A buy adds
    /// to quantity and cost. A sell realizes `(price - average) * quantity`
    /// against the current average cost and removes that cost. Sells with
    /// nothing held are ignored.
    pub fn aggregate(&self, trades: &[TradeRecord]) -> Vec<PositionSummary> {
        let mut sorted: Vec<&TradeRecord> = trades.iter().collect();
        sorted.sort_by_key(|t| t.date);

        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut pairs: Vec<(&str, Running)> = Vec::new();

        for trade in sorted {
            let slot = *index.entry(trade.pair.as_str()).or_insert_with(|| {
                pairs.push((trade.pair.as_str(), Running::default()));
                pairs.len() - 1
            });
            let running = &mut pairs[slot].1;

            match trade.side {
                Side::Buy => {
                    running.quantity += trade.quantity;
                    running.value += trade.quantity * trade.price;
                }
                Side::Sell if running.quantity > Decimal::ZERO => {
                    let average = quantize(running.value / running.quantity);
                    running.pnl += quantize((trade.price - average) * trade.quantity);
                    running.quantity -= trade.quantity;
                    running.value -= trade.quantity * average;
                }
                Side::Sell => {}
            }
        }

        pairs
            .into_iter()
            .map(|(pair, running)| {
                let average_price = (running.quantity > Decimal::ZERO)
                    .then(|| quantize(running.value / running.quantity));
                PositionSummary {
                    pair: pair.to_string(),
                    quantity: quantize(running.quantity),
                    average_price,
                    total_value: quantize(running.value),
                    realized_pnl: running.pnl,
                }
            })
            .collect()
    }

    /// Only positions with a positive held quantity.
    pub fn open_positions(&self, trades: &[TradeRecord]) -> Vec<PositionSummary> {
        self.aggregate(trades)
            .into_iter()
            .filter(PositionSummary::is_open)
            .collect()
    }
}

impl Default for PositionService {
    fn default() -> Self {
        Self::new()
    }
}
