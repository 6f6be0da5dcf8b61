//! The stock and price-point records the store reads and writes.

use crate::types::RowKey;
use serde::{Deserialize, Serialize};

/// One tradable instrument in the registry.
///
/// `name` is the string identity: unique, immutable after creation, and the
/// source of the stock's series table name. `volatility` is the half-width
/// of the uniform perturbation applied each tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stock {
    pub key:        RowKey,
    pub name:       String,
    pub volatility: f64,
}

/// One recorded price observation in a stock's series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub key:   RowKey,
    pub value: f64,
}

/// Partial update for a registered stock. Absent fields are untouched.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StockUpdate {
    pub volatility:  Option<f64>,
    pub share_value: Option<f64>,
}
