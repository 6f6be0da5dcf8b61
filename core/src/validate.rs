//! Typed parse step at the storage boundary.
//!
//! RULE: rows read back from SQLite never reach the simulation loop or the
//! façade unvalidated. A malformed row rejects the whole read — no silent
//! coercion, no default substitution. Callers receiving a failure must
//! treat the read as "no usable data", not "empty".

use crate::{
    error::{EngineError, EngineResult},
    stock::{PricePoint, Stock},
};
use rusqlite::types::Value;

/// Raw registry row as stored: (key, name, volatility).
pub type RawStockRow = (Value, Value, Value);

/// Raw series row as stored: (key, value).
pub type RawPriceRow = (Value, Value);

/// Parse registry rows into [`Stock`]s, rejecting the whole read if any
/// row has the wrong shape.
pub fn parse_stocks(rows: Vec<RawStockRow>) -> EngineResult<Vec<Stock>> {
    rows.into_iter()
        .map(|(key, name, volatility)| {
            Some(Stock {
                key:        as_integer(&key)?,
                name:       as_text(name)?,
                volatility: as_number(&volatility)?,
            })
        })
        .collect::<Option<Vec<_>>>()
        .ok_or(EngineError::ValidationFailed {
            table: "Stocks".to_string(),
        })
}

/// Parse series rows into [`PricePoint`]s. `table` names the series table
/// in the failure, since every series has its own.
pub fn parse_prices(table: &str, rows: Vec<RawPriceRow>) -> EngineResult<Vec<PricePoint>> {
    rows.into_iter()
        .map(|(key, value)| {
            Some(PricePoint {
                key:   as_integer(&key)?,
                value: as_number(&value)?,
            })
        })
        .collect::<Option<Vec<_>>>()
        .ok_or(EngineError::ValidationFailed {
            table: table.to_string(),
        })
}

/// Check a stock name before it is ever spliced into a table identifier.
///
/// Names become part of the `ShareValues_<name>` table name verbatim, so
/// they are restricted to an identifier-safe set: ASCII letters, digits and
/// underscores, not starting with a digit.
pub fn stock_name(name: &str) -> EngineResult<()> {
    let mut chars = name.chars();
    let first_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if first_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Ok(());
    }
    Err(EngineError::InvalidInput(format!(
        "stock name '{name}' must match [A-Za-z_][A-Za-z0-9_]*"
    )))
}

fn as_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Integer(i) => Some(*i),
        _ => None,
    }
}

fn as_text(v: Value) -> Option<String> {
    match v {
        Value::Text(s) => Some(s),
        _ => None,
    }
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Real(f) => Some(*f),
        // Numeric affinity: a FLOAT column hands back whole numbers as
        // INTEGER. Anything else is malformed.
        Value::Integer(i) => Some(*i as f64),
        _ => None,
    }
}
