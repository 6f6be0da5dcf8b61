//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database. The simulation loop and the
//! façade call store methods — they never execute SQL directly.
//!
//! The on-disk layout is fixed by existing data directories: one `Stocks`
//! registry table plus one `ShareValues_<name>` table per stock, the prefix
//! concatenated with the stock name verbatim. Stock names are validated
//! before they are spliced into a table identifier; row values are always
//! bound as parameters.

use crate::{
    error::{EngineError, EngineResult},
    stock::{PricePoint, Stock},
    validate,
};
use rusqlite::{params, types::Value, Connection, ErrorCode};
use std::{fs, path::Path};

/// Table-name prefix for per-stock series. Part of the wire format.
pub const SERIES_PREFIX: &str = "ShareValues_";

fn series_table(name: &str) -> String {
    format!("{SERIES_PREFIX}{name}")
}

pub struct StockStore {
    conn: Connection,
}

impl StockStore {
    /// Open (or create) the database at `path`, creating the containing
    /// directory first if needed. Safe to call repeatedly with the same
    /// path.
    pub fn open(path: &Path) -> EngineResult<Self> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let conn = Connection::open(path)?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> EngineResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Create the stock registry table if it does not already exist.
    pub fn ensure_registry(&self) -> EngineResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS Stocks(
                key INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                volatility FLOAT
            );",
        )?;
        Ok(())
    }

    pub fn registry_exists(&self) -> EngineResult<bool> {
        self.table_exists("Stocks")
    }

    pub fn series_exists(&self, name: &str) -> EngineResult<bool> {
        self.table_exists(&series_table(name))
    }

    fn table_exists(&self, table: &str) -> EngineResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Create an empty price series for `name`.
    pub fn create_series(&self, name: &str) -> EngineResult<()> {
        validate::stock_name(name)?;
        if self.series_exists(name)? {
            return Err(EngineError::DuplicateSeries {
                name: name.to_string(),
            });
        }
        self.conn.execute_batch(&format!(
            "CREATE TABLE {}(
                key INTEGER PRIMARY KEY,
                value FLOAT
            );",
            series_table(name)
        ))?;
        Ok(())
    }

    /// Insert a registry row. Uniqueness is enforced by the UNIQUE
    /// constraint rather than a pre-check, so there is no window between
    /// checking and inserting.
    pub fn insert_stock(&self, name: &str, volatility: f64) -> EngineResult<()> {
        validate::stock_name(name)?;
        let inserted = self.conn.execute(
            "INSERT INTO Stocks (name, volatility) VALUES (?1, ?2)",
            params![name, volatility],
        );
        match inserted {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(EngineError::DuplicateStock {
                    name: name.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Append a price point to the named series.
    pub fn insert_price(&self, name: &str, value: f64) -> EngineResult<()> {
        validate::stock_name(name)?;
        if !self.series_exists(name)? {
            return Err(EngineError::UnknownSeries {
                name: name.to_string(),
            });
        }
        self.conn.execute(
            &format!("INSERT INTO {} (value) VALUES (?1)", series_table(name)),
            params![value],
        )?;
        Ok(())
    }

    /// All registry rows in key order, or None if the registry has never
    /// been created. A malformed row rejects the whole read.
    pub fn list_stocks(&self) -> EngineResult<Option<Vec<Stock>>> {
        if !self.registry_exists()? {
            return Ok(None);
        }
        let mut stmt = self
            .conn
            .prepare("SELECT key, name, volatility FROM Stocks ORDER BY key ASC")?;
        let raw = stmt
            .query_map([], |row| {
                Ok((row.get::<_, Value>(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        validate::parse_stocks(raw).map(Some)
    }

    /// The full price series ascending by key, or None if the series does
    /// not exist.
    pub fn list_prices(&self, name: &str) -> EngineResult<Option<Vec<PricePoint>>> {
        validate::stock_name(name)?;
        if !self.series_exists(name)? {
            return Ok(None);
        }
        let table = series_table(name);
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT key, value FROM {table} ORDER BY key ASC"))?;
        let raw = stmt
            .query_map([], |row| Ok((row.get::<_, Value>(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        validate::parse_prices(&table, raw).map(Some)
    }

    /// Delete the `count` lowest-key rows from the named series. A zero
    /// count is a no-op.
    pub fn trim_oldest(&self, name: &str, count: usize) -> EngineResult<()> {
        validate::stock_name(name)?;
        if count == 0 {
            return Ok(());
        }
        if !self.series_exists(name)? {
            return Err(EngineError::UnknownSeries {
                name: name.to_string(),
            });
        }
        let table = series_table(name);
        self.conn.execute(
            &format!(
                "DELETE FROM {table} WHERE key IN (
                    SELECT key FROM {table} ORDER BY key ASC LIMIT ?1
                )"
            ),
            params![count as i64],
        )?;
        Ok(())
    }

    /// Update the volatility on the registry row for `name`. Matching no
    /// row is not an error.
    pub fn update_volatility(&self, name: &str, volatility: f64) -> EngineResult<()> {
        self.conn.execute(
            "UPDATE Stocks SET volatility = ?1 WHERE name = ?2",
            params![volatility, name],
        )?;
        Ok(())
    }

    /// Registry lookup by name. False when the registry is absent.
    pub fn stock_exists(&self, name: &str) -> EngineResult<bool> {
        if !self.registry_exists()? {
            return Ok(false);
        }
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM Stocks WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
