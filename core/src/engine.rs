//! The engine façade — the single public surface over the storage adapter
//! and the tick loop.
//!
//! RULES:
//!   - One engine object per process, constructed explicitly. No ambient
//!     singletons; the engine owns the store handle for its lifetime.
//!   - Callers never see schema or SQL details; failures surface as
//!     explicit results, never panics.

use crate::{
    config::EngineConfig,
    error::{EngineError, EngineResult},
    sim::Ticker,
    stock::{PricePoint, Stock, StockUpdate},
    store::StockStore,
    validate,
};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct StockEngine {
    store:  Arc<Mutex<StockStore>>,
    config: EngineConfig,
    ticker: Option<Ticker>,
}

impl StockEngine {
    /// Open storage, ensure the registry exists and start the tick loop.
    /// A storage failure here is fatal to startup.
    pub fn open(config: EngineConfig) -> EngineResult<Self> {
        let store = StockStore::open(&config.db_path())?;
        store.ensure_registry()?;
        let mut engine = Self::assemble(store, config);
        engine.start_ticker();
        Ok(engine)
    }

    /// Wrap an existing store without starting the tick loop. Used by
    /// tests and tooling that drive ticks explicitly.
    pub fn with_store(store: StockStore) -> EngineResult<Self> {
        store.ensure_registry()?;
        Ok(Self::assemble(store, EngineConfig::default()))
    }

    fn assemble(store: StockStore, config: EngineConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            config,
            ticker: None,
        }
    }

    /// Start the recurring tick task. No-op if it is already running.
    pub fn start_ticker(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        let seed = self.config.seed.unwrap_or_else(rand::random);
        self.ticker = Some(Ticker::spawn(
            Arc::clone(&self.store),
            self.config.tick_interval(),
            seed,
        ));
    }

    /// Stop the recurring tick task. No-op if it is not running.
    pub fn stop_ticker(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }
    }

    /// Whether storage is open and the registry exists.
    pub fn ready(&self) -> bool {
        match self.store.lock() {
            Ok(store) => store.registry_exists().unwrap_or(false),
            Err(_) => false,
        }
    }

    fn store(&self) -> EngineResult<MutexGuard<'_, StockStore>> {
        self.store.lock().map_err(|_| EngineError::StorageUnavailable)
    }

    /// Register a stock: registry row, empty series and one seed point,
    /// all under a single lock acquisition so no caller or tick observes a
    /// partially created stock.
    pub fn add_stock(&self, name: &str, initial_value: f64, volatility: f64) -> EngineResult<()> {
        validate::stock_name(name)?;
        if initial_value < 0.0 {
            return Err(EngineError::InvalidInput(
                "share value can't be negative".to_string(),
            ));
        }
        if volatility < 0.0 {
            return Err(EngineError::InvalidInput(
                "volatility can't be negative".to_string(),
            ));
        }
        let store = self.store()?;
        store.insert_stock(name, volatility)?;
        store.create_series(name)?;
        store.insert_price(name, initial_value)?;
        Ok(())
    }

    pub fn stock_exists(&self, name: &str) -> EngineResult<bool> {
        self.store()?.stock_exists(name)
    }

    /// All registered stocks in registration order. An uninitialized
    /// registry reads as empty here; the absent/empty distinction matters
    /// only to the tick loop.
    pub fn list_stocks(&self) -> EngineResult<Vec<Stock>> {
        Ok(self.store()?.list_stocks()?.unwrap_or_default())
    }

    /// The most recent `max_points` entries of a stock's series, insertion
    /// order preserved.
    pub fn price_history(&self, name: &str, max_points: usize) -> EngineResult<Vec<PricePoint>> {
        let points = self
            .store()?
            .list_prices(name)?
            .ok_or_else(|| EngineError::UnknownSeries {
                name: name.to_string(),
            })?;
        let skip = points.len().saturating_sub(max_points);
        Ok(points.into_iter().skip(skip).collect())
    }

    /// Apply a partial update; each provided field is applied
    /// independently and absent fields are untouched.
    ///
    /// The registry row carries no price, so a share-value update is an
    /// administrative append to the series: the given value becomes the
    /// latest price and the next tick walks from it.
    pub fn update_stock(&self, name: &str, update: StockUpdate) -> EngineResult<()> {
        if let Some(volatility) = update.volatility {
            if volatility < 0.0 {
                return Err(EngineError::InvalidInput(
                    "volatility can't be negative".to_string(),
                ));
            }
        }
        if let Some(share_value) = update.share_value {
            if share_value < 0.0 {
                return Err(EngineError::InvalidInput(
                    "share value can't be negative".to_string(),
                ));
            }
        }

        let store = self.store()?;
        if !store.stock_exists(name)? {
            return Err(EngineError::UnknownStock {
                name: name.to_string(),
            });
        }
        if let Some(volatility) = update.volatility {
            store.update_volatility(name, volatility)?;
        }
        if let Some(share_value) = update.share_value {
            store.insert_price(name, share_value)?;
        }
        Ok(())
    }

    /// Remove a stock from the registry and drop its series.
    ///
    /// Intentionally has no effect yet: deletion semantics are an open
    /// product decision, and callers must not assume anything happened.
    // TODO: delete the registry row and drop the ShareValues_<name> table
    // together once removal semantics are decided.
    pub fn remove_stock(&self, name: &str) -> EngineResult<()> {
        log::warn!("remove_stock('{name}') is not implemented — no rows changed");
        Ok(())
    }
}

impl Drop for StockEngine {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
