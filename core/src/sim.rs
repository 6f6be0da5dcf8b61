//! The simulation loop — advances every stock's price on a fixed cadence
//! and keeps each series bounded.
//!
//! RULES:
//!   - Ticks never overlap. The next tick is scheduled only after the
//!     current one completes, so a slow tick delays the next rather than
//!     stacking on top of it.
//!   - Per-stock failures are isolated. One stock's bad series must not
//!     halt price advancement for the others.
//!   - Only a fatal storage fault stops the loop, and it is reported,
//!     never retried.

use crate::{error::EngineResult, rng::WalkRng, stock::Stock, store::StockStore};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};

/// Max number of points retained per series. Part of the wire format.
pub const RETENTION_CAP: usize = 1000;

/// Pause between the end of one tick and the start of the next.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// What one tick did to one stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A new point was appended (and the series trimmed if over the cap).
    Advanced,
    /// The candidate price was negative — nothing stored this tick.
    Held,
    /// Series missing or empty — stock skipped this tick.
    Skipped,
}

/// Counts for one full pass over the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub advanced: usize,
    pub held:     usize,
    pub skipped:  usize,
}

/// Run one tick: read the registry and advance each stock independently.
/// An absent registry skips the tick body entirely; a per-stock failure is
/// logged and counted as skipped.
pub fn run_tick(store: &StockStore, rng: &mut WalkRng) -> EngineResult<TickStats> {
    let mut stats = TickStats::default();
    let Some(stocks) = store.list_stocks()? else {
        return Ok(stats);
    };

    for stock in &stocks {
        let delta = rng.range(-stock.volatility, stock.volatility);
        match advance_stock(store, stock, delta) {
            Ok(StepOutcome::Advanced) => stats.advanced += 1,
            Ok(StepOutcome::Held) => stats.held += 1,
            Ok(StepOutcome::Skipped) => stats.skipped += 1,
            Err(e) => {
                log::warn!("stock '{}' skipped this tick: {e}", stock.name);
                stats.skipped += 1;
            }
        }
    }
    Ok(stats)
}

/// Advance a single stock by `delta`. Split out from [`run_tick`] so the
/// walk step can be driven with a known delta.
pub fn advance_stock(store: &StockStore, stock: &Stock, delta: f64) -> EngineResult<StepOutcome> {
    let Some(points) = store.list_prices(&stock.name)? else {
        return Ok(StepOutcome::Skipped);
    };
    // A series with no points has no latest price to walk from.
    let Some(latest) = points.last() else {
        return Ok(StepOutcome::Skipped);
    };

    let candidate = latest.value + delta;
    if candidate < 0.0 {
        return Ok(StepOutcome::Held);
    }

    store.insert_price(&stock.name, candidate)?;
    let new_len = points.len() + 1;
    if new_len > RETENTION_CAP {
        store.trim_oldest(&stock.name, new_len - RETENTION_CAP)?;
    }
    Ok(StepOutcome::Advanced)
}

/// Handle to the recurring tick task. Owned by the engine; stopping (or
/// dropping) it joins the thread.
pub struct Ticker {
    stop:   Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Ticker {
    /// Spawn the loop against a shared store. It runs until [`stop`] is
    /// called or the store lock is poisoned.
    ///
    /// [`stop`]: Ticker::stop
    pub fn spawn(store: Arc<Mutex<StockStore>>, interval: Duration, seed: u64) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            let mut rng = WalkRng::new(seed);
            log::info!("ticker started: interval={}ms seed={seed}", interval.as_millis());
            while !stop_flag.load(Ordering::Relaxed) {
                match store.lock() {
                    Ok(store) => match run_tick(&store, &mut rng) {
                        Ok(stats) => log::debug!(
                            "tick: advanced={} held={} skipped={}",
                            stats.advanced,
                            stats.held,
                            stats.skipped
                        ),
                        Err(e) => log::warn!("tick skipped: {e}"),
                    },
                    Err(_) => {
                        log::error!("store lock poisoned — ticker stopping");
                        break;
                    }
                }
                thread::sleep(interval);
            }
            log::info!("ticker stopped");
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Signal the loop to stop and wait for any in-flight tick to finish.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
