//! Ticker thread tests: background advancement, the stop hook, and
//! engine restarts against the same data directory.

use std::{thread, time::Duration};
use stocksim_core::{config::EngineConfig, engine::StockEngine, store::StockStore};

#[test]
fn ticker_advances_prices_in_the_background_and_stops_on_request() {
    let mut engine =
        StockEngine::with_store(StockStore::in_memory().expect("store")).expect("engine");
    // Volatility 0 keeps every walked value equal to the seed point, so
    // only the count changes while the ticker runs.
    engine.add_stock("Acme", 100.0, 0.0).expect("add");

    engine.start_ticker();
    engine.start_ticker(); // idempotent
    thread::sleep(Duration::from_millis(550));
    engine.stop_ticker();

    let after_stop = engine.price_history("Acme", usize::MAX).expect("history");
    assert!(
        after_stop.len() > 1,
        "expected background ticks, got {} points",
        after_stop.len()
    );
    assert!(after_stop.iter().all(|p| p.value == 100.0));

    // Stopped means stopped: no further growth.
    thread::sleep(Duration::from_millis(250));
    let later = engine.price_history("Acme", usize::MAX).expect("history");
    assert_eq!(after_stop.len(), later.len());
}

#[test]
fn open_is_idempotent_across_restarts() {
    let dir = std::env::temp_dir().join(format!("stocksim-ticker-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let config = EngineConfig {
        data_dir: dir.clone(),
        seed: Some(1),
        ..Default::default()
    };

    {
        let engine = StockEngine::open(config.clone()).expect("open");
        engine.add_stock("Acme", 10.0, 0.5).expect("add");
        assert!(engine.ready());
    } // drop stops the ticker

    {
        let engine = StockEngine::open(config).expect("reopen");
        assert!(engine.ready());
        assert!(engine.stock_exists("Acme").expect("probe"));
        let history = engine.price_history("Acme", 1).expect("history");
        assert_eq!(history.len(), 1);
    }

    let _ = std::fs::remove_dir_all(&dir);
}
