//! Simulation loop tests: the walk step, the retention cap, per-stock
//! failure isolation and walk determinism.

use stocksim_core::{
    rng::WalkRng,
    sim::{self, StepOutcome, TickStats, RETENTION_CAP},
    stock::Stock,
    store::StockStore,
};

fn seeded_store(name: &str, initial: f64, volatility: f64) -> StockStore {
    let s = StockStore::in_memory().expect("store");
    s.ensure_registry().expect("registry");
    add(&s, name, initial, volatility);
    s
}

fn add(s: &StockStore, name: &str, initial: f64, volatility: f64) {
    s.insert_stock(name, volatility).expect("stock");
    s.create_series(name).expect("series");
    s.insert_price(name, initial).expect("seed");
}

fn stock(s: &StockStore, name: &str) -> Stock {
    s.list_stocks()
        .expect("list")
        .expect("registry")
        .into_iter()
        .find(|st| st.name == name)
        .expect("stock registered")
}

fn prices(s: &StockStore, name: &str) -> Vec<f64> {
    s.list_prices(name)
        .expect("read")
        .expect("series present")
        .iter()
        .map(|p| p.value)
        .collect()
}

#[test]
fn fixed_negative_delta_walks_the_price_down() {
    let s = seeded_store("Acme", 100.0, 5.0);
    let acme = stock(&s, "Acme");

    let out = sim::advance_stock(&s, &acme, -3.0).expect("step");
    assert_eq!(out, StepOutcome::Advanced);
    assert_eq!(prices(&s, "Acme"), vec![100.0, 97.0]);
}

#[test]
fn negative_candidate_is_discarded_for_the_tick() {
    let s = seeded_store("Acme", 100.0, 5.0);
    let acme = stock(&s, "Acme");

    let out = sim::advance_stock(&s, &acme, -150.0).expect("step");
    assert_eq!(out, StepOutcome::Held);
    assert_eq!(prices(&s, "Acme"), vec![100.0]);
}

#[test]
fn overfull_series_is_cut_back_to_the_cap() {
    // 1001 points: the seed 0.0 plus 1.0..=1000.0.
    let s = seeded_store("Acme", 0.0, 5.0);
    for v in 1..=1000 {
        s.insert_price("Acme", v as f64).expect("fill");
    }
    let acme = stock(&s, "Acme");

    sim::advance_stock(&s, &acme, 1.0).expect("step");
    let values = prices(&s, "Acme");
    assert_eq!(values.len(), RETENTION_CAP);
    // The two oldest points (0.0 and 1.0) are gone; the rest kept order.
    assert_eq!(values[0], 2.0);
    assert_eq!(values[1], 3.0);
    assert_eq!(*values.last().expect("nonempty"), 1001.0);
}

#[test]
fn cap_is_never_exceeded_after_a_tick() {
    // Start exactly at the cap.
    let s = seeded_store("Acme", 0.0, 5.0);
    for v in 1..RETENTION_CAP {
        s.insert_price("Acme", v as f64).expect("fill");
    }
    let acme = stock(&s, "Acme");
    assert_eq!(prices(&s, "Acme").len(), RETENTION_CAP);

    for i in 0..3 {
        sim::advance_stock(&s, &acme, 1.0).expect("step");
        assert_eq!(prices(&s, "Acme").len(), RETENTION_CAP, "after step {i}");
    }
}

#[test]
fn absent_registry_skips_the_tick_body() {
    let s = StockStore::in_memory().expect("store");
    let mut rng = WalkRng::new(7);

    let stats = sim::run_tick(&s, &mut rng).expect("tick without registry");
    assert_eq!(stats, TickStats::default());

    s.ensure_registry().expect("registry");
    let stats = sim::run_tick(&s, &mut rng).expect("tick over empty registry");
    assert_eq!(stats, TickStats::default());
}

#[test]
fn run_tick_advances_every_stock_within_its_volatility() {
    let s = seeded_store("Acme", 100.0, 5.0);
    add(&s, "Bolt", 50.0, 2.0);
    let mut rng = WalkRng::new(42);

    let stats = sim::run_tick(&s, &mut rng).expect("tick");
    assert_eq!(stats.advanced, 2);

    for (name, start, volatility) in [("Acme", 100.0, 5.0), ("Bolt", 50.0, 2.0)] {
        let values = prices(&s, name);
        assert_eq!(values.len(), 2, "{name} gained one point");
        assert_eq!(values[0], start);
        let delta: f64 = values[1] - start;
        assert!(
            delta.abs() < volatility,
            "{name}: delta {delta} outside ±{volatility}"
        );
    }
}

#[test]
fn a_stock_without_a_series_does_not_stop_the_tick() {
    let s = seeded_store("Acme", 100.0, 5.0);
    // A registry row with no series table behind it.
    s.insert_stock("Ghost", 1.0).expect("row only");
    let mut rng = WalkRng::new(9);

    let stats = sim::run_tick(&s, &mut rng).expect("tick");
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.advanced, 1);
    assert_eq!(prices(&s, "Acme").len(), 2);
}

#[test]
fn an_empty_series_is_skipped() {
    let s = StockStore::in_memory().expect("store");
    s.ensure_registry().expect("registry");
    s.insert_stock("Acme", 5.0).expect("stock");
    s.create_series("Acme").expect("series, no seed point");
    let acme = stock(&s, "Acme");

    let out = sim::advance_stock(&s, &acme, 1.0).expect("step");
    assert_eq!(out, StepOutcome::Skipped);
    assert_eq!(prices(&s, "Acme"), Vec::<f64>::new());
}

#[test]
fn same_seed_reproduces_the_walk() {
    let walk = |seed: u64| -> Vec<f64> {
        let s = seeded_store("Acme", 100.0, 5.0);
        let mut rng = WalkRng::new(seed);
        for _ in 0..25 {
            sim::run_tick(&s, &mut rng).expect("tick");
        }
        prices(&s, "Acme")
    };

    let a = walk(123);
    let b = walk(123);
    assert_eq!(a, b, "same seed must reproduce the walk exactly");

    let c = walk(124);
    assert_ne!(a, c, "different seeds must diverge");
}
