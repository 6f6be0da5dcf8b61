//! stock-console: interactive terminal front-end for the stock simulator.
//!
//! Usage:
//!   stock-console                                  # ./stockDB/stocks.db
//!   stock-console --db-dir ./data --interval-ms 250 --seed 42
//!   stock-console --config engine.json
//!
//! The simulator ticks in the background while the console waits for
//! commands; press h for the command list.

use anyhow::Result;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use stocksim_core::{config::EngineConfig, engine::StockEngine, stock::StockUpdate};

const PROMPT: &str = "press h to see commands...";
const HISTORY_POINTS: usize = 20;

type Lines = io::Lines<io::StdinLock<'static>>;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = match str_arg(&args, "--config") {
        Some(path) => EngineConfig::from_file(Path::new(path))?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = str_arg(&args, "--db-dir") {
        config.data_dir = PathBuf::from(dir);
    }
    config.tick_interval_ms = parse_arg(&args, "--interval-ms", config.tick_interval_ms);
    if let Some(seed) = str_arg(&args, "--seed").and_then(|s| s.parse().ok()) {
        config.seed = Some(seed);
    }

    println!("stock-console");
    println!("  db:       {}", config.db_path().display());
    println!("  interval: {}ms", config.tick_interval_ms);
    println!();

    let engine = StockEngine::open(config)?;

    let mut lines = io::stdin().lock().lines();
    loop {
        println!("{PROMPT}");
        let Some(line) = lines.next() else { break };
        match line?.trim().to_lowercase().as_str() {
            "q" | "quit" => {
                println!("Quitting");
                break;
            }
            "c" | "cls" | "clear" => print!("\x1b[2J\x1b[H"),
            "h" | "help" => print_help(),
            "add" | "addstock" => add_stock(&engine, &mut lines)?,
            "stocks" | "logstocks" => log_stocks(&engine)?,
            "history" | "logsharevalues" => log_share_values(&engine, &mut lines)?,
            "update" | "updatestock" => update_stock(&engine, &mut lines)?,
            "" => {}
            other => println!("unknown command '{other}' — press h for help"),
        }
    }
    Ok(())
}

fn print_help() {
    println!("----Commands-----");
    println!("h | help            this list");
    println!("add | addstock      register a stock (name, share value, volatility)");
    println!("stocks              list registered stocks");
    println!("history             last {HISTORY_POINTS} prices of one stock");
    println!("update              change a stock's share value and/or volatility");
    println!("c | clear           clear the screen");
    println!("q | quit            exit");
    println!("-----------------");
}

fn add_stock(engine: &StockEngine, lines: &mut Lines) -> Result<()> {
    if !engine.ready() {
        println!("Database doesn't exist! Can't add stocks!");
        return Ok(());
    }

    let name = loop {
        let Some(answer) = ask("Stock name: ", lines)? else {
            return Ok(());
        };
        if answer.is_empty() {
            println!("INVALID");
            continue;
        }
        if engine.stock_exists(&answer)? {
            println!("Stock already exists!");
            continue;
        }
        break answer;
    };

    let Some(share_value) = ask_number("Share value [float]: ", lines, |n| {
        (n < 0.0).then_some("Share value can't be negative")
    })?
    else {
        return Ok(());
    };
    let Some(volatility) = ask_number("Volatility [float]: ", lines, |n| {
        (n < 0.0).then_some("Volatility can't be negative")
    })?
    else {
        return Ok(());
    };

    match engine.add_stock(&name, share_value, volatility) {
        Ok(()) => println!("Added '{name}'"),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

fn log_stocks(engine: &StockEngine) -> Result<()> {
    let stocks = engine.list_stocks()?;
    if stocks.is_empty() {
        println!("(no stocks)");
        return Ok(());
    }
    for s in &stocks {
        println!("{:>4}  {:<20} volatility {}", s.key, s.name, s.volatility);
    }
    Ok(())
}

fn log_share_values(engine: &StockEngine, lines: &mut Lines) -> Result<()> {
    let Some(name) = ask_stock_name(engine, lines)? else {
        return Ok(());
    };
    match engine.price_history(&name, HISTORY_POINTS) {
        Ok(points) => println!("{}", serde_json::to_string_pretty(&points)?),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

fn update_stock(engine: &StockEngine, lines: &mut Lines) -> Result<()> {
    let Some(name) = ask_stock_name(engine, lines)? else {
        return Ok(());
    };
    let share_value = ask_optional_number("Share value [number | -]: ", lines)?;
    let volatility = ask_optional_number("Volatility [number | -]: ", lines)?;

    match engine.update_stock(
        &name,
        StockUpdate {
            volatility,
            share_value,
        },
    ) {
        Ok(()) => println!("Updated '{name}'"),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

/// Prompt for an existing stock name, listing the valid names on a miss.
fn ask_stock_name(engine: &StockEngine, lines: &mut Lines) -> Result<Option<String>> {
    loop {
        let Some(answer) = ask("Stock name: ", lines)? else {
            return Ok(None);
        };
        if engine.stock_exists(&answer)? {
            return Ok(Some(answer));
        }
        let stocks = engine.list_stocks()?;
        if stocks.is_empty() {
            println!("No stocks registered yet");
            return Ok(None);
        }
        println!("Not a valid stock:");
        for s in &stocks {
            println!("\t{}", s.name);
        }
    }
}

/// One trimmed line of input; None on EOF.
fn ask(prompt: &str, lines: &mut Lines) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(Some(line?.trim().to_string())),
        None => Ok(None),
    }
}

/// Re-ask until the answer parses and passes `accept`, which returns a
/// message for rejected values. None on EOF.
fn ask_number(
    prompt: &str,
    lines: &mut Lines,
    accept: impl Fn(f64) -> Option<&'static str>,
) -> Result<Option<f64>> {
    loop {
        let Some(answer) = ask(prompt, lines)? else {
            return Ok(None);
        };
        match answer.parse::<f64>() {
            Ok(n) => match accept(n) {
                None => return Ok(Some(n)),
                Some(msg) => println!("{msg}"),
            },
            Err(_) => println!("INVALID"),
        }
    }
}

/// Like ask_number, but "-" (or "null") skips the field.
fn ask_optional_number(prompt: &str, lines: &mut Lines) -> Result<Option<f64>> {
    loop {
        let Some(answer) = ask(prompt, lines)? else {
            return Ok(None);
        };
        if answer == "-" || answer == "null" {
            return Ok(None);
        }
        match answer.parse::<f64>() {
            Ok(n) => return Ok(Some(n)),
            Err(_) => println!("Not a number or null"),
        }
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}
