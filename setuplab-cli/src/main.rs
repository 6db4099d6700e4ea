//! SetupLab CLI: evaluate a two-timeframe trade setup from the command line.
//!
//! Commands:
//! - `evaluate`: load higher/lower timeframe bars, evaluate a price, print the decision
//! - `config`: print the effective selector config and its hash
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`).

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use setuplab_core::synthetic::synthetic_series;
use setuplab_core::{Bar, MarketAnalysis, PriceSeries, SelectorConfig, TradeSelector};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Parser)]
#[command(
    name = "setuplab",
    about = "SetupLab CLI: rule-based trade setups from two timeframes"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the current price against both timeframes.
    Evaluate {
        /// Higher-timeframe CSV (datetime,open,high,low,close,volume).
        #[arg(long)]
        htf: Option<PathBuf>,

        /// Lower-timeframe CSV (datetime,open,high,low,close,volume).
        #[arg(long)]
        ltf: Option<PathBuf>,

        /// Price to evaluate. Defaults to the last lower-timeframe close.
        #[arg(long)]
        price: Option<f64>,

        /// Path to a TOML selector config. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Use synthetic data for any timeframe without a CSV.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Print the full analysis as JSON instead of a summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the effective selector config and its hash.
    Config {
        /// Path to a TOML selector config.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            htf,
            ltf,
            price,
            config,
            synthetic,
            json,
        } => run_evaluate(htf, ltf, price, config, synthetic, json),
        Commands::Config { config } => run_config(config),
    }
}

fn load_config(path: Option<&Path>) -> Result<SelectorConfig> {
    match path {
        Some(path) => SelectorConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(SelectorConfig::default()),
    }
}

fn run_evaluate(
    htf_path: Option<PathBuf>,
    ltf_path: Option<PathBuf>,
    price: Option<f64>,
    config_path: Option<PathBuf>,
    synthetic: bool,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;

    let htf = load_series("htf", htf_path.as_deref(), synthetic, 200, 240)?;
    let ltf = load_series("ltf", ltf_path.as_deref(), synthetic, 400, 15)?;

    let current_price = match price {
        Some(p) if p.is_finite() && p > 0.0 => p,
        Some(p) => bail!("--price must be a positive number, got {p}"),
        None => ltf
            .last()
            .map(|b| b.close)
            .context("lower timeframe has no bars to take a price from")?,
    };

    info!(
        htf_bars = htf.len(),
        ltf_bars = ltf.len(),
        current_price,
        config_hash = %config.config_hash(),
        "evaluating"
    );

    let selector = TradeSelector::new(htf, ltf, config)?;
    let analysis = selector.analyze(current_price)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_summary(&analysis);
    }

    if synthetic && (htf_path.is_none() || ltf_path.is_none()) {
        println!();
        println!("WARNING: Decision based on SYNTHETIC data");
    }

    Ok(())
}

fn run_config(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    println!("config_hash: {}", config.config_hash());
    Ok(())
}

/// A file when given, synthetic bars when allowed, an error otherwise.
fn load_series(
    label: &str,
    path: Option<&Path>,
    synthetic: bool,
    synthetic_bars: usize,
    bar_minutes: i64,
) -> Result<PriceSeries> {
    match path {
        Some(path) => load_csv(label, path),
        None if synthetic => {
            warn!(timeframe = label, bars = synthetic_bars, "using synthetic data");
            Ok(synthetic_series(
                &format!("{label}-synthetic"),
                synthetic_bars,
                bar_minutes,
            )?)
        }
        None => bail!("--{label} is required (or pass --synthetic)"),
    }
}

#[derive(Debug, Deserialize)]
struct CsvBar {
    datetime: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

fn load_csv(label: &str, path: &Path) -> Result<PriceSeries> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut bars = Vec::new();
    for (row, record) in reader.deserialize::<CsvBar>().enumerate() {
        // Header is line 1.
        let line = row + 2;
        let record = record.with_context(|| format!("{}:{line}: malformed row", path.display()))?;
        let timestamp = NaiveDateTime::parse_from_str(&record.datetime, DATETIME_FORMAT)
            .with_context(|| {
                format!(
                    "{}:{line}: bad datetime '{}' (expected {DATETIME_FORMAT})",
                    path.display(),
                    record.datetime
                )
            })?;
        let bar = Bar {
            timestamp,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        };
        bar.validate()
            .with_context(|| format!("{}:{line}: rejected bar", path.display()))?;
        bars.push(bar);
    }

    info!(timeframe = label, bars = bars.len(), path = %path.display(), "loaded csv");
    PriceSeries::new(label, bars).with_context(|| format!("building {label} series"))
}

fn print_summary(analysis: &MarketAnalysis) {
    let m = &analysis.momentum;
    println!();
    println!("=== Market ===");
    println!("Price:          {:.4}", analysis.current_price);
    println!(
        "Structure:      {} BOS, {} CHOCH",
        analysis.structure.bos.len(),
        analysis.structure.choch.len()
    );
    println!(
        "Zones:          {} supply, {} demand",
        analysis.zones.supply.len(),
        analysis.zones.demand.len()
    );
    println!("Triggers:       {}", analysis.triggers.len());
    println!(
        "Momentum:       RSI {:.1}  %K {:.1}  %D {:.1}  MOM {:.4}",
        m.rsi, m.stoch_k, m.stoch_d, m.momentum
    );
    println!();

    match &analysis.decision {
        None => println!("=== No trade ==="),
        Some(d) => {
            println!("=== Trade ===");
            println!("Direction:      {}", d.direction);
            println!("Trigger:        {} (bar {})", d.trigger_type, d.trigger_index);
            println!("Entry:          {:.4}", d.entry_price);
            println!("Stop:           {:.4}", d.stop_loss);
            println!("Target:         {:.4}", d.target_price);
            println!("Risk/Reward:    {:.2}", d.risk_reward);
        }
    }
}
