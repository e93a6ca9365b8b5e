//! SignalScore CLI — score CSV price histories and list the asset catalog.
//!
//! Commands:
//! - `analyze` — run the indicator pipeline and signal scorer over CSV bar files
//! - `assets` — list the configured asset catalog

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde_json::json;
use signalscore_core::data::read_bars_path;
use signalscore_core::currency::format_money;
use signalscore_core::{Analysis, Analyzer, AppConfig, ConversionContext, PipelineError};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "signalscore",
    about = "SignalScore CLI — technical-analysis signal scoring for daily price histories"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one or more CSV files (date,open,high,low,close[,volume]).
    Analyze {
        /// CSV files to analyse. Results print in argument order.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Catalog ticker the files belong to (e.g., GC=F). Selects per-gram pricing.
        #[arg(long)]
        asset: Option<String>,

        /// Base-to-local fx rate. Defaults to the configured rate.
        #[arg(long)]
        fx_rate: Option<f64>,

        /// Treat prices as per troy ounce and show local prices per gram.
        #[arg(long, default_value_t = false)]
        commodity: bool,

        /// Path to a TOML config file. Defaults to the built-in catalog.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print all analyses as one JSON array.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List the configured asset catalog.
    Assets {
        /// Path to a TOML config file. Defaults to the built-in catalog.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            files,
            asset,
            fx_rate,
            commodity,
            config,
            json,
        } => run_analyze(&files, asset.as_deref(), fx_rate, commodity, config.as_deref(), json),
        Commands::Assets { config } => run_assets(config.as_deref()),
    }
}

/// Log to stderr so `--json` output stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("signalscore=info,signalscore_core=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(p) => AppConfig::from_file(p)
            .with_context(|| format!("loading config from {}", p.display())),
        None => Ok(AppConfig::default()),
    }
}

fn build_conversion(
    config: &AppConfig,
    asset: Option<&str>,
    fx_rate: Option<f64>,
    commodity: bool,
) -> Result<ConversionContext> {
    let spec = match asset {
        Some(ticker) => match config.find_asset(ticker) {
            Some(spec) => Some(spec),
            None => bail!("unknown asset '{ticker}'. Run `signalscore assets` for the catalog"),
        },
        None => None,
    };
    let ctx = config.conversion_for(spec, fx_rate)?;
    Ok(if commodity {
        ctx.with_physical_commodity_unit(true)
    } else {
        ctx
    })
}

fn run_analyze(
    files: &[PathBuf],
    asset: Option<&str>,
    fx_rate: Option<f64>,
    commodity: bool,
    config_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let ctx = build_conversion(&config, asset, fx_rate, commodity)?;
    let analyzer = Analyzer::default();
    info!(files = files.len(), fx_rate = ctx.fx_rate(), "analysing");

    let results: Vec<(&PathBuf, Result<Analysis>)> = files
        .par_iter()
        .map(|path| (path, analyze_file(&analyzer, path, &ctx)))
        .collect();

    let mut failures = 0;
    let mut docs = Vec::new();
    for (path, result) in results {
        match result {
            Ok(analysis) if json => {
                docs.push(json!({ "file": path.display().to_string(), "analysis": analysis }));
            }
            Ok(analysis) => print!("{}", render_text(path, &analysis, &ctx)?),
            Err(e) => {
                failures += 1;
                eprintln!("Error for {}: {e:#}", path.display());
            }
        }
    }
    if json {
        println!("{}", json_report(docs)?);
    }

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Read and score one file. A file without a single usable close gives the
/// neutral result instead of failing the batch.
fn analyze_file(analyzer: &Analyzer, path: &Path, ctx: &ConversionContext) -> Result<Analysis> {
    let bars = read_bars_path(path).with_context(|| format!("reading {}", path.display()))?;
    match analyzer.analyze(&bars, Some(ctx)) {
        Ok(analysis) => Ok(analysis),
        Err(PipelineError::InsufficientData { bars: n }) => {
            warn!(file = %path.display(), bars = n, "no usable close price, reporting neutral");
            Ok(Analysis::neutral(&bars))
        }
    }
}

/// All successful analyses as one JSON array, in argument order.
fn json_report(docs: Vec<serde_json::Value>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&serde_json::Value::Array(docs))
}

fn render_text(
    path: &Path,
    analysis: &Analysis,
    ctx: &ConversionContext,
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let result = &analysis.result;
    let date = analysis
        .scored_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "no data".into());

    writeln!(out, "== {} ({date}) ==", path.display())?;
    writeln!(out, "{:<12}{} / 100  {}", "Score:", result.score, analysis.label)?;
    writeln!(out, "{:<12}{:?}", "Confidence:", result.confidence)?;

    if let Some(snapshot) = analysis.latest_snapshot() {
        let money = |v: f64| format_money(v, Some(ctx));
        writeln!(
            out,
            "{:<12}{} (std dev {})",
            "Risk:",
            analysis.risk,
            money(result.volatility)
        )?;
        let adx = snapshot
            .adx_14
            .value()
            .map_or_else(|| "n/a".to_string(), |v| format!("{v:.1}"));
        writeln!(out, "{:<12}{} (ADX {adx})", "Trend:", analysis.trend_strength)?;
        if result.atr > 0.0 {
            writeln!(out, "{:<12}{}", "ATR 14d:", money(result.atr))?;
        } else {
            writeln!(out, "{:<12}n/a", "ATR 14d:")?;
        }
        if let Some(price) = &analysis.price {
            let change = price
                .change_pct
                .map_or_else(String::new, |c| format!("  {c:+.2}%"));
            writeln!(out, "{:<12}{}{change}", "Price:", money(price.last_close))?;
        }
    }

    writeln!(out, "Reasons:")?;
    for reason in &result.reasons {
        writeln!(out, "  - {reason}")?;
    }
    writeln!(out, "{:<12}{}", "Dataset:", &analysis.dataset_hash.0[..12])?;
    out.push('\n');
    Ok(out)
}

fn run_assets(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    println!("Currency: {}  fx rate: {}", config.currency, config.fx_rate);
    println!();
    println!("{:<10} {:<20} {:<10} {}", "Ticker", "Name", "Class", "Local unit");
    println!("{}", "-".repeat(52));
    for asset in &config.assets {
        let unit = if asset.physical_commodity_unit { "/gram" } else { "/unit" };
        println!("{:<10} {:<20} {:<10} {}", asset.ticker, asset.name, asset.class, unit);
    }

    Ok(())
}
