//! scorelab CLI — run, sweep, and summary commands.
//!
//! Commands:
//! - `run` — execute a backtest from a TOML or JSON config against CSV or synthetic data
//! - `sweep` — grid over entry/exit thresholds, run in parallel
//! - `summary` — print the digest of a saved result
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use scorelab_core::data::{CsvPriceProvider, PriceProvider, SyntheticProvider};
use scorelab_core::BacktestConfig;
use scorelab_runner::{
    best_by_sharpe, default_result_path, export_equity_csv, export_trades_csv, load_for_config,
    load_result, run_backtest, run_sweep, save_result, ThresholdGrid,
};

#[derive(Parser)]
#[command(name = "scorelab", about = "scorelab — score-driven bar-replay backtester")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DataSource {
    /// Directory of `<TOKEN>.csv` files with `timestamp,price` rows.
    #[arg(long, conflicts_with = "synthetic")]
    data_dir: Option<PathBuf>,

    /// Use a deterministic synthetic random walk instead of CSV files.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Master seed for synthetic data.
    #[arg(long, default_value_t = 42, requires = "synthetic")]
    seed: u64,

    /// First price of every synthetic series.
    #[arg(long, requires = "synthetic")]
    start_price: Option<f64>,

    /// Annualized synthetic volatility as a fraction (0.8 = 80%).
    #[arg(long, requires = "synthetic")]
    volatility: Option<f64>,

    /// Annualized synthetic drift as a fraction.
    #[arg(long, requires = "synthetic")]
    drift: Option<f64>,
}

impl DataSource {
    fn provider(&self) -> Result<Box<dyn PriceProvider>> {
        match (&self.data_dir, self.synthetic) {
            (_, true) => Ok(Box::new(self.synthetic_provider())),
            (Some(dir), false) => {
                if !dir.is_dir() {
                    bail!("data directory {} does not exist", dir.display());
                }
                Ok(Box::new(CsvPriceProvider::new(dir)))
            }
            (None, false) => bail!("pass --data-dir <dir> or --synthetic"),
        }
    }

    fn synthetic_provider(&self) -> SyntheticProvider {
        let mut provider = SyntheticProvider::new(self.seed);
        if let Some(price) = self.start_price {
            provider = provider.with_start_price(price);
        }
        if let Some(volatility) = self.volatility {
            provider = provider.with_volatility(volatility);
        }
        if let Some(drift) = self.drift {
            provider = provider.with_drift(drift);
        }
        provider
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML or JSON config file.
    Run {
        /// Path to a config file (`.json` is read as JSON, anything else as TOML).
        #[arg(long)]
        config: PathBuf,

        #[command(flatten)]
        data: DataSource,

        /// Result JSON path. Defaults to .backtest-results/latest.json.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Also write `trades.csv` and `equity.csv` next to the result.
        #[arg(long, default_value_t = false)]
        csv: bool,
    },
    /// Run a grid of entry/exit thresholds.
    Sweep {
        /// Path to a config file (`.json` is read as JSON, anything else as TOML).
        #[arg(long)]
        config: PathBuf,

        /// Entry thresholds, comma separated.
        #[arg(long, value_delimiter = ',', default_value = "55,62,70")]
        entry: Vec<f64>,

        /// Exit thresholds, comma separated.
        #[arg(long, value_delimiter = ',', default_value = "35,40")]
        exit: Vec<f64>,

        #[command(flatten)]
        data: DataSource,
    },
    /// Print the summary of a saved result.
    Summary {
        /// Result JSON. Defaults to .backtest-results/latest.json.
        file: Option<PathBuf>,
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
        Commands::Run {
            config,
            data,
            output,
            csv,
        } => cmd_run(&config, &data, output, csv),
        Commands::Sweep {
            config,
            entry,
            exit,
            data,
        } => cmd_sweep(&config, &data, entry, exit),
        Commands::Summary { file } => cmd_summary(file),
    }
}

fn load_config(path: &Path) -> Result<BacktestConfig> {
    BacktestConfig::from_file(path)
        .with_context(|| format!("failed to load config {}", path.display()))
}

fn cmd_run(config_path: &Path, data: &DataSource, output: Option<PathBuf>, csv: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let provider = data.provider()?;
    let result = run_backtest(&config, provider.as_ref()).context("backtest failed")?;

    let path = output.unwrap_or_else(default_result_path);
    save_result(&result, &path)?;

    if csv {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::write(dir.join("trades.csv"), export_trades_csv(&result.trades)?)
            .context("failed to write trades.csv")?;
        std::fs::write(dir.join("equity.csv"), export_equity_csv(&result.equity_curve)?)
            .context("failed to write equity.csv")?;
    }

    info!(path = %path.display(), run_id = %result.run_id, "result saved");
    print!("{}", result.summary());
    println!("Saved result to {}", path.display());
    Ok(())
}

fn cmd_sweep(config_path: &Path, data: &DataSource, entry: Vec<f64>, exit: Vec<f64>) -> Result<()> {
    let config = load_config(config_path)?;
    let provider = data.provider()?;
    let series = load_for_config(&config, provider.as_ref()).context("failed to load series")?;

    let grid = ThresholdGrid::new(entry, exit);
    if grid.size() == 0 {
        bail!("sweep grid is empty");
    }
    let points = run_sweep(&grid, &config, &series).context("sweep failed")?;

    println!(
        "{:>6} {:>6} {:>10} {:>8} {:>8} {:>7}",
        "entry", "exit", "return%", "maxdd%", "sharpe", "trades"
    );
    for p in &points {
        let m = &p.result.metrics;
        println!(
            "{:>6.1} {:>6.1} {:>10.2} {:>8.2} {:>8.2} {:>7}",
            p.entry_threshold,
            p.exit_threshold,
            m.total_return_pct,
            m.max_drawdown_pct,
            m.sharpe,
            m.trade_count
        );
    }
    if let Some(best) = best_by_sharpe(&points) {
        println!(
            "Best Sharpe: entry {:.1} / exit {:.1} ({:.2})",
            best.entry_threshold, best.exit_threshold, best.result.metrics.sharpe
        );
    }
    Ok(())
}

fn cmd_summary(file: Option<PathBuf>) -> Result<()> {
    let path = file.unwrap_or_else(default_result_path);
    let result = load_result(&path)?;
    print!("{}", result.summary());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use scorelab_core::BarInterval;

    fn data_source(args: &[&str]) -> std::result::Result<DataSource, clap::Error> {
        let mut argv = vec!["scorelab", "run", "--config", "c.toml"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv)?.command {
            Commands::Run { data, .. } => Ok(data),
            _ => unreachable!("parsed a run command"),
        }
    }

    #[test]
    fn synthetic_options_shape_the_series() {
        let data = data_source(&["--synthetic", "--seed", "7", "--start-price", "250"]).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = data
            .provider()
            .unwrap()
            .get_prices("X", day, day + chrono::Duration::days(9), BarInterval::OneDay)
            .unwrap();
        assert_eq!(bars[0].price, 250.0);
    }

    #[test]
    fn synthetic_options_require_synthetic() {
        assert!(data_source(&["--data-dir", "data", "--volatility", "0.5"]).is_err());
        assert!(data_source(&["--data-dir", "data", "--drift", "0.1"]).is_err());
    }

    #[test]
    fn missing_source_is_an_error() {
        let data = data_source(&[]).unwrap();
        assert!(data.provider().is_err());
    }
}
