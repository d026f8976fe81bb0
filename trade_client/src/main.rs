//! Trade Client — a websocket client that subscribes to real-time trades for a set of
//! symbols and prints every trade record to stdout as one JSON object per line
//! (CR LF terminated). It sends one subscription request per symbol, keeps the
//! connection alive with periodic pings, answers server `ping` messages, and runs
//! until the server closes the connection.
//!
//! Usage example (CLI):
//! ```bash
//! FINNHUB_TOKEN=... trade_client --symbol BINANCE:BTCUSDT --symbol AAPL
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` to change the level (default `info`).
#![warn(missing_docs)]
mod args;
mod config;
mod connection;
mod reader;
mod session;
mod writer;

use crate::args::Args;
use crate::config::TailConfig;
use clap::Parser;
use log::{error, info};
use std::process::ExitCode;
use trade_common::Result;

#[tokio::main]
async fn main() -> ExitCode {
    init_logger();
    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Validates `args`, then tails the stream to stdout until the connection ends.
async fn run(args: Args) -> Result<()> {
    let config = TailConfig::from_args(&args)?;
    info!("Symbols: {:?}", config.symbols);

    let report = session::run_session(config, tokio::io::stdout()).await?;

    info!(
        "Session ended: {} trades written, {} subscriptions sent",
        report.reader.trades, report.writer.subscriptions
    );
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
