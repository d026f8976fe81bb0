//! Command-line arguments for the trade tail client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use trade_common::endpoint::DEFAULT_STREAM_URL;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(
    version,
    about = "Tail JSON trade data from a real-time market data stream",
    long_about = None
)]
pub struct Args {
    /// A symbol to subscribe to. Repeat the flag for more symbols.
    #[clap(long = "symbol", value_name = "SYMBOL")]
    pub symbols: Vec<String>,

    /// Path to a text file with extra symbols to subscribe to.
    /// Symbols may be separated by commas, spaces, or new lines.
    #[clap(long, value_name = "PATH")]
    pub symbols_file: Option<String>,

    /// Stream API token.
    #[clap(long, env = "FINNHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Stream endpoint; the token is appended as the `token` query parameter.
    #[clap(long, env = "TRADE_TAIL_ENDPOINT", default_value = DEFAULT_STREAM_URL)]
    pub endpoint: String,

    /// Seconds between keep-alive ping frames.
    #[clap(long, default_value_t = 60)]
    pub keepalive_secs: u64,

    /// Log and skip malformed messages instead of exiting.
    #[clap(long)]
    pub skip_malformed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeatable_symbols_keep_order() {
        let args = Args::try_parse_from([
            "trade_client",
            "--symbol",
            "BTCUSDT",
            "--symbol",
            "ETHUSDT",
            "--token",
            "t",
        ])
        .unwrap();
        assert_eq!(args.symbols, vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(args.token.as_deref(), Some("t"));
        assert_eq!(args.keepalive_secs, 60);
        assert!(!args.skip_malformed);
    }

    #[test]
    fn flags_are_optional_at_parse_time() {
        let args = Args::try_parse_from(["trade_client", "--skip-malformed", "--keepalive-secs", "5"])
            .unwrap();
        assert!(args.symbols.is_empty());
        assert!(args.skip_malformed);
        assert_eq!(args.keepalive_secs, 5);
    }
}
