//! Validated runtime configuration.
//!
//! `TailConfig` is built from parsed `Args` before any network activity. Every
//! startup problem (missing token, bad endpoint, bad interval, unreadable symbol
//! file) surfaces here as `TailError::Configuration`.
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use trade_common::endpoint::stream_url;
use trade_common::symbols::{merge_symbols, parse_symbols};
use trade_common::{Result, TailError};
use url::Url;

use crate::args::Args;

/// What the reader does with a text frame it cannot decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Stop the session with `TailError::ProtocolDecode`.
    FailFast,
    /// Log the frame and keep reading.
    SkipMalformed,
}

/// Everything a tail session needs to run.
#[derive(Debug, Clone)]
pub struct TailConfig {
    /// Stream URL with the token already interpolated.
    pub url: Url,
    /// Symbols to subscribe to, in order.
    pub symbols: Vec<String>,
    /// Interval between keep-alive ping frames.
    pub keepalive: Duration,
    /// Handling of malformed inbound frames.
    pub decode_policy: DecodePolicy,
}

impl TailConfig {
    /// Validates `args` into a configuration.
    pub fn from_args(args: &Args) -> Result<Self> {
        let token = args
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| TailError::Configuration("must provide a token".to_string()))?;

        if args.keepalive_secs == 0 {
            return Err(TailError::Configuration(
                "--keepalive-secs must be greater than zero".to_string(),
            ));
        }

        let url = stream_url(&args.endpoint, token)?;

        let file_symbols = match &args.symbols_file {
            Some(raw) => read_symbols_file(&normalize_path(raw))?,
            None => Vec::new(),
        };
        let symbols = merge_symbols(&args.symbols, file_symbols);
        debug!("Configured symbols: {:?}", symbols);

        let decode_policy = if args.skip_malformed {
            DecodePolicy::SkipMalformed
        } else {
            DecodePolicy::FailFast
        };

        Ok(Self {
            url,
            symbols,
            keepalive: Duration::from_secs(args.keepalive_secs),
            decode_policy,
        })
    }
}

fn read_symbols_file(path: &Path) -> Result<Vec<String>> {
    if !is_file_exist(path) {
        return Err(TailError::Configuration(format!(
            "Symbols file not found: {}",
            path.display()
        )));
    }
    let file = File::open(path).map_err(|e| {
        TailError::Configuration(format!("Failed to open {}: {}", path.display(), e))
    })?;
    parse_symbols(BufReader::new(file))
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// Returns `true` if the provided path exists and is a regular file.
fn is_file_exist(path: &Path) -> bool {
    path.exists() && path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(token: Option<&str>) -> Args {
        Args {
            symbols: vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()],
            symbols_file: None,
            token: token.map(str::to_string),
            endpoint: "ws://127.0.0.1:9/".to_string(),
            keepalive_secs: 60,
            skip_malformed: false,
        }
    }

    #[test]
    fn missing_or_blank_token_is_configuration_error() {
        for token in [None, Some(""), Some("   ")] {
            let err = TailConfig::from_args(&args(token)).unwrap_err();
            assert!(err.is_configuration(), "{err}");
        }
    }

    #[test]
    fn builds_url_and_keeps_symbol_order() {
        let config = TailConfig::from_args(&args(Some("tok"))).unwrap();
        assert_eq!(config.url.as_str(), "ws://127.0.0.1:9/?token=tok");
        assert_eq!(config.symbols, vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(config.keepalive, Duration::from_secs(60));
        assert_eq!(config.decode_policy, DecodePolicy::FailFast);
    }

    #[test]
    fn token_is_sent_as_given() {
        let config = TailConfig::from_args(&args(Some(" tok "))).unwrap();
        let token: Vec<String> = config
            .url
            .query_pairs()
            .filter(|(k, _)| k == "token")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(token, vec![" tok ".to_string()]);
    }

    #[test]
    fn zero_keepalive_is_rejected() {
        let mut a = args(Some("tok"));
        a.keepalive_secs = 0;
        assert!(TailConfig::from_args(&a).unwrap_err().is_configuration());
    }

    #[test]
    fn symbols_file_is_appended() {
        let path = std::env::temp_dir().join(format!("trade_tail_symbols_{}.txt", std::process::id()));
        {
            let mut file = File::create(&path).unwrap();
            writeln!(file, "AAPL, MSFT").unwrap();
        }
        let mut a = args(Some("tok"));
        a.symbols_file = Some(format!("\"{}\"", path.display()));
        a.skip_malformed = true;
        let config = TailConfig::from_args(&a).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.symbols, vec!["BTCUSDT", "ETHUSDT", "AAPL", "MSFT"]);
        assert_eq!(config.decode_policy, DecodePolicy::SkipMalformed);
    }

    #[test]
    fn missing_symbols_file_is_configuration_error() {
        let mut a = args(Some("tok"));
        a.symbols_file = Some("/definitely/not/here.txt".to_string());
        assert!(TailConfig::from_args(&a).unwrap_err().is_configuration());
    }
}
