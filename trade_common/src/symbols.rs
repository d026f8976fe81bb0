//! Symbol lists for subscriptions.
//!
//! Symbols are free-form strings owned by the server (e.g. `AAPL`,
//! `BINANCE:BTCUSDT`). A symbol file may separate symbols with commas,
//! whitespace or new lines; lines starting with `#` are comments.

use std::io::BufRead;

use crate::error::TailError;
use crate::result::Result;

/// Trims surrounding whitespace and quotes. Returns `None` for empty input.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches(|c: char| c == '"' || c == '\'').trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parses symbols from a buffered reader, keeping file order.
pub fn parse_symbols<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut symbols = Vec::new();

    for (index, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|e| {
            TailError::Configuration(format!("Failed to read symbols line {}: {}", index + 1, e))
        })?;
        let trimmed_line = line.trim();
        if trimmed_line.is_empty() || trimmed_line.starts_with('#') {
            continue;
        }

        symbols.extend(
            trimmed_line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter_map(normalize_symbol),
        );
    }
    Ok(symbols)
}

/// Concatenates command-line symbols with file symbols, normalizing both.
pub fn merge_symbols<I, S>(cli: I, file: Vec<String>) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cli.into_iter()
        .filter_map(|s| normalize_symbol(s.as_ref()))
        .chain(file)
        .collect()
}
