//! Stream endpoint helpers.
//!
//! The public stream is addressed by a fixed base URL with the access token
//! carried as the `token` query parameter.
use url::Url;

use crate::error::TailError;
use crate::result::Result;

/// Base URL of the public trade stream.
pub const DEFAULT_STREAM_URL: &str = "wss://ws.finnhub.io";
/// Query parameter carrying the access token.
pub const TOKEN_PARAM: &str = "token";

/// Builds the stream URL by interpolating `token` into `base`.
///
/// Any existing `token` parameter on `base` is replaced; other query
/// parameters are kept.
pub fn stream_url(base: &str, token: &str) -> Result<Url> {
    let mut url = Url::parse(base.trim())
        .map_err(|e| TailError::Configuration(format!("Invalid endpoint {:?}: {}", base, e)))?;

    match url.scheme() {
        "ws" | "wss" => {}
        other => {
            return Err(TailError::Configuration(format!(
                "Unsupported endpoint scheme {:?}, expected ws or wss",
                other
            )));
        }
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != TOKEN_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(TOKEN_PARAM, token);

    Ok(url)
}

/// Returns the URL with the token value masked, suitable for logging.
pub fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            if key == TOKEN_PARAM {
                (key.into_owned(), String::from("***"))
            } else {
                (key.into_owned(), value.into_owned())
            }
        })
        .collect();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_lands_in_query() {
        let url = stream_url(DEFAULT_STREAM_URL, "abc123").unwrap();
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.host_str(), Some("ws.finnhub.io"));
        let token: Vec<_> = url.query_pairs().filter(|(k, _)| k == TOKEN_PARAM).collect();
        assert_eq!(token.len(), 1);
        assert_eq!(token[0].1, "abc123");
    }

    #[test]
    fn replaces_existing_token_and_keeps_other_params() {
        let url = stream_url("ws://127.0.0.1:9000/stream?token=old&x=1", "new").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("x".to_string(), "1".to_string()),
                ("token".to_string(), "new".to_string())
            ]
        );
    }

    #[test]
    fn rejects_bad_endpoints() {
        assert!(stream_url("not a url", "t").unwrap_err().is_configuration());
        assert!(stream_url("https://example.com", "t").unwrap_err().is_configuration());
    }

    #[test]
    fn redaction_hides_token() {
        let url = stream_url(DEFAULT_STREAM_URL, "secret").unwrap();
        let shown = redacted(&url);
        assert!(!shown.contains("secret"));
        assert!(shown.contains("token=***") || shown.contains("token=%2A%2A%2A"));
    }
}
