//! Stream protocol messages.
//!
//! Inbound frames are JSON objects discriminated by their `"type"` field. They are
//! decoded into an `InboundMessage` variant before dispatch, so the reader never
//! inspects a generic map. Outbound records are `OutboundMessage` values serialized
//! with the same `"type"` tag.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TailError;
use crate::result::Result;

/// Discriminant field present on every protocol message.
pub const TYPE_FIELD: &str = "type";
/// Payload field of a trade message.
pub const DATA_FIELD: &str = "data";
/// Discriminant of a server keep-alive check.
pub const PING: &str = "ping";
/// Discriminant of a trade batch.
pub const TRADE: &str = "trade";
/// Terminator written after every trade record.
pub const RECORD_TERMINATOR: &[u8] = b"\r\n";

/// Decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Server keep-alive check; must be answered with `OutboundMessage::Pong`.
    Ping,
    /// Batch of trade records in the order the server sent them.
    Trade {
        /// Opaque trade objects, forwarded without schema validation.
        records: Vec<Value>,
    },
    /// Anything else. `kind` holds the discriminant when it was a string.
    Unknown {
        /// Value of the `"type"` field, if present and textual.
        kind: Option<String>,
    },
}

/// Result of decoding one text frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// The classified message.
    pub message: InboundMessage,
    /// Whether the raw object carried a key named `""`.
    pub has_empty_key: bool,
}

impl InboundMessage {
    /// Decodes a text frame.
    ///
    /// The frame must be a JSON object or `null`; `null` reads as an empty
    /// object. A missing or non-string `"type"` yields `Unknown`; a `"trade"`
    /// message must carry a list under `"data"`.
    pub fn decode(text: &str) -> Result<Decoded> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| TailError::ProtocolDecode(e.to_string()))?;
        let object = match value {
            Value::Object(object) => object,
            Value::Null => Map::new(),
            other => {
                return Err(TailError::ProtocolDecode(format!(
                    "expected a JSON object, got {}",
                    other
                )));
            }
        };
        let has_empty_key = object.contains_key("");
        let message = Self::from_object(object)?;
        Ok(Decoded {
            message,
            has_empty_key,
        })
    }

    /// Classifies an already parsed JSON object.
    pub fn from_object(mut object: Map<String, Value>) -> Result<Self> {
        let kind = object
            .get(TYPE_FIELD)
            .and_then(Value::as_str)
            .map(str::to_owned);

        match kind.as_deref() {
            Some(PING) => Ok(InboundMessage::Ping),
            Some(TRADE) => match object.remove(DATA_FIELD) {
                Some(Value::Array(records)) => Ok(InboundMessage::Trade { records }),
                Some(other) => Err(TailError::ProtocolDecode(format!(
                    "trade payload is not a list: {}",
                    other
                ))),
                None => Err(TailError::ProtocolDecode(
                    "trade message without a data field".to_string(),
                )),
            },
            _ => Ok(InboundMessage::Unknown { kind }),
        }
    }
}

/// Outbound record sent on the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    /// Subscribe to trades of one symbol.
    Subscribe {
        /// Symbol as accepted by the server (e.g. `BINANCE:BTCUSDT`).
        symbol: String,
    },
    /// Answer to a server `ping`.
    Pong,
}

impl OutboundMessage {
    /// Creates a subscription request for `symbol`.
    pub fn subscribe(symbol: &str) -> Self {
        OutboundMessage::Subscribe {
            symbol: String::from(symbol),
        }
    }

    /// Serializes the message to its JSON text form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Encodes one trade record as an output line (compact JSON + CR LF).
pub fn encode_trade_line(record: &Value) -> Result<Vec<u8>> {
    let mut line = serde_json::to_vec(record)?;
    line.extend_from_slice(RECORD_TERMINATOR);
    Ok(line)
}
