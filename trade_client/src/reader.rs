//! Reader task.
//!
//! Owns the read half of the connection. Every text frame is decoded into an
//! `InboundMessage` and dispatched: `ping` is answered with a `pong` through the
//! shared `Outbound`, each record of a `trade` batch is written to the output as
//! one CR LF terminated JSON line, anything else is ignored. Non-text frames are
//! dropped silently.
//!
//! The reader is the only producer of the shutdown signal. It holds a
//! `ShutdownGuard` for its whole lifetime, so the signal fires whether the loop
//! ends on a read failure, a fatal decode error, or a panic.
use std::fmt::Display;

use futures_util::{Sink, Stream, StreamExt};
use log::{debug, error, info, trace, warn};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_tungstenite::tungstenite::Message;
use trade_common::message::{Decoded, encode_trade_line};
use trade_common::{InboundMessage, OutboundMessage, Result, Shutdown, TailError};

use crate::config::DecodePolicy;
use crate::connection::Outbound;

/// Counters collected over the life of a reader.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReaderReport {
    /// Trade records written to the output.
    pub trades: u64,
    /// `ping` messages answered.
    pub pings: u64,
    /// Messages with an unrecognized `type`.
    pub ignored: u64,
    /// Malformed text frames skipped under `DecodePolicy::SkipMalformed`.
    pub malformed: u64,
    /// Messages that carried an empty-string key.
    pub empty_key: u64,
}

/// Runs the reader until the inbound stream ends or fails.
///
/// Returns `Ok` when the connection ends, `Err` on a fatal decode error or an
/// output failure. The shutdown signal fires in every case.
pub async fn run_reader<St, E, S, W>(
    inbound: St,
    outbound: Outbound<S>,
    out: W,
    policy: DecodePolicy,
    shutdown: Shutdown,
) -> Result<ReaderReport>
where
    St: Stream<Item = std::result::Result<Message, E>> + Unpin,
    E: Display,
    S: Sink<Message> + Unpin,
    S::Error: Display,
    W: AsyncWrite + Unpin,
{
    let _guard = shutdown.guard();
    let mut reader = Reader {
        outbound,
        out,
        policy,
        report: ReaderReport::default(),
    };
    let result = reader.read_loop(inbound).await;
    match &result {
        Ok(report) => {
            info!(
                "Reader stopped: {} trades, {} pings answered, {} ignored, {} malformed",
                report.trades, report.pings, report.ignored, report.malformed
            );
            debug!("Messages with an empty key: {}", report.empty_key);
        }
        Err(e) => error!("Reader failed: {}", e),
    }
    result
}

struct Reader<S, W> {
    outbound: Outbound<S>,
    out: W,
    policy: DecodePolicy,
    report: ReaderReport,
}

impl<S, W> Reader<S, W>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
    W: AsyncWrite + Unpin,
{
    async fn read_loop<St, E>(&mut self, mut inbound: St) -> Result<ReaderReport>
    where
        St: Stream<Item = std::result::Result<Message, E>> + Unpin,
        E: Display,
    {
        while let Some(frame) = inbound.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(other) => {
                    trace!("Ignoring non-text frame ({} bytes)", other.len());
                    continue;
                }
                Err(e) => {
                    let err = TailError::TransportRead(e.to_string());
                    info!("Connection ended: {}", err);
                    return Ok(self.report);
                }
            };
            self.handle_text(&text).await?;
        }
        info!("Connection closed by server");
        Ok(self.report)
    }

    async fn handle_text(&mut self, text: &str) -> Result<()> {
        let Decoded {
            message,
            has_empty_key,
        } = match InboundMessage::decode(text) {
            Ok(decoded) => decoded,
            Err(e) => return self.on_malformed(e, text),
        };

        match message {
            InboundMessage::Ping => {
                if let Err(e) = self.outbound.send_message(&OutboundMessage::Pong).await {
                    warn!("Failed to answer ping: {}", e);
                }
                self.report.pings += 1;
            }
            InboundMessage::Trade { records } => {
                for record in &records {
                    let line = encode_trade_line(record)?;
                    self.out.write_all(&line).await?;
                    self.out.flush().await?;
                    self.report.trades += 1;
                }
            }
            InboundMessage::Unknown { kind } => {
                trace!("Ignoring message of type {:?}", kind);
                self.report.ignored += 1;
            }
        }

        // Checked after dispatch, so there is never anything left to skip.
        if has_empty_key {
            trace!("Message carries an empty key; nothing further to process");
            self.report.empty_key += 1;
        }
        Ok(())
    }

    fn on_malformed(&mut self, err: TailError, text: &str) -> Result<()> {
        match self.policy {
            DecodePolicy::FailFast => Err(err),
            DecodePolicy::SkipMalformed => {
                warn!("Skipping malformed message: {} ({})", err, text);
                self.report.malformed += 1;
                Ok(())
            }
        }
    }
}
