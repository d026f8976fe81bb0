//! Subscriber / keep-alive task.
//!
//! Sends one subscription request per configured symbol, then pings the
//! connection on a fixed interval until the shutdown signal fires. Write
//! failures are only logged: a broken connection shows up as a read failure in
//! the reader, which fires the shutdown signal.
use std::fmt::Display;
use std::time::Duration;

use futures_util::Sink;
use log::{debug, info, warn};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_tungstenite::tungstenite::Message;
use trade_common::{OutboundMessage, ShutdownListener};

use crate::connection::Outbound;

/// Counters collected over the life of a writer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriterReport {
    /// Subscription requests written successfully.
    pub subscriptions: u64,
    /// Keep-alive pings written successfully.
    pub pings: u64,
}

/// Subscribes to `symbols` in order, then keeps the connection alive until shutdown.
pub async fn run_writer<S>(
    outbound: Outbound<S>,
    symbols: Vec<String>,
    keepalive: Duration,
    mut shutdown: ShutdownListener,
) -> WriterReport
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let mut report = WriterReport::default();

    for symbol in &symbols {
        if shutdown.is_fired() {
            debug!("Shutdown before subscribing to {}", symbol);
            return report;
        }
        match outbound.send_message(&OutboundMessage::subscribe(symbol)).await {
            Ok(()) => {
                info!("Subscribed to {}", symbol);
                report.subscriptions += 1;
            }
            Err(e) => warn!("Failed to subscribe to {}: {}", symbol, e),
        }
    }

    let mut ticker = interval_at(Instant::now() + keepalive, keepalive);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!("Keep-alive running every {:?}", keepalive);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.wait() => break,
            _ = ticker.tick() => match outbound.ping().await {
                Ok(()) => {
                    debug!("Keep-alive ping sent");
                    report.pings += 1;
                }
                Err(e) => warn!("Keep-alive ping failed: {}", e),
            },
        }
    }

    info!(
        "Writer stopping: {} subscriptions, {} pings",
        report.subscriptions, report.pings
    );
    report
}
