//! Transport connection setup and the shared outbound half.
//!
//! The websocket is split after the handshake: the read half goes to the reader
//! task, the write half is wrapped in `Outbound`. Both the reader (pong replies)
//! and the writer (subscriptions, keep-alive pings) write through the same
//! `Outbound`, which holds an async mutex for the duration of each frame send so
//! frames never interleave.
use std::fmt::Display;
use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{Sink, SinkExt, StreamExt};
use log::{debug, info};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use trade_common::endpoint::redacted;
use trade_common::{OutboundMessage, Result, TailError};
use url::Url;

/// Websocket stream produced by `connect`.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
/// Write half of the websocket.
pub type WsSink = SplitSink<WsStream, Message>;
/// Read half of the websocket.
pub type WsSource = SplitStream<WsStream>;

/// Dials `url` and splits the connection into its outbound and inbound halves.
///
/// No extra headers are sent and no retry is attempted.
pub async fn connect(url: &Url) -> Result<(Outbound<WsSink>, WsSource)> {
    info!("Connecting to {}", redacted(url));
    let (ws_stream, response) = connect_async(url.as_str())
        .await
        .map_err(|e| TailError::Connection(e.to_string()))?;
    info!("Connected. Handshake status: {}", response.status());

    let (sink, source) = ws_stream.split();
    Ok((Outbound::new(sink), source))
}

/// Mutex-guarded write side of the connection.
pub struct Outbound<S> {
    sink: Arc<Mutex<S>>,
}

impl<S> Clone for Outbound<S> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S> Outbound<S>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    /// Wraps a frame sink.
    pub fn new(sink: S) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
        }
    }

    /// Sends one frame while holding the write lock.
    pub async fn send(&self, frame: Message) -> Result<()> {
        let mut sink = self.sink.lock().await;
        sink.send(frame)
            .await
            .map_err(|e| TailError::Send(e.to_string()))
    }

    /// Sends a protocol message as a JSON text frame.
    pub async fn send_message(&self, message: &OutboundMessage) -> Result<()> {
        let text = message.to_json()?;
        debug!("Sending {}", text);
        self.send(Message::Text(text)).await
    }

    /// Sends a transport-level ping control frame with an empty payload.
    pub async fn ping(&self) -> Result<()> {
        self.send(Message::Ping(Vec::new())).await
    }

    /// Closes the write side. Intended to be called once, when the session ends.
    pub async fn close(&self) -> Result<()> {
        let mut sink = self.sink.lock().await;
        sink.close().await.map_err(|e| TailError::Send(e.to_string()))
    }

    #[cfg(test)]
    pub(crate) async fn snapshot(&self) -> S
    where
        S: Clone,
    {
        self.sink.lock().await.clone()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use futures_util::Sink;
    use tokio_tungstenite::tungstenite::Message;

    /// In-memory frame sink that records everything sent through it.
    ///
    /// With `stall_flush` set, every flush is `Pending` once before completing,
    /// and a frame started while the previous one is still unflushed is recorded
    /// in `interleaved`.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct RecordingSink {
        pub(crate) frames: Vec<Message>,
        pub(crate) fail_sends: bool,
        pub(crate) closed: bool,
        pub(crate) stall_flush: bool,
        pub(crate) interleaved: bool,
        unflushed: bool,
        stalled: bool,
    }

    impl RecordingSink {
        pub(crate) fn failing() -> Self {
            Self {
                fail_sends: true,
                ..Self::default()
            }
        }

        pub(crate) fn stalling() -> Self {
            Self {
                stall_flush: true,
                ..Self::default()
            }
        }
    }

    impl Sink<Message> for RecordingSink {
        type Error = String;

        fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), String>> {
            if self.fail_sends {
                Poll::Ready(Err("connection reset".to_string()))
            } else {
                Poll::Ready(Ok(()))
            }
        }

        fn start_send(self: Pin<&mut Self>, item: Message) -> Result<(), String> {
            let this = self.get_mut();
            if this.unflushed {
                this.interleaved = true;
            }
            this.unflushed = true;
            this.frames.push(item);
            Ok(())
        }

        fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), String>> {
            let this = self.get_mut();
            if this.stall_flush && this.unflushed && !this.stalled {
                this.stalled = true;
                cx.waker().wake_by_ref();
                return Poll::Pending;
            }
            this.unflushed = false;
            this.stalled = false;
            Poll::Ready(Ok(()))
        }

        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), String>> {
            self.get_mut().closed = true;
            Poll::Ready(Ok(()))
        }
    }
}
