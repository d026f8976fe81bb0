//! One tail session: dial, run reader and writer, wait for shutdown, release.
//!
//! The connection is acquired once at the top of `run_session` and released once
//! at the bottom, after both tasks have been joined, whichever of them caused
//! the shutdown.
use log::{debug, info};
use tokio::io::AsyncWrite;
use trade_common::{Result, Shutdown, TailError};

use crate::config::TailConfig;
use crate::connection::connect;
use crate::reader::{ReaderReport, run_reader};
use crate::writer::{WriterReport, run_writer};

/// What the two tasks did before the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    /// Reader counters.
    pub reader: ReaderReport,
    /// Writer counters.
    pub writer: WriterReport,
}

/// Runs a session against `config.url`, writing trade lines to `out`.
///
/// Returns once the connection has ended. Errors are a failed dial, a fatal
/// decode error in the reader, an output failure, or a crashed task.
pub async fn run_session<W>(config: TailConfig, out: W) -> Result<SessionReport>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (outbound, inbound) = connect(&config.url).await?;

    let shutdown = Shutdown::new();
    let mut done = shutdown.subscribe();

    let reader = tokio::spawn(run_reader(
        inbound,
        outbound.clone(),
        out,
        config.decode_policy,
        shutdown.clone(),
    ));
    let writer = tokio::spawn(run_writer(
        outbound.clone(),
        config.symbols,
        config.keepalive,
        shutdown.subscribe(),
    ));

    done.wait().await;
    info!("Shutdown signal received, closing connection");

    let reader_result = reader.await;
    let writer_result = writer.await;

    if let Err(e) = outbound.close().await {
        debug!("Close after shutdown: {}", e);
    }
    drop(outbound);

    let reader = reader_result.map_err(|e| TailError::Task(format!("reader: {}", e)))??;
    let writer = writer_result.map_err(|e| TailError::Task(format!("writer: {}", e)))?;
    Ok(SessionReport { reader, writer })
}
