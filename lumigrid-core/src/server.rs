//! Receive-side serve loop.
//!
//! A single cooperative loop alternates between three bounded steps:
//! accept (short timeout), receive-and-decode (longer, per-connection
//! timeout), render. The accept timeout guarantees a render cadence
//! even when no sender is up; the receive timeout bounds how long one
//! straggling sender can stall the loop. One connection is processed
//! to completion, and its socket closed, before the next accept.
//!
//! Nothing here is concurrent: the loop is the only actor that ever
//! touches the [`DisplayBuffer`]. Shutdown comes from outside through
//! the stop handle; the cleanup path (drop the listener, clear the
//! panel) runs from whatever state the loop was in.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::display::{DisplayBuffer, DisplayDriver, Rgb};
use crate::error::LumigridError;
use crate::receiver::{FrameOutcome, FrameReceiver};

// ── FrameServerConfig ────────────────────────────────────────────

/// Configuration for [`FrameServer`].
#[derive(Debug, Clone)]
pub struct FrameServerConfig {
    /// `host:port` to listen on.
    pub listen_addr: String,
    /// Expected frame height; frames of any other shape are dropped.
    pub rows: usize,
    /// Expected frame width.
    pub cols: usize,
    /// Bound on waiting for a connection each tick.
    pub accept_timeout: Duration,
    /// Bound on each read of an accepted connection.
    pub receive_timeout: Duration,
    /// Bound on draining a mis-dimensioned frame.
    pub drain_timeout: Duration,
    /// Pause after an unclassified tick error, to avoid a tight
    /// error loop.
    pub error_backoff: Duration,
    /// Color of an ON cell.
    pub lit: Rgb,
    /// Color of an OFF cell.
    pub unlit: Rgb,
}

impl Default for FrameServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8888".into(),
            rows: 32,
            cols: 32,
            accept_timeout: Duration::from_secs(1),
            receive_timeout: Duration::from_secs(5),
            drain_timeout: Duration::from_millis(100),
            error_backoff: Duration::from_millis(100),
            lit: Rgb::WHITE,
            unlit: Rgb::BLACK,
        }
    }
}

// ── FrameServer ──────────────────────────────────────────────────

/// Accepts one connection per frame and keeps the display showing the
/// most recent valid frame.
pub struct FrameServer<D: DisplayDriver> {
    listener: TcpListener,
    receiver: FrameReceiver,
    buffer: DisplayBuffer,
    driver: D,
    running: Arc<AtomicBool>,
    config: FrameServerConfig,
}

impl<D: DisplayDriver> FrameServer<D> {
    /// Bind the listening socket. Failure here is fatal — there is no
    /// serve loop to fall back to.
    pub async fn bind(config: FrameServerConfig, driver: D) -> Result<Self, LumigridError> {
        let listener = TcpListener::bind(&config.listen_addr).await.map_err(|e| {
            LumigridError::ListenerSetup {
                addr: config.listen_addr.clone(),
                source: e,
            }
        })?;

        let receiver = FrameReceiver::new(config.rows, config.cols)
            .with_timeouts(config.receive_timeout, config.drain_timeout);
        let buffer = DisplayBuffer::new(config.rows, config.cols);

        Ok(Self {
            listener,
            receiver,
            buffer,
            driver,
            running: Arc::new(AtomicBool::new(false)),
            config,
        })
    }

    /// The actual bound address (useful when the config asked for
    /// port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, LumigridError> {
        Ok(self.listener.local_addr()?)
    }

    /// A cloneable handle that stops the loop from another task.
    /// Store `false` to request shutdown.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Run ticks until stopped, then clean up: the listener is
    /// dropped and the panel is cleared whatever state the loop was
    /// in when the stop arrived.
    pub async fn run(mut self) -> Result<(), LumigridError> {
        self.running.store(true, Ordering::SeqCst);
        info!("listening on {}", self.config.listen_addr);

        while self.running.load(Ordering::SeqCst) {
            if let Err(e) = self.tick().await {
                error!("tick failed: {e}");
                tokio::time::sleep(self.config.error_backoff).await;
            }
        }

        info!("stopping; clearing display");
        drop(self.listener);
        self.driver.clear();
        self.driver.swap()?;
        Ok(())
    }

    /// One loop iteration: bounded accept, then at most one full
    /// frame receive, then always a render.
    async fn tick(&mut self) -> Result<(), LumigridError> {
        match timeout(self.config.accept_timeout, self.listener.accept()).await {
            Ok(Ok((mut stream, peer))) => {
                match self.receiver.receive(&mut stream).await {
                    FrameOutcome::Committed(matrix) => {
                        debug!("frame committed from {peer}");
                        self.buffer.commit(matrix);
                    }
                    FrameOutcome::Dropped(reason) => {
                        debug!("frame from {peer} dropped: {reason}");
                    }
                }
                // stream drops here — close is unconditional.
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                // No connection this tick; fall through to render so
                // the display refreshes regardless.
            }
        }

        self.buffer
            .render(&mut self.driver, self.config.lit, self.config.unlit)
    }
}
