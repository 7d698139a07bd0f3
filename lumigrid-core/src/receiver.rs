//! Per-connection frame receive state machine.
//!
//! One accepted connection carries at most one frame:
//!
//! ```text
//! AWAIT_HEADER → VALIDATE_DIMS → AWAIT_PAYLOAD → DECODE
//!                     │                │
//!                     └── drain ───────┴──→ DISCARD
//! ```
//!
//! Every transition returns data, not control flow: the caller gets a
//! [`FrameOutcome`] and branches on it. A dropped frame is an
//! ordinary outcome — the display keeps showing the previous frame —
//! and the socket is closed unconditionally (by drop) whichever
//! branch was taken.

use std::fmt;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::matrix::BitMatrix;
use crate::wire::{self, FrameHeader, HEADER_SIZE};

/// Default bound on each blocking read of an accepted connection.
/// Deliberately longer than the server's accept timeout.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound on draining a mis-dimensioned frame's leftovers.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_millis(100);

// ── Outcome types ────────────────────────────────────────────────

/// Why a frame was discarded without touching display state.
#[derive(Debug)]
pub enum DropReason {
    /// Peer closed before all 8 header bytes arrived.
    HeaderTruncated,
    /// Header decoded but dimensions differ from the configured shape.
    DimensionMismatch { rows: i32, cols: i32 },
    /// Peer closed with part of the payload outstanding.
    PayloadTruncated { received: usize, expected: usize },
    /// A read on the established connection exceeded its deadline.
    ReceiveTimeout,
    /// The connection reported an I/O error mid-receive.
    Io(std::io::Error),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::HeaderTruncated => write!(f, "peer closed during header"),
            DropReason::DimensionMismatch { rows, cols } => {
                write!(f, "unexpected dimensions {rows}x{cols}")
            }
            DropReason::PayloadTruncated { received, expected } => {
                write!(f, "payload truncated ({received}/{expected} bytes)")
            }
            DropReason::ReceiveTimeout => write!(f, "receive timed out"),
            DropReason::Io(e) => write!(f, "receive I/O error: {e}"),
        }
    }
}

/// Result of processing one accepted connection.
#[derive(Debug)]
pub enum FrameOutcome {
    /// A full frame of the configured shape arrived and decoded.
    Committed(BitMatrix),
    /// The frame was discarded; display state must not change.
    Dropped(DropReason),
}

// ── FrameReceiver ────────────────────────────────────────────────

/// Reads and validates exactly one frame from an accepted connection.
pub struct FrameReceiver {
    expected_rows: usize,
    expected_cols: usize,
    receive_timeout: Duration,
    drain_timeout: Duration,
}

impl FrameReceiver {
    pub fn new(expected_rows: usize, expected_cols: usize) -> Self {
        Self {
            expected_rows,
            expected_cols,
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, receive: Duration, drain: Duration) -> Self {
        self.receive_timeout = receive;
        self.drain_timeout = drain;
        self
    }

    /// Run the receive state machine to completion on `stream`.
    ///
    /// Never returns an error: every failure mode maps to a
    /// [`DropReason`]. No partial matrix is ever constructed — decode
    /// only runs once the full payload is in memory.
    pub async fn receive(&self, stream: &mut TcpStream) -> FrameOutcome {
        // AWAIT_HEADER — exactly 8 bytes.
        let mut header_buf = [0u8; HEADER_SIZE];
        match timeout(self.receive_timeout, stream.read_exact(&mut header_buf)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return FrameOutcome::Dropped(DropReason::HeaderTruncated);
            }
            Ok(Err(e)) => return FrameOutcome::Dropped(DropReason::Io(e)),
            Err(_) => return FrameOutcome::Dropped(DropReason::ReceiveTimeout),
        }
        let header = FrameHeader::from_bytes(header_buf);

        // VALIDATE_DIMS — anything but the configured shape is
        // discarded; the connection itself is still well-formed, so
        // drain whatever else the peer sent before dropping it.
        if !header.matches(self.expected_rows, self.expected_cols) {
            self.drain(stream).await;
            return FrameOutcome::Dropped(DropReason::DimensionMismatch {
                rows: header.rows,
                cols: header.cols,
            });
        }

        // AWAIT_PAYLOAD — accumulate exactly rows*cols*4 bytes.
        let expected = wire::payload_len(self.expected_rows, self.expected_cols);
        let mut payload = vec![0u8; expected];
        let mut received = 0usize;
        while received < expected {
            match timeout(self.receive_timeout, stream.read(&mut payload[received..])).await {
                Ok(Ok(0)) => {
                    return FrameOutcome::Dropped(DropReason::PayloadTruncated {
                        received,
                        expected,
                    });
                }
                Ok(Ok(n)) => received += n,
                Ok(Err(e)) => return FrameOutcome::Dropped(DropReason::Io(e)),
                Err(_) => return FrameOutcome::Dropped(DropReason::ReceiveTimeout),
            }
        }

        // DECODE — reshape and narrow; the payload length is exact by
        // construction, so this cannot fail.
        let matrix = wire::decode_payload(&payload, self.expected_rows, self.expected_cols);
        FrameOutcome::Committed(matrix)
    }

    /// Best-effort read-and-discard of whatever the peer still has in
    /// flight, bounded by the drain timeout per read.
    async fn drain(&self, stream: &mut TcpStream) {
        let mut scratch = [0u8; 1024];
        loop {
            match timeout(self.drain_timeout, stream.read(&mut scratch)).await {
                Ok(Ok(0)) => break,  // peer closed
                Ok(Ok(_)) => continue,
                Ok(Err(_)) | Err(_) => break,
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
