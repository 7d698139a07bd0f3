//! Connection-per-frame sender.
//!
//! Each bitmap gets exactly one TCP connection: connect, write the
//! header and payload, close. There is no retry and no queue of
//! unsent frames — a failed send drops that frame and the next
//! capture supersedes it.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::matrix::BitMatrix;
use crate::wire;

/// Default bound on connecting and on writing one frame.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(1);

/// Fire-and-forget frame sender targeting one `host:port`.
pub struct FrameSender {
    addr: String,
    io_timeout: Duration,
}

impl FrameSender {
    /// `addr` is a `host:port` string; resolution happens per send,
    /// so an unresolvable name is just another dropped frame.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }

    pub fn with_io_timeout(mut self, io_timeout: Duration) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Attempt to deliver one frame. Returns `true` on success.
    ///
    /// Connect-stage failures (refused, timed out, unresolvable) are
    /// the expected case when the display side is down and are logged
    /// at debug level only. A failure *mid-write* means the peer went
    /// away with a frame half-transferred, which is worth an
    /// operator-visible warning — but it is still just a dropped
    /// frame, never an error to the caller.
    pub async fn send(&self, frame: &BitMatrix) -> bool {
        let mut stream = match timeout(self.io_timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                debug!(addr = %self.addr, "connect failed: {e}");
                return false;
            }
            Err(_) => {
                debug!(addr = %self.addr, "connect timed out after {:?}", self.io_timeout);
                return false;
            }
        };

        let encoded = wire::encode_frame(frame);
        match timeout(self.io_timeout, stream.write_all(&encoded)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(addr = %self.addr, "frame write failed: {e}");
                false
            }
            Err(_) => {
                warn!(
                    addr = %self.addr,
                    "frame write timed out after {:?}", self.io_timeout
                );
                false
            }
        }
        // stream drops here — the connection closes after one frame.
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::ON;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn send_writes_header_then_payload_and_closes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut frame = BitMatrix::new(2, 2);
        frame.set(0, 0, ON);
        let sender = FrameSender::new(addr.to_string());

        let accept = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf).await.unwrap();
            buf
        });

        assert!(sender.send(&frame).await);

        // read_to_end returning proves the sender closed the
        // connection after exactly one frame.
        let buf = accept.await.unwrap();
        assert_eq!(buf.len(), wire::HEADER_SIZE + wire::payload_len(2, 2));
        let hdr = wire::FrameHeader::decode(&buf).unwrap();
        assert!(hdr.matches(2, 2));
        let decoded = wire::decode_payload(&buf[wire::HEADER_SIZE..], 2, 2);
        assert_eq!(decoded, frame);
    }

    #[tokio::test]
    async fn send_to_closed_port_reports_failure() {
        // Bind then immediately drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sender = FrameSender::new(addr.to_string())
            .with_io_timeout(Duration::from_millis(500));
        assert!(!sender.send(&BitMatrix::new(2, 2)).await);
    }

    #[tokio::test]
    async fn send_to_unresolvable_host_reports_failure() {
        let sender = FrameSender::new("nonexistent.invalid:8888")
            .with_io_timeout(Duration::from_millis(500));
        assert!(!sender.send(&BitMatrix::new(2, 2)).await);
    }
}
