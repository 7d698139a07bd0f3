//! Integration tests — full sender → server → display lifecycle and
//! failure scenarios over real TCP connections on localhost.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use lumigrid_core::{
    BitMatrix, DisplayDriver, FrameHeader, FrameSender, FrameServer, FrameServerConfig,
    LumigridError, ON, Rgb, wire,
};

// ── Helpers ──────────────────────────────────────────────────────

/// What the fake panel currently shows, shared with the test body.
#[derive(Clone)]
struct PanelState(Arc<Mutex<Panel>>);

struct Panel {
    cols: usize,
    back: Vec<Rgb>,
    front: Vec<Rgb>,
    swaps: usize,
}

impl PanelState {
    fn new(rows: usize, cols: usize) -> Self {
        Self(Arc::new(Mutex::new(Panel {
            cols,
            back: vec![Rgb::BLACK; rows * cols],
            front: vec![Rgb::BLACK; rows * cols],
            swaps: 0,
        })))
    }

    fn lit_count(&self) -> usize {
        let panel = self.0.lock().unwrap();
        panel.front.iter().filter(|&&c| c == Rgb::WHITE).count()
    }

    fn front(&self, x: usize, y: usize) -> Rgb {
        let panel = self.0.lock().unwrap();
        panel.front[y * panel.cols + x]
    }

    fn swaps(&self) -> usize {
        self.0.lock().unwrap().swaps
    }
}

impl DisplayDriver for PanelState {
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb) {
        let mut panel = self.0.lock().unwrap();
        let idx = y * panel.cols + x;
        panel.back[idx] = color;
    }

    fn clear(&mut self) {
        self.0.lock().unwrap().back.fill(Rgb::BLACK);
    }

    fn swap(&mut self) -> Result<(), LumigridError> {
        let mut panel = self.0.lock().unwrap();
        let back = panel.back.clone();
        panel.front = back;
        panel.swaps += 1;
        Ok(())
    }
}

/// Short-timeout config on an ephemeral port, 4×4 frames.
fn test_config() -> FrameServerConfig {
    FrameServerConfig {
        listen_addr: "127.0.0.1:0".into(),
        rows: 4,
        cols: 4,
        accept_timeout: Duration::from_millis(50),
        receive_timeout: Duration::from_millis(500),
        drain_timeout: Duration::from_millis(50),
        error_backoff: Duration::from_millis(10),
        ..FrameServerConfig::default()
    }
}

/// Bind a server on localhost and spawn its loop. Returns the panel,
/// the bound address, the stop handle, and the loop's join handle.
async fn spawn_server() -> (
    PanelState,
    std::net::SocketAddr,
    Arc<std::sync::atomic::AtomicBool>,
    JoinHandle<Result<(), LumigridError>>,
) {
    let panel = PanelState::new(4, 4);
    let server = FrameServer::bind(test_config(), panel.clone())
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    let stop = server.stop_handle();
    let handle = tokio::spawn(server.run());
    (panel, addr, stop, handle)
}

async fn stop_server(
    stop: Arc<std::sync::atomic::AtomicBool>,
    handle: JoinHandle<Result<(), LumigridError>>,
) {
    stop.store(false, std::sync::atomic::Ordering::SeqCst);
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();
}

/// Poll `cond` every 10 ms for up to 2 s.
async fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

// ── End-to-end delivery ──────────────────────────────────────────

#[tokio::test]
async fn frame_travels_sender_to_panel() {
    let (panel, addr, stop, handle) = spawn_server().await;

    // Panel starts dark.
    assert_eq!(panel.lit_count(), 0);

    let mut frame = BitMatrix::new(4, 4);
    frame.set(0, 0, ON);
    frame.set(3, 3, ON);

    let sender = FrameSender::new(addr.to_string());
    assert!(sender.send(&frame).await);

    assert!(wait_for(|| panel.lit_count() == 2).await, "frame never showed");
    // Matrix (row, col) → panel (x, y).
    assert_eq!(panel.front(0, 0), Rgb::WHITE);
    assert_eq!(panel.front(3, 3), Rgb::WHITE);
    assert_eq!(panel.front(1, 0), Rgb::BLACK);

    stop_server(stop, handle).await;
}

#[tokio::test]
async fn newer_frame_supersedes_older() {
    let (panel, addr, stop, handle) = spawn_server().await;
    let sender = FrameSender::new(addr.to_string());

    let mut first = BitMatrix::new(4, 4);
    first.fill(ON);
    assert!(sender.send(&first).await);
    assert!(wait_for(|| panel.lit_count() == 16).await);

    let mut second = BitMatrix::new(4, 4);
    second.set(1, 2, ON);
    assert!(sender.send(&second).await);
    assert!(wait_for(|| panel.lit_count() == 1).await);
    assert_eq!(panel.front(2, 1), Rgb::WHITE);

    stop_server(stop, handle).await;
}

// ── Discard paths leave the panel untouched ──────────────────────

#[tokio::test]
async fn wrong_dimensions_never_reach_panel() {
    let (panel, addr, stop, handle) = spawn_server().await;
    let sender = FrameSender::new(addr.to_string());

    // Establish a known-good image first.
    let mut good = BitMatrix::new(4, 4);
    good.set(2, 2, ON);
    assert!(sender.send(&good).await);
    assert!(wait_for(|| panel.lit_count() == 1).await);

    // 16×16 header with a full 16×16 payload: validated, drained,
    // dropped — and the server goes back to accepting.
    let mut rogue = TcpStream::connect(addr).await.unwrap();
    let mut bytes = FrameHeader::new(16, 16).encode().to_vec();
    bytes.extend(std::iter::repeat(7u8).take(16 * 16 * 4));
    rogue.write_all(&bytes).await.unwrap();
    drop(rogue);

    // Several render ticks later the panel still shows `good`.
    let swaps_before = panel.swaps();
    assert!(wait_for(|| panel.swaps() > swaps_before + 3).await);
    assert_eq!(panel.lit_count(), 1);
    assert_eq!(panel.front(2, 2), Rgb::WHITE);

    // The loop is still accepting after the drop.
    let mut replacement = BitMatrix::new(4, 4);
    replacement.set(0, 3, ON);
    assert!(sender.send(&replacement).await);
    assert!(wait_for(|| panel.front(3, 0) == Rgb::WHITE).await);

    stop_server(stop, handle).await;
}

#[tokio::test]
async fn truncated_payload_never_reaches_panel() {
    let (panel, addr, stop, handle) = spawn_server().await;

    // Valid header, then close after 8 of 64 payload bytes.
    let mut client = TcpStream::connect(addr).await.unwrap();
    let mut bytes = FrameHeader::new(4, 4).encode().to_vec();
    bytes.extend_from_slice(&[255u8; 8]);
    client.write_all(&bytes).await.unwrap();
    drop(client);

    let swaps_before = panel.swaps();
    assert!(wait_for(|| panel.swaps() > swaps_before + 3).await);
    assert_eq!(panel.lit_count(), 0);

    stop_server(stop, handle).await;
}

// ── Loop behaviour ───────────────────────────────────────────────

#[tokio::test]
async fn renders_every_tick_without_senders() {
    let (panel, _addr, stop, handle) = spawn_server().await;

    // No sender at all: the accept timeout alone must drive swaps.
    assert!(wait_for(|| panel.swaps() >= 3).await, "no render cadence");
    assert_eq!(panel.lit_count(), 0);

    stop_server(stop, handle).await;
}

#[tokio::test]
async fn shutdown_clears_panel() {
    let (panel, addr, stop, handle) = spawn_server().await;
    let sender = FrameSender::new(addr.to_string());

    let mut frame = BitMatrix::new(4, 4);
    frame.fill(ON);
    assert!(sender.send(&frame).await);
    assert!(wait_for(|| panel.lit_count() == 16).await);

    stop_server(stop, handle).await;
    // The cleanup path clears and swaps regardless of loop state.
    assert_eq!(panel.lit_count(), 0);
}

#[tokio::test]
async fn bind_failure_is_fatal() {
    let cfg = FrameServerConfig {
        listen_addr: "256.256.256.256:8888".into(),
        ..test_config()
    };
    let err = FrameServer::bind(cfg, PanelState::new(4, 4))
        .await
        .err()
        .expect("bind should fail");
    assert!(matches!(err, LumigridError::ListenerSetup { .. }));
}

// ── Wire-level round-trip through real sockets ───────────────────

#[tokio::test]
async fn checkerboard_roundtrip_through_server() {
    let (panel, addr, stop, handle) = spawn_server().await;

    let board = BitMatrix::from_fn(4, 4, |y, x| if (y + x) % 2 == 0 { ON } else { 0 });
    let sender = FrameSender::new(addr.to_string());
    assert!(sender.send(&board).await);

    assert!(wait_for(|| panel.lit_count() == 8).await);
    for y in 0..4 {
        for x in 0..4 {
            let expected = if (y + x) % 2 == 0 { Rgb::WHITE } else { Rgb::BLACK };
            // Matrix (row y, col x) lands at panel (x, y).
            assert_eq!(panel.front(x, y), expected, "cell ({y}, {x})");
        }
    }

    stop_server(stop, handle).await;
}

#[tokio::test]
async fn encoded_frame_layout_is_stable() {
    // Independent of any socket: header is 8 bytes of little-endian
    // dimensions, payload is 4 bytes per cell, row-major.
    let mut m = BitMatrix::new(2, 3);
    m.set(1, 0, ON);
    let encoded = wire::encode_frame(&m);

    assert_eq!(encoded.len(), 8 + 2 * 3 * 4);
    assert_eq!(&encoded[0..4], &[2, 0, 0, 0]);
    assert_eq!(&encoded[4..8], &[3, 0, 0, 0]);
    // Cell (1, 0) is the fourth cell in row-major order.
    assert_eq!(&encoded[8 + 3 * 4..8 + 4 * 4], &[255, 0, 0, 0]);
}
