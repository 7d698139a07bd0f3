//! Wire format for one bitmap frame.
//!
//! One TCP connection carries exactly one frame: an 8-byte dimension
//! header followed by a row-major payload, then the sender closes.
//! Everything is little-endian.
//!
//! ```text
//! rows:     i32  (4)
//! cols:     i32  (4)
//! payload:  rows × cols × i32 (4 each), one integer per cell,
//!           nominally 0 or 255
//! ```
//!
//! Decoding narrows each payload integer to a cell value by keeping
//! its low 8 bits. Out-of-domain values (256 → 0, 511 → 255) are
//! accepted as-is; the sender only ever emits 0 or 255 but the
//! receiver does not enforce it.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::LumigridError;
use crate::matrix::BitMatrix;

/// Bytes occupied by [`FrameHeader`] on the wire.
pub const HEADER_SIZE: usize = 8;

/// Bytes occupied by one cell on the wire.
pub const CELL_SIZE: usize = 4;

// ── FrameHeader ──────────────────────────────────────────────────

/// The (rows, cols) pair transmitted ahead of every payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub rows: i32,
    pub cols: i32,
}

impl FrameHeader {
    pub fn new(rows: i32, cols: i32) -> Self {
        Self { rows, cols }
    }

    /// Serialize to bytes (little-endian).
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.rows.to_le_bytes());
        buf[4..8].copy_from_slice(&self.cols.to_le_bytes());
        buf
    }

    /// Deserialize from an exactly-sized buffer. Cannot fail: any
    /// 8 bytes decode to *some* header; validity of the dimensions is
    /// the receiver's concern, not the codec's.
    pub fn from_bytes(bytes: [u8; HEADER_SIZE]) -> Self {
        Self {
            rows: i32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            cols: i32::from_le_bytes(bytes[4..8].try_into().unwrap()),
        }
    }

    /// Deserialize from a slice, checking length.
    pub fn decode(data: &[u8]) -> Result<Self, LumigridError> {
        if data.len() < HEADER_SIZE {
            return Err(LumigridError::HeaderTooShort {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }
        let mut buf = [0u8; HEADER_SIZE];
        buf.copy_from_slice(&data[..HEADER_SIZE]);
        Ok(Self::from_bytes(buf))
    }

    /// True when the header matches the configured display shape.
    pub fn matches(&self, rows: usize, cols: usize) -> bool {
        self.rows == rows as i32 && self.cols == cols as i32
    }
}

// ── Frame encode / decode ────────────────────────────────────────

/// Payload length in bytes for a `rows × cols` frame.
pub fn payload_len(rows: usize, cols: usize) -> usize {
    rows * cols * CELL_SIZE
}

/// Serialize a matrix into one contiguous header + payload buffer.
pub fn encode_frame(matrix: &BitMatrix) -> Bytes {
    let header = FrameHeader::new(matrix.rows() as i32, matrix.cols() as i32);
    let mut buf =
        BytesMut::with_capacity(HEADER_SIZE + payload_len(matrix.rows(), matrix.cols()));
    buf.put_slice(&header.encode());
    for &cell in matrix.cells() {
        buf.put_i32_le(cell as i32);
    }
    buf.freeze()
}

/// Reinterpret a payload as `rows × cols` little-endian integers and
/// narrow each to a cell value by truncation (low 8 bits only).
///
/// `data.len()` must equal [`payload_len`]`(rows, cols)`; the
/// receiver guarantees this by reading exactly that many bytes.
pub fn decode_payload(data: &[u8], rows: usize, cols: usize) -> BitMatrix {
    debug_assert_eq!(data.len(), payload_len(rows, cols));
    let cells = data
        .chunks_exact(CELL_SIZE)
        .map(|chunk| i32::from_le_bytes(chunk.try_into().unwrap()) as u8)
        .collect();
    BitMatrix::from_cells(rows, cols, cells)
}

// ── Tests ────────────────────────────────────────────────────────
