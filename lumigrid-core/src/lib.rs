//! # lumigrid-core
//!
//! Core library for lumigrid: a depth-camera-driven binary bitmap,
//! streamed one frame per TCP connection to a small fixed-size
//! display.
//!
//! This crate contains:
//! - **Matrix**: [`BitMatrix`] — the ON/OFF grid every stage trades in
//! - **Encoder**: [`FrameEncoder`] — percentile binarization,
//!   block-threshold downscale, fixed rotation
//! - **Wire**: 8-byte dimension header + 4-bytes-per-cell payload,
//!   little-endian throughout
//! - **Sender**: [`FrameSender`] — one connection per frame, no retry
//! - **Receiver**: [`FrameReceiver`] — bounded reads, classified
//!   [`FrameOutcome`] instead of error-driven control flow
//! - **Server**: [`FrameServer`] — the accept/receive/render loop
//! - **Display**: [`DisplayDriver`] capability + [`DisplayBuffer`]
//! - **Error**: [`LumigridError`] — typed, `thiserror`-based

pub mod display;
pub mod encoder;
pub mod error;
pub mod matrix;
pub mod receiver;
pub mod sender;
pub mod server;
pub mod wire;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use display::{DisplayBuffer, DisplayDriver, Rgb};
pub use encoder::{DepthMap, FrameEncoder, binarize, downscale};
pub use error::LumigridError;
pub use matrix::{BitMatrix, OFF, ON};
pub use receiver::{DropReason, FrameOutcome, FrameReceiver};
pub use sender::FrameSender;
pub use server::{FrameServer, FrameServerConfig};
pub use wire::{FrameHeader, HEADER_SIZE};
