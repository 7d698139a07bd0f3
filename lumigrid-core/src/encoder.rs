//! Depth-map → bitmap transform pipeline.
//!
//! Three stages, always in this order:
//!
//! 1. **Percentile binarization** — every depth sample strictly above
//!    the `keep_fraction`-th percentile of the frame becomes ON.
//! 2. **Block-threshold downscale** — the full-resolution binary map
//!    is reduced to the display grid; a target cell is ON iff its
//!    source block is at least `on_threshold` ON.
//! 3. **Clockwise rotation** — one fixed 90° turn to match the
//!    physical panel orientation.
//!
//! The depth model and camera live behind [`DepthMap`]; this module
//! only sees the 2D scalar field they produce.

use crate::matrix::{BitMatrix, OFF, ON};

// ── DepthMap ─────────────────────────────────────────────────────

/// A 2D field of scalar depth estimates, one `f32` per pixel,
/// row-major. Produced by the (external) depth model.
#[derive(Debug, Clone)]
pub struct DepthMap {
    rows: usize,
    cols: usize,
    samples: Vec<f32>,
}

impl DepthMap {
    /// Wrap a row-major sample buffer. `samples.len()` must equal
    /// `rows * cols`.
    pub fn from_samples(rows: usize, cols: usize, samples: Vec<f32>) -> Self {
        debug_assert_eq!(samples.len(), rows * cols);
        Self {
            rows,
            cols,
            samples,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.samples[row * self.cols + col]
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// ── FrameEncoder ─────────────────────────────────────────────────

/// Encoder context: pipeline parameters constructed once at process
/// start and passed by reference wherever a frame is encoded.
#[derive(Debug, Clone)]
pub struct FrameEncoder {
    /// Percentile rank (0..=1) used as the binarization cut.
    keep_fraction: f64,
    /// Minimum ON-fraction of a source block for its target cell to
    /// light up (0..=1).
    on_threshold: f64,
    target_rows: usize,
    target_cols: usize,
}

impl FrameEncoder {
    pub fn new(
        keep_fraction: f64,
        on_threshold: f64,
        target_rows: usize,
        target_cols: usize,
    ) -> Self {
        Self {
            keep_fraction,
            on_threshold,
            target_rows,
            target_cols,
        }
    }

    /// Run the full pipeline: binarize → downscale → rotate.
    ///
    /// The rotation swaps dimensions, so the result is
    /// `target_cols × target_rows`; in the square deployment the
    /// shape is unchanged.
    pub fn encode(&self, depth: &DepthMap) -> BitMatrix {
        let binary = binarize(depth, self.keep_fraction);
        let scaled = downscale(&binary, self.target_rows, self.target_cols, self.on_threshold);
        scaled.rotate_clockwise()
    }
}

// ── Pipeline stages ──────────────────────────────────────────────

/// Binarize a depth map against the `keep_fraction`-th percentile of
/// its own samples (nearest-rank selection, index clamped to the
/// valid range). Cells strictly above the threshold become ON.
///
/// An empty map yields an all-OFF matrix of the same shape rather
/// than an error.
pub fn binarize(depth: &DepthMap, keep_fraction: f64) -> BitMatrix {
    if depth.is_empty() {
        return BitMatrix::new(depth.rows(), depth.cols());
    }

    let mut ranked = depth.samples().to_vec();
    // Nearest-rank index; the float→usize cast saturates at 0.
    let index = ((keep_fraction * ranked.len() as f64) as usize).min(ranked.len() - 1);
    let (_, threshold, _) = ranked.select_nth_unstable_by(index, |a, b| a.total_cmp(b));
    let threshold = *threshold;

    BitMatrix::from_fn(depth.rows(), depth.cols(), |y, x| {
        if depth.get(y, x) > threshold { ON } else { OFF }
    })
}

/// Reduce `src` to a `target_rows × target_cols` grid.
///
/// The block feeding output cell `(y, x)` spans source rows
/// `⌊y·srcH/targetH⌋ .. ⌊(y+1)·srcH/targetH⌋` (and the same for
/// columns). The floor-based boundaries are load-bearing: they decide
/// which source pixels influence which output cell, including the
/// unequal edge blocks that appear when the dimensions do not divide
/// evenly. An empty block outputs OFF.
pub fn downscale(
    src: &BitMatrix,
    target_rows: usize,
    target_cols: usize,
    on_threshold: f64,
) -> BitMatrix {
    let row_ratio = src.rows() as f64 / target_rows as f64;
    let col_ratio = src.cols() as f64 / target_cols as f64;

    BitMatrix::from_fn(target_rows, target_cols, |y, x| {
        let row_start = (y as f64 * row_ratio) as usize;
        let row_end = (((y + 1) as f64 * row_ratio) as usize).min(src.rows());
        let col_start = (x as f64 * col_ratio) as usize;
        let col_end = (((x + 1) as f64 * col_ratio) as usize).min(src.cols());

        let block_size = row_end.saturating_sub(row_start) * col_end.saturating_sub(col_start);
        if block_size == 0 {
            return OFF;
        }

        let on_count: usize = (row_start..row_end)
            .map(|sy| (col_start..col_end).filter(|&sx| src.is_on(sy, sx)).count())
            .sum();

        if on_count as f64 / block_size as f64 >= on_threshold {
            ON
        } else {
            OFF
        }
    })
}

// ── Tests ────────────────────────────────────────────────────────
