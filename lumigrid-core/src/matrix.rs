//! Fixed-size binary pixel grid shared across the whole pipeline.
//!
//! Every stage — binarization, downscaling, the wire format, the
//! display buffer — trades in [`BitMatrix`] values whose cells hold
//! exactly one of two sentinels, [`ON`] (255) and [`OFF`] (0).

/// Cell value for a lit pixel.
pub const ON: u8 = 255;
/// Cell value for an unlit pixel.
pub const OFF: u8 = 0;

/// A rectangular `rows × cols` grid of ON/OFF cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl BitMatrix {
    /// An all-OFF matrix of the given shape.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![OFF; rows * cols],
        }
    }

    /// Build a matrix by evaluating `f(row, col)` for every cell.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let cells = (0..rows)
            .flat_map(|y| (0..cols).map(move |x| (y, x)))
            .map(|(y, x)| f(y, x))
            .collect();
        Self { rows, cols, cells }
    }

    /// Wrap an existing row-major cell buffer.
    ///
    /// `cells.len()` must equal `rows * cols`.
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<u8>) -> Self {
        debug_assert_eq!(cells.len(), rows * cols);
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major cell slice.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.cells[row * self.cols + col] = value;
    }

    pub fn is_on(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == ON
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: u8) {
        self.cells.fill(value);
    }

    /// Number of ON cells in the whole matrix.
    pub fn count_on(&self) -> usize {
        self.cells.iter().filter(|&&c| c == ON).count()
    }

    /// Rotate 90° clockwise, producing a `cols × rows` matrix.
    ///
    /// `out[c][rows-1-r] = in[r][c]`.
    pub fn rotate_clockwise(&self) -> BitMatrix {
        BitMatrix::from_fn(self.cols, self.rows, |y, x| {
            self.get(self.rows - 1 - x, y)
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────
