//! Display abstraction: the driver capability and the buffer of the
//! last good frame.
//!
//! The physical panel (LED matrix, terminal, whatever) sits behind
//! [`DisplayDriver`], which exposes exactly the three operations the
//! render step needs: set a pixel, clear, swap buffers. The swap is
//! the atomic present — nothing drawn before it is visible.

use crate::error::LumigridError;
use crate::matrix::BitMatrix;

// ── Rgb ──────────────────────────────────────────────────────────

/// A display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

// ── DisplayDriver ────────────────────────────────────────────────

/// Capability surface of the physical display.
///
/// `set_pixel` and `clear` mutate the back buffer only; [`swap`]
/// presents it, synchronized to the display's own refresh timing.
///
/// [`swap`]: DisplayDriver::swap
pub trait DisplayDriver {
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb);
    fn clear(&mut self);
    fn swap(&mut self) -> Result<(), LumigridError>;
}

// ── DisplayBuffer ────────────────────────────────────────────────

/// Holds the most recent valid frame, plus whether any frame has ever
/// arrived. Owned exclusively by the server loop; replaced whole on
/// every successful receive, never partially updated.
pub struct DisplayBuffer {
    matrix: BitMatrix,
    has_data: bool,
}

impl DisplayBuffer {
    /// An empty buffer: no frame yet, contents all OFF.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            matrix: BitMatrix::new(rows, cols),
            has_data: false,
        }
    }

    /// Replace the stored frame. Only called with a fully decoded
    /// matrix of the configured shape.
    pub fn commit(&mut self, matrix: BitMatrix) {
        self.matrix = matrix;
        self.has_data = true;
    }

    pub fn has_data(&self) -> bool {
        self.has_data
    }

    pub fn matrix(&self) -> &BitMatrix {
        &self.matrix
    }

    /// Draw the buffer to `driver` and present it.
    ///
    /// Before the first frame this is a clear + swap (panel stays
    /// dark). Afterwards every cell maps ON→`lit`, OFF→`unlit`; the
    /// output depends only on the stored matrix, so rendering twice
    /// presents the same image twice.
    pub fn render<D: DisplayDriver>(
        &self,
        driver: &mut D,
        lit: Rgb,
        unlit: Rgb,
    ) -> Result<(), LumigridError> {
        if !self.has_data {
            driver.clear();
            return driver.swap();
        }

        for y in 0..self.matrix.rows() {
            for x in 0..self.matrix.cols() {
                let color = if self.matrix.is_on(y, x) { lit } else { unlit };
                driver.set_pixel(x, y, color);
            }
        }
        driver.swap()
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::ON;

    /// Recording driver: a back/front pair of color grids.
    struct RecordingDriver {
        cols: usize,
        back: Vec<Rgb>,
        front: Vec<Rgb>,
        swaps: usize,
    }

    impl RecordingDriver {
        fn new(rows: usize, cols: usize) -> Self {
            Self {
                cols,
                back: vec![Rgb::BLACK; rows * cols],
                front: vec![Rgb::BLACK; rows * cols],
                swaps: 0,
            }
        }

        fn front(&self, x: usize, y: usize) -> Rgb {
            self.front[y * self.cols + x]
        }
    }

    impl DisplayDriver for RecordingDriver {
        fn set_pixel(&mut self, x: usize, y: usize, color: Rgb) {
            self.back[y * self.cols + x] = color;
        }

        fn clear(&mut self) {
            self.back.fill(Rgb::BLACK);
        }

        fn swap(&mut self) -> Result<(), LumigridError> {
            self.front.copy_from_slice(&self.back);
            self.swaps += 1;
            Ok(())
        }
    }

    #[test]
    fn empty_buffer_renders_dark() {
        let buf = DisplayBuffer::new(2, 2);
        let mut drv = RecordingDriver::new(2, 2);
        drv.back.fill(Rgb::WHITE); // stale garbage in the back buffer
        buf.render(&mut drv, Rgb::WHITE, Rgb::BLACK).unwrap();
        assert_eq!(drv.swaps, 1);
        assert!(drv.front.iter().all(|&c| c == Rgb::BLACK));
    }

    #[test]
    fn committed_frame_renders_lit_cells() {
        let mut buf = DisplayBuffer::new(2, 2);
        let mut m = BitMatrix::new(2, 2);
        m.set(0, 1, ON);
        buf.commit(m);

        let mut drv = RecordingDriver::new(2, 2);
        buf.render(&mut drv, Rgb::WHITE, Rgb::BLACK).unwrap();
        // set_pixel takes (x, y): matrix row 0, col 1 → x=1, y=0.
        assert_eq!(drv.front(1, 0), Rgb::WHITE);
        assert_eq!(drv.front(0, 0), Rgb::BLACK);
        assert_eq!(drv.front(0, 1), Rgb::BLACK);
        assert_eq!(drv.front(1, 1), Rgb::BLACK);
    }

    #[test]
    fn render_is_idempotent() {
        let mut buf = DisplayBuffer::new(3, 3);
        buf.commit(BitMatrix::from_fn(3, 3, |y, x| {
            if (y + x) % 2 == 0 { ON } else { 0 }
        }));

        let mut drv = RecordingDriver::new(3, 3);
        buf.render(&mut drv, Rgb::WHITE, Rgb::BLACK).unwrap();
        let first = drv.front.clone();
        buf.render(&mut drv, Rgb::WHITE, Rgb::BLACK).unwrap();
        assert_eq!(drv.front, first);
        assert_eq!(drv.swaps, 2);
    }

    #[test]
    fn commit_replaces_whole_frame() {
        let mut buf = DisplayBuffer::new(2, 2);
        assert!(!buf.has_data());
        let mut m = BitMatrix::new(2, 2);
        m.fill(ON);
        buf.commit(m);
        assert!(buf.has_data());
        assert_eq!(buf.matrix().count_on(), 4);

        buf.commit(BitMatrix::new(2, 2));
        assert_eq!(buf.matrix().count_on(), 0);
        assert!(buf.has_data());
    }
}
