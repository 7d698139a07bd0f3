//! Terminal-backed display driver.
//!
//! Stands in for the physical LED panel: each cell is drawn as a
//! two-column block (`██`) so the grid is roughly square on screen.
//! Double-buffered — `set_pixel`/`clear` touch only the back buffer,
//! `swap` diffs against what is on screen and redraws just the cells
//! that changed, then flushes once so the update lands atomically.

use std::io::{Stdout, Write, stdout};

use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, SetForegroundColor},
    terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use lumigrid_core::{DisplayDriver, LumigridError, Rgb};

pub struct TerminalDisplay {
    rows: usize,
    cols: usize,
    back: Vec<Rgb>,
    /// `None` until a cell has been drawn at least once, forcing a
    /// full first paint.
    front: Vec<Option<Rgb>>,
    out: Stdout,
}

impl TerminalDisplay {
    /// Take over the terminal (alternate screen, hidden cursor).
    pub fn new(rows: usize, cols: usize) -> Result<Self, LumigridError> {
        let mut out = stdout();
        execute!(out, EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))
            .map_err(|e| LumigridError::Display(e.to_string()))?;
        Ok(Self {
            rows,
            cols,
            back: vec![Rgb::BLACK; rows * cols],
            front: vec![None; rows * cols],
            out,
        })
    }
}

impl DisplayDriver for TerminalDisplay {
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb) {
        if y < self.rows && x < self.cols {
            self.back[y * self.cols + x] = color;
        }
    }

    fn clear(&mut self) {
        self.back.fill(Rgb::BLACK);
    }

    fn swap(&mut self) -> Result<(), LumigridError> {
        for y in 0..self.rows {
            for x in 0..self.cols {
                let idx = y * self.cols + x;
                let color = self.back[idx];
                if self.front[idx] == Some(color) {
                    continue;
                }
                queue!(
                    self.out,
                    cursor::MoveTo((x * 2) as u16, y as u16),
                    SetForegroundColor(Color::Rgb {
                        r: color.r,
                        g: color.g,
                        b: color.b,
                    }),
                    Print("██"),
                )
                .map_err(|e| LumigridError::Display(e.to_string()))?;
                self.front[idx] = Some(color);
            }
        }
        self.out
            .flush()
            .map_err(|e| LumigridError::Display(e.to_string()))?;
        Ok(())
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        // Hand the terminal back whatever state the loop was in.
        let _ = execute!(self.out, cursor::Show, LeaveAlternateScreen);
    }
}
