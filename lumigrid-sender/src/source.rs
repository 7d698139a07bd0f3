//! Depth sources.
//!
//! The depth model and camera are external collaborators: all this
//! crate sees is something that yields a 2D field of scalar depth
//! estimates per captured frame. [`DepthSource`] is that seam; a real
//! deployment plugs a camera + inference backend in behind it.
//!
//! [`SyntheticSource`] stands in when no hardware is present: a
//! "near object" orbiting the field, so the pipeline and the wire
//! can be exercised end to end.

use lumigrid_core::{DepthMap, LumigridError};

/// Anything that can produce one depth field per call.
pub trait DepthSource {
    /// Capture and estimate one frame.
    fn capture(&mut self) -> Result<DepthMap, LumigridError>;
}

// ── SyntheticSource ──────────────────────────────────────────────

/// A disk of high depth-activation orbiting the centre of the field.
pub struct SyntheticSource {
    rows: usize,
    cols: usize,
    tick: u64,
}

impl SyntheticSource {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            tick: 0,
        }
    }
}

impl DepthSource for SyntheticSource {
    fn capture(&mut self) -> Result<DepthMap, LumigridError> {
        let angle = self.tick as f64 * 0.15;
        let cy = self.rows as f64 * (0.5 + 0.3 * angle.sin());
        let cx = self.cols as f64 * (0.5 + 0.3 * angle.cos());
        // Disk radius scaled to the field.
        let radius = self.rows.min(self.cols) as f64 * 0.2;

        let samples = (0..self.rows)
            .flat_map(|y| (0..self.cols).map(move |x| (y, x)))
            .map(|(y, x)| {
                let dy = y as f64 - cy;
                let dx = x as f64 - cx;
                let d2 = dy * dy + dx * dx;
                // Gaussian bump: the orbiting object reads as near,
                // the rest of the field as far background.
                (10.0 * (-d2 / (radius * radius)).exp()) as f32
            })
            .collect();

        self.tick += 1;
        Ok(DepthMap::from_samples(self.rows, self.cols, samples))
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_has_configured_shape() {
        let mut src = SyntheticSource::new(24, 32);
        let d = src.capture().unwrap();
        assert_eq!((d.rows(), d.cols()), (24, 32));
        assert_eq!(d.samples().len(), 24 * 32);
    }

    #[test]
    fn successive_frames_differ() {
        let mut src = SyntheticSource::new(32, 32);
        let a = src.capture().unwrap();
        let b = src.capture().unwrap();
        assert_ne!(a.samples(), b.samples());
    }

    #[test]
    fn bump_is_the_near_extreme() {
        let mut src = SyntheticSource::new(32, 32);
        let d = src.capture().unwrap();
        let max = d.samples().iter().cloned().fold(f32::MIN, f32::max);
        let min = d.samples().iter().cloned().fold(f32::MAX, f32::min);
        assert!(max > 5.0, "bump peak missing ({max})");
        assert!(min >= 0.0);
    }
}
