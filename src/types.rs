use serde::{Deserialize, Serialize};

/// Axis-aligned bounding region in image pixel coordinates.
///
/// Regions typically come from an external object detector. They may extend
/// past the image bounds; the fitter clamps them to the valid area before
/// deriving an initial pose.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Intersect with an image of the given dimensions, returning the
    /// center and extents of the clamped region.
    ///
    /// A region entirely outside the image collapses onto the nearest
    /// boundary strip instead of failing; extents never drop below one
    /// pixel.
    pub fn clamp_to(&self, width: usize, height: usize) -> ClampedRegion {
        let (w, h) = (width as f64, height as f64);
        let x0 = (self.x as f64).clamp(0.0, (w - 1.0).max(0.0));
        let y0 = (self.y as f64).clamp(0.0, (h - 1.0).max(0.0));
        let x1 = (self.x as f64 + self.w as f64).clamp(x0 + 1.0, w.max(x0 + 1.0));
        let y1 = (self.y as f64 + self.h as f64).clamp(y0 + 1.0, h.max(y0 + 1.0));
        ClampedRegion {
            cx: 0.5 * (x0 + x1),
            cy: 0.5 * (y0 + y1),
            w: x1 - x0,
            h: y1 - y0,
        }
    }
}

/// Region clamped to the image, in continuous pixel coordinates.
#[derive(Clone, Copy, Debug)]
pub struct ClampedRegion {
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_interior_region() {
        let r = Rect::new(10, 20, 30, 40).clamp_to(100, 100);
        assert!((r.cx - 25.0).abs() < 1e-9);
        assert!((r.cy - 40.0).abs() < 1e-9);
        assert!((r.w - 30.0).abs() < 1e-9);
        assert!((r.h - 40.0).abs() < 1e-9);
    }

    #[test]
    fn clamp_collapses_outside_region() {
        let r = Rect::new(500, -50, 20, 20).clamp_to(100, 100);
        assert!(r.cx <= 100.0 && r.cy >= 0.0);
        assert!(r.w >= 1.0 && r.h >= 1.0);
    }
}
