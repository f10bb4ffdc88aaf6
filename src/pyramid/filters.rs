//! Separable 1-D filters used before pyramid decimation.

use crate::image::{ImageF32, ImageView, ImageViewMut};

/// Trait implemented by separable 1D filters used for pyramid construction.
pub trait SeparableFilter {
    /// Return the 1D taps (in left-to-right order). The kernel is assumed to
    /// be symmetric around its centre, but the implementation does not rely
    /// on it.
    fn taps(&self) -> &[f32];
}

/// Simple wrapper around a static filter kernel.
#[derive(Clone, Copy, Debug)]
pub struct StaticSeparableFilter {
    taps: &'static [f32],
}

impl Default for StaticSeparableFilter {
    fn default() -> Self {
        GAUSSIAN_5TAP
    }
}

impl StaticSeparableFilter {
    pub const fn new(taps: &'static [f32]) -> Self {
        Self { taps }
    }
}

impl SeparableFilter for StaticSeparableFilter {
    #[inline]
    fn taps(&self) -> &[f32] {
        self.taps
    }
}

/// Normalised 5-tap Gaussian filter `[1, 4, 6, 4, 1] / 16`.
pub const GAUSSIAN_5TAP: StaticSeparableFilter =
    StaticSeparableFilter::new(&[0.0625, 0.25, 0.375, 0.25, 0.0625]);

/// Apply a separable filter horizontally then vertically, replicating the
/// border.
pub fn apply(filter: &dyn SeparableFilter, inp: &ImageF32) -> ImageF32 {
    let taps = filter.taps();
    let radius = taps.len() / 2;
    let (w, h) = (inp.w, inp.h);

    let mut tmp = ImageF32::new(w, h);
    for y in 0..h {
        let src = inp.row(y);
        let dst = tmp.row_mut(y);
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, &tap) in taps.iter().enumerate() {
                let xi = (x + k).saturating_sub(radius).min(w - 1);
                acc += tap * src[xi];
            }
            dst[x] = acc;
        }
    }

    let mut out = ImageF32::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, &tap) in taps.iter().enumerate() {
                let yi = (y + k).saturating_sub(radius).min(h - 1);
                acc += tap * tmp.get(x, yi);
            }
            out.set(x, y, acc);
        }
    }
    out
}
