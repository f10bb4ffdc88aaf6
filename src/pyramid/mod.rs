//! Grayscale image pyramid with configurable separable blur and 2× decimation.
//!
//! The pyramid converts level 0 from 8-bit grayscale to `ImageF32` in `[0, 1]`
//! and repeatedly downsamples by 2×. Prior to each decimation an optional
//! separable filter (Gaussian by default) is applied; border samples clamp to
//! the image extents. The fitter walks the levels coarse → fine, so level
//! `levels - 1` is the coarsest and level 0 the original resolution.

pub mod filters;
mod options;

use crate::image::{ImageF32, ImageU8, ImageView, ImageViewMut};
use filters::apply as apply_filter;
pub use options::PyramidOptions;

#[derive(Clone, Debug)]
pub struct Pyramid {
    pub levels: Vec<ImageF32>,
}

impl Pyramid {
    /// Build a pyramid from an 8-bit grayscale input using the provided options.
    pub fn build_u8(gray: ImageU8<'_>, options: PyramidOptions) -> Self {
        assert!(options.levels >= 1, "pyramid requires at least one level");
        Self::build_f32(convert_l0(gray), options)
    }

    /// Build a pyramid whose level 0 is the supplied float image.
    pub fn build_f32(image: ImageF32, options: PyramidOptions) -> Self {
        assert!(options.levels >= 1, "pyramid requires at least one level");
        let mut levels = Vec::with_capacity(options.levels);
        levels.push(image);

        for lvl in 1..options.levels {
            let prev = levels.last().expect("previous level available");
            let use_blur = lvl <= options.blur_levels;
            let filtered = use_blur.then(|| apply_filter(&options.filter, prev));
            let src = filtered.as_ref().unwrap_or(prev);

            let (nw, nh) = (prev.w.div_ceil(2), prev.h.div_ceil(2));
            let mut down = ImageF32::new(nw, nh);
            for y in 0..nh {
                let sy = (y * 2).min(src.h - 1);
                let src_row = src.row(sy);
                let dst_row = down.row_mut(y);
                for (x, dst_px) in dst_row.iter_mut().enumerate() {
                    let sx = (x * 2).min(src.w - 1);
                    *dst_px = src_row[sx];
                }
            }
            levels.push(down);
        }

        Self { levels }
    }

    /// Dyadic scale factor mapping level-0 coordinates to `level` coordinates.
    #[inline]
    pub fn level_scale(level: usize) -> f64 {
        1.0 / (1u64 << level) as f64
    }
}

fn convert_l0(gray: ImageU8<'_>) -> ImageF32 {
    let mut out = ImageF32::new(gray.w, gray.h);
    for y in 0..gray.h {
        let src = gray.row(y);
        let dst = out.row_mut(y);
        for x in 0..gray.w {
            dst[x] = src[x] as f32 / 255.0;
        }
    }
    out
}
