#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod appearance;
pub mod diagnostics;
pub mod error;
pub mod fitter;
pub mod image;
pub mod model;
pub mod types;

// “Expert” modules – still public, but considered unstable internals.
pub mod pyramid;
pub mod shape;

// --- High-level re-exports -------------------------------------------------

// Main entry points: fitter + trained model + results.
pub use crate::error::{Error, Result};
pub use crate::fitter::{AsmFitter, FitOptions, FitResult};
pub use crate::model::AsmModel;
pub use crate::types::Rect;

// Diagnostics side-channel.
pub use crate::diagnostics::{FitObserver, FitTrace, LevelTrace, Verbosity};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use asm_fitter::prelude::*;
///
/// # fn trained_model() -> asm_fitter::AsmModel { unimplemented!() }
/// # fn main() -> asm_fitter::Result<()> {
/// let model = trained_model();
/// let fitter = AsmFitter::new(&model, FitOptions::default())?;
///
/// let (w, h) = (640usize, 480usize);
/// let gray = vec![128u8; w * h];
/// let img = ImageU8 { w, h, stride: w, data: &gray };
///
/// let result = fitter.fit(img)?;
/// println!("fitted {} landmarks", result.to_point_list()?.len());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::ImageU8;
    pub use crate::{AsmFitter, AsmModel, FitOptions, FitResult, Rect, Verbosity};
}
