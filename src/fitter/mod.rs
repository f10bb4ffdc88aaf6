//! Coarse-to-fine ASM fitting engine.
//!
//! Overview
//! - Builds a blurred image pyramid and initializes a similarity pose from
//!   the target region (or the whole image).
//! - Walks the levels coarse → fine. On each level the per-landmark profile
//!   search proposes a raw observed shape, which the BTSM estimator
//!   regularizes back onto the shape manifold; the loop stops early once
//!   the mean landmark shift drops below the convergence threshold.
//! - The converged `(params, pose)` pair seeds the next finer level;
//!   parameters live in model space, the pose rescales dyadically.
//!
//! Non-convergence within a level's iteration budget is not a failure: the
//! last estimate is carried forward and the outcome is reported through the
//! observer channel. Only model/configuration mismatches (caught when the
//! fitter is constructed) and empty input images surface as errors.

mod estimator;
mod options;
mod result;
mod search;

pub use estimator::{estimate, BtsmEstimate};
pub use options::{FitOptions, ParallelFitOptions};
pub use result::FitResult;
pub use search::{extract_profile, landmark_normal};

use crate::diagnostics::{FitObserver, FitTrace, LevelTrace, LogObserver};
use crate::error::{Error, Result};
use crate::image::ImageU8;
use crate::model::AsmModel;
use crate::pyramid::{Pyramid, PyramidOptions};
use crate::shape::{ShapeSubspace, ShapeVec, SimilarityPose};
use crate::types::{ClampedRegion, Rect};
use nalgebra::DVector;

const EPS: f64 = 1e-9;

/// Fraction of the region's extent the initial mean shape is scaled to
/// fill.
const REGION_FILL: f64 = 0.8;

/// Pyramid options the fitter uses for a given level count.
///
/// Trainers must build their statistics on pyramids constructed with these
/// exact options, otherwise trained and observed profiles sample different
/// image content.
pub fn pyramid_options(levels: usize) -> PyramidOptions {
    PyramidOptions::new(levels).with_blur_levels(levels)
}

/// Multi-resolution ASM search over a trained, read-only model.
pub struct AsmFitter<'m> {
    model: &'m AsmModel,
    options: FitOptions,
}

impl<'m> AsmFitter<'m> {
    /// Validate that the options are compatible with the trained model.
    ///
    /// Incompatibilities (more pyramid levels than trained, profile length
    /// mismatch) are configuration errors surfaced here, before any image
    /// is touched.
    pub fn new(model: &'m AsmModel, options: FitOptions) -> Result<Self> {
        if options.pyramid_levels == 0 || options.pyramid_levels > model.n_levels() {
            return Err(Error::MissingPyramidLevel {
                trained: model.n_levels(),
                requested: options.pyramid_levels,
            });
        }
        if model.profiles().profile_len() != options.profile_len() {
            return Err(Error::ProfileLengthMismatch {
                trained: model.profiles().profile_len(),
                expected: options.profile_len(),
            });
        }
        Ok(Self { model, options })
    }

    #[inline]
    pub fn model(&self) -> &'m AsmModel {
        self.model
    }

    #[inline]
    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    /// Run one full pyramid search starting from a centered pose over the
    /// whole image.
    pub fn fit(&self, image: ImageU8<'_>) -> Result<FitResult<'m>> {
        let mut observer = LogObserver::new(self.options.verbosity);
        self.fit_with_observer(image, &mut observer)
    }

    /// Like [`AsmFitter::fit`], reporting progress to a caller-supplied
    /// observer instead of the log channel.
    pub fn fit_with_observer(
        &self,
        image: ImageU8<'_>,
        observer: &mut dyn FitObserver,
    ) -> Result<FitResult<'m>> {
        Ok(self.fit_traced_with_observer(image, observer)?.0)
    }

    /// Like [`AsmFitter::fit`], additionally returning the per-level trace.
    pub fn fit_traced(&self, image: ImageU8<'_>) -> Result<(FitResult<'m>, FitTrace)> {
        let mut observer = LogObserver::new(self.options.verbosity);
        self.fit_traced_with_observer(image, &mut observer)
    }

    pub fn fit_traced_with_observer(
        &self,
        image: ImageU8<'_>,
        observer: &mut dyn FitObserver,
    ) -> Result<(FitResult<'m>, FitTrace)> {
        if image.w == 0 || image.h == 0 {
            return Err(Error::EmptyImage);
        }
        let region = Rect::new(0, 0, image.w as u32, image.h as u32).clamp_to(image.w, image.h);
        let pyramid = Pyramid::build_u8(image, pyramid_options(self.options.pyramid_levels));
        self.run(&pyramid, region, observer)
    }

    /// Fit every detected region independently, in input order.
    ///
    /// The pyramid is built once and shared; each region only determines
    /// its fit's initial pose. A region lying partially or fully outside
    /// the image is clamped, so pathological detector output still yields a
    /// best-effort result rather than an omission.
    pub fn fit_all(&self, image: ImageU8<'_>, regions: &[Rect]) -> Result<Vec<FitResult<'m>>> {
        if image.w == 0 || image.h == 0 {
            return Err(Error::EmptyImage);
        }
        let (w, h) = (image.w, image.h);
        let pyramid = Pyramid::build_u8(image, pyramid_options(self.options.pyramid_levels));
        let clamped: Vec<ClampedRegion> = regions.iter().map(|r| r.clamp_to(w, h)).collect();

        if self.options.parallel.should_parallelize_regions(clamped.len()) {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                return clamped
                    .par_iter()
                    .map(|region| {
                        let mut observer = LogObserver::new(self.options.verbosity);
                        self.run(&pyramid, *region, &mut observer)
                            .map(|(result, _)| result)
                    })
                    .collect();
            }
        }

        clamped
            .iter()
            .map(|region| {
                let mut observer = LogObserver::new(self.options.verbosity);
                self.run(&pyramid, *region, &mut observer)
                    .map(|(result, _)| result)
            })
            .collect()
    }

    /// Core level loop shared by every entry point.
    fn run(
        &self,
        pyramid: &Pyramid,
        region: ClampedRegion,
        observer: &mut dyn FitObserver,
    ) -> Result<(FitResult<'m>, FitTrace)> {
        let shape_model = self.model.shape();
        let mut pose = initial_pose(shape_model.mean(), &region);
        let mut params: DVector<f64> = DVector::zeros(shape_model.n_components());
        let mut trace = FitTrace::default();
        let mut all_converged = true;

        for level in (0..self.options.pyramid_levels).rev() {
            let img = &pyramid.levels[level];
            let factor = Pyramid::level_scale(level);
            let mut level_pose = pose.rescaled(factor);
            observer.level_started(level, img.w, img.h);

            let mut working = level_pose.apply(&shape_model.reconstruct(&params));
            let mut iterations = 0;
            let mut converged = false;
            let mut mean_shift = 0.0;
            let mut sigma2 = 0.0;

            for iteration in 0..self.options.max_iterations {
                iterations = iteration + 1;
                let sweep = search::sweep(img, &working, self.model, level, &self.options)?;
                for (landmark, choice) in sweep.choices.iter().enumerate() {
                    observer.point(level, landmark, choice.offset, choice.distance);
                }

                let est = estimator::estimate(
                    shape_model,
                    &sweep.observed,
                    &level_pose,
                    self.options.truncation,
                );
                params = est.params;
                level_pose = est.pose;
                sigma2 = est.sigma2;

                let updated = level_pose.apply(&shape_model.reconstruct(&params));
                mean_shift = updated.mean_point_distance(&working);
                working = updated;
                observer.iteration(level, iteration, mean_shift, sweep.mean_distance);

                if mean_shift < self.options.convergence_threshold {
                    converged = true;
                    break;
                }
            }

            all_converged &= converged;
            pose = level_pose.rescaled(1.0 / factor);
            let level_trace = LevelTrace {
                level_index: level,
                width: img.w,
                height: img.h,
                iterations,
                converged,
                mean_shift,
                sigma2,
            };
            observer.level_finished(&level_trace);
            trace.levels.push(level_trace);
        }

        Ok((
            FitResult::new(self.model, params, pose, all_converged),
            trace,
        ))
    }
}

/// Initial pose placing the mean shape in the center of a region, scaled so
/// its bounding box fills [`REGION_FILL`] of the region's extents.
///
/// Shapes that are degenerate along an axis (a single landmark, or all
/// landmarks collinear) only use the non-degenerate axis for the scale; a
/// fully degenerate shape keeps unit scale.
fn initial_pose(mean: &ShapeVec, region: &ClampedRegion) -> SimilarityPose {
    let ext = mean.extents();
    let centroid = mean.centroid();

    let mut scale = f64::INFINITY;
    if ext[0] > EPS {
        scale = scale.min(REGION_FILL * region.w / ext[0]);
    }
    if ext[1] > EPS {
        scale = scale.min(REGION_FILL * region.h / ext[1]);
    }
    if !scale.is_finite() || scale <= 0.0 {
        scale = 1.0;
    }

    SimilarityPose {
        a: scale,
        b: 0.0,
        tx: region.cx - scale * centroid[0],
        ty: region.cy - scale * centroid[1],
    }
}
