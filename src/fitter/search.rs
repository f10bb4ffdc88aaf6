//! Per-landmark 1-D profile search along the boundary normal.
//!
//! Each landmark samples a normalized difference profile at candidate
//! positions along the normal to the local boundary direction (derived from
//! its neighboring landmarks) and keeps the candidate whose profile is
//! closest, in Mahalanobis distance, to the trained statistics. New
//! positions are collected for all landmarks before any is applied, so a
//! sweep reads only the previous iteration's fixed shape.

use super::options::FitOptions;
use crate::error::Result;
use crate::image::ImageF32;
use crate::model::AsmModel;
use crate::shape::ShapeVec;
use nalgebra::DVector;

const EPS: f64 = 1e-12;

/// Winning candidate for one landmark.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PointChoice {
    pub position: [f64; 2],
    pub offset: i32,
    pub distance: f64,
}

/// Outcome of one full search sweep over all landmarks.
#[derive(Clone, Debug)]
pub(crate) struct SearchSweep {
    pub observed: ShapeVec,
    pub choices: Vec<PointChoice>,
    pub mean_distance: f64,
}

/// Extract the normalized difference profile at `center`, sampled along
/// `normal` (a unit vector) with half-length `half_len`.
///
/// `2·half_len + 2` bilinear intensity samples are taken one pixel apart;
/// their forward differences give a `2·half_len + 1` profile centred on the
/// landmark, which is normalized by its mean absolute value. Samples
/// falling outside the image replicate the border, so profiles near the
/// image edge stay well-defined instead of failing the fit.
///
/// Trainers must use this exact function when building profile statistics,
/// which is why it is public.
pub fn extract_profile(
    img: &ImageF32,
    center: [f64; 2],
    normal: [f64; 2],
    half_len: usize,
) -> DVector<f64> {
    let n_samples = 2 * half_len + 2;
    let mut samples = Vec::with_capacity(n_samples);
    for j in 0..n_samples {
        let t = j as f64 - half_len as f64 - 0.5;
        let x = center[0] + t * normal[0];
        let y = center[1] + t * normal[1];
        samples.push(img.sample_clamped(x, y) as f64);
    }

    let mut profile = DVector::zeros(n_samples - 1);
    let mut sum_abs = 0.0;
    for j in 0..n_samples - 1 {
        let d = samples[j + 1] - samples[j];
        profile[j] = d;
        sum_abs += d.abs();
    }
    profile /= sum_abs.max(EPS);
    profile
}

/// Unit normal to the boundary at landmark `i`, derived from the direction
/// between its neighboring landmarks. Endpoints use their single neighbor;
/// a degenerate tangent (coincident neighbors, or a single-landmark model)
/// falls back to the horizontal axis.
///
/// Public for the same reason as [`extract_profile`]: trained statistics
/// are only comparable to fitted profiles when both sides sample along the
/// same normals.
pub fn landmark_normal(shape: &ShapeVec, i: usize) -> [f64; 2] {
    let n = shape.n_points();
    if n < 2 {
        return [1.0, 0.0];
    }
    let prev = shape.point(i.saturating_sub(1));
    let next = shape.point((i + 1).min(n - 1));
    let tx = next[0] - prev[0];
    let ty = next[1] - prev[1];
    let norm = (tx * tx + ty * ty).sqrt();
    if norm < EPS {
        [1.0, 0.0]
    } else {
        [-ty / norm, tx / norm]
    }
}

fn search_point(
    img: &ImageF32,
    shape: &ShapeVec,
    landmark: usize,
    model: &AsmModel,
    level: usize,
    options: &FitOptions,
) -> Result<PointChoice> {
    let p = shape.point(landmark);
    let normal = landmark_normal(shape, landmark);
    let k = options.search_radius as i32;

    let mut best: Option<PointChoice> = None;
    for offset in -k..=k {
        let center = [
            p[0] + offset as f64 * normal[0],
            p[1] + offset as f64 * normal[1],
        ];
        let profile = extract_profile(img, center, normal, options.profile_half_len);
        let distance = model.profiles().evaluate(landmark, level, &profile)?;
        let better = match &best {
            None => true,
            // Ties go to the smaller displacement from the current position.
            Some(b) => {
                distance < b.distance || (distance == b.distance && offset.abs() < b.offset.abs())
            }
        };
        if better {
            best = Some(PointChoice {
                position: center,
                offset,
                distance,
            });
        }
    }
    Ok(best.expect("candidate scan covers at least the zero offset"))
}

/// Run the profile search for every landmark against the previous
/// iteration's shape and assemble the observed shape from the winners.
pub(crate) fn sweep(
    img: &ImageF32,
    shape: &ShapeVec,
    model: &AsmModel,
    level: usize,
    options: &FitOptions,
) -> Result<SearchSweep> {
    let n = shape.n_points();
    let run = |i: usize| search_point(img, shape, i, model, level, options);

    if options.parallel.should_parallelize_landmarks(n) {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            let choices = (0..n)
                .into_par_iter()
                .map(run)
                .collect::<Result<Vec<_>>>()?;
            return Ok(assemble(choices));
        }
    }

    let choices = (0..n).map(run).collect::<Result<Vec<_>>>()?;
    Ok(assemble(choices))
}

fn assemble(choices: Vec<PointChoice>) -> SearchSweep {
    let mut observed = ShapeVec::zeros(choices.len());
    let mut acc = 0.0;
    for (i, c) in choices.iter().enumerate() {
        observed.set_point(i, c.position);
        acc += c.distance;
    }
    let mean_distance = acc / choices.len().max(1) as f64;
    SearchSweep {
        observed,
        choices,
        mean_distance,
    }
}
