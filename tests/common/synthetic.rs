//! Synthetic disk fixture shared by the integration tests.
//!
//! Renders a dark disk on a bright background, places landmarks on its
//! boundary and hand-trains a model: mean shape on the boundary, a single
//! radial deformation mode, and per-level profile statistics extracted from
//! the reference rendering with the same sampling the fitter uses.
#![allow(dead_code)]

use asm_fitter::appearance::{ProfileModel, ProfileStats};
use asm_fitter::fitter::{extract_profile, landmark_normal, pyramid_options};
use asm_fitter::image::ImageU8;
use asm_fitter::pyramid::Pyramid;
use asm_fitter::shape::{PcaShapeModel, ShapeVec};
use asm_fitter::AsmModel;
use nalgebra::{DMatrix, DVector};

pub const NS: usize = 6;

pub struct DiskScene {
    pub buffer: Vec<u8>,
    pub w: usize,
    pub h: usize,
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub truth: Vec<[f64; 2]>,
}

impl DiskScene {
    pub fn view(&self) -> ImageU8<'_> {
        ImageU8 {
            w: self.w,
            h: self.h,
            stride: self.w,
            data: &self.buffer,
        }
    }
}

/// Dark disk on bright background with `n_points` boundary landmarks.
pub fn disk_scene(w: usize, h: usize, cx: f64, cy: f64, radius: f64, n_points: usize) -> DiskScene {
    let mut buffer = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let d = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt();
            buffer[y * w + x] = if d < radius { 40 } else { 216 };
        }
    }
    let truth = (0..n_points)
        .map(|i| {
            let theta = 2.0 * std::f64::consts::PI * i as f64 / n_points as f64;
            [cx + radius * theta.cos(), cy + radius * theta.sin()]
        })
        .collect();
    DiskScene {
        buffer,
        w,
        h,
        cx,
        cy,
        radius,
        truth,
    }
}

/// Train a model on the scene: centered mean shape, one radial mode with
/// the given eigenvalue, identity-covariance profile statistics per level.
pub fn disk_model(scene: &DiskScene, levels: usize, eigenvalue: f64) -> AsmModel {
    let n = scene.truth.len();
    let centered: Vec<[f64; 2]> = scene
        .truth
        .iter()
        .map(|p| [p[0] - scene.cx, p[1] - scene.cy])
        .collect();
    let mean = ShapeVec::from_points(&centered);

    let mut basis = DMatrix::zeros(2 * n, 1);
    for (i, p) in centered.iter().enumerate() {
        let norm = (p[0] * p[0] + p[1] * p[1]).sqrt().max(1e-9);
        basis[(2 * i, 0)] = p[0] / norm;
        basis[(2 * i + 1, 0)] = p[1] / norm;
    }
    let col_norm = basis.column(0).norm();
    basis /= col_norm;
    let shape = PcaShapeModel::new(mean, basis, DVector::from_element(1, eigenvalue))
        .expect("synthetic subspace is well-formed");

    let profiles = trained_profiles(scene, levels);
    AsmModel::new(shape, profiles).expect("landmark counts agree")
}

fn trained_profiles(scene: &DiskScene, levels: usize) -> ProfileModel {
    let pyramid = Pyramid::build_u8(scene.view(), pyramid_options(levels));
    let true_shape = ShapeVec::from_points(&scene.truth);
    let n = scene.truth.len();
    let len = 2 * NS + 1;

    let mut stats = Vec::with_capacity(levels);
    for level in 0..levels {
        let scale = Pyramid::level_scale(level);
        let level_img = &pyramid.levels[level];
        let mut per_point = Vec::with_capacity(n);
        for i in 0..n {
            let p = true_shape.point(i);
            let center = [p[0] * scale, p[1] * scale];
            let normal = landmark_normal(&true_shape, i);
            let profile = extract_profile(level_img, center, normal, NS);
            per_point.push(ProfileStats {
                mean: profile,
                inv_covar: DMatrix::identity(len, len),
            });
        }
        stats.push(per_point);
    }
    ProfileModel::new(stats).expect("synthetic statistics are well-formed")
}

/// Largest distance between fitted integer points and the true landmarks.
pub fn max_landmark_error(points: &[[i32; 2]], truth: &[[f64; 2]]) -> f64 {
    points
        .iter()
        .zip(truth.iter())
        .map(|(p, t)| ((p[0] as f64 - t[0]).powi(2) + (p[1] as f64 - t[1]).powi(2)).sqrt())
        .fold(0.0, f64::max)
}
