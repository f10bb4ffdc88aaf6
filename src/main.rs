use asm_fitter::appearance::{ProfileModel, ProfileStats};
use asm_fitter::fitter::{extract_profile, landmark_normal, pyramid_options};
use asm_fitter::image::ImageU8;
use asm_fitter::pyramid::Pyramid;
use asm_fitter::shape::{PcaShapeModel, ShapeVec};
use asm_fitter::{AsmFitter, AsmModel, FitOptions, Rect};
use nalgebra::{DMatrix, DVector};

const N_POINTS: usize = 12;
const LEVELS: usize = 2;
const NS: usize = 6;

// Demo: hand-trains a tiny circular model on a synthetic disk image, then
// fits it from a deliberately offset detection region.
fn main() {
    let (w, h) = (96usize, 96usize);
    let (cx, cy, radius) = (48.0f64, 48.0f64, 30.0f64);
    let buffer = disk_u8(w, h, cx, cy, radius);
    let img = ImageU8 {
        w,
        h,
        stride: w,
        data: &buffer,
    };

    let truth: Vec<[f64; 2]> = (0..N_POINTS)
        .map(|i| {
            let theta = 2.0 * std::f64::consts::PI * i as f64 / N_POINTS as f64;
            [cx + radius * theta.cos(), cy + radius * theta.sin()]
        })
        .collect();
    let model = train_model(img.clone(), &truth, cx, cy);

    let options = FitOptions {
        pyramid_levels: LEVELS,
        ..Default::default()
    };
    let fitter = AsmFitter::new(&model, options).expect("model and options are compatible");

    let region = Rect::new(14, 16, 72, 70);
    let results = fitter.fit_all(img, &[region]).expect("fit should run");
    let mut point_lists = Vec::with_capacity(results.len());
    for result in &results {
        let points = result.to_point_list().expect("result carries its model");
        println!(
            "converged={} points={}",
            result.converged(),
            serde_json::to_string(&points).expect("points serialize")
        );
        point_lists.push(points);
    }

    // Optional report dump: `asm-fitter out/points.json`
    if let Some(path) = std::env::args().nth(1) {
        asm_fitter::image::io::write_json_file(std::path::Path::new(&path), &point_lists)
            .expect("report written");
    }
}

fn disk_u8(w: usize, h: usize, cx: f64, cy: f64, radius: f64) -> Vec<u8> {
    let mut img = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let d = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt();
            img[y * w + x] = if d < radius { 40 } else { 216 };
        }
    }
    img
}

/// Build mean shape, a single radial deformation mode and per-level profile
/// statistics extracted from the reference rendering.
fn train_model(img: ImageU8<'_>, truth: &[[f64; 2]], cx: f64, cy: f64) -> AsmModel {
    let centered: Vec<[f64; 2]> = truth.iter().map(|p| [p[0] - cx, p[1] - cy]).collect();
    let mean = ShapeVec::from_points(&centered);

    let dim = 2 * N_POINTS;
    let mut basis = DMatrix::zeros(dim, 1);
    for (i, p) in centered.iter().enumerate() {
        let norm = (p[0] * p[0] + p[1] * p[1]).sqrt().max(1e-9);
        basis[(2 * i, 0)] = p[0] / norm;
        basis[(2 * i + 1, 0)] = p[1] / norm;
    }
    let col_norm = basis.column(0).norm();
    basis /= col_norm;
    let shape = PcaShapeModel::new(mean, basis, DVector::from_element(1, 25.0))
        .expect("synthetic subspace is well-formed");

    let pyramid = Pyramid::build_u8(img, pyramid_options(LEVELS));
    let true_shape = ShapeVec::from_points(truth);
    let mut stats = Vec::with_capacity(LEVELS);
    for level in 0..LEVELS {
        let scale = Pyramid::level_scale(level);
        let level_img = &pyramid.levels[level];
        let mut per_point = Vec::with_capacity(N_POINTS);
        for i in 0..N_POINTS {
            let p = true_shape.point(i);
            let center = [p[0] * scale, p[1] * scale];
            let normal = landmark_normal(&true_shape, i);
            let profile = extract_profile(level_img, center, normal, NS);
            per_point.push(ProfileStats {
                mean: profile,
                inv_covar: DMatrix::identity(2 * NS + 1, 2 * NS + 1),
            });
        }
        stats.push(per_point);
    }
    let profiles = ProfileModel::new(stats).expect("synthetic statistics are well-formed");
    AsmModel::new(shape, profiles).expect("landmark counts agree")
}
