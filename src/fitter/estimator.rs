//! Bayesian Tangent Shape Model parameter estimation.
//!
//! Given a raw observed shape from the local search and the pose carried
//! from the previous iteration, the estimator computes the MAP shape
//! parameters under the PCA prior together with a re-estimated pose. The
//! observation-noise variance is re-derived on every call from the residual
//! the basis cannot explain, which is what keeps the ridge system
//! well-conditioned: the `σ²Λ⁻¹` term has strictly positive entries by PCA
//! construction.

use crate::shape::{PcaShapeModel, ShapeSubspace, ShapeVec, SimilarityPose};
use nalgebra::{DMatrix, DVector};

/// Floor for the estimated observation variance; keeps the prior term from
/// vanishing when the basis explains the observation exactly.
const SIGMA2_FLOOR: f64 = 1e-8;

/// Regularized estimate produced by one BTSM solve.
#[derive(Clone, Debug)]
pub struct BtsmEstimate {
    /// MAP shape parameters, clamped to the plausible range.
    pub params: DVector<f64>,
    /// Pose aligning the reconstructed model shape to the raw observation.
    pub pose: SimilarityPose,
    /// Observation-noise variance used by the solve.
    pub sigma2: f64,
}

/// Fuse the shape prior with a raw observation.
///
/// `observed` is the image-space shape assembled from the per-landmark
/// search winners; `prior_pose` is the pose estimate carried from the
/// previous iteration (or the initial pose on the first call). `truncation`
/// is the `m` factor bounding each parameter to `± m·√λᵢ`.
pub fn estimate(
    model: &PcaShapeModel,
    observed: &ShapeVec,
    prior_pose: &SimilarityPose,
    truncation: f64,
) -> BtsmEstimate {
    // 1. Tangent-space alignment: undo the previous pose so the observation
    //    is expressed in model coordinates.
    let tangent = prior_pose.inverse().apply(observed);

    // 2. Residual split: the part of the centered observation the basis
    //    explains vs. the part it cannot, which calibrates σ².
    let r = tangent.as_vector() - model.mean().as_vector();
    let proj = model.basis().transpose() * &r;
    let explained = model.basis() * &proj;
    let residual = &r - &explained;
    let dof = (r.len().saturating_sub(model.n_components())).max(1) as f64;
    let sigma2 = (residual.norm_squared() / dof).max(SIGMA2_FLOOR);

    // 3. Ridge/MAP solve: b = (ΦᵀΦ + σ²Λ⁻¹)⁻¹ Φᵀ (Y′ − mean).
    let k = model.n_components();
    let mut system = model.basis().transpose() * model.basis();
    for i in 0..k {
        system[(i, i)] += sigma2 / model.eigenvalues()[i];
    }
    let mut params = solve_spd(system, &proj).unwrap_or_else(|| {
        // Orthonormal-basis shrinkage: exact when ΦᵀΦ = I, and a stable
        // fallback whenever the factorization cannot proceed.
        DVector::from_fn(k, |i, _| {
            let l = model.eigenvalues()[i];
            proj[i] * l / (l + sigma2)
        })
    });

    // 4. Pose from a Procrustes alignment of the reconstruction against the
    //    raw observation, then clamp the parameters to the plausible range.
    let reconstructed = model.reconstruct(&params);
    let pose = SimilarityPose::align(&reconstructed, observed);
    model.clamp_params(&mut params, truncation);

    BtsmEstimate {
        params,
        pose,
        sigma2,
    }
}

fn solve_spd(system: DMatrix<f64>, rhs: &DVector<f64>) -> Option<DVector<f64>> {
    system.cholesky().map(|chol| chol.solve(rhs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_model() -> PcaShapeModel {
        // Four landmarks on a unit square; one scaling-like component.
        let mean = ShapeVec::from_points(&[[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]]);
        let mut basis = DMatrix::zeros(8, 1);
        for (i, &v) in mean.as_vector().iter().enumerate() {
            basis[(i, 0)] = v;
        }
        let norm = basis.column(0).norm();
        basis /= norm;
        PcaShapeModel::new(mean, basis, DVector::from_element(1, 4.0)).unwrap()
    }

    #[test]
    fn exact_mean_observation_returns_zero_params() {
        let model = square_model();
        let pose = SimilarityPose::from_scale_rotation_translation(2.0, 0.5, 30.0, 40.0);
        let observed = pose.apply(model.mean());

        let est = estimate(&model, &observed, &pose, 3.0);
        assert!(est.params[0].abs() < 1e-9);
        assert!((est.sigma2 - SIGMA2_FLOOR).abs() < 1e-9);
        assert!((est.pose.a - pose.a).abs() < 1e-9);
        assert!((est.pose.b - pose.b).abs() < 1e-9);
        assert!((est.pose.tx - pose.tx).abs() < 1e-6);
        assert!((est.pose.ty - pose.ty).abs() < 1e-6);
    }

    #[test]
    fn wild_observations_are_clamped() {
        let model = square_model();
        // Square grown far beyond the prior's plausible range.
        let big = SimilarityPose::from_scale_rotation_translation(50.0, 0.0, 0.0, 0.0);
        let observed = big.apply(model.mean());

        let est = estimate(&model, &observed, &SimilarityPose::identity(), 3.0);
        let bound = 3.0 * 4.0f64.sqrt();
        assert!(est.params[0].abs() <= bound + 1e-12);
    }

    #[test]
    fn single_landmark_does_not_crash() {
        let mean = ShapeVec::from_points(&[[0.0, 0.0]]);
        let basis = DMatrix::from_column_slice(2, 1, &[1.0, 0.0]);
        let model = PcaShapeModel::new(mean, basis, DVector::from_element(1, 1.0)).unwrap();
        let observed = ShapeVec::from_points(&[[7.0, -3.0]]);

        let est = estimate(&model, &observed, &SimilarityPose::identity(), 3.0);
        // Rotation/scale are unobservable: alignment is translation only.
        assert!((est.pose.scale() - 1.0).abs() < 1e-9);
        assert!(est.pose.rotation().abs() < 1e-9);
    }
}
