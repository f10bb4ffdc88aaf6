use super::ShapeVec;
use crate::error::{Error, Result};
use nalgebra::{DMatrix, DVector};

/// Capability boundary between the statistical shape model and the fitting
/// engine: project an image-aligned shape into the subspace, reconstruct a
/// shape from parameters, and truncate parameters to the plausible range.
///
/// Implemented once by [`PcaShapeModel`]; the engine consumes the trait so
/// the model remains an opaque, read-only dependency.
pub trait ShapeSubspace {
    fn n_points(&self) -> usize;
    fn n_components(&self) -> usize;

    /// Mean shape in model space.
    fn mean(&self) -> &ShapeVec;

    /// Project a tangent-space shape onto the basis: `Φᵀ (y − mean)`.
    fn project(&self, shape: &ShapeVec) -> DVector<f64>;

    /// Reconstruct `mean + Φ b` from subspace parameters.
    fn reconstruct(&self, params: &DVector<f64>) -> ShapeVec;

    /// Clamp each parameter to `± m·√λᵢ`. Violating components are bounded,
    /// never dropped.
    fn clamp_params(&self, params: &mut DVector<f64>, truncation: f64);
}

/// PCA shape subspace: mean shape, orthonormal basis of deviations and
/// per-component variances, all sized once at model load.
#[derive(Clone, Debug)]
pub struct PcaShapeModel {
    mean: ShapeVec,
    basis: DMatrix<f64>,
    eigenvalues: DVector<f64>,
}

impl PcaShapeModel {
    /// Validate and assemble a trained subspace.
    ///
    /// `basis` must be `2N × k` with `k ≤ 2N`, matching the mean shape, and
    /// every eigenvalue must be strictly positive (guaranteed by a proper
    /// PCA truncation; enforced here so the estimator's `Λ⁻¹` is always
    /// well-defined).
    pub fn new(mean: ShapeVec, basis: DMatrix<f64>, eigenvalues: DVector<f64>) -> Result<Self> {
        let dim = mean.as_vector().len();
        if dim == 0 {
            return Err(Error::MalformedShapeModel("empty mean shape".into()));
        }
        if basis.nrows() != dim {
            return Err(Error::MalformedShapeModel(format!(
                "basis has {} rows, mean shape implies {}",
                basis.nrows(),
                dim
            )));
        }
        if basis.ncols() != eigenvalues.len() {
            return Err(Error::MalformedShapeModel(format!(
                "basis has {} components, {} eigenvalues supplied",
                basis.ncols(),
                eigenvalues.len()
            )));
        }
        if basis.ncols() > dim {
            return Err(Error::MalformedShapeModel(format!(
                "{} components exceed the {}-dimensional shape space",
                basis.ncols(),
                dim
            )));
        }
        if eigenvalues.iter().any(|&l| l <= 0.0 || !l.is_finite()) {
            return Err(Error::MalformedShapeModel(
                "eigenvalues must be strictly positive and finite".into(),
            ));
        }
        Ok(Self {
            mean,
            basis,
            eigenvalues,
        })
    }

    #[inline]
    pub fn basis(&self) -> &DMatrix<f64> {
        &self.basis
    }

    #[inline]
    pub fn eigenvalues(&self) -> &DVector<f64> {
        &self.eigenvalues
    }
}

impl ShapeSubspace for PcaShapeModel {
    #[inline]
    fn n_points(&self) -> usize {
        self.mean.n_points()
    }

    #[inline]
    fn n_components(&self) -> usize {
        self.basis.ncols()
    }

    #[inline]
    fn mean(&self) -> &ShapeVec {
        &self.mean
    }

    fn project(&self, shape: &ShapeVec) -> DVector<f64> {
        let r = shape.as_vector() - self.mean.as_vector();
        self.basis.transpose() * r
    }

    fn reconstruct(&self, params: &DVector<f64>) -> ShapeVec {
        ShapeVec::from_vector(self.mean.as_vector() + &self.basis * params)
    }

    fn clamp_params(&self, params: &mut DVector<f64>, truncation: f64) {
        for (p, &l) in params.iter_mut().zip(self.eigenvalues.iter()) {
            let bound = truncation * l.sqrt();
            *p = p.clamp(-bound, bound);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_model() -> PcaShapeModel {
        // Two landmarks on the x axis, one component moving them apart.
        let mean = ShapeVec::from_points(&[[-1.0, 0.0], [1.0, 0.0]]);
        let basis = DMatrix::from_column_slice(4, 1, &[-0.5f64.sqrt(), 0.0, 0.5f64.sqrt(), 0.0]);
        let eigenvalues = DVector::from_element(1, 4.0);
        PcaShapeModel::new(mean, basis, eigenvalues).unwrap()
    }

    #[test]
    fn project_reconstruct_round_trip() {
        let model = line_model();
        let params = DVector::from_element(1, 1.25);
        let shape = model.reconstruct(&params);
        let back = model.project(&shape);
        assert!((back[0] - 1.25).abs() < 1e-12);
    }

    #[test]
    fn clamp_bounds_parameters() {
        let model = line_model();
        let mut params = DVector::from_element(1, 100.0);
        model.clamp_params(&mut params, 3.0);
        assert!((params[0] - 6.0).abs() < 1e-12);
        // already inside the bounds: untouched
        let mut small = DVector::from_element(1, 1.0);
        model.clamp_params(&mut small, 3.0);
        assert!((small[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let mean = ShapeVec::from_points(&[[0.0, 0.0], [1.0, 1.0]]);
        let basis = DMatrix::zeros(6, 1);
        let eig = DVector::from_element(1, 1.0);
        assert!(matches!(
            PcaShapeModel::new(mean, basis, eig),
            Err(Error::MalformedShapeModel(_))
        ));
    }

    #[test]
    fn nonpositive_eigenvalues_are_rejected() {
        let mean = ShapeVec::from_points(&[[0.0, 0.0], [1.0, 1.0]]);
        let basis = DMatrix::zeros(4, 1);
        let eig = DVector::from_element(1, 0.0);
        assert!(PcaShapeModel::new(mean, basis, eig).is_err());
    }
}
