//! Immutable fit output.

use crate::error::{Error, Result};
use crate::model::AsmModel;
use crate::shape::{ShapeSubspace, ShapeVec, SimilarityPose};
use nalgebra::DVector;

/// Final outcome of one fit: shape parameters, pose, and a reference to the
/// model that produced them.
///
/// The model reference is needed to reconstruct absolute landmark points on
/// demand; a result built with [`FitResult::detached`] must be given a
/// model via [`FitResult::set_model`] before conversion, otherwise the
/// conversion reports a usage error. Non-convergence is *not* an error —
/// the `converged` flag is diagnostic only and the carried estimate is the
/// best one available.
#[derive(Clone, Debug)]
pub struct FitResult<'m> {
    params: DVector<f64>,
    pose: SimilarityPose,
    model: Option<&'m AsmModel>,
    converged: bool,
}

impl<'m> FitResult<'m> {
    pub(crate) fn new(
        model: &'m AsmModel,
        params: DVector<f64>,
        pose: SimilarityPose,
        converged: bool,
    ) -> Self {
        Self {
            params,
            pose,
            model: Some(model),
            converged,
        }
    }

    /// Build a result that is not yet associated with a model.
    pub fn detached(params: DVector<f64>, pose: SimilarityPose, converged: bool) -> Self {
        Self {
            params,
            pose,
            model: None,
            converged,
        }
    }

    /// Attach (or replace) the model reference used for reconstruction.
    pub fn set_model(&mut self, model: &'m AsmModel) {
        self.model = Some(model);
    }

    /// Shape parameters in the PCA subspace.
    #[inline]
    pub fn params(&self) -> &DVector<f64> {
        &self.params
    }

    /// Similarity pose mapping model space to original-resolution image
    /// coordinates.
    #[inline]
    pub fn pose(&self) -> SimilarityPose {
        self.pose
    }

    /// Whether every pyramid level converged within its iteration budget.
    #[inline]
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Reconstruct the continuous image-space shape `pose ∘ reconstruct(b)`.
    pub fn shape(&self) -> Result<ShapeVec> {
        let model = self.model.ok_or(Error::MissingModel)?;
        Ok(self.pose.apply(&model.shape().reconstruct(&self.params)))
    }

    /// Landmark positions rounded to integer pixel coordinates, in landmark
    /// order. Pure and deterministic: repeated calls yield identical output.
    pub fn to_point_list(&self) -> Result<Vec<[i32; 2]>> {
        let shape = self.shape()?;
        Ok(shape
            .points()
            .map(|p| [p[0].round() as i32, p[1].round() as i32])
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_result_reports_usage_error() {
        let result = FitResult::detached(DVector::zeros(1), SimilarityPose::identity(), true);
        assert!(matches!(result.to_point_list(), Err(Error::MissingModel)));
        assert!(matches!(result.shape(), Err(Error::MissingModel)));
    }
}
