//! The trained model bundle consumed by the fitter.

use crate::appearance::ProfileModel;
use crate::error::{Error, Result};
use crate::shape::{PcaShapeModel, ShapeSubspace};

/// Fully-trained Active Shape Model: the PCA shape subspace plus the local
/// appearance statistics for every landmark at every pyramid level.
///
/// Loading and saving this structure is a collaborator's responsibility;
/// once assembled it is immutable, which is what allows fits over the same
/// model to run concurrently without locking.
#[derive(Clone, Debug)]
pub struct AsmModel {
    shape: PcaShapeModel,
    profiles: ProfileModel,
}

impl AsmModel {
    /// Bundle a shape subspace with appearance statistics, verifying that
    /// both sides agree on the landmark count.
    pub fn new(shape: PcaShapeModel, profiles: ProfileModel) -> Result<Self> {
        if shape.n_points() != profiles.n_points() {
            return Err(Error::LandmarkCountMismatch {
                shape: shape.n_points(),
                appearance: profiles.n_points(),
            });
        }
        Ok(Self { shape, profiles })
    }

    #[inline]
    pub fn shape(&self) -> &PcaShapeModel {
        &self.shape
    }

    #[inline]
    pub fn profiles(&self) -> &ProfileModel {
        &self.profiles
    }

    /// Number of landmarks tracked by this model.
    #[inline]
    pub fn n_points(&self) -> usize {
        self.shape.n_points()
    }

    /// Number of pyramid levels the appearance statistics were trained for.
    #[inline]
    pub fn n_levels(&self) -> usize {
        self.profiles.n_levels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::ProfileStats;
    use crate::shape::ShapeVec;
    use nalgebra::{DMatrix, DVector};

    #[test]
    fn landmark_count_mismatch_is_rejected() {
        let mean = ShapeVec::from_points(&[[0.0, 0.0], [1.0, 0.0]]);
        let shape = PcaShapeModel::new(
            mean,
            DMatrix::from_column_slice(4, 1, &[0.5, 0.5, 0.5, 0.5]),
            DVector::from_element(1, 1.0),
        )
        .unwrap();
        let profiles = ProfileModel::new(vec![vec![ProfileStats {
            mean: DVector::zeros(3),
            inv_covar: DMatrix::identity(3, 3),
        }]])
        .unwrap();
        assert!(matches!(
            AsmModel::new(shape, profiles),
            Err(Error::LandmarkCountMismatch { .. })
        ));
    }
}
