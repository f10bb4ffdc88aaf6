//! Trained local appearance statistics.
//!
//! For every (landmark, pyramid level) pair the model stores the mean of the
//! normalized difference profile observed during training together with the
//! inverse of its covariance. Fitting scores a candidate displacement by the
//! squared Mahalanobis distance of its profile against these statistics;
//! lower is better. The tables are produced offline by a trainer and are
//! strictly read-only here.

use crate::error::{Error, Result};
use nalgebra::{DMatrix, DVector};

/// Statistics for one (landmark, level) pair.
#[derive(Clone, Debug)]
pub struct ProfileStats {
    /// Mean difference profile, length `2·ns + 1`.
    pub mean: DVector<f64>,
    /// Inverse covariance of the profile, `(2·ns + 1)²`.
    pub inv_covar: DMatrix<f64>,
}

/// Per-landmark, per-level profile statistics for a trained model.
///
/// Indexed `[level][landmark]`; every entry shares one profile length.
#[derive(Clone, Debug)]
pub struct ProfileModel {
    stats: Vec<Vec<ProfileStats>>,
    n_points: usize,
    profile_len: usize,
}

impl ProfileModel {
    /// Validate and assemble trained statistics.
    ///
    /// Requires at least one level, the same landmark count on every level,
    /// and consistent mean/covariance dimensions throughout.
    pub fn new(stats: Vec<Vec<ProfileStats>>) -> Result<Self> {
        if stats.is_empty() || stats[0].is_empty() {
            return Err(Error::MalformedAppearanceModel(
                "no trained profile statistics".into(),
            ));
        }
        let n_points = stats[0].len();
        let profile_len = stats[0][0].mean.len();
        if profile_len == 0 {
            return Err(Error::MalformedAppearanceModel("empty profiles".into()));
        }
        for (level, per_point) in stats.iter().enumerate() {
            if per_point.len() != n_points {
                return Err(Error::MalformedAppearanceModel(format!(
                    "level {} has {} landmarks, level 0 has {}",
                    level,
                    per_point.len(),
                    n_points
                )));
            }
            for (landmark, entry) in per_point.iter().enumerate() {
                if entry.mean.len() != profile_len
                    || entry.inv_covar.nrows() != profile_len
                    || entry.inv_covar.ncols() != profile_len
                {
                    return Err(Error::MalformedAppearanceModel(format!(
                        "inconsistent dimensions at level {level}, landmark {landmark}"
                    )));
                }
            }
        }
        Ok(Self {
            stats,
            n_points,
            profile_len,
        })
    }

    #[inline]
    pub fn n_levels(&self) -> usize {
        self.stats.len()
    }

    #[inline]
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// Trained profile length (`2·ns + 1`).
    #[inline]
    pub fn profile_len(&self) -> usize {
        self.profile_len
    }

    /// Squared Mahalanobis distance `(x−μ)ᵀ Σ⁻¹ (x−μ)` of a candidate
    /// profile against the trained statistics for `(landmark, level)`.
    ///
    /// Addressing statistics outside the trained range is a configuration
    /// error: the model does not match the shape being fit.
    pub fn evaluate(&self, landmark: usize, level: usize, profile: &DVector<f64>) -> Result<f64> {
        if level >= self.n_levels() || landmark >= self.n_points {
            return Err(Error::StatsOutOfRange {
                landmark,
                level,
                points: self.n_points,
                levels: self.n_levels(),
            });
        }
        if profile.len() != self.profile_len {
            return Err(Error::ProfileSampleMismatch {
                got: profile.len(),
                expected: self.profile_len,
            });
        }
        let entry = &self.stats[level][landmark];
        let d = profile - &entry.mean;
        Ok((&entry.inv_covar * &d).dot(&d))
    }
}
