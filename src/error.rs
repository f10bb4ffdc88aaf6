//! Crate-wide error taxonomy.
//!
//! Only configuration/model errors and usage errors surface to the caller.
//! Numerical degeneracy is absorbed by the regularized estimator and
//! non-convergence is reported through the diagnostics channel, so neither
//! appears here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Shape and appearance statistics disagree on the landmark count.
    #[error("landmark count mismatch: shape model has {shape}, appearance model has {appearance}")]
    LandmarkCountMismatch { shape: usize, appearance: usize },

    /// The fit requested more pyramid levels than the model was trained for.
    #[error("appearance model trained for {trained} pyramid levels, fit requested {requested}")]
    MissingPyramidLevel { trained: usize, requested: usize },

    /// Trained profile length does not match the configured profile half-length.
    #[error("profile length mismatch: trained profiles have {trained} samples, options imply {expected}")]
    ProfileLengthMismatch { trained: usize, expected: usize },

    /// Shape model dimensions are internally inconsistent.
    #[error("malformed shape model: {0}")]
    MalformedShapeModel(String),

    /// Appearance statistics are internally inconsistent.
    #[error("malformed appearance model: {0}")]
    MalformedAppearanceModel(String),

    /// A profile evaluation addressed statistics outside the trained range.
    #[error(
        "landmark {landmark} / level {level} outside trained range \
         ({points} landmarks, {levels} levels)"
    )]
    StatsOutOfRange {
        landmark: usize,
        level: usize,
        points: usize,
        levels: usize,
    },

    /// A candidate profile had the wrong number of samples.
    #[error("candidate profile has {got} samples, trained statistics expect {expected}")]
    ProfileSampleMismatch { got: usize, expected: usize },

    /// The input image has zero width or height.
    #[error("input image is empty")]
    EmptyImage,

    /// A detached fit result was converted before a model was attached.
    #[error("fit result has no associated model; call set_model before converting")]
    MissingModel,
}

pub type Result<T> = std::result::Result<T, Error>;
