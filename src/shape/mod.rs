//! Shape-space data model: point vectors, similarity poses and the PCA
//! subspace capability consumed by the fitting engine.
//!
//! A shape lives in one of two equivalent representations: a raw
//! image-space [`ShapeVec`], or a `(params, pose)` pair where `params`
//! selects a point in the PCA subspace and [`SimilarityPose`] maps it into
//! the image. The fitter keeps the two synchronized; any update to one side
//! invalidates the other until re-derived.

mod model;
mod pose;
mod vector;

pub use model::{PcaShapeModel, ShapeSubspace};
pub use pose::SimilarityPose;
pub use vector::ShapeVec;
