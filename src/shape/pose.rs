use super::ShapeVec;
use serde::Serialize;

const EPS: f64 = 1e-12;

/// Similarity transform mapping model space to image space.
///
/// Stored as `(a, b, tx, ty)` with `a = s·cosθ`, `b = s·sinθ`, so applying
/// the pose to a point is a single rotation-scale followed by a
/// translation. The representation is valid at any pyramid resolution via
/// [`SimilarityPose::rescaled`].
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SimilarityPose {
    pub a: f64,
    pub b: f64,
    pub tx: f64,
    pub ty: f64,
}

impl SimilarityPose {
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn from_scale_rotation_translation(scale: f64, theta: f64, tx: f64, ty: f64) -> Self {
        Self {
            a: scale * theta.cos(),
            b: scale * theta.sin(),
            tx,
            ty,
        }
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    #[inline]
    pub fn rotation(&self) -> f64 {
        self.b.atan2(self.a)
    }

    #[inline]
    pub fn apply_point(&self, p: [f64; 2]) -> [f64; 2] {
        [
            self.a * p[0] - self.b * p[1] + self.tx,
            self.b * p[0] + self.a * p[1] + self.ty,
        ]
    }

    pub fn apply(&self, shape: &ShapeVec) -> ShapeVec {
        let mut out = ShapeVec::zeros(shape.n_points());
        for (i, p) in shape.points().enumerate() {
            out.set_point(i, self.apply_point(p));
        }
        out
    }

    /// Inverse transform. A degenerate (zero-scale) pose inverts to the
    /// identity rather than failing; downstream regularization recovers.
    pub fn inverse(&self) -> Self {
        let s2 = self.a * self.a + self.b * self.b;
        if s2 < EPS {
            return Self::identity();
        }
        let ia = self.a / s2;
        let ib = -self.b / s2;
        Self {
            a: ia,
            b: ib,
            tx: -(ia * self.tx - ib * self.ty),
            ty: -(ib * self.tx + ia * self.ty),
        }
    }

    /// Closed-form Procrustes alignment: the similarity minimizing
    /// `Σ ‖T(from_i) − to_i‖²` over scale, rotation and translation.
    ///
    /// With a single landmark (or coincident points) the rotation/scale part
    /// is unobservable; the alignment degenerates to a pure translation.
    pub fn align(from: &ShapeVec, to: &ShapeVec) -> Self {
        debug_assert_eq!(from.n_points(), to.n_points());
        let cf = from.centroid();
        let ct = to.centroid();

        let mut sxx = 0.0; // Σ xc·yc   (dot)
        let mut sxy = 0.0; // Σ xc×yc   (cross)
        let mut d = 0.0; // Σ ‖xc‖²
        for (p, q) in from.points().zip(to.points()) {
            let x = [p[0] - cf[0], p[1] - cf[1]];
            let y = [q[0] - ct[0], q[1] - ct[1]];
            sxx += x[0] * y[0] + x[1] * y[1];
            sxy += x[0] * y[1] - x[1] * y[0];
            d += x[0] * x[0] + x[1] * x[1];
        }

        let (a, b) = if d < EPS {
            (1.0, 0.0)
        } else {
            (sxx / d, sxy / d)
        };
        Self {
            a,
            b,
            tx: ct[0] - (a * cf[0] - b * cf[1]),
            ty: ct[1] - (b * cf[0] + a * cf[1]),
        }
    }

    /// Express the pose at a different resolution: image coordinates scale
    /// by `factor`, so every component does.
    pub fn rescaled(&self, factor: f64) -> Self {
        Self {
            a: self.a * factor,
            b: self.b * factor,
            tx: self.tx * factor,
            ty: self.ty * factor,
        }
    }
}
