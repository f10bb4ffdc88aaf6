use nalgebra::DVector;

/// Ordered sequence of 2-D landmark points with fixed length.
///
/// Points are stored interleaved (`x0, y0, x1, y1, …`) in a dense vector
/// sized once at construction; the landmark count never changes for the
/// lifetime of a model. The flat layout is what the PCA basis and the
/// estimator operate on directly.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeVec {
    data: DVector<f64>,
}

impl ShapeVec {
    /// Zero-filled shape with `n_points` landmarks.
    pub fn zeros(n_points: usize) -> Self {
        Self {
            data: DVector::zeros(n_points * 2),
        }
    }

    /// Build from a point slice.
    pub fn from_points(points: &[[f64; 2]]) -> Self {
        let mut data = DVector::zeros(points.len() * 2);
        for (i, p) in points.iter().enumerate() {
            data[2 * i] = p[0];
            data[2 * i + 1] = p[1];
        }
        Self { data }
    }

    /// Wrap an interleaved coordinate vector. Panics on odd length.
    pub fn from_vector(data: DVector<f64>) -> Self {
        assert!(data.len() % 2 == 0, "interleaved shape vector must have even length");
        Self { data }
    }

    #[inline]
    pub fn n_points(&self) -> usize {
        self.data.len() / 2
    }

    #[inline]
    pub fn point(&self, i: usize) -> [f64; 2] {
        [self.data[2 * i], self.data[2 * i + 1]]
    }

    #[inline]
    pub fn set_point(&mut self, i: usize, p: [f64; 2]) {
        self.data[2 * i] = p[0];
        self.data[2 * i + 1] = p[1];
    }

    pub fn points(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        (0..self.n_points()).map(move |i| self.point(i))
    }

    #[inline]
    pub fn as_vector(&self) -> &DVector<f64> {
        &self.data
    }

    pub fn centroid(&self) -> [f64; 2] {
        let n = self.n_points().max(1) as f64;
        let mut cx = 0.0;
        let mut cy = 0.0;
        for p in self.points() {
            cx += p[0];
            cy += p[1];
        }
        [cx / n, cy / n]
    }

    /// Axis-aligned extents (width, height) of the point set.
    pub fn extents(&self) -> [f64; 2] {
        if self.n_points() == 0 {
            return [0.0, 0.0];
        }
        let mut min = [f64::INFINITY, f64::INFINITY];
        let mut max = [f64::NEG_INFINITY, f64::NEG_INFINITY];
        for p in self.points() {
            min[0] = min[0].min(p[0]);
            min[1] = min[1].min(p[1]);
            max[0] = max[0].max(p[0]);
            max[1] = max[1].max(p[1]);
        }
        [max[0] - min[0], max[1] - min[1]]
    }

    /// Mean Euclidean per-landmark distance to another shape of the same
    /// length. This is the convergence signal of the iterative search.
    pub fn mean_point_distance(&self, other: &ShapeVec) -> f64 {
        debug_assert_eq!(self.n_points(), other.n_points());
        let n = self.n_points();
        if n == 0 {
            return 0.0;
        }
        let mut acc = 0.0;
        for (a, b) in self.points().zip(other.points()) {
            acc += ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt();
        }
        acc / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_of_square() {
        let s = ShapeVec::from_points(&[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]]);
        assert_eq!(s.centroid(), [1.0, 1.0]);
        assert_eq!(s.extents(), [2.0, 2.0]);
    }

    #[test]
    fn mean_point_distance_uniform_shift() {
        let a = ShapeVec::from_points(&[[0.0, 0.0], [1.0, 0.0]]);
        let b = ShapeVec::from_points(&[[3.0, 4.0], [4.0, 4.0]]);
        assert!((a.mean_point_distance(&b) - 5.0).abs() < 1e-12);
    }
}
