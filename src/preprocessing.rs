//! Feature scaling.
//!
//! Per-column standardization to zero mean and unit variance. The scaler is
//! fit on the training split only and reapplied verbatim to the test split
//! and to inference input.
use crate::math::Matrix;

/// Standard scaler (per-column mean/std).
#[derive(Clone, Debug, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl StandardScaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-9;

    /// Fit a scaler from a matrix where rows are samples and columns are
    /// features.
    pub fn fit(x: &Matrix) -> StandardScaler {
        let (nrows, ncols) = x.shape();
        assert!(nrows > 0 && ncols > 0, "scaler requires a non-empty matrix");

        let nrows_f = nrows as f64;
        let mut mean = vec![0.0f64; ncols];
        for r in 0..nrows {
            for c in 0..ncols {
                mean[c] += x[(r, c)];
            }
        }
        for v in mean.iter_mut() {
            *v /= nrows_f;
        }

        let mut std = vec![0.0f64; ncols];
        for r in 0..nrows {
            for c in 0..ncols {
                let d = x[(r, c)] - mean[c];
                std[c] += d * d;
            }
        }
        for v in std.iter_mut() {
            *v = (*v / nrows_f).sqrt().max(Self::MIN_STD);
        }

        StandardScaler { mean, std }
    }

    /// Transform all rows and return a new matrix.
    pub fn transform(&self, x: &Matrix) -> Matrix {
        let (nrows, ncols) = x.shape();
        assert_eq!(ncols, self.mean.len(), "feature count mismatch");

        let mut out = Vec::with_capacity(nrows * ncols);
        for r in 0..nrows {
            for c in 0..ncols {
                out.push((x[(r, c)] - self.mean[c]) / self.std[c]);
            }
        }
        Matrix::from_shape_vec((nrows, ncols), out).expect("transform: shape mismatch")
    }
}
