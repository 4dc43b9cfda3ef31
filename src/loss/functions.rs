use ndarray::{Array2, ArrayView2};

/// Trait defining the interface for loss functions
pub trait Loss: Send + Sync {
    /// Compute the loss for a batch of predictions and targets
    fn compute_batch(&self, predictions: ArrayView2<f64>, targets: ArrayView2<f64>) -> f64;

    /// Gradient of the loss with respect to the predictions
    fn gradient_batch(&self, predictions: ArrayView2<f64>, targets: ArrayView2<f64>) -> Array2<f64>;
}

/// Mean squared error averaged over every element of the batch.
pub struct MSE;

impl Loss for MSE {
    fn compute_batch(&self, predictions: ArrayView2<f64>, targets: ArrayView2<f64>) -> f64 {
        let diff = &predictions - &targets;
        (&diff * &diff).mean().unwrap_or(0.0)
    }

    fn gradient_batch(&self, predictions: ArrayView2<f64>, targets: ArrayView2<f64>) -> Array2<f64> {
        let n = predictions.len().max(1) as f64;
        (&predictions - &targets) * (2.0 / n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn mse_averages_over_all_elements() {
        let p = array![[1.0, 2.0], [3.0, 4.0]];
        let t = array![[1.0, 0.0], [3.0, 6.0]];
        assert_abs_diff_eq!(MSE.compute_batch(p.view(), t.view()), 2.0);
    }

    #[test]
    fn mse_gradient_matches_finite_difference() {
        let p = array![[0.3, -1.2], [2.0, 0.7]];
        let t = array![[1.0, 0.0], [1.5, 0.5]];
        let grad = MSE.gradient_batch(p.view(), t.view());
        let h = 1e-6;
        for i in 0..2 {
            for j in 0..2 {
                let mut plus = p.clone();
                plus[[i, j]] += h;
                let mut minus = p.clone();
                minus[[i, j]] -= h;
                let numeric = (MSE.compute_batch(plus.view(), t.view())
                    - MSE.compute_batch(minus.view(), t.view()))
                    / (2.0 * h);
                assert_abs_diff_eq!(grad[[i, j]], numeric, epsilon = 1e-6);
            }
        }
    }
}
