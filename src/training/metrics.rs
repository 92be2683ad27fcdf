//! Error metrics over reassembled full series.

use ndarray::Array3;
use tracing::info;

/// Mean squared error.
pub fn mse(prediction: &Array3<f64>, target: &Array3<f64>) -> f64 {
    let n = target.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    prediction
        .iter()
        .zip(target.iter())
        .map(|(p, t)| (p - t).powi(2))
        .sum::<f64>()
        / n
}

/// Root mean squared error.
pub fn rmse(prediction: &Array3<f64>, target: &Array3<f64>) -> f64 {
    mse(prediction, target).sqrt()
}

/// Mean absolute error.
pub fn mae(prediction: &Array3<f64>, target: &Array3<f64>) -> f64 {
    let n = target.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    prediction
        .iter()
        .zip(target.iter())
        .map(|(p, t)| (p - t).abs())
        .sum::<f64>()
        / n
}

/// R² score (coefficient of determination).
pub fn r2_score(prediction: &Array3<f64>, target: &Array3<f64>) -> f64 {
    let n = target.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mean = target.iter().sum::<f64>() / n;

    let ss_res: f64 = prediction
        .iter()
        .zip(target.iter())
        .map(|(p, t)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = target.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// Prediction error summary for one split.
#[derive(Debug, Clone)]
pub struct ErrorSummary {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl ErrorSummary {
    pub fn compute(prediction: &Array3<f64>, target: &Array3<f64>) -> Self {
        Self {
            mse: mse(prediction, target),
            rmse: rmse(prediction, target),
            mae: mae(prediction, target),
            r2: r2_score(prediction, target),
        }
    }
}

/// Per-split error summaries for one predictor.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub train: ErrorSummary,
    pub validation: ErrorSummary,
    pub test: ErrorSummary,
}

impl ErrorReport {
    /// Log one line per split.
    pub fn log(&self, label: &str) {
        info!("{} error results:", label);
        for (split, summary) in [
            ("train", &self.train),
            ("validation", &self.validation),
            ("test", &self.test),
        ] {
            info!(
                "  {:<10} | mse={:.6} | rmse={:.6} | mae={:.6} | r2={:.4}",
                split, summary.mse, summary.rmse, summary.mae, summary.r2
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_mse() {
        let target = array![[[1.0], [2.0], [3.0]]];
        let prediction = array![[[1.1], [2.0], [2.9]]];

        assert_relative_eq!(mse(&prediction, &target), 0.006666666666666667, epsilon = 1e-12);
    }

    #[test]
    fn test_rmse_is_sqrt_of_mse() {
        let target = array![[[0.0], [0.0]]];
        let prediction = array![[[3.0], [4.0]]];

        assert_relative_eq!(mse(&prediction, &target), 12.5);
        assert_relative_eq!(rmse(&prediction, &target), 12.5_f64.sqrt());
    }

    #[test]
    fn test_mae() {
        let target = array![[[1.0], [-1.0]]];
        let prediction = array![[[2.0], [1.0]]];

        assert_relative_eq!(mae(&prediction, &target), 1.5);
    }

    #[test]
    fn test_r2_score_near_one_for_good_fit() {
        let target = array![[[1.0], [2.0], [3.0], [4.0], [5.0]]];
        let prediction = array![[[1.1], [2.1], [2.9], [4.0], [5.1]]];

        assert!(r2_score(&prediction, &target) > 0.95);
    }

    #[test]
    fn test_perfect_prediction() {
        let target = array![[[1.0, 2.0], [3.0, 4.0]]];
        let summary = ErrorSummary::compute(&target, &target);

        assert_relative_eq!(summary.mse, 0.0);
        assert_relative_eq!(summary.mae, 0.0);
        assert_relative_eq!(summary.r2, 1.0);
    }
}
