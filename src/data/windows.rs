//! Time-resolution windowing.
//!
//! A full series `[realizations, steps, channels]` is cut into fixed
//! windows of `time_resolution` steps, which become the sample axis the
//! model trains over. After inference the per-window outputs are stitched
//! back into full series for error reporting and plotting.

use anyhow::{anyhow, Result};
use ndarray::Array3;

/// Number of whole windows in one realization.
pub fn windows_per_realization(steps: usize, time_resolution: usize) -> usize {
    steps / time_resolution
}

/// Cut a series into windows: `[r, L, c]` → `[r·W, T, c]` with `W = L / T`.
///
/// A trailing partial window is dropped.
pub fn window_series(series: &Array3<f64>, time_resolution: usize) -> Result<Array3<f64>> {
    if time_resolution == 0 {
        return Err(anyhow!("Time resolution must be positive"));
    }

    let (realizations, steps, channels) = series.dim();
    let per_realization = windows_per_realization(steps, time_resolution);
    if per_realization == 0 {
        return Err(anyhow!(
            "Series length {} is shorter than the time resolution {}",
            steps,
            time_resolution
        ));
    }

    let mut windows = Array3::zeros((realizations * per_realization, time_resolution, channels));

    for r in 0..realizations {
        for w in 0..per_realization {
            let sample = r * per_realization + w;
            for t in 0..time_resolution {
                for c in 0..channels {
                    windows[[sample, t, c]] = series[[r, w * time_resolution + t, c]];
                }
            }
        }
    }

    Ok(windows)
}

/// Window an input/target pair with the same resolution.
pub fn window_split(
    input: &Array3<f64>,
    target: &Array3<f64>,
    time_resolution: usize,
) -> Result<(Array3<f64>, Array3<f64>)> {
    Ok((
        window_series(input, time_resolution)?,
        window_series(target, time_resolution)?,
    ))
}

/// Stitch windows back into full series: `[r·W, T, c]` → `[r, W·T, c]`.
///
/// The window count must be divisible by the number of realizations; the
/// reassembled length is `W·T`, i.e. any steps truncated during windowing
/// stay truncated.
pub fn assemble_series(windows: &Array3<f64>, realizations: usize) -> Result<Array3<f64>> {
    let (samples, time_resolution, channels) = windows.dim();
    if realizations == 0 || samples % realizations != 0 {
        return Err(anyhow!(
            "{} windows cannot be split over {} realizations",
            samples,
            realizations
        ));
    }

    let per_realization = samples / realizations;
    let steps = per_realization * time_resolution;
    let mut series = Array3::zeros((realizations, steps, channels));

    for r in 0..realizations {
        for w in 0..per_realization {
            let sample = r * per_realization + w;
            for t in 0..time_resolution {
                for c in 0..channels {
                    series[[r, w * time_resolution + t, c]] = windows[[sample, t, c]];
                }
            }
        }
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    fn ramp_series(realizations: usize, steps: usize, channels: usize) -> Array3<f64> {
        let mut series = Array3::zeros((realizations, steps, channels));
        for r in 0..realizations {
            for t in 0..steps {
                for c in 0..channels {
                    series[[r, t, c]] = (r * steps * channels + t * channels + c) as f64;
                }
            }
        }
        series
    }

    #[test]
    fn test_window_series_shapes() {
        let series = ramp_series(2, 10, 3);
        let windows = window_series(&series, 5).unwrap();

        assert_eq!(windows.dim(), (4, 5, 3));
        // First window of the second realization starts where its series does.
        assert_relative_eq!(windows[[2, 0, 0]], series[[1, 0, 0]]);
    }

    #[test]
    fn test_window_series_truncates_partial_window() {
        let series = ramp_series(1, 11, 2);
        let windows = window_series(&series, 4).unwrap();

        // 11 steps at resolution 4 keep two whole windows; 3 steps are dropped.
        assert_eq!(windows.dim(), (2, 4, 2));
        assert_relative_eq!(windows[[1, 3, 1]], series[[0, 7, 1]]);
    }

    #[test]
    fn test_window_series_rejects_short_series() {
        let series = ramp_series(1, 3, 1);
        assert!(window_series(&series, 5).is_err());
        assert!(window_series(&series, 0).is_err());
    }

    #[test]
    fn test_assemble_restores_windowed_series() {
        let series = ramp_series(3, 12, 2);
        let windows = window_series(&series, 4).unwrap();
        let restored = assemble_series(&windows, 3).unwrap();

        assert_eq!(restored.dim(), series.dim());
        for (a, b) in series.iter().zip(restored.iter()) {
            assert_relative_eq!(a, b);
        }
    }

    #[test]
    fn test_assemble_rejects_uneven_split() {
        let windows = ramp_series(5, 4, 1);
        assert!(assemble_series(&windows, 2).is_err());
        assert!(assemble_series(&windows, 0).is_err());
    }
}
