//! Series file loading and standardization.

use anyhow::{anyhow, Context, Result};
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-channel standardization parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standardizer {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl Standardizer {
    /// Fit per-channel mean and standard deviation over all realizations
    /// and time steps of a series.
    pub fn fit(series: &Array3<f64>) -> Self {
        let (realizations, steps, channels) = series.dim();
        let n = (realizations * steps) as f64;

        let mut mean = vec![0.0; channels];
        let mut std = vec![1.0; channels];

        for c in 0..channels {
            let mut sum = 0.0;
            for r in 0..realizations {
                for t in 0..steps {
                    sum += series[[r, t, c]];
                }
            }
            mean[c] = sum / n;

            let mut var = 0.0;
            for r in 0..realizations {
                for t in 0..steps {
                    var += (series[[r, t, c]] - mean[c]).powi(2);
                }
            }
            std[c] = (var / n).sqrt().max(1e-8);
        }

        Self { mean, std }
    }

    /// Standardize a series with the fitted parameters.
    pub fn transform(&self, series: &Array3<f64>) -> Array3<f64> {
        let (realizations, steps, channels) = series.dim();
        let mut out = Array3::zeros((realizations, steps, channels));

        for r in 0..realizations {
            for t in 0..steps {
                for c in 0..channels {
                    out[[r, t, c]] = (series[[r, t, c]] - self.mean[c]) / self.std[c];
                }
            }
        }

        out
    }

    /// Map a standardized series back to physical units.
    pub fn inverse_transform(&self, series: &Array3<f64>) -> Array3<f64> {
        let (realizations, steps, channels) = series.dim();
        let mut out = Array3::zeros((realizations, steps, channels));

        for r in 0..realizations {
            for t in 0..steps {
                for c in 0..channels {
                    out[[r, t, c]] = series[[r, t, c]] * self.std[c] + self.mean[c];
                }
            }
        }

        out
    }
}

/// Standardizers fitted on the training split, reused for validation and test.
#[derive(Debug, Clone)]
pub struct SplitStats {
    pub input: Standardizer,
    pub target: Standardizer,
}

/// Read a series file into `[realizations, steps, channels]`.
///
/// Expected CSV layout: a `realization` column followed by one column per
/// channel, rows ordered by time step within each realization. Every
/// realization must contain the same number of steps.
pub fn read_series_csv<P: AsRef<Path>>(path: P) -> Result<Array3<f64>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Cannot open series file '{}'", path.display()))?;

    let channels = reader.headers()?.len().saturating_sub(1);
    if channels == 0 {
        return Err(anyhow!(
            "Series file '{}' has no channel columns",
            path.display()
        ));
    }

    let mut values: Vec<f64> = Vec::new();
    let mut realization_ids: Vec<usize> = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != channels + 1 {
            return Err(anyhow!(
                "Row {} of '{}' has {} columns, expected {}",
                row + 1,
                path.display(),
                record.len(),
                channels + 1
            ));
        }

        let id: usize = record[0]
            .trim()
            .parse()
            .with_context(|| format!("Bad realization id in row {} of '{}'", row + 1, path.display()))?;

        if realization_ids.last() != Some(&id) {
            realization_ids.push(id);
        }

        for field in record.iter().skip(1) {
            let value: f64 = field
                .trim()
                .parse()
                .with_context(|| format!("Bad value in row {} of '{}'", row + 1, path.display()))?;
            values.push(value);
        }
    }

    let realizations = realization_ids.len();
    if realizations == 0 {
        return Err(anyhow!("Series file '{}' is empty", path.display()));
    }

    let total_steps = values.len() / channels;
    if total_steps % realizations != 0 {
        return Err(anyhow!(
            "Series file '{}' has ragged realizations: {} rows over {} realizations",
            path.display(),
            total_steps,
            realizations
        ));
    }
    let steps = total_steps / realizations;

    Array3::from_shape_vec((realizations, steps, channels), values)
        .with_context(|| format!("Cannot shape series from '{}'", path.display()))
}

/// Load one input/target split and standardize it.
///
/// When `stats` is `None` the standardizers are fitted on this split (the
/// training split in practice) and returned for reuse; otherwise the given
/// ones are applied unchanged.
pub fn load_and_standardize<P: AsRef<Path>>(
    input_path: P,
    target_path: P,
    stats: Option<&SplitStats>,
) -> Result<(Array3<f64>, Array3<f64>, SplitStats)> {
    let input = read_series_csv(&input_path)?;
    let target = read_series_csv(&target_path)?;

    let (r_in, steps_in, _) = input.dim();
    let (r_tg, steps_tg, _) = target.dim();
    if r_in != r_tg || steps_in != steps_tg {
        return Err(anyhow!(
            "Input series is {}x{} but target series is {}x{}",
            r_in,
            steps_in,
            r_tg,
            steps_tg
        ));
    }

    let stats = match stats {
        Some(existing) => existing.clone(),
        None => SplitStats {
            input: Standardizer::fit(&input),
            target: Standardizer::fit(&target),
        },
    };

    let input = stats.input.transform(&input);
    let target = stats.target.transform(&target);

    Ok((input, target, stats))
}
