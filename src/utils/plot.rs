//! Prediction overlay plots.

use anyhow::Result;
use ndarray::Array3;
use plotters::prelude::*;
use std::path::Path;

/// Draw the predicted and target series for one realization and channel.
pub fn plot_series_overlay(
    prediction: &Array3<f64>,
    target: &Array3<f64>,
    realization: usize,
    channel: usize,
    title: &str,
    path: &Path,
) -> Result<()> {
    let steps = target.dim().1.min(prediction.dim().1);

    let predicted: Vec<f64> = (0..steps).map(|t| prediction[[realization, t, channel]]).collect();
    let actual: Vec<f64> = (0..steps).map(|t| target[[realization, t, channel]]).collect();

    let min_val = predicted
        .iter()
        .chain(actual.iter())
        .fold(f64::INFINITY, |a, &b| a.min(b));
    let max_val = predicted
        .iter()
        .chain(actual.iter())
        .fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let margin = ((max_val - min_val) * 0.1).max(1e-6);

    let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0..steps, (min_val - margin)..(max_val + margin))?;

    chart
        .configure_mesh()
        .x_desc("Time step")
        .y_desc("Standardized value")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            actual.iter().enumerate().map(|(t, &v)| (t, v)),
            &BLUE,
        ))?
        .label("Target")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .draw_series(LineSeries::new(
            predicted.iter().enumerate().map(|(t, &v)| (t, v)),
            &RED,
        ))?
        .label("Predicted")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    tracing::info!("Saved plot to '{}'", path.display());

    Ok(())
}
