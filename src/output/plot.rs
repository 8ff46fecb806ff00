//! Charts of sweep results.
use crate::sweep::SweepResults;
use anyhow::{Result, ensure};
use plotters::prelude::*;
use std::path::Path;

/// The output file name for the growth rate chart
pub const GROWTH_RATE_PLOT_FILE_NAME: &str = "growth_rate.svg";

const PLOT_SIZE: (u32, u32) = (1000, 600);

/// Draw a bar chart of growth rate for each label and save it as an SVG file
pub fn plot_growth_rate(file_path: &Path, results: &SweepResults) -> Result<()> {
    ensure!(!results.is_empty(), "No results to plot");

    let (labels, values): (Vec<_>, Vec<_>) = results
        .iter()
        .map(|(label, record)| (label.to_string(), record.result.growth_rate))
        .unzip();
    let y_min = values.iter().copied().fold(0.0, f64::min);
    let y_max = values.iter().copied().fold(1e-3, f64::max) * 1.1;

    let root = SVGBackend::new(file_path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Growth Rate Across Enhancement Factors", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((0..labels.len()).into_segmented(), y_min..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .y_desc("Growth Rate (h⁻¹)")
        .draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, value)| {
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *value)],
            BLUE.mix(0.7).filled(),
        );
        bar.set_margin(0, 0, 8, 8);
        bar
    }))?;

    root.present()?;

    Ok(())
}
