use std::path::Path;

use anyhow::{Context, Result};
use plotters::prelude::*;

use crate::stats::MonthBucket;

/// Plot dimensions in pixels
const PLOT_WIDTH: u32 = 1200;
const PLOT_HEIGHT: u32 = 600;

/// Chart title
const TITLE: &str = "Active Members Over Time";

/// Target number of x-axis labels; months in between go unlabeled so long
/// ranges stay readable.
const MAX_X_LABELS: usize = 12;

/// Render the monthly series as a line chart with point markers.
/// An empty series produces an empty chart rather than an error.
pub fn render_plot(path: &Path, buckets: &[MonthBucket]) -> Result<()> {
    let root = BitMapBackend::new(path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)
        .with_context(|| format!("Failed to initialize plot {}", path.display()))?;

    let max_count = buckets.iter().map(|b| b.active).max().unwrap_or(0);
    let x_max = buckets.len().saturating_sub(1).max(1);

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d(0usize..x_max, 0u32..max_count + 1)
        .context("Failed to build chart")?;

    chart
        .configure_mesh()
        .x_desc("Month")
        .y_desc("Number of Active Members")
        .x_labels(MAX_X_LABELS.min(buckets.len().max(1)))
        .x_label_formatter(&|idx: &usize| {
            buckets
                .get(*idx)
                .map(|b| b.month.to_string())
                .unwrap_or_default()
        })
        .draw()
        .context("Failed to draw chart mesh")?;

    chart
        .draw_series(LineSeries::new(
            buckets.iter().enumerate().map(|(i, b)| (i, b.active)),
            &BLUE,
        ))
        .context("Failed to draw line series")?;

    chart
        .draw_series(
            buckets
                .iter()
                .enumerate()
                .map(|(i, b)| Circle::new((i, b.active), 3, BLUE.filled())),
        )
        .context("Failed to draw point markers")?;

    root.present()
        .with_context(|| format!("Failed to write plot {}", path.display()))?;
    Ok(())
}
