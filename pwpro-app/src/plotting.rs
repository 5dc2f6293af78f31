//! Renders measured polygons to PNG.

use anyhow::Result;
use plotters::prelude::*;
use pwpro_core::measure::local_offsets_feet;
use pwpro_schemas::geo::{GeoCoordinate, MeasurementResult};
use std::path::Path;

/// Draws the closed outline in feet east/north of the first vertex, on equal axes.
pub fn plot_polygon_outline(
    path: &Path,
    points: &[GeoCoordinate],
    label: Option<&str>,
    result: &MeasurementResult,
) -> Result<()> {
    let mut outline = local_offsets_feet(points);
    if let Some(first) = outline.first().copied() {
        outline.push(first);
    }
    let (x_range, y_range) = square_bounds(&outline);

    let root = BitMapBackend::new(path, (1024, 1024)).into_drawing_area();
    root.fill(&WHITE)?;

    let caption = format!(
        "{}: {:.0} sq ft, {:.0} ft perimeter",
        label.unwrap_or("Polygon"),
        result.area_square_feet,
        result.perimeter_feet
    );
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 36).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    chart.configure_mesh()
        .x_desc("East (ft)")
        .y_desc("North (ft)")
        .draw()?;

    chart.draw_series(LineSeries::new(outline.iter().copied(), BLUE.stroke_width(3)))?;
    chart.draw_series(
        outline
            .iter()
            .take(points.len())
            .map(|&(x, y)| Circle::new((x, y), 5, RED.filled())),
    )?;

    root.present()?;
    Ok(())
}

/// Square axis ranges around the outline with 10% padding so shapes are not distorted.
fn square_bounds(outline: &[(f64, f64)]) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
    for &(x, y) in outline {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    let half = ((max_x - min_x).max(max_y - min_y).max(1.0) * 1.1) / 2.0;
    let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    (cx - half..cx + half, cy - half..cy + half)
}
