//! Scatter plots of the loss series.

use std::ops::Range;
use std::path::Path;

use phasenet_core::{report_error, Result};
use plotters::prelude::*;
use plotters::style::register_font;

/// 8 × 8 inches at 96 dpi.
pub const CANVAS: (u32, u32) = (768, 768);

/// Family every chart label is drawn with.
pub const FONT_FAMILY: &str = "sans-serif";

/// DejaVu Sans, shipped with the crate so rendering never depends on host fonts.
const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Make [`FONT_FAMILY`] resolve to the bundled face. Re-registering is harmless.
pub fn register_bundled_font() -> Result<()> {
    register_font(FONT_FAMILY, FontStyle::Normal, BUNDLED_FONT).map_err(|_| {
        report_error("bundled font could not be parsed", "assets/DejaVuSans.ttf")
    })
}

/// Axis ranges covering every finite point, padded so a flat series still
/// has a visible extent.
pub fn bounds(points: &[(f64, f64)]) -> (Range<f64>, Range<f64>) {
    let finite = || points.iter().filter(|(x, y)| x.is_finite() && y.is_finite());
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in finite() {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if x_min > x_max {
        return (0.0..1.0, 0.0..1.0);
    }

    let pad = |lo: f64, hi: f64| {
        let span = hi - lo;
        let margin = if span > 0.0 { span * 0.05 } else { 1.0 };
        (lo - margin)..(hi + margin)
    };
    (pad(x_min, x_max), pad(y_min, y_max))
}

/// Render `points` as small black circles, "epochs" against "cost".
pub fn scatter(path: &Path, title: &str, points: &[(f64, f64)]) -> Result<()> {
    register_bundled_font()?;

    let root = BitMapBackend::new(path, CANVAS).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| report_error(format!("backend error: {e}"), path))?;

    let (x_range, y_range) = bounds(points);
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(title, (FONT_FAMILY, 24))
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(|e| report_error(format!("chart build error: {e}"), path))?;

    chart
        .configure_mesh()
        .x_desc("epochs")
        .y_desc("cost")
        .draw()
        .map_err(|e| report_error(format!("mesh error: {e}"), path))?;

    chart
        .draw_series(
            points
                .iter()
                .filter(|(x, y)| x.is_finite() && y.is_finite())
                .map(|&(x, y)| Circle::new((x, y), 1, BLACK.filled())),
        )
        .map_err(|e| report_error(format!("draw error: {e}"), path))?;

    root.present()
        .map_err(|e| report_error(format!("render error: {e}"), path))?;
    Ok(())
}
