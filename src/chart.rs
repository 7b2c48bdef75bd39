/// Line charts of one history series.
///
/// [`build_chart`] computes everything a chart shows (title, axis label, mean
/// line, y limits) as plain data so it can be checked without drawing.
/// [`Chart::save_svg`] hands that data to plotters.

use crate::analysis::summarize;
use crate::model::{RiverError, UNIT_LABEL};
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::path::{Path, PathBuf};

pub const MEAN_LABEL: &str = "Average Water Level";

/// Padding factors applied to the observed extremes.
const Y_LOWER_FACTOR: f64 = 0.95;
const Y_UPPER_FACTOR: f64 = 1.05;

const CHART_SIZE: (u32, u32) = (900, 400);

/// A renderable chart for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub y_label: String,
    pub values: Vec<f64>,
    /// Height of the dashed reference line.
    pub mean: f64,
    pub mean_label: String,
    /// `(min × 0.95, max × 1.05)`
    pub y_limits: (f64, f64),
}

pub fn build_chart(series: &str, values: &[f64]) -> Result<Chart, RiverError> {
    let stats = summarize(series, values)?;

    Ok(Chart {
        title: series.to_string(),
        y_label: UNIT_LABEL.to_string(),
        values: values.to_vec(),
        mean: stats.mean,
        mean_label: MEAN_LABEL.to_string(),
        y_limits: (stats.min * Y_LOWER_FACTOR, stats.max * Y_UPPER_FACTOR),
    })
}

/// File name for a series chart: lowercase, non-alphanumerics collapsed to `_`.
pub fn chart_file_name(series: &str) -> String {
    let mut slug = String::with_capacity(series.len());
    for c in series.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    format!("{}.svg", slug.trim_matches('_'))
}

fn render_err<E: std::fmt::Display>(err: E) -> RiverError {
    RiverError::Render(err.to_string())
}

impl Chart {
    /// Y range handed to plotters. Identical to `y_limits` unless those are
    /// degenerate (all-zero or negative series), which plotters cannot draw.
    fn plot_range(&self) -> (f64, f64) {
        let (lo, hi) = self.y_limits;
        if lo < hi {
            (lo, hi)
        } else {
            (lo.min(hi) - 1.0, lo.max(hi) + 1.0)
        }
    }

    /// Draws the chart as SVG at `path`, overwriting any existing file.
    pub fn save_svg(&self, path: &Path) -> Result<(), RiverError> {
        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let x_max = self.values.len().saturating_sub(1).max(1);
        let (y_lo, y_hi) = self.plot_range();

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(30)
            .y_label_area_size(70)
            .build_cartesian_2d(0..x_max, y_lo..y_hi)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_desc("Reading")
            .y_desc(self.y_label.as_str())
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(LineSeries::new(
                self.values.iter().enumerate().map(|(i, v)| (i, *v)),
                &BLUE,
            ))
            .map_err(render_err)?;

        chart
            .draw_series(DashedLineSeries::new(
                vec![(0, self.mean), (x_max, self.mean)],
                10,
                5,
                RED.stroke_width(2),
            ))
            .map_err(render_err)?
            .label(self.mean_label.as_str())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        Ok(())
    }

    /// Draws into `dir` using [`chart_file_name`]; returns the written path.
    pub fn save_svg_in(&self, dir: &Path) -> Result<PathBuf, RiverError> {
        std::fs::create_dir_all(dir).map_err(render_err)?;
        let path = dir.join(chart_file_name(&self.title));
        self.save_svg(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_line_and_padded_limits() {
        let chart = build_chart("James River", &[10.0, 20.0, 30.0]).unwrap();
        assert_eq!(chart.title, "James River");
        assert_eq!(chart.y_label, "Cubic Feet per Second (cfs)");
        assert_eq!(chart.mean_label, "Average Water Level");
        assert!((chart.mean - 20.0).abs() < 1e-12);
        assert!((chart.y_limits.0 - 9.5).abs() < 1e-9);
        assert!((chart.y_limits.1 - 31.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_values_cannot_be_charted() {
        assert_eq!(
            build_chart("New River", &[]).unwrap_err(),
            RiverError::EmptySeries("New River".to_string())
        );
    }

    #[test]
    fn test_flat_zero_series_still_has_a_drawable_range() {
        let chart = build_chart("Dry Creek", &[0.0, 0.0]).unwrap();
        assert_eq!(chart.y_limits, (0.0, 0.0));
        let (lo, hi) = chart.plot_range();
        assert!(lo < hi);
    }

    #[test]
    fn test_chart_file_name_is_slugged() {
        assert_eq!(chart_file_name("James River"), "james_river.svg");
        assert_eq!(
            chart_file_name("Potomac River, Little Falls"),
            "potomac_river_little_falls.svg"
        );
    }

    #[test]
    fn test_svg_is_written_with_title_and_legend() {
        let dir = tempfile::tempdir().unwrap();
        let chart = build_chart("Rappahannock River", &[1200.0, 1350.0, 1100.0]).unwrap();
        let path = chart.save_svg_in(dir.path()).unwrap();

        assert_eq!(path.file_name().unwrap(), "rappahannock_river.svg");
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Rappahannock River"));
        assert!(svg.contains("Average Water Level"));
    }
}
