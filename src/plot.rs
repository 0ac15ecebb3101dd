//! SVG chart output with plotters.

use crate::chart::{Chart, ChartSink, Panel, Rgb};
use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::path::{Path, PathBuf};
use tracing::debug;

const PANEL_HEIGHT: u32 = 450;
const WIDTH: u32 = 1200;

/// Writes every shown chart as an SVG file in one directory
pub struct SvgWriter {
    output_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl SvgWriter {
    /// Create the writer, creating `output_dir` if needed
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create plot directory: {}", output_dir.display()))?;
        Ok(Self {
            output_dir,
            written: Vec::new(),
        })
    }

    /// Files written so far, in order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ChartSink for SvgWriter {
    fn show(&mut self, chart: Chart) -> Result<()> {
        let name = format!("{:02}_{}.svg", self.written.len() + 1, slug(&chart.title));
        let path = self.output_dir.join(name);
        draw_chart(&chart, &path).with_context(|| format!("Failed to draw {}", path.display()))?;
        debug!("wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

/// Draw a chart with its panels stacked top to bottom
pub fn draw_chart<P: AsRef<Path>>(chart: &Chart, path: P) -> Result<()> {
    let height = PANEL_HEIGHT * chart.panels.len().max(1) as u32;
    let root = SVGBackend::new(path.as_ref(), (WIDTH, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let body = root.titled(&chart.title, ("sans-serif", 26))?;
    let areas = body.split_evenly((chart.panels.len().max(1), 1));

    for (area, panel) in areas.iter().zip(&chart.panels) {
        draw_panel(area, panel, chart)?;
    }

    root.present()?;
    Ok(())
}

fn draw_panel(area: &DrawingArea<SVGBackend<'_>, Shift>, panel: &Panel, chart: &Chart) -> Result<()> {
    let (x_min, x_max) = panel.x_range();
    let (y_min, y_max) = panel.y_range();

    // Rotated tick labels need room for the longest one
    let sample_label = chart.tick_label(x_max);
    let x_area = 30 + 8 * sample_label.chars().count() as u32;

    let mut plot = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(x_area)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    let x_formatter = |x: &f64| chart.tick_label(*x);
    let y_formatter = |y: &f64| format!("{:.1}", y);

    let mut mesh = plot.configure_mesh();
    mesh.x_labels(10)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .x_label_style(("sans-serif", 14).into_font().transform(FontTransform::Rotate90))
        .light_line_style(RGBColor(235, 235, 235))
        .bold_line_style(RGBColor(200, 200, 200));
    if let Some(ref label) = panel.y_label {
        mesh.y_desc(label.as_str());
    }
    if let Some(ref label) = panel.x_label {
        mesh.x_desc(label.as_str());
    }
    mesh.draw()?;

    for trace in &panel.traces {
        let color = rgb(trace.color);

        let line = plot.draw_series(LineSeries::new(
            trace.points.iter().copied(),
            color.stroke_width(2),
        ))?;
        if panel.legend {
            line.label(trace.label.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        if trace.markers {
            plot.draw_series(
                trace
                    .points
                    .iter()
                    .map(|&point| Circle::new(point, 3, color.filled())),
            )?;
        }

        if let Some(ref errors) = trace.errors {
            plot.draw_series(trace.points.iter().zip(errors).map(|(&(x, y), &e)| {
                let e = e.abs();
                ErrorBar::new_vertical(x, y - e, y, y + e, color.filled(), 8)
            }))?;
        }
    }

    if panel.legend {
        plot.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }

    Ok(())
}

fn rgb((r, g, b): Rgb) -> RGBColor {
    RGBColor(r, g, b)
}

/// File-name friendly form of a chart title
fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("chart");
    }
    out
}
