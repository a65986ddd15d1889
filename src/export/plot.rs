//! PNG plots of reconstructed tables.
//!
//! Plots are drawn with tiny-skia: a framed plot area with a grid, the data
//! as a stroked polyline, a filled marker at every point, and the title and
//! axis labels in the margins. Axis scales come from the data bounds.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tiny_skia::{Color, FillRule, LineCap, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use super::label::{draw_label, Orientation};
use crate::error::{Error, Result};
use crate::model::{BjhRow, IsothermPoint, TPlotPoint, Table};

const BACKGROUND: [u8; 3] = [255, 255, 255];
const FRAME: [u8; 3] = [64, 64, 64];
const GRID: [u8; 3] = [225, 225, 225];
const SERIES: [u8; 3] = [31, 119, 180];
const TEXT: [u8; 3] = [0, 0, 0];

/// Fraction of each side left as margin around the plot area.
const MARGIN: f32 = 0.1;
const GRID_DIVISIONS: u32 = 5;
const SERIES_WIDTH: f32 = 2.0;
/// Label em size as a fraction of the shorter image side.
const LABEL_SCALE: f32 = 0.035;
const MIN_LABEL_SIZE: f32 = 8.0;

/// Output image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotSize {
    pub width: u32,
    pub height: u32,
}

impl PlotSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for PlotSize {
    fn default() -> Self {
        Self::new(960, 720)
    }
}

/// Point marker shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Dot,
    Square,
    Circle,
}

/// Title and axis labels. Empty strings are not drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotLabels {
    pub title: String,
    pub x: String,
    pub y: String,
}

impl PlotLabels {
    pub fn new(title: impl Into<String>, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn isotherm() -> Self {
        Self::new(
            "Isotherm",
            "Relative Pressure (P/P0)",
            "Relative Volume @ STP (cc/g)",
        )
    }

    pub fn tplot() -> Self {
        Self::new(
            "t-Plot: Volume vs Thickness",
            "Statistical Thickness (nm)",
            "Volume @ STP (cc/g)",
        )
    }

    pub fn bjh() -> Self {
        Self::new(
            "BJH Desorption: dV(log d) vs Diameter",
            "Pore Diameter (nm)",
            "dV(log d) (cc/g)",
        )
    }
}

/// Isotherm: relative pressure vs. adsorbed volume.
pub fn isotherm_series(table: &Table<IsothermPoint>) -> Vec<(f64, f64)> {
    table.rows().iter().map(|r| (r.p_over_p0, r.volume)).collect()
}

/// t-plot: statistical thickness vs. volume.
pub fn tplot_series(table: &Table<TPlotPoint>) -> Vec<(f64, f64)> {
    table
        .rows()
        .iter()
        .map(|r| (r.thickness_nm, r.volume))
        .collect()
}

/// BJH distribution: pore diameter vs. dV(log d).
pub fn bjh_series(table: &Table<BjhRow>) -> Vec<(f64, f64)> {
    table
        .rows()
        .iter()
        .map(|r| (r.diameter_nm, r.dv_logd))
        .collect()
}

/// Draw a series. Non-finite points are skipped.
pub fn render_plot(
    points: &[(f64, f64)],
    marker: Marker,
    labels: &PlotLabels,
    size: PlotSize,
) -> Result<Pixmap> {
    let width = size.width.max(16);
    let height = size.height.max(16);
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| Error::Plot(format!("cannot allocate a {}x{} image", width, height)))?;
    pixmap.fill(color(BACKGROUND));

    let area = PlotArea::new(width, height);
    area.draw_grid(&mut pixmap);
    area.draw_frame(&mut pixmap);
    area.draw_labels(&mut pixmap, labels, width, height);

    let points: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let Some(bounds) = Bounds::of(&points) else {
        return Ok(pixmap);
    };

    let pixels: Vec<(f32, f32)> = points.iter().map(|&p| area.project(&bounds, p)).collect();
    draw_series(&mut pixmap, &pixels);
    draw_markers(&mut pixmap, &pixels, marker);
    Ok(pixmap)
}

/// Draw a series and save it as PNG.
pub fn write_plot(
    points: &[(f64, f64)],
    marker: Marker,
    labels: &PlotLabels,
    size: PlotSize,
    path: &Path,
) -> Result<()> {
    let data = render_plot(points, marker, labels, size)?
        .encode_png()
        .map_err(|e| Error::Plot(format!("PNG encoding failed: {}", e)))?;
    fs::write(path, data)?;
    log::info!("Wrote plot with {} points to {}", points.len(), path.display());
    Ok(())
}

fn color([r, g, b]: [u8; 3]) -> Color {
    Color::from_rgba8(r, g, b, 255)
}

fn paint(rgb: [u8; 3], anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color(rgb));
    paint.anti_alias = anti_alias;
    paint
}

fn hairline() -> Stroke {
    Stroke {
        width: 1.0,
        ..Stroke::default()
    }
}

fn draw_series(pixmap: &mut Pixmap, pixels: &[(f32, f32)]) {
    let Some((&(x0, y0), rest)) = pixels.split_first() else {
        return;
    };
    let mut pb = PathBuilder::new();
    pb.move_to(x0, y0);
    for &(x, y) in rest {
        pb.line_to(x, y);
    }
    if let Some(path) = pb.finish() {
        let stroke = Stroke {
            width: SERIES_WIDTH,
            line_cap: LineCap::Round,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint(SERIES, true), &stroke, Transform::identity(), None);
    }
}

fn draw_markers(pixmap: &mut Pixmap, pixels: &[(f32, f32)], marker: Marker) {
    let mut pb = PathBuilder::new();
    for &(x, y) in pixels {
        match marker {
            Marker::Dot => pb.push_circle(x, y, 2.5),
            Marker::Circle => pb.push_circle(x, y, 4.5),
            Marker::Square => {
                if let Some(rect) = Rect::from_xywh(x - 4.0, y - 4.0, 8.0, 8.0) {
                    pb.push_rect(rect);
                }
            }
        }
    }
    if let Some(path) = pb.finish() {
        pixmap.fill_path(
            &path,
            &paint(SERIES, true),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

struct Bounds {
    x: (f64, f64),
    y: (f64, f64),
}

impl Bounds {
    fn of(points: &[(f64, f64)]) -> Option<Self> {
        let first = points.first()?;
        let mut b = Bounds {
            x: (first.0, first.0),
            y: (first.1, first.1),
        };
        for &(x, y) in &points[1..] {
            b.x = (b.x.0.min(x), b.x.1.max(x));
            b.y = (b.y.0.min(y), b.y.1.max(y));
        }
        b.x = padded(b.x);
        b.y = padded(b.y);
        Some(b)
    }
}

/// Widen a zero-width range so a single value lands mid-axis.
fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi > lo {
        (lo, hi)
    } else {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.5 };
        (lo - pad, hi + pad)
    }
}

/// Plot area edges, as pixel indices.
struct PlotArea {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl PlotArea {
    fn new(width: u32, height: u32) -> Self {
        let mx = (width as f32 * MARGIN).round();
        let my = (height as f32 * MARGIN).round();
        Self {
            left: mx,
            top: my,
            right: width as f32 - 1.0 - mx,
            bottom: height as f32 - 1.0 - my,
        }
    }

    /// Data point to the center of its pixel.
    fn project(&self, bounds: &Bounds, (x, y): (f64, f64)) -> (f32, f32) {
        let fx = ((x - bounds.x.0) / (bounds.x.1 - bounds.x.0)) as f32;
        let fy = ((y - bounds.y.0) / (bounds.y.1 - bounds.y.0)) as f32;
        let px = self.left + fx * (self.right - self.left);
        // Image rows grow downwards
        let py = self.bottom - fy * (self.bottom - self.top);
        (px + 0.5, py + 0.5)
    }

    fn draw_grid(&self, pixmap: &mut Pixmap) {
        let mut pb = PathBuilder::new();
        let steps = GRID_DIVISIONS as f32;
        for i in 1..GRID_DIVISIONS {
            let t = i as f32 / steps;
            let x = (self.left + (self.right - self.left) * t).floor() + 0.5;
            let y = (self.top + (self.bottom - self.top) * t).floor() + 0.5;
            pb.move_to(x, self.top + 0.5);
            pb.line_to(x, self.bottom + 0.5);
            pb.move_to(self.left + 0.5, y);
            pb.line_to(self.right + 0.5, y);
        }
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(
                &path,
                &paint(GRID, false),
                &hairline(),
                Transform::identity(),
                None,
            );
        }
    }

    fn draw_frame(&self, pixmap: &mut Pixmap) {
        let Some(rect) = Rect::from_ltrb(
            self.left + 0.5,
            self.top + 0.5,
            self.right + 0.5,
            self.bottom + 0.5,
        ) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        pixmap.stroke_path(&path, &paint(FRAME, false), &hairline(), Transform::identity(), None);
    }

    /// Title centered in the top margin, x label in the bottom margin, y
    /// label rotated in the left margin.
    fn draw_labels(&self, pixmap: &mut Pixmap, labels: &PlotLabels, width: u32, height: u32) {
        let size = (width.min(height) as f32 * LABEL_SCALE).max(MIN_LABEL_SIZE);
        let ink = paint(TEXT, true);
        let mid_x = (self.left + self.right) / 2.0;
        let mid_y = (self.top + self.bottom) / 2.0;

        draw_label(
            pixmap,
            &labels.title,
            size * 1.2,
            (width as f32 / 2.0, self.top / 2.0),
            Orientation::Horizontal,
            &ink,
        );
        draw_label(
            pixmap,
            &labels.x,
            size,
            (mid_x, (self.bottom + height as f32) / 2.0),
            Orientation::Horizontal,
            &ink,
        );
        draw_label(
            pixmap,
            &labels.y,
            size,
            (self.left / 2.0, mid_y),
            Orientation::Vertical,
            &ink,
        );
    }
}
