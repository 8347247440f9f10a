//! Chart output
//!
//! The job hands every computed chart to a [`ChartSink`]. [`PngRenderer`]
//! draws them with plotters' bitmap backend; tests substitute a recording
//! sink.

use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::Palette;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::info;

use crate::error::{ReportError, ReportResult};
use crate::views::{Bar, Chart, Slice, ViewKind};

/// Output image size in pixels
pub const IMAGE_SIZE: (u32, u32) = (800, 600);

const FONT: &str = "sans-serif";

/// Longest label drawn on a bar axis before it is shortened
const MAX_LABEL_CHARS: usize = 28;

/// Destination for computed charts
pub trait ChartSink {
    fn emit(&mut self, kind: ViewKind, chart: &Chart) -> ReportResult<()>;
}

/// Writes `report-N-<slug>.png` files into one directory
pub struct PngRenderer {
    output_dir: PathBuf,
}

impl PngRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl ChartSink for PngRenderer {
    fn emit(&mut self, kind: ViewKind, chart: &Chart) -> ReportResult<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(kind.file_name());

        {
            let root = BitMapBackend::new(&path, IMAGE_SIZE).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;
            let title = kind.title();

            match chart {
                Chart::Histogram {
                    histogram,
                    density,
                    x_label,
                } => draw_histogram(&root, title, histogram, density.as_deref(), x_label)?,
                Chart::HorizontalBars { bars, value_label } => {
                    draw_horizontal_bars(&root, title, bars, value_label)?
                }
                Chart::VerticalBars { bars, value_label } => {
                    draw_vertical_bars(&root, title, bars, value_label)?
                }
                Chart::Line {
                    points,
                    x_label,
                    y_label,
                } => draw_line(&root, title, points, x_label, y_label)?,
                Chart::Pie { slices } => draw_pie(&root, title, slices)?,
                Chart::Heatmap { labels, matrix } => draw_heatmap(&root, title, labels, matrix)?,
            }

            root.present().map_err(render_err)?;
        }

        info!("Wrote {}", path.display());
        Ok(())
    }
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

fn render_err<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::Render(e.to_string())
}

fn short_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        label.to_string()
    } else {
        let head: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
        format!("{}…", head)
    }
}

/// Upper axis bound with some headroom above the largest value
fn headroom(max: f64) -> f64 {
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn draw_histogram(
    root: &Area,
    title: &str,
    histogram: &crate::stats::Histogram,
    density: Option<&[(f64, f64)]>,
    x_label: &str,
) -> ReportResult<()> {
    let lo = histogram.edges.first().copied().unwrap_or(0.0);
    let hi = histogram.edges.last().copied().unwrap_or(1.0);
    let density_max = density
        .map(|d| d.iter().map(|(_, y)| *y).fold(0.0, f64::max))
        .unwrap_or(0.0);
    let y_max = headroom((histogram.max_count() as f64).max(density_max));

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(lo..hi, 0f64..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc("Count")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(histogram.counts.iter().enumerate().map(|(i, count)| {
            Rectangle::new(
                [
                    (histogram.edges[i], 0.0),
                    (histogram.edges[i + 1], *count as f64),
                ],
                BLUE.mix(0.6).filled(),
            )
        }))
        .map_err(render_err)?;

    if let Some(curve) = density {
        chart
            .draw_series(LineSeries::new(curve.iter().copied(), RED.stroke_width(2)))
            .map_err(render_err)?;
    }

    Ok(())
}

fn draw_horizontal_bars(
    root: &Area,
    title: &str,
    bars: &[Bar],
    value_label: &str,
) -> ReportResult<()> {
    let n = bars.len();
    let x_max = headroom(bars.iter().map(|b| b.value).fold(0.0, f64::max));
    let labels: Vec<String> = bars.iter().map(|b| short_label(&b.label)).collect();
    let label_of = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(220)
        .build_cartesian_2d(0f64..x_max, (0usize..n).into_segmented())
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n + 1)
        .y_label_formatter(&label_of)
        .x_desc(value_label)
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, bar)| {
            let mut rect = Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(i)),
                    (bar.value, SegmentValue::Exact(i + 1)),
                ],
                BLUE.mix(0.7).filled(),
            );
            rect.set_margin(4, 4, 0, 0);
            rect
        }))
        .map_err(render_err)?;

    Ok(())
}

fn draw_vertical_bars(
    root: &Area,
    title: &str,
    bars: &[Bar],
    value_label: &str,
) -> ReportResult<()> {
    let n = bars.len();
    let y_max = headroom(bars.iter().map(|b| b.value).fold(0.0, f64::max));
    let labels: Vec<String> = bars.iter().map(|b| short_label(&b.label)).collect();
    let label_of = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 24))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d((0usize..n).into_segmented(), 0f64..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n + 1)
        .x_label_formatter(&label_of)
        .y_desc(value_label)
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, bar)| {
            let mut rect = Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0.0),
                    (SegmentValue::Exact(i + 1), bar.value),
                ],
                GREEN.mix(0.7).filled(),
            );
            rect.set_margin(0, 0, 6, 6);
            rect
        }))
        .map_err(render_err)?;

    Ok(())
}

fn draw_line(
    root: &Area,
    title: &str,
    points: &[(i32, f64)],
    x_label: &str,
    y_label: &str,
) -> ReportResult<()> {
    let first = points.first().map(|p| p.0).unwrap_or(0);
    let last = points.last().map(|p| p.0).unwrap_or(first);
    let (x_lo, x_hi) = if first == last {
        (first - 1, last + 1)
    } else {
        (first, last)
    };
    let y_max = headroom(points.iter().map(|p| p.1).fold(0.0, f64::max));

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_lo..x_hi, 0f64..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .x_label_formatter(&|year: &i32| year.to_string())
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), BLUE.stroke_width(2)))
        .map_err(render_err)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|(year, mean)| Circle::new((*year, *mean), 3, BLUE.filled())),
        )
        .map_err(render_err)?;

    Ok(())
}

fn draw_pie(root: &Area, title: &str, slices: &[Slice]) -> ReportResult<()> {
    let (width, height) = root.dim_in_pixel();
    let body = root.titled(title, (FONT, 24)).map_err(render_err)?;

    let center = (width as i32 / 2, (height as i32 - 40) / 2);
    let radius = f64::from(width.min(height)) * 0.3;
    let sizes: Vec<f64> = slices.iter().map(|s| s.count as f64).collect();
    let colors: Vec<RGBColor> = (0..slices.len()).map(palette).collect();
    let labels: Vec<String> = slices
        .iter()
        .map(|s| format!("{} ({})", short_label(&s.label), s.percent))
        .collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(90.0);
    pie.label_style((FONT, 16).into_font().color(&BLACK));
    body.draw(&pie).map_err(render_err)?;

    Ok(())
}

fn draw_heatmap(
    root: &Area,
    title: &str,
    labels: &[String],
    matrix: &[Vec<f64>],
) -> ReportResult<()> {
    let body = root.titled(title, (FONT, 24)).map_err(render_err)?;

    let n = labels.len().max(1) as i32;
    let (left, top) = (200, 30);
    let cell = (440 / n).max(1);

    let centered = Pos::new(HPos::Center, VPos::Center);
    let value_style = TextStyle::from((FONT, 18).into_font()).pos(centered);
    let label_style = TextStyle::from((FONT, 16).into_font()).color(&BLACK);

    for (i, row) in matrix.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            let x0 = left + j as i32 * cell;
            let y0 = top + i as i32 * cell;
            let fill = heat_color(*value);
            body.draw(&Rectangle::new(
                [(x0, y0), (x0 + cell, y0 + cell)],
                fill.filled(),
            ))
            .map_err(render_err)?;

            let text = if value.is_nan() {
                "NaN".to_string()
            } else {
                format!("{:.2}", value)
            };
            let ink = if value.abs() > 0.6 { &WHITE } else { &BLACK };
            body.draw(&Text::new(
                text,
                (x0 + cell / 2, y0 + cell / 2),
                value_style.color(ink),
            ))
            .map_err(render_err)?;
        }
    }

    for (i, label) in labels.iter().enumerate() {
        let offset = i as i32 * cell + cell / 2;
        body.draw(&Text::new(
            label.clone(),
            (10, top + offset),
            label_style.pos(Pos::new(HPos::Left, VPos::Center)),
        ))
        .map_err(render_err)?;
        body.draw(&Text::new(
            label.clone(),
            (left + offset, top + n * cell + 15),
            label_style.pos(Pos::new(HPos::Center, VPos::Top)),
        ))
        .map_err(render_err)?;
    }

    Ok(())
}

/// Yellow-green-blue ramp over [-1, 1]; undefined values are grey
fn heat_color(value: f64) -> RGBColor {
    const STOPS: [(u8, u8, u8); 5] = [
        (255, 255, 217),
        (199, 233, 180),
        (65, 182, 196),
        (34, 94, 168),
        (8, 29, 88),
    ];

    if value.is_nan() {
        return RGBColor(200, 200, 200);
    }

    let t = ((value.clamp(-1.0, 1.0) + 1.0) / 2.0) * (STOPS.len() - 1) as f64;
    let idx = (t.floor() as usize).min(STOPS.len() - 2);
    let frac = t - idx as f64;
    let (a, b) = (STOPS[idx], STOPS[idx + 1]);
    let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * frac).round() as u8;

    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn palette(i: usize) -> RGBColor {
    let (r, g, b) = Palette99::COLORS[i % Palette99::COLORS.len()];
    RGBColor(r, g, b)
}
