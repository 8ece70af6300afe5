//! Static Chart Renderer
//! Rasterizes a `Figure` into an RGB pixel buffer with plotters.
//!
//! Every chart shares one layout: title on top, axis descriptions on the
//! bottom and left edges, legend in the upper right where a chart has more
//! than one series. Pie charts skip the axes and the heatmap carries a colour
//! bar on its right edge.

use crate::charts::figure::{Figure, PieSlice, Plot, StackedSeries, XAxis};
use crate::charts::palette;
use crate::stats::{BoxSummary, HistogramBin};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use thiserror::Error;

const FONT: &str = "sans-serif";
const BAR_HALF_WIDTH: f64 = 0.4;
const BOX_HALF_HEIGHT: f64 = 0.3;
const VIOLIN_HALF_HEIGHT: f64 = 0.4;
const COLORBAR_STEPS: usize = 64;
const NO_LABELS: &[String] = &[];

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid render size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Drawing failed: {0}")]
    Drawing(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Drawing(err.to_string())
    }
}

/// Raster size of a rendered chart. The default is a 10 x 6 inch figure at
/// 100 DPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            dpi: 100,
        }
    }
}

impl RenderSettings {
    /// Thumbnail used for history entries.
    pub fn thumbnail() -> Self {
        Self {
            width: 500,
            height: 300,
            dpi: 50,
        }
    }

    pub fn buffer_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    /// Physical page size in PostScript points (1/72 inch).
    pub fn page_points(&self) -> (f64, f64) {
        let dpi = f64::from(self.dpi.max(1));
        (
            f64::from(self.width) * 72.0 / dpi,
            f64::from(self.height) * 72.0 / dpi,
        )
    }
}

/// Pixel sizes derived from the DPI, so a figure looks the same at any resolution.
#[derive(Debug, Clone, Copy)]
struct Style {
    title: f64,
    label: f64,
    tick: f64,
    annotation: f64,
    margin: u32,
    x_area: u32,
    y_area: u32,
    stroke: u32,
}

impl Style {
    fn for_settings(settings: &RenderSettings) -> Self {
        let px_per_pt = f64::from(settings.dpi.max(1)) / 72.0;
        let px = |pt: f64| (pt * px_per_pt).round().max(1.0) as u32;
        Self {
            title: 12.0 * px_per_pt,
            label: 10.0 * px_per_pt,
            tick: 9.0 * px_per_pt,
            annotation: 9.0 * px_per_pt,
            margin: px(14.0),
            x_area: px(32.0),
            y_area: px(44.0),
            stroke: px(1.5),
        }
    }
}

type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type Chart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Draws figures onto in-memory bitmaps.
pub struct ChartRenderer;

impl ChartRenderer {
    /// Render `figure` to a tightly packed RGB buffer of
    /// `settings.width * settings.height * 3` bytes.
    pub fn render_rgb(figure: &Figure, settings: &RenderSettings) -> Result<Vec<u8>, RenderError> {
        if settings.width == 0 || settings.height == 0 {
            return Err(RenderError::InvalidSize {
                width: settings.width,
                height: settings.height,
            });
        }

        let mut buffer = vec![255u8; settings.buffer_len()];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (settings.width, settings.height))
                .into_drawing_area();
            root.fill(&WHITE)?;
            Self::draw(&root, figure, &Style::for_settings(settings))?;
            root.present()?;
        }
        Ok(buffer)
    }

    fn draw(root: &Canvas<'_>, figure: &Figure, style: &Style) -> Result<(), RenderError> {
        match &figure.plot {
            Plot::Bars {
                categories,
                heights,
            } => Self::draw_bars(root, figure, style, categories, heights),
            Plot::Pie { slices } => Self::draw_pie(root, figure, style, slices),
            Plot::Line { axis, points } => Self::draw_line(root, figure, style, axis, points),
            Plot::Scatter { axis, points } => Self::draw_scatter(root, figure, style, axis, points),
            Plot::Histogram { bins, density } => {
                Self::draw_histogram(root, figure, style, bins, density)
            }
            Plot::Box(summary) => Self::draw_box(root, figure, style, summary),
            Plot::Heatmap { labels, matrix } => {
                Self::draw_heatmap(root, figure, style, labels, matrix)
            }
            Plot::Area(stacked) => Self::draw_area(root, figure, style, stacked),
            Plot::StackedBars(stacked) => Self::draw_stacked_bars(root, figure, style, stacked),
            Plot::Violin { density, summary } => {
                Self::draw_violin(root, figure, style, density, summary)
            }
        }
    }

    fn cartesian<'a, 'b>(
        root: &'a Canvas<'b>,
        figure: &Figure,
        style: &Style,
        x: Range<f64>,
        y: Range<f64>,
    ) -> Result<Chart<'a, 'b>, RenderError> {
        Ok(ChartBuilder::on(root)
            .margin(style.margin)
            .caption(figure.title.as_str(), (FONT, style.title))
            .x_label_area_size(style.x_area)
            .y_label_area_size(style.y_area)
            .build_cartesian_2d(x, y)?)
    }

    /// Axes, ticks and descriptions. Category labels replace integer ticks.
    fn draw_mesh(
        chart: &mut Chart<'_, '_>,
        figure: &Figure,
        style: &Style,
        x_categories: Option<&[String]>,
        y_categories: Option<&[String]>,
    ) -> Result<(), RenderError> {
        let x_format = |v: &f64| Self::category_tick(x_categories.unwrap_or_default(), *v);
        let y_format = |v: &f64| {
            let labels = y_categories.unwrap_or_default();
            // Rows are drawn top-down.
            Self::category_tick(labels, labels.len() as f64 - 1.0 - *v)
        };

        let mut mesh = chart.configure_mesh();
        mesh.x_desc(figure.x_label.as_str())
            .y_desc(figure.y_label.as_str())
            .label_style((FONT, style.tick))
            .axis_desc_style((FONT, style.label));
        if let Some(labels) = x_categories {
            mesh.x_labels(labels.len() * 2 + 1)
                .x_label_formatter(&x_format)
                .disable_x_mesh();
        }
        if let Some(labels) = y_categories {
            mesh.y_labels(labels.len() * 2 + 1)
                .y_label_formatter(&y_format)
                .disable_y_mesh();
        }
        mesh.draw()?;
        Ok(())
    }

    /// Label for a tick on a category axis; blank between categories.
    fn category_tick(labels: &[String], value: f64) -> String {
        let index = value.round();
        if (value - index).abs() > 1e-6 || index < 0.0 {
            return String::new();
        }
        labels.get(index as usize).cloned().unwrap_or_default()
    }

    fn draw_legend<'a, 'b: 'a>(chart: &mut Chart<'a, 'b>, style: &Style) -> Result<(), RenderError> {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font((FONT, style.tick))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }

    fn category_range(count: usize) -> Range<f64> {
        -0.5..(count.max(1) as f64 - 0.5)
    }

    /// Range over `lo..hi` with a margin on each side; zero stays a hard floor
    /// or ceiling for bar-like charts when `anchor_zero` is set.
    fn value_range(lo: f64, hi: f64, anchor_zero: bool) -> Range<f64> {
        if !lo.is_finite() || !hi.is_finite() {
            return 0.0..1.0;
        }
        let (lo, hi) = if anchor_zero {
            (lo.min(0.0), hi.max(0.0))
        } else {
            (lo, hi)
        };
        if (hi - lo).abs() < f64::EPSILON {
            return (lo - 0.5)..(hi + 0.5);
        }
        let pad = (hi - lo) * 0.05;
        let low = if anchor_zero && lo == 0.0 { 0.0 } else { lo - pad };
        let high = if anchor_zero && hi == 0.0 { 0.0 } else { hi + pad };
        low..high
    }

    fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
        values
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    }

    fn draw_bars(
        root: &Canvas<'_>,
        figure: &Figure,
        style: &Style,
        categories: &[String],
        heights: &[f64],
    ) -> Result<(), RenderError> {
        let (lo, hi) = Self::extent(heights.iter().copied());
        let mut chart = Self::cartesian(
            root,
            figure,
            style,
            Self::category_range(categories.len()),
            Self::value_range(lo, hi, true),
        )?;
        Self::draw_mesh(&mut chart, figure, style, Some(categories), None)?;

        chart.draw_series(heights.iter().enumerate().map(|(i, &h)| {
            let x = i as f64;
            Rectangle::new(
                [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, h)],
                palette::pick(&palette::SET2, i).filled(),
            )
        }))?;
        Ok(())
    }

    fn polar(center: (i32, i32), radius: f64, degrees: f64) -> (i32, i32) {
        let theta = degrees.to_radians();
        (
            center.0 + (radius * theta.cos()).round() as i32,
            center.1 - (radius * theta.sin()).round() as i32,
        )
    }

    /// Slices run counter-clockwise from three o'clock.
    fn draw_pie(
        root: &Canvas<'_>,
        figure: &Figure,
        style: &Style,
        slices: &[PieSlice],
    ) -> Result<(), RenderError> {
        let body = root.titled(&figure.title, (FONT, style.title))?;
        let (width, height) = body.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = f64::from(width.min(height)) * 0.38;

        let mut start = 0.0_f64;
        for (i, slice) in slices.iter().enumerate() {
            let sweep = slice.fraction * 360.0;
            let steps = ((sweep / 2.0).ceil() as usize).max(1);
            let mut outline = vec![center];
            outline.extend(
                (0..=steps).map(|k| Self::polar(center, radius, start + sweep * k as f64 / steps as f64)),
            );
            let color = palette::pick(&palette::PASTEL, i);
            body.draw(&Polygon::new(outline.clone(), color.filled()))?;
            body.draw(&PathElement::new(outline, WHITE.stroke_width(style.stroke)))?;

            let middle = start + sweep / 2.0;
            let side = if middle.to_radians().cos() >= 0.0 {
                HPos::Left
            } else {
                HPos::Right
            };
            body.draw(&Text::new(
                slice.label.clone(),
                Self::polar(center, radius * 1.1, middle),
                (FONT, style.label)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(side, VPos::Center)),
            ))?;
            body.draw(&Text::new(
                slice.percent_label(),
                Self::polar(center, radius * 0.6, middle),
                (FONT, style.annotation)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Center)),
            ))?;
            start += sweep;
        }
        Ok(())
    }

    fn x_range(axis: &XAxis, points: &[(f64, f64)]) -> Range<f64> {
        match axis {
            XAxis::Discrete(labels) => Self::category_range(labels.len()),
            XAxis::Continuous => {
                let (lo, hi) = Self::extent(points.iter().map(|p| p.0));
                Self::value_range(lo, hi, false)
            }
        }
    }

    fn x_categories(axis: &XAxis) -> Option<&[String]> {
        match axis {
            XAxis::Discrete(labels) => Some(labels.as_slice()),
            XAxis::Continuous => None,
        }
    }

    fn draw_line(
        root: &Canvas<'_>,
        figure: &Figure,
        style: &Style,
        axis: &XAxis,
        points: &[(f64, f64)],
    ) -> Result<(), RenderError> {
        let (lo, hi) = Self::extent(points.iter().map(|p| p.1));
        let mut chart = Self::cartesian(
            root,
            figure,
            style,
            Self::x_range(axis, points),
            Self::value_range(lo, hi, false),
        )?;
        Self::draw_mesh(&mut chart, figure, style, Self::x_categories(axis), None)?;

        let color = palette::TAB10[0];
        chart.draw_series(LineSeries::new(
            points.iter().copied(),
            color.stroke_width(style.stroke),
        ))?;
        Ok(())
    }

    fn draw_scatter(
        root: &Canvas<'_>,
        figure: &Figure,
        style: &Style,
        axis: &XAxis,
        points: &[(f64, f64)],
    ) -> Result<(), RenderError> {
        let (lo, hi) = Self::extent(points.iter().map(|p| p.1));
        let mut chart = Self::cartesian(
            root,
            figure,
            style,
            Self::x_range(axis, points),
            Self::value_range(lo, hi, false),
        )?;
        Self::draw_mesh(&mut chart, figure, style, Self::x_categories(axis), None)?;

        let color = palette::VIRIDIS[2];
        let radius = (style.stroke * 3) as i32;
        chart.draw_series(
            points
                .iter()
                .map(|&p| Circle::new(p, radius, color.mix(0.8).filled())),
        )?;
        Ok(())
    }

    fn draw_histogram(
        root: &Canvas<'_>,
        figure: &Figure,
        style: &Style,
        bins: &[HistogramBin],
        density: &[(f64, f64)],
    ) -> Result<(), RenderError> {
        let x_lo = bins.first().map(|b| b.start).unwrap_or(0.0);
        let x_hi = bins.last().map(|b| b.end).unwrap_or(1.0);
        let (_, top) = Self::extent(
            bins.iter()
                .map(|b| b.count as f64)
                .chain(density.iter().map(|d| d.1)),
        );
        let mut chart = Self::cartesian(
            root,
            figure,
            style,
            Self::value_range(x_lo, x_hi, false),
            Self::value_range(0.0, top, true),
        )?;
        Self::draw_mesh(&mut chart, figure, style, None, None)?;

        let color = palette::DODGER_BLUE;
        chart.draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], color.mix(0.5).filled())
        }))?;
        chart.draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], WHITE.stroke_width(1))
        }))?;
        chart.draw_series(LineSeries::new(
            density.iter().copied(),
            color.stroke_width(style.stroke * 2),
        ))?;
        Ok(())
    }

    /// Box drawn horizontally with the values on the X axis.
    fn draw_box(
        root: &Canvas<'_>,
        figure: &Figure,
        style: &Style,
        summary: &BoxSummary,
    ) -> Result<(), RenderError> {
        let mut chart = Self::cartesian(
            root,
            figure,
            style,
            Self::value_range(summary.min, summary.max, false),
            -0.5..0.5,
        )?;
        Self::draw_mesh(&mut chart, figure, style, None, Some(NO_LABELS))?;

        let fill = palette::MUTED[0];
        let edge = RGBColor(60, 60, 60).stroke_width(style.stroke);
        let h = BOX_HALF_HEIGHT;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(summary.q1, -h), (summary.q3, h)],
            fill.filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(summary.q1, -h), (summary.q3, h)],
            edge,
        )))?;
        chart.draw_series(
            [
                vec![(summary.median, -h), (summary.median, h)],
                vec![(summary.whisker_low, 0.0), (summary.q1, 0.0)],
                vec![(summary.q3, 0.0), (summary.whisker_high, 0.0)],
                vec![(summary.whisker_low, -h / 2.0), (summary.whisker_low, h / 2.0)],
                vec![(summary.whisker_high, -h / 2.0), (summary.whisker_high, h / 2.0)],
            ]
            .into_iter()
            .map(|path| PathElement::new(path, edge)),
        )?;
        chart.draw_series(
            summary
                .outliers
                .iter()
                .map(|&v| Circle::new((v, 0.0), (style.stroke * 3) as i32, edge)),
        )?;
        Ok(())
    }

    fn draw_violin(
        root: &Canvas<'_>,
        figure: &Figure,
        style: &Style,
        density: &[(f64, f64)],
        summary: &BoxSummary,
    ) -> Result<(), RenderError> {
        let (lo, hi) = Self::extent(
            density
                .iter()
                .map(|d| d.0)
                .chain([summary.min, summary.max]),
        );
        let mut chart = Self::cartesian(
            root,
            figure,
            style,
            Self::value_range(lo, hi, false),
            -0.5..0.5,
        )?;
        Self::draw_mesh(&mut chart, figure, style, None, Some(NO_LABELS))?;

        let peak = density.iter().map(|d| d.1).fold(0.0, f64::max);
        if peak > 0.0 {
            let scale = VIOLIN_HALF_HEIGHT / peak;
            let outline: Vec<(f64, f64)> = density
                .iter()
                .map(|&(x, d)| (x, d * scale))
                .chain(density.iter().rev().map(|&(x, d)| (x, -d * scale)))
                .collect();
            chart.draw_series(std::iter::once(Polygon::new(
                outline.clone(),
                palette::SET3[0].filled(),
            )))?;
            chart.draw_series(std::iter::once(PathElement::new(
                outline,
                RGBColor(60, 60, 60).stroke_width(style.stroke),
            )))?;
        }

        let inner = RGBColor(60, 60, 60);
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(summary.whisker_low, 0.0), (summary.whisker_high, 0.0)],
            inner.stroke_width(style.stroke),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(summary.q1, -0.03), (summary.q3, 0.03)],
            inner.filled(),
        )))?;
        chart.draw_series(std::iter::once(Circle::new(
            (summary.median, 0.0),
            (style.stroke * 3) as i32,
            WHITE.filled(),
        )))?;
        Ok(())
    }

    fn draw_heatmap(
        root: &Canvas<'_>,
        figure: &Figure,
        style: &Style,
        labels: &[String],
        matrix: &[Vec<f64>],
    ) -> Result<(), RenderError> {
        let body = root.titled(&figure.title, (FONT, style.title))?;
        let (width, _) = body.dim_in_pixel();
        let bar_width = (style.y_area * 2).min(width / 4);
        let (cells, bar) = body.split_horizontally(width - bar_width);

        let n = labels.len();
        let mut chart = ChartBuilder::on(&cells)
            .margin(style.margin)
            .x_label_area_size(style.x_area)
            .y_label_area_size(style.y_area * 2)
            .build_cartesian_2d(Self::category_range(n), Self::category_range(n))?;
        Self::draw_mesh(&mut chart, figure, style, Some(labels), Some(labels))?;

        for (row, values) in matrix.iter().enumerate() {
            let y = (n - 1 - row) as f64;
            for (col, &value) in values.iter().enumerate() {
                let x = col as f64;
                let color = palette::coolwarm(value);
                chart.draw_series(std::iter::once(Rectangle::new(
                    [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                    color.filled(),
                )))?;
                let text = if value.is_nan() {
                    "nan".to_string()
                } else {
                    format!("{:.2}", value)
                };
                chart.draw_series(std::iter::once(Text::new(
                    text,
                    (x, y),
                    (FONT, style.annotation)
                        .into_font()
                        .color(&palette::text_on(color))
                        .pos(Pos::new(HPos::Center, VPos::Center)),
                )))?;
            }
        }

        Self::draw_colorbar(&bar, style)
    }

    fn draw_colorbar(area: &Canvas<'_>, style: &Style) -> Result<(), RenderError> {
        let mut chart = ChartBuilder::on(area)
            .margin(style.margin)
            .margin_left(0)
            .x_label_area_size(style.x_area)
            .set_label_area_size(LabelAreaPosition::Right, style.y_area)
            .build_cartesian_2d(0.0..1.0, -1.0..1.0)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_labels(0)
            .y_labels(5)
            .label_style((FONT, style.tick))
            .draw()?;

        let step = 2.0 / COLORBAR_STEPS as f64;
        chart.draw_series((0..COLORBAR_STEPS).map(|i| {
            let low = -1.0 + i as f64 * step;
            Rectangle::new(
                [(0.0, low), (1.0, low + step)],
                palette::coolwarm(low + step / 2.0).filled(),
            )
        }))?;
        Ok(())
    }

    fn stacked_value_range(stacked: &StackedSeries) -> Range<f64> {
        let (low, high) = stacked.stack_extent();
        Self::value_range(low, high, true)
    }

    /// Bottom and top of each series' band per group, negatives stacking downward.
    fn stack_bands(stacked: &StackedSeries) -> Vec<Vec<(f64, f64)>> {
        let mut positive = vec![0.0; stacked.groups.len()];
        let mut negative = vec![0.0; stacked.groups.len()];
        stacked
            .series
            .iter()
            .map(|series| {
                series
                    .values
                    .iter()
                    .enumerate()
                    .map(|(g, &v)| {
                        let base = if v < 0.0 { &mut negative[g] } else { &mut positive[g] };
                        let band = (*base, *base + v);
                        *base += v;
                        band
                    })
                    .collect()
            })
            .collect()
    }

    fn draw_stacked_bars(
        root: &Canvas<'_>,
        figure: &Figure,
        style: &Style,
        stacked: &StackedSeries,
    ) -> Result<(), RenderError> {
        let mut chart = Self::cartesian(
            root,
            figure,
            style,
            Self::category_range(stacked.groups.len()),
            Self::stacked_value_range(stacked),
        )?;
        Self::draw_mesh(&mut chart, figure, style, Some(stacked.groups.as_slice()), None)?;

        let size = (style.tick / 2.0) as i32;
        for (i, (series, bands)) in stacked
            .series
            .iter()
            .zip(Self::stack_bands(stacked))
            .enumerate()
        {
            let color = palette::pick(&palette::PASTEL, i);
            chart
                .draw_series(bands.into_iter().enumerate().map(|(g, (bottom, top))| {
                    let x = g as f64;
                    Rectangle::new(
                        [(x - BAR_HALF_WIDTH, bottom), (x + BAR_HALF_WIDTH, top)],
                        color.filled(),
                    )
                }))?
                .label(series.name.as_str())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - size), (x + 2 * size, y + size)], color.filled())
                });
        }
        Self::draw_legend(&mut chart, style)
    }

    fn draw_area(
        root: &Canvas<'_>,
        figure: &Figure,
        style: &Style,
        stacked: &StackedSeries,
    ) -> Result<(), RenderError> {
        let groups = stacked.groups.len();
        let x_range = if groups > 1 {
            0.0..(groups - 1) as f64
        } else {
            Self::category_range(groups)
        };
        let mut chart = Self::cartesian(
            root,
            figure,
            style,
            x_range,
            Self::stacked_value_range(stacked),
        )?;
        Self::draw_mesh(&mut chart, figure, style, Some(stacked.groups.as_slice()), None)?;

        let size = (style.tick / 2.0) as i32;
        for (i, (series, bands)) in stacked
            .series
            .iter()
            .zip(Self::stack_bands(stacked))
            .enumerate()
        {
            let color = palette::pick(&palette::TAB20, i);
            let outline: Vec<(f64, f64)> = bands
                .iter()
                .enumerate()
                .map(|(g, band)| (g as f64, band.1))
                .chain(
                    bands
                        .iter()
                        .enumerate()
                        .rev()
                        .map(|(g, band)| (g as f64, band.0)),
                )
                .collect();
            chart
                .draw_series(std::iter::once(Polygon::new(outline, color.mix(0.85).filled())))?
                .label(series.name.as_str())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - size), (x + 2 * size, y + size)], color.filled())
                });
            chart.draw_series(LineSeries::new(
                bands.iter().enumerate().map(|(g, band)| (g as f64, band.1)),
                color.stroke_width(style.stroke),
            ))?;
        }
        Self::draw_legend(&mut chart, style)
    }
}
