//! Chart model produced by dispatch and consumed by the renderer.

use crate::stats::{BoxSummary, HistogramBin};

/// Where the X values of a line or scatter plot sit.
#[derive(Debug, Clone, PartialEq)]
pub enum XAxis {
    /// Points carry their own numeric X.
    Continuous,
    /// Points sit at integer positions naming these labels.
    Discrete(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    pub fraction: f64,
}

impl PieSlice {
    /// Slice share as shown on the chart, e.g. `"42.9%"`.
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.fraction * 100.0)
    }
}

/// Per-group sums of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Numeric columns summed per group key, groups in ascending key order.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedSeries {
    pub groups: Vec<String>,
    pub series: Vec<NamedSeries>,
}

impl StackedSeries {
    /// Total of the positive and of the negative contributions per group.
    pub fn stack_extent(&self) -> (f64, f64) {
        (0..self.groups.len()).fold((0.0, 0.0), |(low, high), g| {
            let (neg, pos) = self.series.iter().fold((0.0, 0.0), |(neg, pos), s| {
                let v = s.values[g];
                if v < 0.0 {
                    (neg + v, pos)
                } else {
                    (neg, pos + v)
                }
            });
            (f64::min(low, neg), f64::max(high, pos))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Plot {
    Bars {
        categories: Vec<String>,
        heights: Vec<f64>,
    },
    Pie {
        slices: Vec<PieSlice>,
    },
    Line {
        axis: XAxis,
        points: Vec<(f64, f64)>,
    },
    Scatter {
        axis: XAxis,
        points: Vec<(f64, f64)>,
    },
    Histogram {
        bins: Vec<HistogramBin>,
        /// Density scaled to bin counts.
        density: Vec<(f64, f64)>,
    },
    Box(BoxSummary),
    Heatmap {
        labels: Vec<String>,
        matrix: Vec<Vec<f64>>,
    },
    Area(StackedSeries),
    StackedBars(StackedSeries),
    Violin {
        density: Vec<(f64, f64)>,
        summary: BoxSummary,
    },
}

/// One chart: title, axis descriptions and geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub plot: Plot,
}

impl Figure {
    pub fn new(title: impl Into<String>, plot: Plot) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            plot,
        }
    }

    pub fn with_axes(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }
}
