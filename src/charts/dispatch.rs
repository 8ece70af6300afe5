//! Chart Dispatcher Module
//! Maps a chart request onto the dataset and builds the matching `Figure`.

use crate::charts::figure::{Figure, NamedSeries, PieSlice, Plot, StackedSeries, XAxis};
use crate::charts::kind::{ChartKind, ChartRequest};
use crate::data::{ColumnKind, Dataset};
use crate::stats::{StatsCalculator, HISTOGRAM_BINS};
use polars::prelude::PolarsError;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Histogram density stops at the data range; violins extend two bandwidths.
const HISTOGRAM_DENSITY_CUT: f64 = 0.0;
const VIOLIN_DENSITY_CUT: f64 = 2.0;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Column '{0}' not found")]
    UnknownColumn(String),
    #[error("{0} requires a Y-axis column")]
    MissingYColumn(ChartKind),
    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),
    #[error("Column '{0}' has no values to plot")]
    NoValues(String),
    #[error("Heatmap requires at least two numeric columns.")]
    TooFewNumericColumns { found: usize },
    #[error("No numeric columns to sum by '{0}'")]
    NothingToAggregate(String),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl ChartError {
    /// Unmet preconditions reported as a warning rather than a failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, ChartError::TooFewNumericColumns { .. })
    }
}

/// How distinct X values are ordered when they become categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CategoryOrder {
    /// Numeric/temporal keys ascending, text keys by first appearance.
    Natural,
    /// Numeric/temporal keys ascending, text keys lexicographically.
    Sorted,
}

/// Distinct values of an X column and the category each row falls into.
/// `keys` holds each label's numeric value, or its first-seen index for text.
#[derive(Debug)]
struct Categories {
    labels: Vec<String>,
    keys: Vec<f64>,
    rows: Vec<Option<usize>>,
}

impl Categories {
    fn build(dataset: &Dataset, column: &str, order: CategoryOrder) -> Result<Self, ChartError> {
        let labels = dataset.labels(column)?;
        let keys = match dataset.column_kind(column) {
            Some(kind) if kind.is_ordered() => Some(dataset.numbers(column)?),
            _ => None,
        };

        let mut distinct: Vec<(String, f64)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut rows = Vec::with_capacity(labels.len());

        for (row, label) in labels.into_iter().enumerate() {
            let key = match &keys {
                Some(keys) => keys[row],
                None => Some(index.len() as f64),
            };
            let (Some(label), Some(key)) = (label, key) else {
                rows.push(None);
                continue;
            };
            let slot = *index.entry(label.clone()).or_insert_with(|| {
                distinct.push((label, key));
                distinct.len() - 1
            });
            rows.push(Some(slot));
        }

        let mut order_of: Vec<usize> = (0..distinct.len()).collect();
        if keys.is_some() {
            order_of.sort_by(|&a, &b| {
                distinct[a]
                    .1
                    .partial_cmp(&distinct[b].1)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        } else if order == CategoryOrder::Sorted {
            order_of.sort_by(|&a, &b| distinct[a].0.cmp(&distinct[b].0));
        }

        let mut rank = vec![0; distinct.len()];
        for (new, &old) in order_of.iter().enumerate() {
            rank[old] = new;
        }

        Ok(Self {
            labels: order_of.iter().map(|&i| distinct[i].0.clone()).collect(),
            keys: order_of.iter().map(|&i| distinct[i].1).collect(),
            rows: rows.into_iter().map(|r| r.map(|old| rank[old])).collect(),
        })
    }

    fn len(&self) -> usize {
        self.labels.len()
    }
}

/// Maps a selected chart kind to its rendering routine.
pub struct ChartDispatcher;

impl ChartDispatcher {
    /// Build exactly one figure for `request`, or fail without side effects.
    pub fn dispatch(dataset: &Dataset, request: &ChartRequest) -> Result<Figure, ChartError> {
        debug!(kind = %request.kind, x = %request.x, y = ?request.y, "dispatching chart");

        let x = request.x.as_str();
        if !dataset.has_column(x) {
            return Err(ChartError::UnknownColumn(x.to_string()));
        }

        match request.kind {
            ChartKind::Bar => Self::bar(dataset, x, Self::y_column(dataset, request)?),
            ChartKind::Pie => Self::pie(dataset, x),
            ChartKind::Line => Self::line(dataset, x, Self::y_column(dataset, request)?),
            ChartKind::Scatter => Self::scatter(dataset, x, Self::y_column(dataset, request)?),
            ChartKind::Histogram => Self::histogram(dataset, x),
            ChartKind::Box => Self::box_plot(dataset, x),
            ChartKind::Heatmap => Self::heatmap(dataset),
            ChartKind::Area => Self::stacked(dataset, x, ChartKind::Area),
            ChartKind::StackedBar => Self::stacked(dataset, x, ChartKind::StackedBar),
            ChartKind::Violin => Self::violin(dataset, x),
        }
    }

    fn y_column<'a>(dataset: &Dataset, request: &'a ChartRequest) -> Result<&'a str, ChartError> {
        let y = request
            .y
            .as_deref()
            .ok_or(ChartError::MissingYColumn(request.kind))?;
        if !dataset.has_column(y) {
            return Err(ChartError::UnknownColumn(y.to_string()));
        }
        Ok(y)
    }

    /// Values of a numeric column with nulls kept in place.
    fn numeric(dataset: &Dataset, column: &str) -> Result<Vec<Option<f64>>, ChartError> {
        if dataset.column_kind(column) != Some(ColumnKind::Numeric) {
            return Err(ChartError::NotNumeric(column.to_string()));
        }
        Ok(dataset.numbers(column)?)
    }

    /// Present values of a numeric column; fails when none are left.
    fn sample(dataset: &Dataset, column: &str) -> Result<Vec<f64>, ChartError> {
        let values: Vec<f64> = Self::numeric(dataset, column)?.into_iter().flatten().collect();
        if values.is_empty() {
            return Err(ChartError::NoValues(column.to_string()));
        }
        Ok(values)
    }

    /// Mean of `y` per category of `x` as (label, key, mean); categories with
    /// no Y value are dropped.
    fn category_means(
        dataset: &Dataset,
        x: &str,
        y: &str,
    ) -> Result<Vec<(String, f64, f64)>, ChartError> {
        let ys = Self::numeric(dataset, y)?;
        let categories = Categories::build(dataset, x, CategoryOrder::Natural)?;

        let mut sums = vec![(0.0, 0usize); categories.len()];
        for (slot, value) in categories.rows.iter().zip(ys) {
            if let (Some(slot), Some(value)) = (slot, value) {
                sums[*slot].0 += value;
                sums[*slot].1 += 1;
            }
        }

        let means: Vec<(String, f64, f64)> = categories
            .labels
            .into_iter()
            .zip(categories.keys)
            .zip(sums)
            .filter(|(_, (_, n))| *n > 0)
            .map(|((label, key), (sum, n))| (label, key, sum / n as f64))
            .collect();

        if means.is_empty() {
            return Err(ChartError::NoValues(y.to_string()));
        }
        Ok(means)
    }

    fn bar(dataset: &Dataset, x: &str, y: &str) -> Result<Figure, ChartError> {
        let (categories, heights): (Vec<String>, Vec<f64>) = Self::category_means(dataset, x, y)?
            .into_iter()
            .map(|(label, _, mean)| (label, mean))
            .unzip();
        Ok(Figure::new(
            format!("Bar Chart of {} vs {}", x, y),
            Plot::Bars {
                categories,
                heights,
            },
        )
        .with_axes(x, y))
    }

    fn pie(dataset: &Dataset, x: &str) -> Result<Figure, ChartError> {
        let categories = Categories::build(dataset, x, CategoryOrder::Natural)?;
        let mut counts = vec![0usize; categories.len()];
        for slot in categories.rows.iter().flatten() {
            counts[*slot] += 1;
        }

        let total: usize = counts.iter().sum();
        if total == 0 {
            return Err(ChartError::NoValues(x.to_string()));
        }

        let mut slices: Vec<PieSlice> = categories
            .labels
            .into_iter()
            .zip(counts)
            .map(|(label, count)| PieSlice {
                label,
                count,
                fraction: count as f64 / total as f64,
            })
            .collect();
        // Stable: equal counts keep category order.
        slices.sort_by(|a, b| b.count.cmp(&a.count));

        Ok(Figure::new(format!("Pie Chart of {}", x), Plot::Pie { slices }))
    }

    fn line(dataset: &Dataset, x: &str, y: &str) -> Result<Figure, ChartError> {
        let means = Self::category_means(dataset, x, y)?;

        let (axis, points) = if dataset.column_kind(x) == Some(ColumnKind::Numeric) {
            let points = means.into_iter().map(|(_, key, m)| (key, m)).collect();
            (XAxis::Continuous, points)
        } else {
            let (labels, points): (Vec<String>, Vec<(f64, f64)>) = means
                .into_iter()
                .enumerate()
                .map(|(i, (label, _, m))| (label, (i as f64, m)))
                .unzip();
            (XAxis::Discrete(labels), points)
        };

        Ok(
            Figure::new(format!("Line Chart of {} vs {}", x, y), Plot::Line { axis, points })
                .with_axes(x, y),
        )
    }

    fn scatter(dataset: &Dataset, x: &str, y: &str) -> Result<Figure, ChartError> {
        let ys = Self::numeric(dataset, y)?;

        let (axis, points): (XAxis, Vec<(f64, f64)>) =
            if dataset.column_kind(x) == Some(ColumnKind::Numeric) {
                let xs = dataset.numbers(x)?;
                let points = xs
                    .into_iter()
                    .zip(ys)
                    .filter_map(|(x, y)| Some((x?, y?)))
                    .collect();
                (XAxis::Continuous, points)
            } else {
                let categories = Categories::build(dataset, x, CategoryOrder::Natural)?;
                let points = categories
                    .rows
                    .iter()
                    .zip(ys)
                    .filter_map(|(slot, y)| Some(((*slot)? as f64, y?)))
                    .collect();
                (XAxis::Discrete(categories.labels), points)
            };

        if points.is_empty() {
            return Err(ChartError::NoValues(y.to_string()));
        }

        Ok(Figure::new(
            format!("Scatter Plot of {} vs {}", x, y),
            Plot::Scatter { axis, points },
        )
        .with_axes(x, y))
    }

    fn histogram(dataset: &Dataset, x: &str) -> Result<Figure, ChartError> {
        let values = Self::sample(dataset, x)?;
        let bins = StatsCalculator::histogram(&values, HISTOGRAM_BINS);
        let bin_width = bins.first().map(|b| b.width()).unwrap_or(1.0);
        let scale = values.len() as f64 * bin_width;
        let density = StatsCalculator::density_curve(&values, HISTOGRAM_DENSITY_CUT)
            .into_iter()
            .map(|(at, d)| (at, d * scale))
            .collect();

        Ok(
            Figure::new(format!("Histogram of {}", x), Plot::Histogram { bins, density })
                .with_axes(x, "Count"),
        )
    }

    fn box_plot(dataset: &Dataset, x: &str) -> Result<Figure, ChartError> {
        let values = Self::sample(dataset, x)?;
        let summary = StatsCalculator::box_summary(&values)
            .ok_or_else(|| ChartError::NoValues(x.to_string()))?;
        Ok(Figure::new(format!("Box Plot of {}", x), Plot::Box(summary)).with_axes(x, ""))
    }

    fn heatmap(dataset: &Dataset) -> Result<Figure, ChartError> {
        let labels = dataset.numeric_columns();
        if labels.len() < 2 {
            return Err(ChartError::TooFewNumericColumns {
                found: labels.len(),
            });
        }

        let columns = labels
            .iter()
            .map(|name| dataset.numbers(name))
            .collect::<Result<Vec<_>, _>>()?;
        let matrix = StatsCalculator::correlation_matrix(&columns);

        Ok(Figure::new(
            "Heatmap of Correlations",
            Plot::Heatmap { labels, matrix },
        ))
    }

    /// Sum every numeric column except `x` per group of `x`.
    fn stacked(dataset: &Dataset, x: &str, kind: ChartKind) -> Result<Figure, ChartError> {
        let categories = Categories::build(dataset, x, CategoryOrder::Sorted)?;
        if categories.labels.is_empty() {
            return Err(ChartError::NoValues(x.to_string()));
        }

        let mut series = Vec::new();
        for name in dataset.numeric_columns() {
            if name == x {
                continue;
            }
            let mut values = vec![0.0; categories.len()];
            for (slot, value) in categories.rows.iter().zip(dataset.numbers(&name)?) {
                if let (Some(slot), Some(value)) = (slot, value) {
                    values[*slot] += value;
                }
            }
            series.push(NamedSeries { name, values });
        }

        if series.is_empty() {
            return Err(ChartError::NothingToAggregate(x.to_string()));
        }

        let stacked = StackedSeries {
            groups: categories.labels,
            series,
        };
        let (title, plot) = match kind {
            ChartKind::Area => (format!("Area Chart of {}", x), Plot::Area(stacked)),
            _ => (
                format!("Stacked Bar Chart of {}", x),
                Plot::StackedBars(stacked),
            ),
        };
        Ok(Figure::new(title, plot).with_axes(x, ""))
    }

    fn violin(dataset: &Dataset, x: &str) -> Result<Figure, ChartError> {
        let values = Self::sample(dataset, x)?;
        let summary = StatsCalculator::box_summary(&values)
            .ok_or_else(|| ChartError::NoValues(x.to_string()))?;
        let density = StatsCalculator::density_curve(&values, VIOLIN_DENSITY_CUT);

        Ok(Figure::new(
            format!("Violin Plot of {}", x),
            Plot::Violin { density, summary },
        )
        .with_axes(x, ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use polars::prelude::*;

    fn dataset() -> Dataset {
        let df = DataFrame::new(vec![
            Column::new("city".into(), vec!["Oslo", "Rome", "Oslo", "Lima", "Rome", "Oslo"]),
            Column::new("temp".into(), vec![2.0, 18.0, 4.0, 20.0, 16.0, 3.0]),
            Column::new("rain".into(), vec![Some(5i64), Some(1), None, Some(0), Some(2), Some(6)]),
            Column::new("day".into(), vec![3i64, 1, 2, 1, 2, 1]),
        ])
        .unwrap();
        Dataset::new("weather.csv", df)
    }

    #[test]
    fn bar_averages_per_category_in_appearance_order() {
        let request = ChartRequest::with_y(ChartKind::Bar, "city", "temp");
        let figure = ChartDispatcher::dispatch(&dataset(), &request).unwrap();
        assert_eq!(figure.title, "Bar Chart of city vs temp");
        let Plot::Bars { categories, heights } = figure.plot else {
            panic!("expected bars");
        };
        assert_eq!(categories, vec!["Oslo", "Rome", "Lima"]);
        assert_relative_eq!(heights[0], 3.0);
        assert_relative_eq!(heights[1], 17.0);
        assert_relative_eq!(heights[2], 20.0);
    }

    #[test]
    fn pie_counts_values_most_frequent_first() {
        let request = ChartRequest::x_only(ChartKind::Pie, "city");
        let figure = ChartDispatcher::dispatch(&dataset(), &request).unwrap();
        let Plot::Pie { slices } = figure.plot else {
            panic!("expected pie");
        };
        let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Oslo", "Rome", "Lima"]);
        assert_eq!(slices[0].count, 3);
        assert_eq!(slices[0].percent_label(), "50.0%");
        assert_eq!(slices[2].percent_label(), "16.7%");
    }

    #[test]
    fn line_sorts_numeric_x_and_averages_duplicates() {
        let request = ChartRequest::with_y(ChartKind::Line, "day", "temp");
        let figure = ChartDispatcher::dispatch(&dataset(), &request).unwrap();
        let Plot::Line { axis, points } = figure.plot else {
            panic!("expected line");
        };
        assert_eq!(axis, XAxis::Continuous);
        assert_eq!(points.len(), 3);
        assert_relative_eq!(points[0].0, 1.0);
        assert_relative_eq!(points[0].1, 41.0 / 3.0);
        assert_relative_eq!(points[2].0, 3.0);
        assert_relative_eq!(points[2].1, 2.0);
    }

    #[test]
    fn line_places_float_x_at_its_value() {
        let request = ChartRequest::with_y(ChartKind::Line, "temp", "day");
        let figure = ChartDispatcher::dispatch(&dataset(), &request).unwrap();
        let Plot::Line { axis, points } = figure.plot else {
            panic!("expected line");
        };
        assert_eq!(axis, XAxis::Continuous);
        let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0, 16.0, 18.0, 20.0]);
        assert!(xs.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn text_categories_are_keyed_by_first_appearance() {
        let categories = Categories::build(&dataset(), "city", CategoryOrder::Sorted).unwrap();
        assert_eq!(categories.labels, vec!["Lima", "Oslo", "Rome"]);
        assert_eq!(categories.keys, vec![2.0, 0.0, 1.0]);
        assert_eq!(categories.rows[0], Some(1));
    }

    #[test]
    fn scatter_skips_rows_with_missing_values() {
        let request = ChartRequest::with_y(ChartKind::Scatter, "temp", "rain");
        let figure = ChartDispatcher::dispatch(&dataset(), &request).unwrap();
        let Plot::Scatter { points, .. } = figure.plot else {
            panic!("expected scatter");
        };
        assert_eq!(points.len(), 5);

        let request = ChartRequest::with_y(ChartKind::Scatter, "city", "temp");
        let figure = ChartDispatcher::dispatch(&dataset(), &request).unwrap();
        let Plot::Scatter { axis, points } = figure.plot else {
            panic!("expected scatter");
        };
        assert_eq!(
            axis,
            XAxis::Discrete(vec!["Oslo".into(), "Rome".into(), "Lima".into()])
        );
        assert_eq!(points[3], (2.0, 20.0));
    }

    #[test]
    fn histogram_uses_thirty_bins() {
        let request = ChartRequest::x_only(ChartKind::Histogram, "temp");
        let figure = ChartDispatcher::dispatch(&dataset(), &request).unwrap();
        let Plot::Histogram { bins, density } = figure.plot else {
            panic!("expected histogram");
        };
        assert_eq!(bins.len(), 30);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 6);
        assert!(!density.is_empty());
    }

    #[test]
    fn stacked_sums_numeric_columns_by_sorted_group() {
        let request = ChartRequest::x_only(ChartKind::StackedBar, "city");
        let figure = ChartDispatcher::dispatch(&dataset(), &request).unwrap();
        assert_eq!(figure.title, "Stacked Bar Chart of city");
        let Plot::StackedBars(stacked) = figure.plot else {
            panic!("expected stacked bars");
        };
        assert_eq!(stacked.groups, vec!["Lima", "Oslo", "Rome"]);
        let names: Vec<&str> = stacked.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["temp", "rain", "day"]);
        assert_eq!(stacked.series[0].values, vec![20.0, 9.0, 34.0]);
        assert_eq!(stacked.series[1].values, vec![0.0, 11.0, 3.0]);
    }

    #[test]
    fn area_excludes_the_group_column_itself() {
        let request = ChartRequest::x_only(ChartKind::Area, "day");
        let figure = ChartDispatcher::dispatch(&dataset(), &request).unwrap();
        let Plot::Area(stacked) = figure.plot else {
            panic!("expected area");
        };
        assert_eq!(stacked.groups.len(), 3);
        assert!(stacked.series.iter().all(|s| s.name != "day"));
    }

    #[test]
    fn heatmap_needs_two_numeric_columns() {
        let df = DataFrame::new(vec![
            Column::new("a".into(), vec![1.0, 2.0]),
            Column::new("b".into(), vec!["x", "y"]),
        ])
        .unwrap();
        let ds = Dataset::new("one.csv", df);
        let err = ChartDispatcher::dispatch(&ds, &ChartRequest::x_only(ChartKind::Heatmap, "a"))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(err, ChartError::TooFewNumericColumns { found: 1 }));

        let figure =
            ChartDispatcher::dispatch(&dataset(), &ChartRequest::x_only(ChartKind::Heatmap, "city"))
                .unwrap();
        let Plot::Heatmap { labels, matrix } = figure.plot else {
            panic!("expected heatmap");
        };
        assert_eq!(labels, vec!["temp", "rain", "day"]);
        assert_eq!(matrix.len(), 3);
    }

    #[test]
    fn incompatible_columns_fail() {
        let ds = dataset();
        let err = ChartDispatcher::dispatch(&ds, &ChartRequest::x_only(ChartKind::Box, "city"))
            .unwrap_err();
        assert!(matches!(err, ChartError::NotNumeric(_)));
        assert!(!err.is_validation());

        let err = ChartDispatcher::dispatch(&ds, &ChartRequest::x_only(ChartKind::Bar, "city"))
            .unwrap_err();
        assert!(matches!(err, ChartError::MissingYColumn(ChartKind::Bar)));

        let err = ChartDispatcher::dispatch(&ds, &ChartRequest::x_only(ChartKind::Pie, "nope"))
            .unwrap_err();
        assert!(matches!(err, ChartError::UnknownColumn(_)));
    }
}
