//! Statistics Calculator Module
//! Quartiles, binning, kernel density and correlation behind the distribution
//! and heatmap charts.

use rayon::prelude::*;
use statrs::distribution::{Continuous, Normal};
use statrs::statistics::Statistics;

/// Bucket count for histograms.
pub const HISTOGRAM_BINS: usize = 30;

/// Whiskers reach the furthest point within this many IQRs of the box.
pub const WHISKER_IQR_FACTOR: f64 = 1.5;

/// Sample points along a density curve.
pub const DENSITY_GRID_POINTS: usize = 200;

/// Five-number summary with outliers, as drawn by box and violin plots.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

/// One histogram bucket; `end` is exclusive except for the last bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Handles the numeric work for charts, with multi-threading for correlations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Copy of `values` in ascending order.
    pub fn sorted(values: &[f64]) -> Vec<f64> {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sorted
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
        if values.is_empty() {
            return None;
        }
        let sorted = Self::sorted(values);
        let q1 = Self::percentile(&sorted, 25.0);
        let median = Self::percentile(&sorted, 50.0);
        let q3 = Self::percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR_FACTOR * iqr;
        let high_fence = q3 + WHISKER_IQR_FACTOR * iqr;

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < low_fence || v > high_fence)
            .collect();

        Some(BoxSummary {
            count: sorted.len(),
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[sorted.len() - 1],
            whisker_low,
            whisker_high,
            outliers,
        })
    }

    /// Equal-width bins spanning `[min, max]`. A constant sample gets a unit
    /// wide range centred on its value.
    pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
        if values.is_empty() || bins == 0 {
            return Vec::new();
        }
        let (mut lo, mut hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                start: lo + i as f64 * width,
                end: if i + 1 == bins {
                    hi
                } else {
                    lo + (i + 1) as f64 * width
                },
                count,
            })
            .collect()
    }

    /// `n` evenly spaced points from `start` to `end` inclusive.
    pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (end - start) / (n - 1) as f64;
                (0..n).map(|i| start + i as f64 * step).collect()
            }
        }
    }

    /// Scott's rule: `n^(-1/5)` times the sample standard deviation.
    /// `None` when the sample cannot support a kernel estimate.
    pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
        if values.len() < 2 {
            return None;
        }
        let std = values.iter().std_dev();
        let bandwidth = (values.len() as f64).powf(-0.2) * std;
        (bandwidth.is_finite() && bandwidth > 0.0).then_some(bandwidth)
    }

    /// Gaussian kernel density of `values` evaluated at each grid point.
    pub fn kernel_density(values: &[f64], bandwidth: f64, grid: &[f64]) -> Vec<f64> {
        let Ok(kernel) = Normal::new(0.0, 1.0) else {
            return vec![0.0; grid.len()];
        };
        let norm = values.len() as f64 * bandwidth;

        grid.iter()
            .map(|&x| {
                values
                    .iter()
                    .map(|&v| kernel.pdf((x - v) / bandwidth))
                    .sum::<f64>()
                    / norm
            })
            .collect()
    }

    /// Density curve over the data range widened by `cut` bandwidths on each
    /// side. Empty when the sample is too small or constant.
    pub fn density_curve(values: &[f64], cut: f64) -> Vec<(f64, f64)> {
        let Some(bandwidth) = Self::scott_bandwidth(values) else {
            return Vec::new();
        };
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min) - cut * bandwidth;
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max) + cut * bandwidth;
        let grid = Self::linspace(lo, hi, DENSITY_GRID_POINTS);
        let density = Self::kernel_density(values, bandwidth, &grid);
        grid.into_iter().zip(density).collect()
    }

    /// Pearson correlation over rows where both values are present.
    /// NaN when fewer than two pairs remain or either side is constant.
    pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
        let pairs: Vec<(f64, f64)> = a
            .iter()
            .zip(b.iter())
            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
            .collect();
        let n = pairs.len();
        if n < 2 {
            return f64::NAN;
        }

        let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
        let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
        let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
        for &(x, y) in &pairs {
            cov += (x - mean_x) * (y - mean_y);
            var_x += (x - mean_x).powi(2);
            var_y += (y - mean_y).powi(2);
        }

        let denom = (var_x * var_y).sqrt();
        if denom == 0.0 {
            f64::NAN
        } else {
            (cov / denom).clamp(-1.0, 1.0)
        }
    }

    /// Pairwise correlation matrix, one row per column, rows computed in parallel.
    pub fn correlation_matrix(columns: &[Vec<Option<f64>>]) -> Vec<Vec<f64>> {
        (0..columns.len())
            .into_par_iter()
            .map(|i| {
                columns
                    .iter()
                    .map(|other| Self::pearson(&columns[i], other))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn percentile_interpolates_like_numpy() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(StatsCalculator::percentile(&sorted, 25.0), 1.75);
        assert_relative_eq!(StatsCalculator::percentile(&sorted, 50.0), 2.5);
        assert_relative_eq!(StatsCalculator::percentile(&sorted, 100.0), 4.0);
        assert!(StatsCalculator::percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn box_summary_separates_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let summary = StatsCalculator::box_summary(&values).unwrap();
        assert_relative_eq!(summary.q1, 2.25);
        assert_relative_eq!(summary.median, 3.5);
        assert_relative_eq!(summary.q3, 4.75);
        assert_relative_eq!(summary.whisker_low, 1.0);
        assert_relative_eq!(summary.whisker_high, 5.0);
        assert_eq!(summary.outliers, vec![100.0]);
        assert!(StatsCalculator::box_summary(&[]).is_none());
    }

    #[test]
    fn histogram_covers_range_with_closed_last_bin() {
        let values: Vec<f64> = (0..=30).map(f64::from).collect();
        let bins = StatsCalculator::histogram(&values, HISTOGRAM_BINS);
        assert_eq!(bins.len(), 30);
        assert_relative_eq!(bins[0].start, 0.0);
        assert_relative_eq!(bins[29].end, 30.0);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 31);
        assert_eq!(bins[29].count, 2);
    }

    #[test]
    fn histogram_of_constant_sample_is_centred() {
        let bins = StatsCalculator::histogram(&[7.0, 7.0], 30);
        assert_relative_eq!(bins[0].start, 6.5);
        assert_relative_eq!(bins[29].end, 7.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn kernel_density_integrates_to_one() {
        let values = [1.0, 2.0, 2.5, 3.0, 6.0];
        let curve = StatsCalculator::density_curve(&values, 3.0);
        assert_eq!(curve.len(), DENSITY_GRID_POINTS);
        let step = curve[1].0 - curve[0].0;
        let area: f64 = curve.iter().map(|&(_, d)| d * step).sum();
        assert_relative_eq!(area, 1.0, epsilon = 0.02);
        assert!(StatsCalculator::density_curve(&[4.0, 4.0], 3.0).is_empty());
    }

    #[test]
    fn pearson_skips_incomplete_rows() {
        let a = [Some(1.0), Some(2.0), None, Some(4.0)];
        let b = [Some(2.0), Some(4.0), Some(9.0), Some(8.0)];
        assert_relative_eq!(StatsCalculator::pearson(&a, &b), 1.0, epsilon = 1e-12);
        let c = [Some(8.0), Some(4.0), Some(1.0), Some(2.0)];
        assert_relative_eq!(StatsCalculator::pearson(&b, &c), -0.9532, epsilon = 1e-3);
        assert!(StatsCalculator::pearson(&a, &[Some(1.0); 4]).is_nan());
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let columns = vec![
            vec![Some(1.0), Some(2.0), Some(3.0)],
            vec![Some(3.0), Some(1.0), Some(2.0)],
        ];
        let matrix = StatsCalculator::correlation_matrix(&columns);
        assert_relative_eq!(matrix[0][0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(matrix[1][1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(matrix[0][1], matrix[1][0], epsilon = 1e-12);
    }
}
