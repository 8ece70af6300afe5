//! Stats module - numeric summaries behind the charts

mod calculator;

pub use calculator::{
    BoxSummary, HistogramBin, StatsCalculator, DENSITY_GRID_POINTS, HISTOGRAM_BINS,
    WHISKER_IQR_FACTOR,
};
