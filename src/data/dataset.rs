//! Dataset Module
//! In-memory table produced by an upload, with per-column kind inference.

use polars::prelude::*;

/// Number of rows shown in the dataset preview.
pub const PREVIEW_ROWS: usize = 5;

/// How a column behaves when bound to a chart axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Temporal,
}

impl ColumnKind {
    pub fn of(dtype: &DataType) -> Self {
        match dtype {
            DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => ColumnKind::Numeric,
            DataType::Date | DataType::Datetime(_, _) | DataType::Time | DataType::Duration(_) => {
                ColumnKind::Temporal
            }
            _ => ColumnKind::Categorical,
        }
    }

    /// Numeric and temporal columns have a natural ascending order.
    pub fn is_ordered(self) -> bool {
        !matches!(self, ColumnKind::Categorical)
    }
}

/// First rows of a dataset rendered as text.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A loaded table. Never mutated; a new upload replaces it.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    df: DataFrame,
}

impl Dataset {
    pub fn new(name: impl Into<String>, df: DataFrame) -> Self {
        Self {
            name: name.into(),
            df,
        }
    }

    /// File name the dataset was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    /// Column names in table order.
    pub fn columns(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Names of the numeric columns, in table order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .filter(|col| ColumnKind::of(col.dtype()) == ColumnKind::Numeric)
            .map(|col| col.name().to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        self.df
            .column(name)
            .ok()
            .map(|col| ColumnKind::of(col.dtype()))
    }

    /// Values of a column as text; nulls stay `None`.
    pub fn labels(&self, name: &str) -> PolarsResult<Vec<Option<String>>> {
        let series = self
            .df
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::String)?;
        let ca = series.str()?;
        Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
    }

    /// Values of a column as floats. Temporal columns yield their physical
    /// representation; NaN counts as missing.
    pub fn numbers(&self, name: &str) -> PolarsResult<Vec<Option<f64>>> {
        let column = self.df.column(name)?.as_materialized_series();
        let physical = column.to_physical_repr();
        let values = physical.cast(&DataType::Float64)?;
        let ca = values.f64()?;
        Ok(ca
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect())
    }

    /// First `rows` rows, every cell rendered as text and nulls as empty cells.
    pub fn preview(&self, rows: usize) -> PolarsResult<Preview> {
        let head = Dataset::new(self.name.clone(), self.df.head(Some(rows)));
        let columns = head.columns();
        let mut cells: Vec<Vec<String>> = vec![Vec::with_capacity(columns.len()); head.row_count()];

        for name in &columns {
            for (row, value) in head.labels(name)?.into_iter().enumerate() {
                cells[row].push(value.unwrap_or_default());
            }
        }

        Ok(Preview {
            columns,
            rows: cells,
        })
    }
}
