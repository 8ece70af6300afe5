//! Dataset Loader Module
//! Parses uploaded CSV text or spreadsheet workbooks into a `Dataset` using
//! Polars and calamine.

use crate::data::Dataset;
use calamine::{open_workbook_auto_from_rs, Data, DataType as CellType, Range, Reader};
use polars::prelude::*;
use std::io::Cursor;
use thiserror::Error;

/// Rows scanned when inferring CSV column types.
const INFER_SCHEMA_ROWS: usize = 10000;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to parse data: {0}")]
    Polars(#[from] PolarsError),
    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("File is not valid UTF-8 text")]
    NotUtf8,
    #[error("File has no header row")]
    MissingHeader,
    #[error("Line {line} has {found} fields, expected {expected}")]
    RaggedRow {
        line: usize,
        found: usize,
        expected: usize,
    },
    #[error("Unterminated quoted field starting on line {0}")]
    UnterminatedQuote(usize),
    #[error("Workbook has no worksheets")]
    NoSheets,
    #[error("Worksheet is empty")]
    EmptySheet,
}

/// A file handed over by the user: its name decides the parser.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Spreadsheet,
}

impl FileFormat {
    /// Anything not named `*.csv` is treated as a workbook.
    pub fn detect(file_name: &str) -> Self {
        if file_name.to_ascii_lowercase().ends_with(".csv") {
            FileFormat::Csv
        } else {
            FileFormat::Spreadsheet
        }
    }
}

/// Column type decided from the cells of a worksheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetColumnType {
    Int,
    Float,
    Bool,
    DateTime,
    Text,
}

/// Turns uploads into datasets. Nothing is partially recovered: any fault
/// rejects the whole file.
pub struct DataLoader;

impl DataLoader {
    pub fn load(file: &UploadedFile) -> Result<Dataset, LoadError> {
        let df = match FileFormat::detect(&file.name) {
            FileFormat::Csv => Self::load_csv(&file.bytes)?,
            FileFormat::Spreadsheet => Self::load_spreadsheet(&file.bytes)?,
        };
        Ok(Dataset::new(file.name.clone(), df))
    }

    /// Parse comma-separated text with a header row.
    pub fn load_csv(bytes: &[u8]) -> Result<DataFrame, LoadError> {
        let text = std::str::from_utf8(bytes).map_err(|_| LoadError::NotUtf8)?;
        Self::check_csv_shape(text)?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .map_parse_options(|opts| opts.with_try_parse_dates(true))
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()?;

        Ok(df)
    }

    /// Every non-blank record must have as many fields as the header.
    /// Quoted fields may hold commas, newlines and doubled quotes; a quote
    /// opens a quoted field only as the field's first character.
    fn check_csv_shape(text: &str) -> Result<(), LoadError> {
        let mut expected: Option<usize> = None;
        let mut fields = 1;
        let mut blank = true;
        let mut in_quotes = false;
        let mut field_start = true;
        let mut line = 1;
        let mut record_line = 1;

        let mut close_record =
            |fields: usize, blank: bool, record_line: usize| -> Result<(), LoadError> {
            if blank {
                return Ok(());
            }
            match expected {
                None => {
                    expected = Some(fields);
                    Ok(())
                }
                Some(n) if n == fields => Ok(()),
                Some(n) => Err(LoadError::RaggedRow {
                    line: record_line,
                    found: fields,
                    expected: n,
                }),
            }
        };

        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '"' if in_quotes => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                }
                '"' if field_start => {
                    in_quotes = true;
                    field_start = false;
                    blank = false;
                }
                ',' if !in_quotes => {
                    fields += 1;
                    field_start = true;
                    blank = false;
                }
                '\n' => {
                    line += 1;
                    if !in_quotes {
                        close_record(fields, blank, record_line)?;
                        fields = 1;
                        blank = true;
                        field_start = true;
                        record_line = line;
                    }
                }
                '\r' => {}
                _ => {
                    field_start = false;
                    blank = false;
                }
            }
        }

        if in_quotes {
            return Err(LoadError::UnterminatedQuote(record_line));
        }
        close_record(fields, blank, record_line)?;

        if expected.is_none() {
            return Err(LoadError::MissingHeader);
        }
        Ok(())
    }

    /// Read the first worksheet; its first row names the columns.
    pub fn load_spreadsheet(bytes: &[u8]) -> Result<DataFrame, LoadError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let range = workbook.worksheet_range_at(0).ok_or(LoadError::NoSheets)??;
        Self::range_to_dataframe(&range)
    }

    /// Build a frame from worksheet cells; the first row names the columns
    /// and unnamed header cells become `column_<n>`.
    fn range_to_dataframe(range: &Range<Data>) -> Result<DataFrame, LoadError> {
        let rows: Vec<&[Data]> = range.rows().collect();
        let Some((header, body)) = rows.split_first() else {
            return Err(LoadError::EmptySheet);
        };

        let mut columns = Vec::with_capacity(header.len());
        for (idx, cell) in header.iter().enumerate() {
            let name = cell
                .as_string()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("column_{}", idx + 1));
            let cells: Vec<Option<&Data>> = body.iter().map(|row| row.get(idx)).collect();
            let series = Self::sheet_column_to_series(&name, &cells)?;
            columns.push(series.into());
        }

        Ok(DataFrame::new(columns)?)
    }

    fn infer_sheet_column(cells: &[Option<&Data>]) -> SheetColumnType {
        let mut has_int = false;
        let mut has_float = false;
        let mut has_bool = false;
        let mut has_datetime = false;

        for cell in cells.iter().flatten() {
            if cell.is_string() {
                return SheetColumnType::Text;
            }
            if cell.is_int() {
                has_int = true;
            } else if cell.is_float() {
                has_float = true;
            } else if cell.is_bool() {
                has_bool = true;
            } else if cell.is_datetime() || cell.is_datetime_iso() {
                has_datetime = true;
            }
        }

        if has_float {
            let all_whole = cells
                .iter()
                .flatten()
                .filter_map(|cell| cell.as_f64())
                .all(|f| f.is_finite() && (f - f.trunc()).abs() < 1e-10);
            if all_whole {
                SheetColumnType::Int
            } else {
                SheetColumnType::Float
            }
        } else if has_int {
            SheetColumnType::Int
        } else if has_datetime {
            SheetColumnType::DateTime
        } else if has_bool {
            SheetColumnType::Bool
        } else {
            SheetColumnType::Text
        }
    }

    fn sheet_column_to_series(name: &str, cells: &[Option<&Data>]) -> Result<Series, LoadError> {
        let series = match Self::infer_sheet_column(cells) {
            SheetColumnType::Int => {
                let v: Vec<Option<i64>> = cells
                    .iter()
                    .map(|c| c.filter(|cell| cell.is_int() || cell.is_float()))
                    .map(|c| c.and_then(|cell| cell.as_i64()))
                    .collect();
                Series::new(name.into(), v)
            }
            SheetColumnType::Float => {
                let v: Vec<Option<f64>> = cells
                    .iter()
                    .map(|c| c.filter(|cell| cell.is_int() || cell.is_float()))
                    .map(|c| c.and_then(|cell| cell.as_f64()))
                    .collect();
                Series::new(name.into(), v)
            }
            SheetColumnType::Bool => {
                let v: Vec<Option<bool>> = cells
                    .iter()
                    .map(|c| c.and_then(|cell| cell.get_bool()))
                    .collect();
                Series::new(name.into(), v)
            }
            SheetColumnType::DateTime => {
                let v: Vec<Option<i64>> = cells
                    .iter()
                    .map(|c| {
                        c.and_then(|cell| cell.as_datetime())
                            .map(|dt| dt.and_utc().timestamp_micros())
                    })
                    .collect();
                Series::new(name.into(), v)
                    .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?
            }
            SheetColumnType::Text => {
                let v: Vec<Option<String>> = cells
                    .iter()
                    .map(|c| c.and_then(|cell| cell.as_string()))
                    .collect();
                Series::new(name.into(), v)
            }
        };
        Ok(series)
    }
}
