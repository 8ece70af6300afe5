//! Data module - upload parsing and the in-memory dataset

mod dataset;
mod loader;

pub use dataset::{ColumnKind, Dataset, Preview, PREVIEW_ROWS};
pub use loader::{DataLoader, FileFormat, LoadError, UploadedFile};
