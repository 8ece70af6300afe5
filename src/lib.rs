//! DataView - turn an uploaded CSV or Excel table into charts
//!
//! A session takes one dataset at a time, dispatches a chart request against
//! it, keeps every chart it produced and exports any of them as PNG or PDF.

pub mod charts;
pub mod data;
pub mod export;
pub mod gui;
pub mod session;
pub mod stats;
pub mod telemetry;

pub use session::{Feedback, History, RenderedChart, Session, SessionError};
