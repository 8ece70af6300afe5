//! Charts module - chart selection, dispatch and rendering

mod dispatch;
mod figure;
mod kind;
pub mod palette;
mod renderer;

pub use dispatch::{ChartDispatcher, ChartError};
pub use figure::{Figure, NamedSeries, PieSlice, Plot, StackedSeries, XAxis};
pub use kind::{AxisChoices, ChartKind, ChartRequest};
pub use renderer::{ChartRenderer, RenderError, RenderSettings};
