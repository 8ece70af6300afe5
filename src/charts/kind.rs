//! Chart kinds, chart requests and the axis choices each kind offers.

use std::fmt;

/// The ten supported visualizations, in selector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
    Scatter,
    Histogram,
    Box,
    Heatmap,
    Area,
    StackedBar,
    Violin,
}

impl ChartKind {
    pub const ALL: [Self; 10] = [
        Self::Bar,
        Self::Pie,
        Self::Line,
        Self::Scatter,
        Self::Histogram,
        Self::Box,
        Self::Heatmap,
        Self::Area,
        Self::StackedBar,
        Self::Violin,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Bar => "Bar Chart",
            Self::Pie => "Pie Chart",
            Self::Line => "Line Chart",
            Self::Scatter => "Scatter Plot",
            Self::Histogram => "Histogram",
            Self::Box => "Box Plot",
            Self::Heatmap => "Heatmap",
            Self::Area => "Area Chart",
            Self::StackedBar => "Stacked Bar Chart",
            Self::Violin => "Violin Plot",
        }
    }

    /// Bar, line and scatter plot one column against another.
    pub fn needs_y(self) -> bool {
        matches!(self, Self::Bar | Self::Line | Self::Scatter)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the user asked for when pressing Generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub x: String,
    pub y: Option<String>,
}

impl ChartRequest {
    /// A Y column given for a single-axis kind is dropped.
    pub fn new(kind: ChartKind, x: impl Into<String>, y: Option<String>) -> Self {
        Self {
            kind,
            x: x.into(),
            y: y.filter(|_| kind.needs_y()),
        }
    }

    pub fn x_only(kind: ChartKind, x: impl Into<String>) -> Self {
        Self::new(kind, x, None)
    }

    pub fn with_y(kind: ChartKind, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self::new(kind, x, Some(y.into()))
    }
}

/// Columns offered for axis binding. `y` is `None` when the kind takes no Y.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisChoices {
    pub x: Vec<String>,
    pub y: Option<Vec<String>>,
}

impl AxisChoices {
    pub fn for_kind(columns: &[String], kind: ChartKind) -> Self {
        Self {
            x: columns.to_vec(),
            y: kind.needs_y().then(|| columns.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_two_axis_kinds_offer_y() {
        let columns = vec!["a".to_string(), "b".to_string()];
        for kind in ChartKind::ALL {
            let choices = AxisChoices::for_kind(&columns, kind);
            assert_eq!(choices.x, columns);
            assert_eq!(choices.y.is_some(), kind.needs_y(), "{kind}");
        }
        assert!(ChartKind::Scatter.needs_y());
        assert!(!ChartKind::Area.needs_y());
        assert!(!ChartKind::StackedBar.needs_y());
    }

    #[test]
    fn request_drops_y_for_single_axis_kinds() {
        let pie = ChartRequest::with_y(ChartKind::Pie, "a", "b");
        assert_eq!(pie.y, None);
        let bar = ChartRequest::with_y(ChartKind::Bar, "a", "b");
        assert_eq!(bar.y.as_deref(), Some("b"));
    }

    #[test]
    fn labels_match_selector_text() {
        let labels: Vec<&str> = ChartKind::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(labels[0], "Bar Chart");
        assert_eq!(labels[8], "Stacked Bar Chart");
        assert_eq!(labels[9], "Violin Plot");
    }
}
