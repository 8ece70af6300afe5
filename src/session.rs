//! Session Module
//! Per-user state and the three actions a user can take: upload a file,
//! generate a chart, export a chart.
//!
//! Every action runs to completion and leaves the session usable whatever the
//! outcome. Failures are returned and also kept as the current feedback
//! message for display.

use crate::charts::{
    AxisChoices, ChartDispatcher, ChartError, ChartKind, ChartRequest, Figure, RenderSettings,
};
use crate::data::{DataLoader, Dataset, LoadError, UploadedFile};
use crate::export::{Download, ExportError, ExportFormat, Exporter};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No dataset loaded")]
    NoDataset,
    #[error("{0}")]
    Load(#[from] LoadError),
    #[error("{0}")]
    Chart(#[from] ChartError),
    #[error("Chart {0} does not exist")]
    UnknownChart(usize),
    #[error("{0}")]
    Export(#[from] ExportError),
}

impl SessionError {
    /// The message shown to the user for this failure.
    pub fn feedback(&self) -> Feedback {
        match self {
            SessionError::Chart(err) if err.is_validation() => Feedback::Warning(err.to_string()),
            other => Feedback::Error(format!("Error: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Warning(String),
    Error(String),
}

impl Feedback {
    pub fn message(&self) -> &str {
        match self {
            Feedback::Warning(msg) | Feedback::Error(msg) => msg,
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Feedback::Warning(_))
    }
}

/// Result of one successful dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    /// 1-based position in the history.
    pub number: usize,
    pub request: ChartRequest,
    pub figure: Figure,
}

impl RenderedChart {
    pub fn heading(&self) -> String {
        format!("Chart {}", self.number)
    }
}

/// Append-only record of the charts generated in this session.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<RenderedChart>,
}

impl History {
    fn push(&mut self, request: ChartRequest, figure: Figure) -> &RenderedChart {
        let number = self.entries.len() + 1;
        self.entries.push(RenderedChart {
            number,
            request,
            figure,
        });
        &self.entries[number - 1]
    }

    pub fn entries(&self) -> &[RenderedChart] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&RenderedChart> {
        self.entries.last()
    }

    pub fn get(&self, number: usize) -> Option<&RenderedChart> {
        number.checked_sub(1).and_then(|i| self.entries.get(i))
    }
}

#[derive(Debug, Default)]
pub struct Session {
    dataset: Option<Dataset>,
    history: History,
    settings: RenderSettings,
    feedback: Option<Feedback>,
}

impl Session {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Outcome of the last failed action, cleared when the next action starts.
    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn axis_choices(&self, kind: ChartKind) -> Option<AxisChoices> {
        self.dataset
            .as_ref()
            .map(|ds| AxisChoices::for_kind(&ds.columns(), kind))
    }

    fn fail<T>(&mut self, err: SessionError) -> Result<T, SessionError> {
        let feedback = err.feedback();
        if feedback.is_warning() {
            warn!(reason = feedback.message(), "chart refused");
        } else {
            warn!(error = %err, "action failed");
        }
        self.feedback = Some(feedback);
        Err(err)
    }

    /// Replace the dataset with the parsed upload. On failure the previous
    /// dataset is dropped; history is never touched.
    pub fn upload(&mut self, file: &UploadedFile) -> Result<&Dataset, SessionError> {
        self.feedback = None;
        match DataLoader::load(file) {
            Ok(dataset) => {
                info!(
                    file = %file.name,
                    rows = dataset.row_count(),
                    columns = dataset.columns().len(),
                    "dataset loaded"
                );
                let dataset: &Dataset = self.dataset.insert(dataset);
                Ok(dataset)
            }
            Err(err) => {
                self.dataset = None;
                self.fail(err.into())
            }
        }
    }

    /// Dispatch `request` against the current dataset and record the chart.
    pub fn generate(&mut self, request: ChartRequest) -> Result<&RenderedChart, SessionError> {
        self.feedback = None;
        let Some(dataset) = self.dataset.as_ref() else {
            return self.fail(SessionError::NoDataset);
        };

        match ChartDispatcher::dispatch(dataset, &request) {
            Ok(figure) => {
                info!(
                    kind = %request.kind,
                    title = %figure.title,
                    number = self.history.len() + 1,
                    "chart generated"
                );
                Ok(self.history.push(request, figure))
            }
            Err(err) => self.fail(err.into()),
        }
    }

    /// Export history entry `number` (1-based).
    pub fn export(&mut self, number: usize, format: ExportFormat) -> Result<Download, SessionError> {
        self.feedback = None;
        let Some(chart) = self.history.get(number) else {
            return self.fail(SessionError::UnknownChart(number));
        };

        match Exporter::export(&chart.figure, format, &self.settings) {
            Ok(download) => {
                info!(
                    chart = number,
                    format = %format,
                    bytes = download.bytes.len(),
                    "chart exported"
                );
                Ok(download)
            }
            Err(err) => self.fail(err.into()),
        }
    }

    /// Export the most recent chart.
    pub fn export_latest(&mut self, format: ExportFormat) -> Result<Download, SessionError> {
        let number = self.history.len();
        self.export(number, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv(text: &str) -> UploadedFile {
        UploadedFile::new("data.csv", text.as_bytes().to_vec())
    }

    #[test]
    fn generate_without_dataset_reports_error() {
        let mut session = Session::default();
        let err = session
            .generate(ChartRequest::x_only(ChartKind::Pie, "a"))
            .unwrap_err();
        assert!(matches!(err, SessionError::NoDataset));
        assert_eq!(
            session.feedback(),
            Some(&Feedback::Error("Error: No dataset loaded".into()))
        );
        assert!(session.history().is_empty());
    }

    #[test]
    fn heatmap_refusal_is_a_warning() {
        let mut session = Session::default();
        session.upload(&csv("a,b\n1,x\n2,y\n")).unwrap();
        assert!(session
            .generate(ChartRequest::x_only(ChartKind::Heatmap, "a"))
            .is_err());
        assert_eq!(
            session.feedback(),
            Some(&Feedback::Warning(
                "Heatmap requires at least two numeric columns.".into()
            ))
        );
    }

    #[test]
    fn feedback_clears_on_next_success() {
        let mut session = Session::default();
        session.upload(&csv("a,b\n1,x\n2,y\n")).unwrap();
        assert!(session
            .generate(ChartRequest::x_only(ChartKind::Box, "b"))
            .is_err());
        assert!(session.feedback().is_some());
        let chart = session
            .generate(ChartRequest::x_only(ChartKind::Pie, "b"))
            .unwrap();
        assert_eq!(chart.heading(), "Chart 1");
        assert!(session.feedback().is_none());
    }

    #[test]
    fn history_numbers_are_one_based() {
        let mut session = Session::default();
        session.upload(&csv("a\n1\n2\n")).unwrap();
        session
            .generate(ChartRequest::x_only(ChartKind::Histogram, "a"))
            .unwrap();
        session
            .generate(ChartRequest::x_only(ChartKind::Box, "a"))
            .unwrap();
        assert_eq!(session.history().get(0), None);
        assert_eq!(session.history().get(2).map(|c| c.number), Some(2));
        assert_eq!(
            session.history().latest().map(|c| c.request.kind),
            Some(ChartKind::Box)
        );
        assert!(matches!(
            session.export(3, ExportFormat::Png),
            Err(SessionError::UnknownChart(3))
        ));
    }

    #[test]
    fn axis_choices_follow_the_dataset() {
        let mut session = Session::default();
        assert!(session.axis_choices(ChartKind::Bar).is_none());
        session.upload(&csv("a,b\n1,2\n")).unwrap();
        let choices = session.axis_choices(ChartKind::Bar).unwrap();
        assert_eq!(choices.x, vec!["a", "b"]);
        assert!(session
            .axis_choices(ChartKind::Pie)
            .is_some_and(|c| c.y.is_none()));
    }
}
