use dataview::charts::{ChartKind, ChartRequest, Plot};
use dataview::data::UploadedFile;
use dataview::export::ExportFormat;
use dataview::{Feedback, Session, SessionError};

const MIXED: &str = "A,B,C\n\
                     1,10.5,x\n\
                     2,11.0,y\n\
                     3,9.5,x\n\
                     4,12.25,z\n\
                     5,13.0,y\n\
                     6,8.75,x\n";

fn upload(session: &mut Session, name: &str, text: &str) -> Result<(), SessionError> {
    session
        .upload(&UploadedFile::new(name, text.as_bytes().to_vec()))
        .map(|_| ())
}

fn loaded() -> Session {
    let mut session = Session::default();
    upload(&mut session, "mixed.csv", MIXED).unwrap();
    session
}

fn request_for(kind: ChartKind) -> ChartRequest {
    match kind {
        ChartKind::Bar => ChartRequest::with_y(kind, "C", "A"),
        ChartKind::Line | ChartKind::Scatter => ChartRequest::with_y(kind, "A", "B"),
        ChartKind::Pie | ChartKind::Area | ChartKind::StackedBar => ChartRequest::x_only(kind, "C"),
        _ => ChartRequest::x_only(kind, "B"),
    }
}

#[test]
fn every_kind_adds_exactly_one_entry() {
    let mut session = loaded();
    for (i, kind) in ChartKind::ALL.into_iter().enumerate() {
        let chart = session.generate(request_for(kind)).unwrap();
        assert_eq!(chart.number, i + 1);
        assert!(session.feedback().is_none(), "{kind}");
        assert_eq!(session.history().len(), i + 1);
    }
}

#[test]
fn heatmap_with_one_numeric_column_warns_and_adds_nothing() {
    let mut session = Session::default();
    upload(&mut session, "one.csv", "A,C\n1,x\n2,y\n3,x\n").unwrap();
    let result = session.generate(ChartRequest::x_only(ChartKind::Heatmap, "A"));
    assert!(result.is_err());
    assert!(session.history().is_empty());
    assert_eq!(
        session.feedback(),
        Some(&Feedback::Warning(
            "Heatmap requires at least two numeric columns.".to_string()
        ))
    );
}

#[test]
fn bar_title_names_both_columns() {
    let mut session = loaded();
    let chart = session
        .generate(ChartRequest::with_y(ChartKind::Bar, "C", "A"))
        .unwrap();
    assert_eq!(chart.figure.title, "Bar Chart of C vs A");
    let Plot::Bars { categories, .. } = &chart.figure.plot else {
        panic!("expected bars");
    };
    assert_eq!(categories, &vec!["x", "y", "z"]);
    assert_eq!(session.history().len(), 1);
}

#[test]
fn png_export_is_deterministic() {
    let mut session = loaded();
    session
        .generate(ChartRequest::with_y(ChartKind::Bar, "C", "A"))
        .unwrap();

    let first = session.export(1, ExportFormat::Png).unwrap();
    let second = session.export(1, ExportFormat::Png).unwrap();
    assert_eq!(first.file_name, "chart.png");
    assert_eq!(first.mime, "image/png");
    assert!(first.bytes.starts_with(b"\x89PNG"));
    assert_eq!(first.bytes, second.bytes);

    let decoded = image::load_from_memory(&first.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1000, 600));
}

#[test]
fn pdf_export_is_a_single_deterministic_page() {
    let mut session = loaded();
    session
        .generate(ChartRequest::x_only(ChartKind::Pie, "C"))
        .unwrap();

    let first = session.export_latest(ExportFormat::Pdf).unwrap();
    let second = session.export_latest(ExportFormat::Pdf).unwrap();
    assert_eq!(first.file_name, "chart.pdf");
    assert_eq!(first.mime, "application/pdf");
    assert!(first.bytes.starts_with(b"%PDF-"));
    assert_eq!(first.bytes, second.bytes);

    let doc = printpdf::lopdf::Document::load_mem(&first.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn history_keeps_generation_order() {
    let mut session = loaded();
    for kind in [ChartKind::Pie, ChartKind::Line, ChartKind::Histogram] {
        session.generate(request_for(kind)).unwrap();
    }
    let kinds: Vec<ChartKind> = session
        .history()
        .entries()
        .iter()
        .map(|c| c.request.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![ChartKind::Pie, ChartKind::Line, ChartKind::Histogram]
    );
    let headings: Vec<String> = session
        .history()
        .entries()
        .iter()
        .map(|c| c.heading())
        .collect();
    assert_eq!(headings, vec!["Chart 1", "Chart 2", "Chart 3"]);
}

#[test]
fn new_upload_replaces_dataset_and_keeps_history() {
    let mut session = loaded();
    session
        .generate(ChartRequest::x_only(ChartKind::Histogram, "A"))
        .unwrap();

    upload(&mut session, "other.csv", "P,Q\n1,2\n3,4\n").unwrap();
    let dataset = session.dataset().unwrap();
    assert_eq!(dataset.name(), "other.csv");
    assert_eq!(dataset.columns(), vec!["P", "Q"]);
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history().entries()[0].figure.title, "Histogram of A");
}

#[test]
fn malformed_upload_errors_and_unsets_dataset() {
    let mut session = loaded();
    session
        .generate(ChartRequest::x_only(ChartKind::Pie, "C"))
        .unwrap();

    let err = upload(&mut session, "broken.csv", "A,B\n1,2\n3\n").unwrap_err();
    assert!(matches!(err, SessionError::Load(_)));
    assert!(session.dataset().is_none());
    assert!(matches!(session.feedback(), Some(Feedback::Error(msg)) if msg.starts_with("Error: ")));
    assert_eq!(session.history().len(), 1);

    let err = session
        .generate(ChartRequest::x_only(ChartKind::Pie, "C"))
        .unwrap_err();
    assert!(matches!(err, SessionError::NoDataset));
}

#[test]
fn incompatible_columns_leave_session_usable() {
    let mut session = loaded();
    let err = session
        .generate(ChartRequest::x_only(ChartKind::Violin, "C"))
        .unwrap_err();
    assert!(matches!(err.feedback(), Feedback::Error(_)));
    assert!(session.history().is_empty());

    session
        .generate(ChartRequest::x_only(ChartKind::Violin, "A"))
        .unwrap();
    assert_eq!(session.history().len(), 1);
}
