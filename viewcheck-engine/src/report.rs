//! Read-only document scans rendered as plain-text reports.

use tracing::info;
use viewcheck_core::document::{DimensionType, Document, DocumentKind};

use crate::errors::{EngineError, ensure_kind};

/// Prefix given to empty bodies so they are easy to find in the browser tree.
pub const EMPTY_BODY_PREFIX: &str = "_____EMPTY";
const RULE: &str = "---------------";

/// Fixed text around a report's findings.
#[derive(Debug, Clone)]
pub struct ReportLayout {
    /// Lines printed whether or not anything matched.
    pub preamble: Vec<String>,
    /// Line introducing the findings.
    pub header: String,
    /// Line printed instead of header and findings when nothing matched.
    pub empty: String,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub findings: Vec<String>,
    pub text: String,
}

impl Report {
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Collects one line per matching item and renders the layout around them.
pub fn scan<I, T, F>(items: I, describe: F, layout: &ReportLayout) -> Report
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Option<String>,
{
    let findings: Vec<String> = items.into_iter().filter_map(describe).collect();

    let mut lines: Vec<&str> = layout.preamble.iter().map(String::as_str).collect();
    if findings.is_empty() {
        lines.push(&layout.empty);
    } else {
        lines.push(&layout.header);
        lines.extend(findings.iter().map(String::as_str));
    }
    lines.push(&layout.footer);

    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    Report { findings, text }
}

/// Views whose dimensions are measured as true lengths instead of projected.
pub fn dimension_type_report(document: &Document) -> Result<Report, EngineError> {
    ensure_kind(document, DocumentKind::Drawing)?;
    let layout = ReportLayout {
        preamble: vec![
            "====== DrawingViewChecker report ======".to_string(),
            format!("Document: {}", document.full_name()),
        ],
        header: "Views with true dimension type:".to_string(),
        empty: "No views with true dimensions found. All good.".to_string(),
        footer: "====== DrawingViewChecker finished ======".to_string(),
    };
    let report = scan(
        document.views(),
        |(sheet, view)| {
            (view.dimension_type == DimensionType::True)
                .then(|| format!("{} - {}", sheet.name, view.name))
        },
        &layout,
    );
    info!(findings = report.findings.len(), "dimension type scan finished");
    Ok(report)
}

/// Views placed on a different sheet than their parent view. Sheets are told
/// apart by name, as the host shows them.
pub fn relocated_views_report(document: &Document) -> Result<Report, EngineError> {
    ensure_kind(document, DocumentKind::Drawing)?;
    if let Some((_, parent)) = document.dangling_parent() {
        return Err(EngineError::ViewNotFound(parent.get()));
    }
    let layout = ReportLayout {
        preamble: Vec::new(),
        header: format!(
            "Drawing {} has views moved to other sheets:",
            document.full_name()
        ),
        empty: "No views moved to other sheets. All good.".to_string(),
        footer: RULE.to_string(),
    };
    let report = scan(
        document.views(),
        |(sheet, view)| {
            let parent_sheet = document.sheet_of(view.parent?)?;
            (sheet.name != parent_sheet.name)
                .then(|| format!("View {}, references -> {}", view.name, parent_sheet.name))
        },
        &layout,
    );
    info!(findings = report.findings.len(), "relocated view scan finished");
    Ok(report)
}

/// Bodies without faces in a multi-body part. Matches are renamed
/// `_____EMPTY<i>` after the report is built.
pub fn empty_bodies_report(document: &mut Document) -> Result<Report, EngineError> {
    ensure_kind(document, DocumentKind::Part)?;
    let layout = ReportLayout {
        preamble: Vec::new(),
        header: format!("Part {} has empty bodies:", document.full_name()),
        empty: "No empty bodies found. All good.".to_string(),
        footer: RULE.to_string(),
    };
    let multi_body = document.bodies().len() > 1;
    let report = scan(
        document.bodies(),
        |body| (multi_body && body.face_count == 0).then(|| format!("{};", body.name)),
        &layout,
    );

    if !report.is_clean() {
        for (index, body) in document
            .bodies_mut()
            .iter_mut()
            .filter(|body| body.face_count == 0)
            .enumerate()
        {
            body.name = format!("{EMPTY_BODY_PREFIX}{index}");
        }
    }
    info!(findings = report.findings.len(), "empty body scan finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use viewcheck_core::document::{Sheet, SolidBody, View, ViewId, ViewKind};

    use super::*;

    #[test]
    fn scan_renders_empty_block_when_nothing_matches() {
        let layout = ReportLayout {
            preamble: vec!["title".to_string()],
            header: "found:".to_string(),
            empty: "nothing".to_string(),
            footer: "end".to_string(),
        };
        let report = scan([1, 2, 3], |n| (n > 5).then(|| n.to_string()), &layout);
        assert!(report.is_clean());
        assert_eq!(report.text, "title\nnothing\nend\n");

        let report = scan([4, 7, 9], |n| (n > 5).then(|| n.to_string()), &layout);
        assert_eq!(report.findings, vec!["7", "9"]);
        assert_eq!(report.text, "title\nfound:\n7\n9\nend\n");
    }

    #[test]
    fn dimension_report_lists_true_dimension_views() {
        let mut document = Document::drawing("gear.idw", "1:1");
        document.push_sheet(
            Sheet::new("Sheet:1")
                .with_view(View::new(ViewId::new(1), "А", ViewKind::Standard))
                .with_view(
                    View::new(ViewId::new(2), "Б", ViewKind::Projected)
                        .with_dimension_type(DimensionType::True),
                ),
        );
        let report = dimension_type_report(&document).expect("report");
        assert_eq!(report.findings, vec!["Sheet:1 - Б"]);
        assert_eq!(
            report.text,
            "====== DrawingViewChecker report ======\n\
             Document: gear.idw\n\
             Views with true dimension type:\n\
             Sheet:1 - Б\n\
             ====== DrawingViewChecker finished ======\n"
        );
    }

    #[test]
    fn relocated_report_compares_owning_sheets() {
        let base = ViewId::new(1);
        let mut document = Document::drawing("gear.idw", "1:1");
        document.push_sheet(
            Sheet::new("Sheet:1")
                .with_view(View::new(base, "1", ViewKind::Standard))
                .with_view(View::new(ViewId::new(2), "2", ViewKind::Projected).with_parent(base)),
        );
        document.push_sheet(
            Sheet::new("Sheet:2")
                .with_view(View::new(ViewId::new(3), "В", ViewKind::Detail).with_parent(base)),
        );
        let report = relocated_views_report(&document).expect("report");
        assert_eq!(report.findings, vec!["View В, references -> Sheet:1"]);
        assert!(report.text.starts_with("Drawing gear.idw has views moved"));
        assert!(report.text.ends_with("---------------\n"));

        document.sheets_mut()[1].views.push(
            View::new(ViewId::new(4), "Г", ViewKind::Detail).with_parent(ViewId::new(99)),
        );
        assert_eq!(
            relocated_views_report(&document),
            Err(EngineError::ViewNotFound(99))
        );
    }

    #[test]
    fn relocated_report_treats_same_named_sheets_as_one() {
        let base = ViewId::new(1);
        let mut document = Document::drawing("gear.idw", "1:1");
        document.push_sheet(
            Sheet::new("Sheet:1").with_view(View::new(base, "1", ViewKind::Standard)),
        );
        document.push_sheet(
            Sheet::new("Sheet:1")
                .with_view(View::new(ViewId::new(2), "А", ViewKind::Detail).with_parent(base)),
        );
        let report = relocated_views_report(&document).expect("report");
        assert!(report.is_clean());
        assert_eq!(
            report.text,
            "No views moved to other sheets. All good.\n---------------\n"
        );
    }

    #[test]
    fn empty_body_report_renames_matches() {
        let mut document = Document::part("bracket.ipt");
        document.push_body(SolidBody::new("Solid1", 12));
        document.push_body(SolidBody::new("Solid2", 0));

        let report = empty_bodies_report(&mut document).expect("report");
        assert_eq!(
            report.text,
            "Part bracket.ipt has empty bodies:\nSolid2;\n---------------\n"
        );
        assert_eq!(document.bodies()[0].name, "Solid1");
        assert_eq!(document.bodies()[1].name, "_____EMPTY0");
    }

    #[test]
    fn empty_body_report_ignores_single_body_parts() {
        let mut document = Document::part("pin.ipt");
        document.push_body(SolidBody::new("Solid1", 0));

        let report = empty_bodies_report(&mut document).expect("report");
        assert!(report.is_clean());
        assert_eq!(report.text, "No empty bodies found. All good.\n---------------\n");
        assert_eq!(document.bodies()[0].name, "Solid1");
    }

    #[test]
    fn scans_reject_wrong_document_kind() {
        let mut drawing = Document::drawing("a.idw", "1:1");
        assert!(matches!(
            empty_bodies_report(&mut drawing),
            Err(EngineError::WrongDocumentKind { .. })
        ));
        let part = Document::part("a.ipt");
        assert!(dimension_type_report(&part).is_err());
        assert!(relocated_views_report(&part).is_err());
    }
}
