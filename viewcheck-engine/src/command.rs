use std::collections::HashMap;

use viewcheck_core::document::Document;
use viewcheck_core::thread::ThreadDesignation;

use crate::check::check_drawing;
use crate::errors::EngineError;
use crate::naming::{NameSequencer, RenameOutcome, rename_views};
use crate::report::{dimension_type_report, empty_bodies_report, relocated_views_report};
use crate::rotation::apply_rotation_marks;
use crate::scale::{apply_scale_labels, partition};

#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

impl From<Result<String, EngineError>> for CommandResponse {
    fn from(result: Result<String, EngineError>) -> Self {
        match result {
            Ok(message) => Self::ok(message),
            Err(err) => Self::err(err.to_string()),
        }
    }
}

pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the command reads or edits the document in its context.
    fn needs_document(&self) -> bool {
        true
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse;
}

/// Everything a command may touch. The host decides which document is active.
pub struct CommandContext<'a> {
    pub document: Option<&'a mut Document>,
    pub sequencer: &'a NameSequencer,
}

impl CommandContext<'_> {
    pub fn document(&mut self) -> Result<&mut Document, EngineError> {
        self.document
            .as_deref_mut()
            .ok_or(EngineError::InputUnavailable)
    }
}

pub struct CommandBus {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl CommandBus {
    pub fn new() -> Self {
        let mut bus = Self {
            handlers: HashMap::new(),
        };
        bus.register(ScaleLabelsCommand);
        bus.register(RotationMarksCommand);
        bus.register(RenameViewsCommand);
        bus.register(CheckDrawingCommand);
        bus.register(DimensionTypesCommand);
        bus.register(RelocatedViewsCommand);
        bus.register(EmptyBodiesCommand);
        bus.register(DocumentKindCommand);
        bus.register(ThreadUndercutCommand);
        bus
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) {
        self.handlers.insert(handler.name(), Box::new(handler));
    }

    pub fn dispatch(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        if let Some(handler) = self.handlers.get(request.name.as_str()) {
            handler.execute(request, context)
        } else {
            CommandResponse::err(format!("unknown command: {}", request.name))
        }
    }

    /// Lets a host skip loading a document for commands that never read it.
    /// Unknown commands need none; dispatch rejects them anyway.
    pub fn needs_document(&self, name: &str) -> bool {
        self.handlers
            .get(name)
            .is_some_and(|handler| handler.needs_document())
    }

    pub fn available_commands(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

fn describe_rename(outcome: RenameOutcome) -> String {
    match outcome {
        RenameOutcome::Renamed { count } => format!("{count} view(s) renamed"),
        RenameOutcome::NoCandidates => "no views need renaming".to_string(),
        RenameOutcome::Ambiguous {
            candidates,
            labeled,
            capacity,
        } => format!(
            "renaming skipped: {candidates} candidate(s), {labeled} labeled view(s), {capacity} name(s) available"
        ),
    }
}

struct ScaleLabelsCommand;

impl CommandHandler for ScaleLabelsCommand {
    fn name(&self) -> &'static str {
        "scale_labels"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        context
            .document()
            .and_then(apply_scale_labels)
            .map(|pass| {
                format!(
                    "scale suffix added to {} view(s), removed from {} view(s)",
                    pass.added.len(),
                    pass.removed.len()
                )
            })
            .into()
    }
}

struct RotationMarksCommand;

impl CommandHandler for RotationMarksCommand {
    fn name(&self) -> &'static str {
        "rotation_marks"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        context
            .document()
            .and_then(apply_rotation_marks)
            .map(|pass| {
                format!(
                    "rotation glyph added to {} view(s), removed from {} view(s)",
                    pass.marked.len(),
                    pass.cleared.len()
                )
            })
            .into()
    }
}

struct RenameViewsCommand;

impl CommandHandler for RenameViewsCommand {
    fn name(&self) -> &'static str {
        "rename_views"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let sequencer = context.sequencer;
        context
            .document()
            .and_then(|document| {
                let partition = partition(document)?;
                Ok(rename_views(document, &partition, sequencer))
            })
            .map(describe_rename)
            .into()
    }
}

struct CheckDrawingCommand;

impl CommandHandler for CheckDrawingCommand {
    fn name(&self) -> &'static str {
        "check_drawing"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let sequencer = context.sequencer;
        context
            .document()
            .and_then(|document| check_drawing(document, sequencer))
            .map(|check| {
                format!(
                    "scale suffix +{}/-{}; {}; rotation glyph +{}/-{}",
                    check.scale.added.len(),
                    check.scale.removed.len(),
                    describe_rename(check.rename),
                    check.rotation.marked.len(),
                    check.rotation.cleared.len()
                )
            })
            .into()
    }
}

struct DimensionTypesCommand;

impl CommandHandler for DimensionTypesCommand {
    fn name(&self) -> &'static str {
        "dimension_types"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        context
            .document()
            .and_then(|document| dimension_type_report(document))
            .map(|report| report.text)
            .into()
    }
}

struct RelocatedViewsCommand;

impl CommandHandler for RelocatedViewsCommand {
    fn name(&self) -> &'static str {
        "relocated_views"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        context
            .document()
            .and_then(|document| relocated_views_report(document))
            .map(|report| report.text)
            .into()
    }
}

struct EmptyBodiesCommand;

impl CommandHandler for EmptyBodiesCommand {
    fn name(&self) -> &'static str {
        "empty_bodies"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        context
            .document()
            .and_then(empty_bodies_report)
            .map(|report| report.text)
            .into()
    }
}

struct DocumentKindCommand;

impl CommandHandler for DocumentKindCommand {
    fn name(&self) -> &'static str {
        "document_kind"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        context
            .document()
            .map(|document| document.kind().as_str().to_string())
            .into()
    }
}

struct ThreadUndercutCommand;

impl CommandHandler for ThreadUndercutCommand {
    fn name(&self) -> &'static str {
        "thread_undercut"
    }

    fn needs_document(&self) -> bool {
        false
    }

    fn execute(
        &self,
        request: &CommandRequest,
        _context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let Some(designation) = request.args.first() else {
            return CommandResponse::err("usage: thread_undercut <designation>, e.g. M10x1.5");
        };
        let thread = match ThreadDesignation::parse(designation) {
            Ok(thread) => thread,
            Err(err) => return CommandResponse::err(EngineError::from(err).to_string()),
        };
        match thread.undercut() {
            Some(undercut) => CommandResponse::ok(format!(
                "{designation}: groove width {:.2} mm, depth {:.2} mm (bottom diameter {:.2} mm), radii {:.2}/{:.2} mm",
                undercut.groove_width,
                undercut.bore_diameter,
                undercut.inner_diameter(thread.diameter),
                undercut.large_radius,
                undercut.small_radius
            )),
            None => CommandResponse::err(format!(
                "{designation}: pitch {} mm is not a standard pitch",
                thread.pitch
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use viewcheck_core::document::{DocumentKind, Sheet, SolidBody, View, ViewId, ViewKind};

    use super::*;

    fn drawing() -> Document {
        let base = ViewId::new(1);
        let mut document = Document::drawing("lever.idw", "1:1");
        document.push_sheet(
            Sheet::new("Sheet:1")
                .with_view(View::new(base, "1", ViewKind::Standard).with_label("<DrawingViewName/>"))
                .with_view(
                    View::new(ViewId::new(2), "2", ViewKind::Section)
                        .with_parent(base)
                        .with_scale("2:1")
                        .with_label("<DrawingViewName/>-<DrawingViewName/>"),
                ),
        );
        document
    }

    #[test]
    fn scale_and_rename_commands_work() {
        let mut document = drawing();
        let sequencer = NameSequencer::default();
        let bus = CommandBus::new();
        let mut context = CommandContext {
            document: Some(&mut document),
            sequencer: &sequencer,
        };

        let response = bus.dispatch(&CommandRequest::new("scale_labels"), &mut context);
        assert!(response.success);
        assert_eq!(
            response.message.as_deref(),
            Some("scale suffix added to 1 view(s), removed from 0 view(s)")
        );

        let response = bus.dispatch(&CommandRequest::new("rename_views"), &mut context);
        assert!(response.success);
        assert_eq!(response.message.as_deref(), Some("2 view(s) renamed"));

        let section = document.view(ViewId::new(2)).unwrap();
        assert_eq!(section.name, "Б");
        assert_eq!(
            section.label,
            "<DrawingViewName/>-<DrawingViewName/> ( <DrawingViewScale/> )"
        );
    }

    #[test]
    fn missing_document_is_reported_as_unavailable() {
        let sequencer = NameSequencer::default();
        let bus = CommandBus::new();
        let mut context = CommandContext {
            document: None,
            sequencer: &sequencer,
        };
        for name in ["scale_labels", "check_drawing", "empty_bodies", "document_kind"] {
            let response = bus.dispatch(&CommandRequest::new(name), &mut context);
            assert!(!response.success, "{name} should fail without a document");
            assert_eq!(response.message.as_deref(), Some("no document supplied"));
        }
    }

    #[test]
    fn report_commands_return_text() {
        let mut part = Document::part("cap.ipt");
        part.push_body(SolidBody::new("Solid1", 6));
        part.push_body(SolidBody::new("Solid2", 0));
        let sequencer = NameSequencer::default();
        let bus = CommandBus::new();
        let mut context = CommandContext {
            document: Some(&mut part),
            sequencer: &sequencer,
        };

        let response = bus.dispatch(&CommandRequest::new("document_kind"), &mut context);
        assert_eq!(response.message.as_deref(), Some(DocumentKind::Part.as_str()));

        let response = bus.dispatch(&CommandRequest::new("empty_bodies"), &mut context);
        assert!(response.success);
        assert!(response.message.unwrap().contains("Solid2;"));

        let response = bus.dispatch(&CommandRequest::new("relocated_views"), &mut context);
        assert!(!response.success);
    }

    #[test]
    fn thread_undercut_parses_arguments() {
        let sequencer = NameSequencer::default();
        let bus = CommandBus::new();
        let mut context = CommandContext {
            document: None,
            sequencer: &sequencer,
        };

        let request = CommandRequest::new("thread_undercut").with_args(["M10x1.5"]);
        let response = bus.dispatch(&request, &mut context);
        assert!(response.success);
        assert!(response.message.unwrap().contains("groove width 2.50 mm"));

        let response = bus.dispatch(&CommandRequest::new("thread_undercut"), &mut context);
        assert!(!response.success);

        let request = CommandRequest::new("thread_undercut").with_args(["M10x1.1"]);
        assert!(!bus.dispatch(&request, &mut context).success);
    }

    #[test]
    fn unknown_command_is_rejected() {
        let sequencer = NameSequencer::default();
        let bus = CommandBus::new();
        let mut context = CommandContext {
            document: None,
            sequencer: &sequencer,
        };
        let response = bus.dispatch(&CommandRequest::new("explode"), &mut context);
        assert!(!response.success);
        assert_eq!(bus.available_commands().count(), 9);
    }

    #[test]
    fn only_document_commands_need_a_document() {
        let bus = CommandBus::new();
        assert!(!bus.needs_document("thread_undercut"));
        assert!(!bus.needs_document("explode"));
        for name in ["scale_labels", "rename_views", "empty_bodies", "document_kind"] {
            assert!(bus.needs_document(name), "{name} should need a document");
        }
    }
}
