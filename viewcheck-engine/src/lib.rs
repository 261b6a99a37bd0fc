pub mod check;
pub mod command;
pub mod naming;
pub mod report;
pub mod rotation;
pub mod scale;

pub mod errors {
    use thiserror::Error;
    use viewcheck_core::document::{Document, DocumentKind};
    use viewcheck_core::thread::ThreadError;

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum EngineError {
        #[error("no document supplied")]
        InputUnavailable,
        #[error("expected a {} document, got {}", expected.as_str(), actual.as_str())]
        WrongDocumentKind {
            expected: DocumentKind,
            actual: DocumentKind,
        },
        #[error("unable to classify {subject}: {field} is unavailable")]
        ClassificationFailure {
            subject: String,
            field: &'static str,
        },
        #[error("view with id {0} not found")]
        ViewNotFound(u64),
        #[error("invalid naming scheme: {0}")]
        InvalidNamingScheme(String),
        #[error(transparent)]
        Thread(#[from] ThreadError),
    }

    /// Rejects documents of any kind other than `expected`.
    pub fn ensure_kind(document: &Document, expected: DocumentKind) -> Result<(), EngineError> {
        if document.kind() == expected {
            Ok(())
        } else {
            Err(EngineError::WrongDocumentKind {
                expected,
                actual: document.kind(),
            })
        }
    }
}
