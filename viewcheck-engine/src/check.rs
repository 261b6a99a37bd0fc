use tracing::info;
use viewcheck_core::document::Document;

use crate::errors::EngineError;
use crate::naming::{NameSequencer, RenameOutcome, rename_views};
use crate::rotation::{RotationPass, apply_rotation_marks};
use crate::scale::{ScalePass, apply_scale_labels};

/// Combined outcome of the scale, rename and rotation passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawingCheck {
    pub scale: ScalePass,
    pub rename: RenameOutcome,
    pub rotation: RotationPass,
}

/// Runs every label pass on a working copy and commits it only when all of
/// them succeed.
pub fn check_drawing(
    document: &mut Document,
    sequencer: &NameSequencer,
) -> Result<DrawingCheck, EngineError> {
    let mut draft = document.clone();
    let scale = apply_scale_labels(&mut draft)?;
    let rename = rename_views(&mut draft, &scale.partition, sequencer);
    let rotation = apply_rotation_marks(&mut draft)?;

    *document = draft;
    info!(?rename, "drawing check committed");
    Ok(DrawingCheck {
        scale,
        rename,
        rotation,
    })
}
