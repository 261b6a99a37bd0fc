use std::collections::HashMap;
use std::f64::consts::TAU;

use tracing::{debug, info};
use viewcheck_core::document::{Document, DocumentKind, View, ViewId};
use viewcheck_core::markup::LabelMarkup;

use crate::errors::{EngineError, ensure_kind};

/// Decimal digits kept when comparing the remaining turn against zero.
pub const RESIDUAL_DIGITS: i32 = 4;

fn round_to_digits(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// A view is rotated unless its angle is zero or, after rounding, a full turn.
pub fn is_rotated(angle: f64) -> bool {
    let magnitude = (angle % TAU).abs();
    if magnitude == 0.0 {
        return false;
    }
    round_to_digits(TAU - magnitude, RESIDUAL_DIGITS) != 0.0
}

/// Sets the rotation glyph of a single view. Returns whether its label changed.
pub fn apply(view: &mut View) -> bool {
    let mut label = LabelMarkup::parse(&view.label);
    let changed = label.set_rotation_glyph(is_rotated(view.rotation));
    if changed {
        view.label = label.render();
    }
    changed
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationPass {
    pub marked: Vec<ViewId>,
    pub cleared: Vec<ViewId>,
}

/// Brings the rotation glyph of every labeled view in line with its angle.
/// Fails before writing anything when an angle is not finite.
pub fn apply_rotation_marks(document: &mut Document) -> Result<RotationPass, EngineError> {
    ensure_kind(document, DocumentKind::Drawing)?;

    let mut pass = RotationPass::default();
    let mut rewrites: HashMap<ViewId, String> = HashMap::new();
    for (_, view) in document.views() {
        if !view.show_label {
            continue;
        }
        if !view.rotation.is_finite() {
            return Err(EngineError::ClassificationFailure {
                subject: format!("view {}", view.name),
                field: "rotation",
            });
        }
        let rotated = is_rotated(view.rotation);
        debug!(view = %view.name, angle = view.rotation, rotated, "checked view rotation");

        let mut label = LabelMarkup::parse(&view.label);
        if label.set_rotation_glyph(rotated) {
            if rotated {
                pass.marked.push(view.id);
            } else {
                pass.cleared.push(view.id);
            }
            rewrites.insert(view.id, label.render());
        }
    }

    for view in document.views_mut() {
        if let Some(label) = rewrites.remove(&view.id) {
            view.label = label;
        }
    }

    info!(
        marked = pass.marked.len(),
        cleared = pass.cleared.len(),
        "rotation glyphs updated"
    );
    Ok(pass)
}
