use std::collections::HashMap;

use tracing::{debug, info};
use viewcheck_core::document::{Document, DocumentKind, View, ViewId, ViewKind};
use viewcheck_core::markup::{LabelMarkup, LabelTemplate};

use crate::errors::{EngineError, ensure_kind};

/// Whether a view label should carry the scale suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleVerdict {
    /// Unlabeled, parentless or standard views are left alone.
    Excluded,
    /// The view scale differs from the drawing scale.
    NeedsSuffix,
    /// The view scale equals the drawing scale, so a suffix would be redundant.
    RedundantSuffix,
}

/// Scale expressions compare without whitespace, so `1 : 2` equals `1:2`.
pub fn normalize_scale(expression: &str) -> String {
    expression.chars().filter(|ch| !ch.is_whitespace()).collect()
}

#[inline]
pub fn is_eligible(view: &View) -> bool {
    view.show_label && view.parent.is_some() && view.kind != ViewKind::Standard
}

pub fn classify(view: &View, document: &Document) -> Result<ScaleVerdict, EngineError> {
    if !is_eligible(view) {
        return Ok(ScaleVerdict::Excluded);
    }
    let nominal = nominal_scale(document)?;
    classify_against(view, &nominal)
}

fn nominal_scale(document: &Document) -> Result<String, EngineError> {
    document
        .nominal_scale()
        .map(normalize_scale)
        .ok_or_else(|| EngineError::ClassificationFailure {
            subject: format!("document {}", document.full_name()),
            field: "drawing scale",
        })
}

fn classify_against(view: &View, nominal: &str) -> Result<ScaleVerdict, EngineError> {
    if !is_eligible(view) {
        return Ok(ScaleVerdict::Excluded);
    }
    let scale = view
        .scale
        .as_deref()
        .ok_or_else(|| EngineError::ClassificationFailure {
            subject: format!("view {}", view.name),
            field: "scale",
        })?;
    if normalize_scale(scale) == nominal {
        Ok(ScaleVerdict::RedundantSuffix)
    } else {
        Ok(ScaleVerdict::NeedsSuffix)
    }
}

/// Eligible views of a drawing split by verdict, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScalePartition {
    pub redundant: Vec<ViewId>,
    pub distinct: Vec<ViewId>,
}

impl ScalePartition {
    /// Views the rename pass treats as candidates.
    #[inline]
    pub fn candidate_count(&self) -> usize {
        self.redundant.len() + self.distinct.len()
    }

    pub fn verdict(&self, id: ViewId) -> ScaleVerdict {
        if self.distinct.contains(&id) {
            ScaleVerdict::NeedsSuffix
        } else if self.redundant.contains(&id) {
            ScaleVerdict::RedundantSuffix
        } else {
            ScaleVerdict::Excluded
        }
    }
}

/// Classifies every view; any unreadable input fails the whole partition.
pub fn partition(document: &Document) -> Result<ScalePartition, EngineError> {
    ensure_kind(document, DocumentKind::Drawing)?;
    let nominal = nominal_scale(document)?;
    let mut partition = ScalePartition::default();
    for (sheet, view) in document.views() {
        let verdict = classify_against(view, &nominal)?;
        debug!(sheet = %sheet.name, view = %view.name, ?verdict, "classified view scale");
        match verdict {
            ScaleVerdict::Excluded => {}
            ScaleVerdict::NeedsSuffix => partition.distinct.push(view.id),
            ScaleVerdict::RedundantSuffix => partition.redundant.push(view.id),
        }
    }
    Ok(partition)
}

/// Result of rewriting scale suffixes on a drawing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScalePass {
    pub partition: ScalePartition,
    pub added: Vec<ViewId>,
    pub removed: Vec<ViewId>,
}

/// Adds or removes the scale suffix so every eligible label matches its
/// verdict. All labels are computed before any is written.
pub fn apply_scale_labels(document: &mut Document) -> Result<ScalePass, EngineError> {
    let partition = partition(document)?;
    let mut pass = ScalePass::default();
    let mut rewrites: HashMap<ViewId, String> = HashMap::new();

    for (_, view) in document.views() {
        let mut label = LabelMarkup::parse(&view.label);
        let changed = match partition.verdict(view.id) {
            ScaleVerdict::Excluded => continue,
            ScaleVerdict::NeedsSuffix => {
                let changed = label.add_scale_suffix(LabelTemplate::for_view(view.kind.is_section()));
                if changed {
                    pass.added.push(view.id);
                }
                changed
            }
            ScaleVerdict::RedundantSuffix => {
                let changed = label.remove_scale_suffix();
                if changed {
                    pass.removed.push(view.id);
                }
                changed
            }
        };
        if changed {
            rewrites.insert(view.id, label.render());
        }
    }

    for view in document.views_mut() {
        if let Some(label) = rewrites.remove(&view.id) {
            view.label = label;
        }
    }

    info!(
        added = pass.added.len(),
        removed = pass.removed.len(),
        candidates = partition.candidate_count(),
        "scale labels updated"
    );
    pass.partition = partition;
    Ok(pass)
}
