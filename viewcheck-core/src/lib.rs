pub mod markup;
pub mod thread;

pub mod document {
    use std::collections::HashSet;

    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ViewId(u64);

    impl ViewId {
        #[inline]
        pub fn new(raw: u64) -> Self {
            Self(raw)
        }

        /// Raw value, used for serialization and log fields.
        #[inline]
        pub fn get(self) -> u64 {
            self.0
        }
    }

    /// Host document type as reported by the CAD layer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DocumentKind {
        Part,
        Assembly,
        Drawing,
        Unknown,
    }

    impl DocumentKind {
        pub fn as_str(self) -> &'static str {
            match self {
                DocumentKind::Part => "Part",
                DocumentKind::Assembly => "Assembly",
                DocumentKind::Drawing => "Drawing",
                DocumentKind::Unknown => "UnknownDocument",
            }
        }
    }

    impl Default for DocumentKind {
        fn default() -> Self {
            DocumentKind::Unknown
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ViewKind {
        Standard,
        Projected,
        Auxiliary,
        Section,
        Detail,
        Draft,
        Overlay,
        Custom,
    }

    impl ViewKind {
        /// Section labels use the composite `name-name` template.
        #[inline]
        pub fn is_section(self) -> bool {
            matches!(self, ViewKind::Section)
        }
    }

    /// How the dimensions placed on a view are measured.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DimensionType {
        #[default]
        Projected,
        True,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct View {
        pub id: ViewId,
        pub name: String,
        pub kind: ViewKind,
        #[serde(default = "View::default_show_label")]
        pub show_label: bool,
        #[serde(default)]
        pub parent: Option<ViewId>,
        /// Effective scale expression; `None` when the host could not read it.
        #[serde(default)]
        pub scale: Option<String>,
        /// Signed rotation in radians.
        #[serde(default)]
        pub rotation: f64,
        #[serde(default)]
        pub label: String,
        #[serde(default)]
        pub dimension_type: DimensionType,
    }

    impl View {
        pub fn new(id: ViewId, name: impl Into<String>, kind: ViewKind) -> Self {
            Self {
                id,
                name: name.into(),
                kind,
                show_label: true,
                parent: None,
                scale: None,
                rotation: 0.0,
                label: String::new(),
                dimension_type: DimensionType::Projected,
            }
        }

        fn default_show_label() -> bool {
            true
        }

        pub fn with_parent(mut self, parent: ViewId) -> Self {
            self.parent = Some(parent);
            self
        }

        pub fn with_scale(mut self, scale: impl Into<String>) -> Self {
            self.scale = Some(scale.into());
            self
        }

        pub fn with_rotation(mut self, radians: f64) -> Self {
            self.rotation = radians;
            self
        }

        pub fn with_label(mut self, label: impl Into<String>) -> Self {
            self.label = label.into();
            self
        }

        pub fn with_dimension_type(mut self, dimension_type: DimensionType) -> Self {
            self.dimension_type = dimension_type;
            self
        }

        pub fn hide_label(mut self) -> Self {
            self.show_label = false;
            self
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Sheet {
        pub name: String,
        #[serde(default)]
        pub views: Vec<View>,
    }

    impl Sheet {
        #[inline]
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                views: Vec::new(),
            }
        }

        pub fn with_view(mut self, view: View) -> Self {
            self.views.push(view);
            self
        }
    }

    /// Solid body of a part document; only the face count matters here.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct SolidBody {
        pub name: String,
        pub face_count: usize,
    }

    impl SolidBody {
        #[inline]
        pub fn new(name: impl Into<String>, face_count: usize) -> Self {
            Self {
                name: name.into(),
                face_count,
            }
        }
    }

    /// Snapshot of a host document: drawings carry sheets, parts carry bodies.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Document {
        full_name: String,
        #[serde(default)]
        kind: DocumentKind,
        #[serde(default)]
        drawing_scale: Option<String>,
        #[serde(default)]
        sheets: Vec<Sheet>,
        #[serde(default)]
        bodies: Vec<SolidBody>,
    }

    impl Document {
        pub fn new(full_name: impl Into<String>, kind: DocumentKind) -> Self {
            Self {
                full_name: full_name.into(),
                kind,
                drawing_scale: None,
                sheets: Vec::new(),
                bodies: Vec::new(),
            }
        }

        /// Drawing document with its nominal scale, e.g. `"1:2"`.
        pub fn drawing(full_name: impl Into<String>, drawing_scale: impl Into<String>) -> Self {
            let mut document = Self::new(full_name, DocumentKind::Drawing);
            document.drawing_scale = Some(drawing_scale.into());
            document
        }

        pub fn part(full_name: impl Into<String>) -> Self {
            Self::new(full_name, DocumentKind::Part)
        }

        #[inline]
        pub fn full_name(&self) -> &str {
            &self.full_name
        }

        #[inline]
        pub fn kind(&self) -> DocumentKind {
            self.kind
        }

        #[inline]
        pub fn nominal_scale(&self) -> Option<&str> {
            self.drawing_scale.as_deref()
        }

        pub fn set_nominal_scale(&mut self, scale: Option<String>) {
            self.drawing_scale = scale;
        }

        pub fn push_sheet(&mut self, sheet: Sheet) {
            self.sheets.push(sheet);
        }

        pub fn push_body(&mut self, body: SolidBody) {
            self.bodies.push(body);
        }

        #[inline]
        pub fn sheets(&self) -> &[Sheet] {
            &self.sheets
        }

        #[inline]
        pub fn sheets_mut(&mut self) -> &mut [Sheet] {
            &mut self.sheets
        }

        #[inline]
        pub fn bodies(&self) -> &[SolidBody] {
            &self.bodies
        }

        #[inline]
        pub fn bodies_mut(&mut self) -> &mut [SolidBody] {
            &mut self.bodies
        }

        /// Views in traversal order: sheet order, then view order within the sheet.
        pub fn views(&self) -> impl Iterator<Item = (&Sheet, &View)> + '_ {
            self.sheets
                .iter()
                .flat_map(|sheet| sheet.views.iter().map(move |view| (sheet, view)))
        }

        pub fn views_mut(&mut self) -> impl Iterator<Item = &mut View> + '_ {
            self.sheets.iter_mut().flat_map(|sheet| sheet.views.iter_mut())
        }

        pub fn view_count(&self) -> usize {
            self.sheets.iter().map(|sheet| sheet.views.len()).sum()
        }

        pub fn view(&self, id: ViewId) -> Option<&View> {
            self.views().map(|(_, view)| view).find(|view| view.id == id)
        }

        pub fn view_mut(&mut self, id: ViewId) -> Option<&mut View> {
            self.views_mut().find(|view| view.id == id)
        }

        /// Sheet that owns the given view.
        pub fn sheet_of(&self, id: ViewId) -> Option<&Sheet> {
            self.views()
                .find(|(_, view)| view.id == id)
                .map(|(sheet, _)| sheet)
        }

        /// First view id that appears more than once, if any.
        pub fn duplicate_view_id(&self) -> Option<ViewId> {
            let mut seen = HashSet::new();
            self.views()
                .map(|(_, view)| view.id)
                .find(|id| !seen.insert(*id))
        }

        /// First `(view, parent)` pair whose parent id does not resolve.
        pub fn dangling_parent(&self) -> Option<(ViewId, ViewId)> {
            self.views().find_map(|(_, view)| {
                view.parent
                    .filter(|parent| self.view(*parent).is_none())
                    .map(|parent| (view.id, parent))
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn sample() -> Document {
            let mut document = Document::drawing("bracket.idw", "1:2");
            document.push_sheet(
                Sheet::new("Sheet:1")
                    .with_view(View::new(ViewId::new(1), "1", ViewKind::Standard))
                    .with_view(
                        View::new(ViewId::new(2), "2", ViewKind::Projected)
                            .with_parent(ViewId::new(1)),
                    ),
            );
            document.push_sheet(
                Sheet::new("Sheet:2").with_view(
                    View::new(ViewId::new(3), "3", ViewKind::Detail).with_parent(ViewId::new(1)),
                ),
            );
            document
        }

        #[test]
        fn traversal_follows_sheet_then_view_order() {
            let document = sample();
            let order: Vec<u64> = document.views().map(|(_, view)| view.id.get()).collect();
            assert_eq!(order, vec![1, 2, 3]);
            assert_eq!(document.view_count(), 3);
        }

        #[test]
        fn sheet_lookup_and_integrity_checks() {
            let mut document = sample();
            assert_eq!(
                document.sheet_of(ViewId::new(3)).map(|sheet| sheet.name.as_str()),
                Some("Sheet:2")
            );
            assert!(document.duplicate_view_id().is_none());
            assert!(document.dangling_parent().is_none());

            document.sheets_mut()[1].views.push(
                View::new(ViewId::new(2), "dup", ViewKind::Projected).with_parent(ViewId::new(9)),
            );
            assert_eq!(document.duplicate_view_id(), Some(ViewId::new(2)));
            assert_eq!(
                document.dangling_parent(),
                Some((ViewId::new(2), ViewId::new(9)))
            );
        }

        #[test]
        fn view_defaults_show_label_when_deserialized() {
            let view: View = serde_json::from_value(serde_json::json!({
                "id": 7,
                "name": "А",
                "kind": "section"
            }))
            .expect("deserialize view");
            assert!(view.show_label);
            assert!(view.parent.is_none());
            assert_eq!(view.dimension_type, DimensionType::Projected);
            assert!(view.kind.is_section());
        }
    }
}
