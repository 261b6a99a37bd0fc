//! Structured model of a view label's formatted text.
//!
//! The host stores a label as a flat markup string. Parsing splits it into
//! known tokens and verbatim text so scale and rotation edits are plain
//! segment insertions and removals. `render` reproduces the input exactly for
//! any unedited label.

pub const NAME_TOKEN: &str = "<DrawingViewName/>";
pub const SCALE_TOKEN: &str = "<DrawingViewScale/>";
pub const BREAK_TOKEN: &str = "<Br/>";
/// Scale suffix written after the name template. Parsing also accepts other
/// spacing around and inside the parentheses.
pub const SCALE_SUFFIX: &str = " ( <DrawingViewScale/> )";
/// Styled glyph marking a rotated view.
pub const ROTATION_GLYPH: &str = "<StyleOverride Font='GOST Common'>\u{e94e}</StyleOverride>";

/// Name template a label starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelTemplate {
    /// `<DrawingViewName/>`
    Simple,
    /// `<DrawingViewName/>-<DrawingViewName/>`, used by section views.
    Composite,
}

impl LabelTemplate {
    #[inline]
    pub fn for_view(is_section: bool) -> Self {
        if is_section {
            LabelTemplate::Composite
        } else {
            LabelTemplate::Simple
        }
    }

    fn segments(self) -> Vec<Segment> {
        match self {
            LabelTemplate::Simple => vec![Segment::Name],
            LabelTemplate::Composite => {
                vec![Segment::Name, Segment::Text("-".to_string()), Segment::Name]
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Name,
    Scale,
    /// Parenthesised scale token, kept verbatim with its leading whitespace.
    ScaleSuffix(String),
    Break,
    RotationMarker,
}

impl Segment {
    fn suffix() -> Self {
        Segment::ScaleSuffix(SCALE_SUFFIX.to_string())
    }

    fn literal(&self) -> &str {
        match self {
            Segment::Text(text) => text,
            Segment::Name => NAME_TOKEN,
            Segment::Scale => SCALE_TOKEN,
            Segment::ScaleSuffix(raw) => raw,
            Segment::Break => BREAK_TOKEN,
            Segment::RotationMarker => ROTATION_GLYPH,
        }
    }
}

const TOKENS: [(&str, Segment); 4] = [
    (ROTATION_GLYPH, Segment::RotationMarker),
    (NAME_TOKEN, Segment::Name),
    (SCALE_TOKEN, Segment::Scale),
    (BREAK_TOKEN, Segment::Break),
];

/// Length of a `( <DrawingViewScale/> )` group at the start of `rest`,
/// including any whitespace before and inside the parentheses.
fn scale_suffix_len(rest: &str) -> Option<usize> {
    let after = rest
        .trim_start()
        .strip_prefix('(')?
        .trim_start()
        .strip_prefix(SCALE_TOKEN)?
        .trim_start()
        .strip_prefix(')')?;
    Some(rest.len() - after.len())
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelMarkup {
    segments: Vec<Segment>,
}

impl LabelMarkup {
    pub fn parse(markup: &str) -> Self {
        let mut label = Self::default();
        let mut text = String::new();
        let mut rest = markup;

        'scan: while let Some(ch) = rest.chars().next() {
            // tried before the bare scale token it contains
            if let Some(len) = scale_suffix_len(rest) {
                if !text.is_empty() {
                    label.segments.push(Segment::Text(std::mem::take(&mut text)));
                }
                label.segments.push(Segment::ScaleSuffix(rest[..len].to_string()));
                rest = &rest[len..];
                continue;
            }
            for (literal, segment) in &TOKENS {
                if rest.starts_with(literal) {
                    if !text.is_empty() {
                        label.segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    label.segments.push(segment.clone());
                    rest = &rest[literal.len()..];
                    continue 'scan;
                }
            }
            text.push(ch);
            rest = &rest[ch.len_utf8()..];
        }

        if !text.is_empty() {
            label.segments.push(Segment::Text(text));
        }
        label
    }

    pub fn render(&self) -> String {
        self.segments.iter().map(Segment::literal).collect()
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Any scale reference counts, whether or not it sits right after the template.
    pub fn has_scale_suffix(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Scale | Segment::ScaleSuffix(_)))
    }

    /// Inserts the scale suffix right after the name template, keeping whatever
    /// surrounds it. A label without the template gets the template prepended.
    /// Returns whether the label changed.
    pub fn add_scale_suffix(&mut self, template: LabelTemplate) -> bool {
        if self.has_scale_suffix() {
            return false;
        }
        match self.template_end(template) {
            Some(end) => self.segments.insert(end, Segment::suffix()),
            None => {
                let mut head = template.segments();
                head.push(Segment::suffix());
                head.append(&mut self.segments);
                self.segments = head;
            }
        }
        self.coalesce();
        true
    }

    /// Drops every scale reference. Returns whether the label changed.
    pub fn remove_scale_suffix(&mut self) -> bool {
        let before = self.segments.len();
        self.segments
            .retain(|segment| !matches!(segment, Segment::Scale | Segment::ScaleSuffix(_)));
        let changed = self.segments.len() != before;
        if changed {
            self.coalesce();
        }
        changed
    }

    pub fn has_rotation_glyph(&self) -> bool {
        self.segments.contains(&Segment::RotationMarker)
    }

    /// Adds the glyph before the first line break (or at the end), or removes
    /// every occurrence. Returns whether the label changed.
    pub fn set_rotation_glyph(&mut self, present: bool) -> bool {
        if present {
            if self.has_rotation_glyph() {
                return false;
            }
            match self.segments.iter().position(|s| *s == Segment::Break) {
                Some(index) => self.segments.insert(index, Segment::RotationMarker),
                None => self.segments.push(Segment::RotationMarker),
            }
            true
        } else {
            let before = self.segments.len();
            self.segments.retain(|s| *s != Segment::RotationMarker);
            let changed = self.segments.len() != before;
            if changed {
                self.coalesce();
            }
            changed
        }
    }

    fn template_end(&self, template: LabelTemplate) -> Option<usize> {
        let pattern = template.segments();
        self.segments
            .windows(pattern.len())
            .position(|window| window == pattern.as_slice())
            .map(|start| start + pattern.len())
    }

    /// Merges neighbouring text runs left behind by removals.
    fn coalesce(&mut self) {
        let mut merged: Vec<Segment> = Vec::with_capacity(self.segments.len());
        for segment in self.segments.drain(..) {
            if let Segment::Text(next) = &segment {
                if next.is_empty() {
                    continue;
                }
                if let Some(Segment::Text(previous)) = merged.last_mut() {
                    previous.push_str(next);
                    continue;
                }
            }
            merged.push(segment);
        }
        self.segments = merged;
    }
}

pub fn has_scale_suffix(markup: &str) -> bool {
    LabelMarkup::parse(markup).has_scale_suffix()
}

pub fn add_scale_suffix(markup: &str, is_section: bool) -> String {
    let mut label = LabelMarkup::parse(markup);
    label.add_scale_suffix(LabelTemplate::for_view(is_section));
    label.render()
}

pub fn remove_scale_suffix(markup: &str) -> String {
    let mut label = LabelMarkup::parse(markup);
    label.remove_scale_suffix();
    label.render()
}

pub fn has_rotation_glyph(markup: &str) -> bool {
    LabelMarkup::parse(markup).has_rotation_glyph()
}

pub fn set_rotation_glyph(markup: &str, present: bool) -> String {
    let mut label = LabelMarkup::parse(markup);
    label.set_rotation_glyph(present);
    label.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTION: &str = "<DrawingViewName/>-<DrawingViewName/>";

    #[test]
    fn parse_then_render_is_lossless() {
        let inputs = [
            "",
            "<DrawingViewName/>",
            "<DrawingViewName/> ( <DrawingViewScale/> )<Br/>Повернуто",
            "<StyleOverride Font='GOST Common'>\u{e94e}</StyleOverride><Br/>x",
            "plain <b>text</b> with <DrawingViewScale/> alone",
        ];
        for input in inputs {
            assert_eq!(LabelMarkup::parse(input).render(), input);
        }
    }

    #[test]
    fn parse_recognises_tokens() {
        let label = LabelMarkup::parse("<DrawingViewName/> ( <DrawingViewScale/> ) note<Br/>");
        assert_eq!(
            label.segments(),
            &[
                Segment::Name,
                Segment::ScaleSuffix(SCALE_SUFFIX.to_string()),
                Segment::Text(" note".to_string()),
                Segment::Break,
            ]
        );
    }

    #[test]
    fn add_suffix_keeps_trailing_text() {
        assert_eq!(
            add_scale_suffix("<DrawingViewName/> note", false),
            "<DrawingViewName/> ( <DrawingViewScale/> ) note"
        );
        assert_eq!(
            add_scale_suffix(SECTION, true),
            "<DrawingViewName/>-<DrawingViewName/> ( <DrawingViewScale/> )"
        );
    }

    #[test]
    fn add_suffix_without_template_prepends_it() {
        assert_eq!(
            add_scale_suffix("note", false),
            "<DrawingViewName/> ( <DrawingViewScale/> )note"
        );
        assert_eq!(
            add_scale_suffix("<DrawingViewName/>", true),
            "<DrawingViewName/>-<DrawingViewName/> ( <DrawingViewScale/> )<DrawingViewName/>"
        );
    }

    #[test]
    fn suffix_edits_are_idempotent() {
        let once = add_scale_suffix("<DrawingViewName/> x", false);
        assert_eq!(add_scale_suffix(&once, false), once);

        let removed = remove_scale_suffix(&once);
        assert_eq!(remove_scale_suffix(&removed), removed);
    }

    #[test]
    fn suffix_round_trips() {
        let bare = "<DrawingViewName/>-<DrawingViewName/><Br/>Б-Б";
        assert_eq!(remove_scale_suffix(&add_scale_suffix(bare, true)), bare);

        let suffixed = "<DrawingViewName/> ( <DrawingViewScale/> ) left";
        assert_eq!(add_scale_suffix(&remove_scale_suffix(suffixed), false), suffixed);
    }

    #[test]
    fn suffix_is_recognised_with_any_spacing() {
        for markup in [
            "<DrawingViewName/>( <DrawingViewScale/> )",
            "<DrawingViewName/>(<DrawingViewScale/>)",
            "<DrawingViewName/>  (  <DrawingViewScale/>\t)",
        ] {
            let label = LabelMarkup::parse(markup);
            assert_eq!(label.render(), markup);
            assert!(matches!(label.segments(), [Segment::Name, Segment::ScaleSuffix(_)]));
            assert_eq!(remove_scale_suffix(markup), "<DrawingViewName/>");
            assert_eq!(add_scale_suffix(markup, false), markup);
        }
        assert_eq!(
            remove_scale_suffix("<DrawingViewName/>-<DrawingViewName/>(<DrawingViewScale/>)<Br/>x"),
            "<DrawingViewName/>-<DrawingViewName/><Br/>x"
        );
    }

    #[test]
    fn parentheses_without_scale_token_stay_text() {
        let markup = "<DrawingViewName/> (see note)";
        assert_eq!(
            LabelMarkup::parse(markup).segments(),
            &[Segment::Name, Segment::Text(" (see note)".to_string())]
        );
        assert_eq!(remove_scale_suffix(markup), markup);
    }

    #[test]
    fn remove_drops_loose_scale_token_too() {
        let markup = "<DrawingViewName/> M<DrawingViewScale/>";
        assert!(has_scale_suffix(markup));
        assert_eq!(remove_scale_suffix(markup), "<DrawingViewName/> M");
        assert!(!has_scale_suffix(&remove_scale_suffix(markup)));
    }

    #[test]
    fn rotation_glyph_goes_before_first_break() {
        let marked = set_rotation_glyph("<DrawingViewName/><Br/>a<Br/>b", true);
        assert_eq!(
            marked,
            format!("<DrawingViewName/>{ROTATION_GLYPH}<Br/>a<Br/>b")
        );
        assert!(has_rotation_glyph(&marked));
        assert_eq!(set_rotation_glyph(&marked, true), marked);
    }

    #[test]
    fn rotation_glyph_appends_without_break_and_clears_all() {
        let marked = set_rotation_glyph("<DrawingViewName/>", true);
        assert_eq!(marked, format!("<DrawingViewName/>{ROTATION_GLYPH}"));

        let doubled = format!("a{ROTATION_GLYPH}b{ROTATION_GLYPH}c");
        let cleared = set_rotation_glyph(&doubled, false);
        assert_eq!(cleared, "abc");
        assert_eq!(set_rotation_glyph(&cleared, false), cleared);
        assert_eq!(
            LabelMarkup::parse(&doubled).segments().len(),
            5,
            "glyphs split the text into runs"
        );
    }
}
