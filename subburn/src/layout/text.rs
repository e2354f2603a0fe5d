use crate::foundation::error::{SubburnError, SubburnResult};
use crate::layout::wrap::TextMeasure;
use crate::model::color::Color;
use crate::model::style::Style;
use std::borrow::Cow;
use std::ops::Range;
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color carried through Parley layout.
pub(crate) struct TextBrush {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Color> for TextBrush {
    fn from(c: Color) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Font parameters resolved to surface pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    /// CSS-style family list ending in a generic class.
    pub stack: String,
    /// Font size in surface pixels.
    pub size_px: f32,
    /// Numeric weight.
    pub weight: f32,
    /// Extra advance between glyphs in surface pixels.
    pub letter_spacing_px: f32,
}

impl FontSpec {
    /// Resolve a style's font for a surface with the given scale factor.
    pub fn from_style(style: &Style, scale: f64) -> Self {
        Self {
            stack: style.font_stack(),
            size_px: (style.font_size * scale) as f32,
            weight: f32::from(style.font_weight.0),
            letter_spacing_px: (style.letter_spacing * scale) as f32,
        }
    }
}

/// A styled sub-range of a line (used for the emphasized word).
#[derive(Clone, Debug)]
pub(crate) struct SpanStyle {
    pub(crate) range: Range<usize>,
    pub(crate) brush: TextBrush,
    pub(crate) size_px: f32,
}

/// Stateful helper for shaping subtitle lines with Parley.
///
/// Families resolve through the system font collection; a family that is not installed falls
/// through to the generic class at the end of [`FontSpec::stack`].
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Make the fonts in `bytes` available by family name. Returns the registered family names.
    pub fn register_font_bytes(&mut self, bytes: Vec<u8>) -> SubburnResult<Vec<String>> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes), None);
        if families.is_empty() {
            return Err(SubburnError::validation(
                "no font families registered from font bytes",
            ));
        }
        let mut names = Vec::with_capacity(families.len());
        for (id, _) in &families {
            if let Some(name) = self.font_ctx.collection.family_name(*id) {
                names.push(name.to_owned());
            }
        }
        Ok(names)
    }

    /// Register a font file from disk.
    pub fn register_font_file(&mut self, path: &Path) -> SubburnResult<Vec<String>> {
        let bytes = std::fs::read(path).map_err(|e| {
            SubburnError::validation(format!("read font '{}': {e}", path.display()))
        })?;
        let names = self.register_font_bytes(bytes)?;
        tracing::debug!(path = %path.display(), families = ?names, "registered font");
        Ok(names)
    }

    /// Shape a single unwrapped line.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        spec: &FontSpec,
        base: TextBrush,
        spans: &[SpanStyle],
    ) -> parley::Layout<TextBrush> {
        use parley::style::{FontStack, FontWeight, StyleProperty};

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(StyleProperty::FontStack(FontStack::Source(Cow::Owned(
            spec.stack.clone(),
        ))));
        builder.push_default(StyleProperty::FontSize(spec.size_px));
        builder.push_default(StyleProperty::FontWeight(FontWeight::new(spec.weight)));
        builder.push_default(StyleProperty::LetterSpacing(spec.letter_spacing_px));
        builder.push_default(StyleProperty::Brush(base));
        for span in spans {
            builder.push(StyleProperty::Brush(span.brush), span.range.clone());
            builder.push(StyleProperty::FontSize(span.size_px), span.range.clone());
        }

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        layout
    }

    /// Advance width of `text` as it would be drawn with `spec`.
    pub fn measure(&mut self, text: &str, spec: &FontSpec) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        f64::from(
            self.layout_line(text, spec, TextBrush::default(), &[])
                .width(),
        )
    }

    /// Borrow the engine as a [`TextMeasure`] bound to one font.
    pub fn measurer<'a>(&'a mut self, spec: &'a FontSpec) -> FontMeasure<'a> {
        FontMeasure { engine: self, spec }
    }
}

/// [`TextMeasure`] backed by a [`TextLayoutEngine`] and a fixed [`FontSpec`].
pub struct FontMeasure<'a> {
    engine: &'a mut TextLayoutEngine,
    spec: &'a FontSpec,
}

impl TextMeasure for FontMeasure<'_> {
    fn measure(&mut self, text: &str) -> f64 {
        self.engine.measure(text, self.spec)
    }

    fn measure_scaled(&mut self, text: &str, range: Range<usize>, scale: f64) -> f64 {
        if text.is_empty() || text.get(range.clone()).is_none() {
            return self.measure(text);
        }
        let span = SpanStyle {
            range,
            brush: TextBrush::default(),
            size_px: self.spec.size_px * scale as f32,
        };
        let layout = self
            .engine
            .layout_line(text, self.spec, TextBrush::default(), &[span]);
        f64::from(layout.width())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/text.rs"]
mod tests;
