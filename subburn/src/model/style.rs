use crate::foundation::error::{SubburnError, SubburnResult};
use crate::model::color::Color;
use serde::{Deserialize, Serialize};

/// How segment text is disclosed over the segment's active window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    /// Full text for the whole window, explicit newlines honored.
    #[default]
    LineByLine,
    /// Full text wrapped to the safe-zone width, bounded by `maxLines`.
    MultipleLines,
    /// Whitespace-token prefix revealed proportionally.
    WordByWord,
    /// Character prefix revealed proportionally.
    CharacterByCharacter,
}

/// Horizontal anchoring of each line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Anchor at the left safe-zone edge.
    Left,
    /// Anchor at the horizontal center.
    #[default]
    Center,
    /// Anchor at the right safe-zone edge.
    Right,
}

/// Vertical anchoring of the text block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Offset from the bottom edge.
    #[default]
    Bottom,
    /// Vertically centered; offset ignored.
    Center,
    /// Offset from the top edge.
    Top,
}

/// Entrance effect for a newly active segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Animation {
    /// No entrance effect.
    None,
    /// Opacity ramp.
    #[default]
    Fade,
    /// Rise from below while fading in.
    #[serde(alias = "slide-up", alias = "slideUp")]
    Slide,
    /// Drop from above while fading in.
    SlideDown,
    /// Enter from the right.
    SlideLeft,
    /// Enter from the left.
    SlideRight,
    /// Scale up with overshoot.
    Pop,
    /// Scale from small to full size.
    Zoom,
    /// Two-step scale bounce.
    Bounce,
    /// Soft halo around glyphs.
    Glow,
    /// Accepted for compatibility; the reveal comes from the display mode.
    Typewriter,
    /// Accepted for compatibility; the highlight comes from the display mode.
    Karaoke,
}

/// Generic font class used when the requested family is not installed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontClass {
    /// `sans-serif`.
    SansSerif,
    /// `serif`.
    Serif,
    /// `monospace`.
    Monospace,
}

impl FontClass {
    /// CSS generic family keyword.
    pub fn generic_name(self) -> &'static str {
        match self {
            Self::SansSerif => "sans-serif",
            Self::Serif => "serif",
            Self::Monospace => "monospace",
        }
    }

    /// Guess the class of a family name.
    pub fn of_family(family: &str) -> Self {
        const SERIF: &[&str] = &[
            "serif",
            "times",
            "georgia",
            "garamond",
            "playfair",
            "merriweather",
            "lora",
            "source serif",
            "baskerville",
        ];
        const MONO: &[&str] = &["mono", "courier", "consolas", "menlo", "code"];

        let lower = family.to_ascii_lowercase();
        if lower.contains("sans") {
            return Self::SansSerif;
        }
        if MONO.iter().any(|m| lower.contains(m)) {
            Self::Monospace
        } else if SERIF.iter().any(|s| lower.contains(s)) {
            Self::Serif
        } else {
            Self::SansSerif
        }
    }
}

/// CSS-like font weight (`normal`, `bold`, or a numeric weight).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// Weight 400.
    pub const NORMAL: Self = Self(400);
    /// Weight 700.
    pub const BOLD: Self = Self(700);

    /// Whether the weight renders as bold in engines that only know two weights.
    pub fn is_bold(self) -> bool {
        self.0 >= 600
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::BOLD
    }
}

impl Serialize for FontWeight {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match *self {
            Self::NORMAL => serializer.serialize_str("normal"),
            Self::BOLD => serializer.serialize_str("bold"),
            Self(w) => serializer.serialize_str(&w.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(u16),
            Str(String),
        }

        let w = match Repr::deserialize(deserializer)? {
            Repr::Num(n) => n,
            Repr::Str(s) => match s.trim() {
                "normal" => 400,
                "bold" => 700,
                other => other.parse().map_err(|_| {
                    serde::de::Error::custom(format!("invalid font weight \"{other}\""))
                })?,
            },
        };
        if !(1..=1000).contains(&w) {
            return Err(serde::de::Error::custom("font weight must be in 1..=1000"));
        }
        Ok(Self(w))
    }
}

/// Visual configuration shared by every segment of a track.
///
/// Pixel quantities are authored against a 1080-px-tall frame and scaled by the renderer.
/// `verticalOffset` is a percentage of frame height measured from the edge named by `position`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Style {
    /// Primary font family; may itself be a comma-separated stack.
    pub font_family: String,
    /// Font size in reference pixels.
    pub font_size: f64,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Text fill color.
    pub color: Color,
    /// Background box color.
    pub background_color: Color,
    /// Background box opacity in `0..=1`; zero disables the box.
    pub background_opacity: f64,
    /// Horizontal anchoring.
    pub text_align: TextAlign,
    /// Vertical anchoring.
    pub position: Position,
    /// Distance from the anchored edge, in percent of frame height.
    pub vertical_offset: f64,
    /// Horizontal shift in reference pixels.
    pub horizontal_offset: f64,
    /// Entrance effect.
    pub animation: Animation,
    /// Entrance effect length in seconds.
    pub animation_duration: f64,
    /// Outline stroke color.
    pub outline_color: Color,
    /// Outline stroke width in reference pixels; zero disables.
    pub outline_width: f64,
    /// Background corner radius in reference pixels.
    pub border_radius: f64,
    /// Background padding in reference pixels.
    pub padding: f64,
    /// Extra inter-glyph spacing in reference pixels.
    pub letter_spacing: f64,
    /// Line advance as a multiple of font size.
    pub line_height: f64,
    /// Reveal algorithm.
    pub display_mode: DisplayMode,
    /// Wrap limit for [`DisplayMode::MultipleLines`].
    pub max_lines: u32,
    /// Fill color for the currently spoken word, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_color: Option<Color>,
    /// Scale applied to the currently spoken word, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_scale: Option<f64>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_owned(),
            font_size: 24.0,
            font_weight: FontWeight::BOLD,
            color: Color::WHITE,
            background_color: Color::BLACK,
            background_opacity: 0.7,
            text_align: TextAlign::Center,
            position: Position::Bottom,
            vertical_offset: 10.0,
            horizontal_offset: 0.0,
            animation: Animation::Fade,
            animation_duration: 0.3,
            outline_color: Color::BLACK,
            outline_width: 2.0,
            border_radius: 8.0,
            padding: 12.0,
            letter_spacing: 0.0,
            line_height: 1.4,
            display_mode: DisplayMode::LineByLine,
            max_lines: 2,
            highlight_color: None,
            highlight_scale: None,
        }
    }
}

impl Style {
    /// Check numeric ranges. Offsets may be negative; everything else may not.
    pub fn validate(&self) -> SubburnResult<()> {
        fn non_negative(name: &str, v: f64) -> SubburnResult<()> {
            if !v.is_finite() || v < 0.0 {
                return Err(SubburnError::validation(format!(
                    "style.{name} must be finite and >= 0 (got {v})"
                )));
            }
            Ok(())
        }

        if self.font_family.trim().is_empty() {
            return Err(SubburnError::validation("style.fontFamily must not be empty"));
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(SubburnError::validation("style.fontSize must be > 0"));
        }
        if !self.line_height.is_finite() || self.line_height <= 0.0 {
            return Err(SubburnError::validation("style.lineHeight must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.background_opacity) {
            return Err(SubburnError::validation(
                "style.backgroundOpacity must be in 0..=1",
            ));
        }
        non_negative("animationDuration", self.animation_duration)?;
        non_negative("outlineWidth", self.outline_width)?;
        non_negative("borderRadius", self.border_radius)?;
        non_negative("padding", self.padding)?;
        non_negative("letterSpacing", self.letter_spacing)?;
        if let Some(s) = self.highlight_scale {
            non_negative("highlightScale", s)?;
        }
        if !self.vertical_offset.is_finite() || !self.horizontal_offset.is_finite() {
            return Err(SubburnError::validation("style offsets must be finite"));
        }
        if self.max_lines == 0 {
            return Err(SubburnError::validation("style.maxLines must be >= 1"));
        }
        Ok(())
    }

    /// Whether the background box is drawn.
    pub fn background_enabled(&self) -> bool {
        self.background_opacity > 0.0 && self.background_color.a > 0
    }

    /// Whether the outline stroke pass runs.
    pub fn outline_enabled(&self) -> bool {
        self.outline_width > 0.0 && self.outline_color.a > 0
    }

    /// Background color with `backgroundOpacity` folded into alpha.
    pub fn effective_background(&self) -> Color {
        self.background_color.with_opacity(self.background_opacity)
    }

    /// First family named in `fontFamily`, without quotes.
    pub fn primary_family(&self) -> &str {
        self.font_family
            .split(',')
            .next()
            .map(|f| f.trim().trim_matches(['"', '\'']))
            .unwrap_or("")
    }

    /// Generic fallback class for this style's family.
    pub fn font_class(&self) -> FontClass {
        let generic = self
            .font_family
            .split(',')
            .skip(1)
            .map(str::trim)
            .find_map(|f| match f {
                "serif" => Some(FontClass::Serif),
                "sans-serif" => Some(FontClass::SansSerif),
                "monospace" => Some(FontClass::Monospace),
                _ => None,
            });
        generic.unwrap_or_else(|| FontClass::of_family(self.primary_family()))
    }

    /// CSS-style font stack: the requested family followed by its generic class.
    pub fn font_stack(&self) -> String {
        format!(
            "\"{}\", {}",
            self.primary_family(),
            self.font_class().generic_name()
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/style.rs"]
mod tests;
