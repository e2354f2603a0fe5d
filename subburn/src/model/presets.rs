use crate::model::color::Color;
use crate::model::style::{Animation, DisplayMode, FontWeight, Position, Style};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Grouping used by editors to decide the default display mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PresetCategory {
    /// Static line styles.
    Basic,
    /// Word-highlighting styles.
    Dynamic,
    /// One-word-at-a-time styles.
    Word,
}

/// A named, read-only style template.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Preset {
    /// Stable identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Grouping.
    pub category: PresetCategory,
    /// Template style.
    pub style: Style,
}

impl Preset {
    /// Copy this preset into an editable style.
    ///
    /// Dynamic and word presets switch the display mode to word-by-word.
    pub fn apply(&self) -> Style {
        let mut style = self.style.clone();
        if matches!(
            self.category,
            PresetCategory::Dynamic | PresetCategory::Word
        ) {
            style.display_mode = DisplayMode::WordByWord;
        }
        style
    }
}

static PRESETS: LazyLock<BTreeMap<&'static str, Preset>> = LazyLock::new(|| {
    let base = Style::default();
    let list = [
        Preset {
            id: "classic-dark",
            name: "Classic Dark",
            category: PresetCategory::Basic,
            style: Style {
                vertical_offset: 15.0,
                outline_width: 0.0,
                animation: Animation::None,
                ..base.clone()
            },
        },
        Preset {
            id: "modern-bold",
            name: "Modern Bold",
            category: PresetCategory::Basic,
            style: Style {
                font_family: "Archivo Black".to_owned(),
                font_size: 28.0,
                background_color: Color::rgba(0, 0, 0, 0),
                background_opacity: 0.0,
                vertical_offset: 20.0,
                outline_width: 4.0,
                border_radius: 0.0,
                padding: 0.0,
                letter_spacing: 1.0,
                line_height: 1.2,
                animation: Animation::None,
                ..base.clone()
            },
        },
        Preset {
            id: "dynamic-karaoke",
            name: "Dynamic Karaoke",
            category: PresetCategory::Dynamic,
            style: Style {
                font_size: 26.0,
                font_weight: FontWeight::BOLD,
                color: Color::rgb(0xA0, 0xA0, 0xA0),
                highlight_color: Some(Color::rgb(0xFF, 0xD7, 0x00)),
                background_color: Color::rgba(0, 0, 0, 128),
                background_opacity: 0.5,
                vertical_offset: 15.0,
                border_radius: 12.0,
                padding: 16.0,
                animation: Animation::Fade,
                ..base.clone()
            },
        },
        Preset {
            id: "hormozi-word",
            name: "Hormozi Pop",
            category: PresetCategory::Word,
            style: Style {
                font_family: "Anton".to_owned(),
                font_size: 32.0,
                highlight_color: Some(Color::rgb(0x00, 0xFF, 0x00)),
                highlight_scale: Some(1.2),
                background_color: Color::rgba(0, 0, 0, 0),
                background_opacity: 0.0,
                position: Position::Center,
                vertical_offset: 50.0,
                outline_width: 6.0,
                border_radius: 0.0,
                padding: 0.0,
                letter_spacing: 2.0,
                line_height: 1.0,
                animation: Animation::Pop,
                ..base
            },
        },
    ];
    list.into_iter().map(|p| (p.id, p)).collect()
});

/// Look up a preset by id.
pub fn preset(id: &str) -> Option<&'static Preset> {
    PRESETS.get(id)
}

/// All presets ordered by id.
pub fn presets() -> impl Iterator<Item = &'static Preset> {
    PRESETS.values()
}

#[cfg(test)]
#[path = "../../tests/unit/model/presets.rs"]
mod tests;
