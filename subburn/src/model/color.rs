use crate::foundation::core::Rgba8Premul;
use serde::{Deserialize, Serialize};

/// Straight-alpha RGBA8 color as authored in a style.
///
/// Accepts CSS-style strings (`#RGB`, `#RRGGBB`, `#RRGGBBAA`, `rgb(..)`, `rgba(..)`, a handful of
/// named colors, `transparent`) or an object `{r, g, b, a}` with 0..255 channels and 0..1 alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Opaque color from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from channels with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a CSS-style color string.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_fn(args);
        }
        named(&lower).ok_or_else(|| format!("unrecognized color \"{s}\""))
    }

    /// Scale alpha by `opacity` (clamped to `0..=1`).
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (f64::from(self.a) * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Premultiplied form for raster compositing.
    pub fn to_premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }

    /// Render as `#RRGGBB`, or `#RRGGBBAA` when not opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    pub(crate) fn to_cpu(self) -> vello_cpu::peniko::Color {
        vello_cpu::peniko::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Css(String),
            RgbaObj {
                r: u8,
                g: u8,
                b: u8,
                #[serde(default = "one")]
                a: f64,
            },
        }

        fn one() -> f64 {
            1.0
        }

        match Repr::deserialize(deserializer)? {
            Repr::Css(s) => Self::parse(&s).map_err(serde::de::Error::custom),
            Repr::RgbaObj { r, g, b, a } => Ok(Self::rgb(r, g, b).with_opacity(a)),
        }
    }
}

fn parse_hex(s: &str) -> Result<Color, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }
    fn hex_nibble(c: &str) -> Result<u8, String> {
        hex_byte(c).map(|v| v * 17)
    }

    if !s.is_ascii() {
        return Err("hex color must be ASCII".to_owned());
    }
    match s.len() {
        3 => Ok(Color::rgb(
            hex_nibble(&s[0..1])?,
            hex_nibble(&s[1..2])?,
            hex_nibble(&s[2..3])?,
        )),
        6 => Ok(Color::rgb(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        8 => Ok(Color::rgba(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        )),
        _ => Err("hex color must be #RGB, #RRGGBB or #RRGGBBAA".to_owned()),
    }
}

fn parse_rgb_fn(args: &str) -> Result<Color, String> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err("rgb()/rgba() takes 3 or 4 components".to_owned());
    }
    let channel = |p: &str| -> Result<u8, String> {
        let v: f64 = p
            .parse()
            .map_err(|_| format!("invalid color component \"{p}\""))?;
        Ok(v.clamp(0.0, 255.0).round() as u8)
    };
    let c = Color::rgb(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?);
    match parts.get(3) {
        Some(a) => {
            let a: f64 = a.parse().map_err(|_| format!("invalid alpha \"{a}\""))?;
            Ok(c.with_opacity(a))
        }
        None => Ok(c),
    }
}

fn named(s: &str) -> Option<Color> {
    Some(match s {
        "transparent" => Color::rgba(0, 0, 0, 0),
        "white" => Color::WHITE,
        "black" => Color::BLACK,
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "cyan" => Color::rgb(0, 255, 255),
        "magenta" => Color::rgb(255, 0, 255),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        _ => return None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/model/color.rs"]
mod tests;
