use crate::foundation::error::{SubburnError, SubburnResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Height in pixels that style metrics are authored against.
pub const REFERENCE_HEIGHT: f64 = 1080.0;

/// Absolute 0-based sample index in export timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Iterate every frame index in the range.
    pub fn iter(self) -> impl Iterator<Item = FrameIndex> {
        (self.start.0..self.end.0).map(FrameIndex)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> SubburnResult<Self> {
        if den == 0 {
            return Err(SubburnError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(SubburnError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Presentation time of frame `idx` in seconds.
    pub fn frame_time_secs(self, idx: FrameIndex) -> f64 {
        (idx.0 as f64) * self.frame_duration_secs()
    }

    /// Number of samples needed to cover `[0, secs)`.
    ///
    /// Rounds up, so a partial trailing interval still gets a frame. The product is snapped to
    /// the nearest integer first when it is within float noise of one.
    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        if !secs.is_finite() || secs <= 0.0 {
            return 0;
        }
        let exact = secs * self.as_f64();
        let nearest = exact.round();
        if (exact - nearest).abs() < 1e-9 {
            return nearest as u64;
        }
        exact.ceil() as u64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

/// Render surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A surface with either dimension at zero is not drawable.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Multiplier applied to style pixel metrics for this surface.
    pub fn scale_factor(self) -> f64 {
        f64::from(self.height) / REFERENCE_HEIGHT
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        use crate::foundation::math::mul_div255_u8;

        Self {
            r: mul_div255_u8(u16::from(r), u16::from(a)),
            g: mul_div255_u8(u16::from(g), u16::from(a)),
            b: mul_div255_u8(u16::from(b), u16::from(a)),
            a,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
