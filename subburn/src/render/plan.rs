use crate::foundation::core::{Canvas, Point, Rect, Vec2};
use crate::layout::wrap::{TextMeasure, wrap};
use crate::model::color::Color;
use crate::model::segment::Segment;
use crate::model::style::{Animation, DisplayMode, Position, Style, TextAlign};
use crate::render::reveal::frame_text;
use std::ops::Range;

/// Fraction of each frame dimension kept clear of subtitles.
pub const SAFE_ZONE: f64 = 0.1;

/// Halo width added around the glyph outline for [`Animation::Glow`], in reference pixels.
const GLOW_SPREAD: f64 = 6.0;

/// One laid-out subtitle line in surface pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct LinePlan {
    /// Text drawn on this line.
    pub text: String,
    /// Byte range within `text` of the emphasized word.
    pub highlight: Option<Range<usize>>,
    /// Left edge of the line's advance box.
    pub x: f64,
    /// Vertical middle of the line.
    pub center_y: f64,
    /// Measured advance width.
    pub width: f64,
}

/// Rounded box behind the text block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundPlan {
    /// Box bounds including padding.
    pub rect: Rect,
    /// Corner radius.
    pub radius: f64,
    /// Fill color with the style opacity folded in.
    pub color: Color,
}

/// Entrance-animation state for the whole block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entrance {
    /// Group opacity in `[0, 1]`.
    pub opacity: f64,
    /// Translation applied after scaling.
    pub offset: Vec2,
    /// Uniform scale about the block anchor.
    pub scale: f64,
}

impl Entrance {
    /// No animation in effect.
    pub const IDENTITY: Self = Self {
        opacity: 1.0,
        offset: Vec2::ZERO,
        scale: 1.0,
    };

    /// Whether this entrance changes anything.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Everything needed to draw one frame of one segment, independent of the rasterizer.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    /// Surface the plan was computed for.
    pub canvas: Canvas,
    /// Lines top to bottom.
    pub lines: Vec<LinePlan>,
    /// Block anchor: horizontal alignment point and vertical block center.
    pub anchor: Point,
    /// Font size in surface pixels.
    pub font_size_px: f64,
    /// Distance between consecutive line centers.
    pub line_height_px: f64,
    /// Background box, when enabled.
    pub background: Option<BackgroundPlan>,
    /// Outline stroke width in surface pixels (0 disables the pass).
    pub outline_width_px: f64,
    /// Halo width for the glow effect (0 disables the pass).
    pub glow_width_px: f64,
    /// Entrance animation sample.
    pub entrance: Entrance,
}

/// Compute the geometry of `seg` drawn with `style` on `canvas`, `elapsed` seconds after the
/// segment became active.
///
/// Returns `None` when there is nothing to draw: an empty canvas or blank visible text.
/// `measure` must measure with the font the rasterizer will use at
/// `style.font_size * canvas.scale_factor()`.
pub fn plan_frame(
    canvas: Canvas,
    seg: &Segment,
    style: &Style,
    elapsed: f64,
    measure: &mut impl TextMeasure,
) -> Option<FramePlan> {
    if canvas.is_empty() {
        return None;
    }
    let ft = frame_text(seg, style, elapsed);
    if ft.text.trim().is_empty() {
        return None;
    }

    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    let s = canvas.scale_factor();
    let font_size_px = style.font_size * s;
    let lh = font_size_px * style.line_height;

    let raw_lines: Vec<(String, Option<Range<usize>>)> = match style.display_mode {
        DisplayMode::MultipleLines => wrap(
            &ft.text,
            w - 2.0 * SAFE_ZONE * w,
            style.max_lines as usize,
            measure,
        )
        .into_iter()
        .map(|l| (l, None))
        .collect(),
        _ => split_hard_lines(&ft.text, ft.highlight),
    };
    if raw_lines.is_empty() {
        return None;
    }

    let h_off = style.horizontal_offset * s;
    let base_x = match style.text_align {
        TextAlign::Center => w / 2.0 + h_off,
        TextAlign::Left => SAFE_ZONE * w + h_off,
        TextAlign::Right => w - SAFE_ZONE * w - h_off,
    };
    let vo = h * style.vertical_offset / 100.0;
    let base_y = match style.position {
        Position::Bottom => (h - SAFE_ZONE * h).min(h - vo),
        Position::Top => (SAFE_ZONE * h).max(vo),
        Position::Center => h / 2.0,
    };

    let total = raw_lines.len() as f64 * lh;
    let start_y = base_y - total / 2.0 + lh / 2.0;

    let mut max_w = 0.0f64;
    let lines: Vec<LinePlan> = raw_lines
        .into_iter()
        .enumerate()
        .map(|(i, (text, highlight))| {
            let width = match (&highlight, style.highlight_scale) {
                (Some(range), Some(k)) if k != 1.0 => {
                    measure.measure_scaled(&text, range.clone(), k)
                }
                _ => measure.measure(&text),
            };
            max_w = max_w.max(width);
            LinePlan {
                x: align_left_edge(base_x, width, style.text_align),
                center_y: start_y + i as f64 * lh,
                text,
                highlight,
                width,
            }
        })
        .collect();

    let background = style.background_enabled().then(|| {
        let pad = style.padding * s;
        let x0 = align_left_edge(base_x, max_w, style.text_align) - pad;
        let y0 = start_y - lh / 2.0 - pad;
        let rect = Rect::new(x0, y0, x0 + max_w + 2.0 * pad, y0 + total + 2.0 * pad);
        let radius = (style.border_radius * s)
            .max(0.0)
            .min(rect.width().min(rect.height()) / 2.0);
        BackgroundPlan {
            rect,
            radius,
            color: style.effective_background(),
        }
    });

    let outline_width_px = if style.outline_enabled() {
        style.outline_width * s
    } else {
        0.0
    };
    let glow_width_px = if style.animation == Animation::Glow {
        (style.outline_width.max(0.0) + GLOW_SPREAD) * s
    } else {
        0.0
    };

    Some(FramePlan {
        canvas,
        lines,
        anchor: Point::new(base_x, base_y),
        font_size_px,
        line_height_px: lh,
        background,
        outline_width_px,
        glow_width_px,
        entrance: entrance(style, elapsed, canvas, lh),
    })
}

pub(crate) fn align_left_edge(base_x: f64, width: f64, align: TextAlign) -> f64 {
    match align {
        TextAlign::Center => base_x - width / 2.0,
        TextAlign::Left => base_x,
        TextAlign::Right => base_x - width,
    }
}

/// Split on `\n`, trimming each line and carrying the highlight into the line that holds it.
fn split_hard_lines(
    text: &str,
    highlight: Option<Range<usize>>,
) -> Vec<(String, Option<Range<usize>>)> {
    let mut out = Vec::new();
    let mut offset = 0usize;
    for raw in text.split('\n') {
        let lead = raw.len() - raw.trim_start().len();
        let trimmed = raw.trim();
        let line_start = offset + lead;
        let line_end = line_start + trimmed.len();
        offset += raw.len() + 1;
        if trimmed.is_empty() {
            continue;
        }
        let hl = highlight
            .as_ref()
            .filter(|r| r.start >= line_start && r.end <= line_end)
            .map(|r| r.start - line_start..r.end - line_start);
        out.push((trimmed.to_owned(), hl));
    }
    out
}

/// Sample the entrance animation `elapsed` seconds into a segment.
pub fn entrance(style: &Style, elapsed: f64, canvas: Canvas, line_height_px: f64) -> Entrance {
    let d = style.animation_duration;
    if !d.is_finite() || d <= 0.0 || elapsed.is_nan() || elapsed >= d {
        return Entrance::IDENTITY;
    }
    let p = (elapsed / d).clamp(0.0, 1.0);
    let e = ease_out_cubic(p);
    let slide_x = f64::from(canvas.width) * 0.05;
    let slide_y = line_height_px;

    match style.animation {
        Animation::Fade => Entrance {
            opacity: p,
            ..Entrance::IDENTITY
        },
        Animation::Slide => Entrance {
            opacity: p,
            offset: Vec2::new(0.0, (1.0 - e) * slide_y),
            scale: 1.0,
        },
        Animation::SlideDown => Entrance {
            opacity: p,
            offset: Vec2::new(0.0, -(1.0 - e) * slide_y),
            scale: 1.0,
        },
        Animation::SlideLeft => Entrance {
            opacity: p,
            offset: Vec2::new((1.0 - e) * slide_x, 0.0),
            scale: 1.0,
        },
        Animation::SlideRight => Entrance {
            opacity: p,
            offset: Vec2::new(-(1.0 - e) * slide_x, 0.0),
            scale: 1.0,
        },
        Animation::Pop => Entrance {
            opacity: (2.0 * p).min(1.0),
            offset: Vec2::ZERO,
            scale: 0.5 + 0.5 * ease_out_back(p),
        },
        Animation::Zoom => Entrance {
            opacity: p,
            offset: Vec2::ZERO,
            scale: 0.5 + 0.5 * e,
        },
        Animation::Bounce => Entrance {
            opacity: 1.0,
            offset: Vec2::ZERO,
            scale: 1.0 + 0.1 * (std::f64::consts::PI * p).sin(),
        },
        Animation::None | Animation::Glow | Animation::Typewriter | Animation::Karaoke => {
            Entrance::IDENTITY
        }
    }
}

fn ease_out_cubic(p: f64) -> f64 {
    1.0 - (1.0 - p).powi(3)
}

fn ease_out_back(p: f64) -> f64 {
    const C1: f64 = 1.70158;
    const C3: f64 = C1 + 1.0;
    1.0 + C3 * (p - 1.0).powi(3) + C1 * (p - 1.0).powi(2)
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
