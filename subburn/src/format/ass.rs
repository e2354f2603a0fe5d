use crate::foundation::core::Canvas;
use crate::format::timestamp::format_ass_timestamp;
use crate::layout::wrap::hard_lines;
use crate::model::color::Color;
use crate::model::segment::Segment;
use crate::model::style::{Animation, DisplayMode, Position, Style, TextAlign};
use crate::model::track::Track;
use crate::render::plan::SAFE_ZONE;
use crate::render::reveal::{FrameText, frame_text, reveal_step_offsets};
use std::fmt::Write as _;

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Events shorter than this (after centisecond rounding) are dropped.
const MIN_EVENT_SECS: f64 = 0.01;

/// Generate an Advanced SubStation Alpha script for burning `track` into a video of size
/// `play_res`.
///
/// Style metrics are scaled to `play_res` the same way the compositor scales them, so a
/// filter-graph render lands close to a frame-captured one. Progressive display modes produce one
/// event per visible state.
pub fn to_ass(track: &Track, style: &Style, play_res: Canvas) -> String {
    let play_res = if play_res.is_empty() {
        Canvas::new(1920, 1080)
    } else {
        play_res
    };

    let mut out = String::new();
    let wrap_style = if style.display_mode == DisplayMode::MultipleLines {
        0
    } else {
        2
    };
    let _ = write!(
        out,
        "[Script Info]\nScriptType: v4.00+\nPlayResX: {}\nPlayResY: {}\nWrapStyle: {wrap_style}\n\
         ScaledBorderAndShadow: yes\n\n[V4+ Styles]\n{STYLE_FORMAT}\n{}\n\n[Events]\n{EVENT_FORMAT}\n",
        play_res.width,
        play_res.height,
        style_line(style, play_res),
    );

    let entrance = animation_tags(style, play_res.scale_factor());
    for seg in track.segments() {
        if seg.text.trim().is_empty() {
            continue;
        }
        for (i, (start, end, ft)) in segment_states(seg, style).into_iter().enumerate() {
            let start_ts = format_ass_timestamp(start);
            let end_ts = format_ass_timestamp(end);
            if start_ts == end_ts {
                continue;
            }
            let body = dialogue_text(&ft, style);
            if body.is_empty() {
                continue;
            }
            let tags = if i == 0 { entrance.as_str() } else { "" };
            let _ = write!(out, "Dialogue: 0,{start_ts},{end_ts},Default,,0,0,0,,");
            if !tags.is_empty() {
                let _ = write!(out, "{{{tags}}}");
            }
            out.push_str(&body);
            out.push('\n');
        }
    }
    out
}

/// `&HAABBGGRR` with ASS alpha (0 = opaque).
pub fn ass_color(c: Color) -> String {
    format!(
        "&H{:02X}{:02X}{:02X}{:02X}",
        255 - c.a,
        c.b,
        c.g,
        c.r
    )
}

/// Override-tag color `&HBBGGRR&`.
fn ass_inline_color(c: Color) -> String {
    format!("&H{:02X}{:02X}{:02X}&", c.b, c.g, c.r)
}

/// Numpad alignment for `\an` / the style `Alignment` field.
pub fn alignment(style: &Style) -> u8 {
    let row = match style.position {
        Position::Bottom => 1,
        Position::Center => 4,
        Position::Top => 7,
    };
    let col = match style.text_align {
        TextAlign::Left => 0,
        TextAlign::Center => 1,
        TextAlign::Right => 2,
    };
    row + col
}

fn style_line(style: &Style, play_res: Canvas) -> String {
    let s = play_res.scale_factor();
    let w = f64::from(play_res.width);
    let h = f64::from(play_res.height);
    let font_px = style.font_size * s;

    let (border_style, outline_colour, back_colour, outline) = if style.background_enabled() {
        let bg = ass_color(style.effective_background());
        (3, bg.clone(), bg, style.padding * s)
    } else {
        let outline = if style.outline_enabled() {
            style.outline_width * s
        } else {
            0.0
        };
        (
            1,
            ass_color(style.outline_color),
            ass_color(Color::rgba(0, 0, 0, 0)),
            outline,
        )
    };

    let margin_v = match style.position {
        Position::Center => 0.0,
        Position::Bottom | Position::Top => {
            let anchor = (style.vertical_offset / 100.0).max(SAFE_ZONE) * h;
            (anchor - font_px * style.line_height / 2.0).max(0.0)
        }
    };

    let edge = SAFE_ZONE * w;
    let h_off = style.horizontal_offset * s;
    let (margin_l, margin_r) = match style.text_align {
        TextAlign::Center if h_off >= 0.0 => (edge + 2.0 * h_off, edge),
        TextAlign::Center => (edge, edge - 2.0 * h_off),
        TextAlign::Left => (edge + h_off, edge),
        TextAlign::Right => (edge, edge + h_off),
    };

    format!(
        "Style: Default,{},{},{},&H000000FF,{outline_colour},{back_colour},{},0,0,0,100,100,{},0,\
         {border_style},{},0,{},{},{},{},1",
        style.primary_family(),
        num(font_px),
        ass_color(style.color),
        if style.font_weight.is_bold() { -1 } else { 0 },
        num(style.letter_spacing * s),
        num(outline),
        alignment(style),
        margin_l.max(0.0).round(),
        margin_r.max(0.0).round(),
        margin_v.round(),
    )
}

/// Override tags reproducing the entrance animation on an event's first appearance.
fn animation_tags(style: &Style, scale: f64) -> String {
    let ms = (style.animation_duration.max(0.0) * 1000.0).round() as u64;
    match style.animation {
        Animation::Fade
        | Animation::Slide
        | Animation::SlideDown
        | Animation::SlideLeft
        | Animation::SlideRight
            if ms > 0 =>
        {
            format!("\\fad({ms},0)")
        }
        Animation::Pop | Animation::Zoom if ms > 0 => {
            format!("\\fscx50\\fscy50\\t(0,{ms},\\fscx100\\fscy100)")
        }
        Animation::Bounce => {
            "\\t(0,200,\\fscx110\\fscy110)\\t(200,400,\\fscx100\\fscy100)".to_owned()
        }
        Animation::Glow => format!(
            "\\bord{}\\blur5",
            num((style.outline_width.max(0.0) + 2.0) * scale)
        ),
        _ => String::new(),
    }
}

/// Visible states of a segment as `(start, end, text)` triples in absolute seconds.
fn segment_states(seg: &Segment, style: &Style) -> Vec<(f64, f64, FrameText)> {
    let mode = style.display_mode;
    let highlighting = mode == DisplayMode::WordByWord
        && (style.highlight_color.is_some() || style.highlight_scale.is_some());
    if !mode.is_progressive() {
        return vec![(seg.start, seg.end, frame_text(seg, style, 0.0))];
    }

    let mut cuts: Vec<f64> = reveal_step_offsets(mode.unit_count(&seg.text))
        .into_iter()
        .map(|o| seg.start + o)
        .collect();
    if highlighting {
        for w in seg.word_timings().iter() {
            cuts.push(w.start);
            cuts.push(w.end);
        }
    }
    cuts.retain(|&c| c > seg.start + MIN_EVENT_SECS && c < seg.end - MIN_EVENT_SECS);
    cuts.sort_by(f64::total_cmp);
    cuts.dedup_by(|a, b| (*a - *b).abs() < MIN_EVENT_SECS);

    let mut bounds = Vec::with_capacity(cuts.len() + 2);
    bounds.push(seg.start);
    bounds.extend(cuts);
    bounds.push(seg.end);

    let mut states: Vec<(f64, f64, FrameText)> = Vec::new();
    for pair in bounds.windows(2) {
        let mid = (pair[0] + pair[1]) / 2.0;
        let ft = frame_text(seg, style, mid - seg.start);
        match states.last_mut() {
            Some(last) if last.2 == ft => last.1 = pair[1],
            _ => states.push((pair[0], pair[1], ft)),
        }
    }
    states
}

fn dialogue_text(ft: &FrameText, style: &Style) -> String {
    let Some(range) = ft.highlight.clone() else {
        return hard_lines(&ft.text)
            .iter()
            .map(|l| escape(l))
            .collect::<Vec<_>>()
            .join("\\N");
    };

    let mut tags = String::new();
    if let Some(c) = style.highlight_color {
        let _ = write!(tags, "\\1c{}", ass_inline_color(c));
    }
    if let Some(k) = style.highlight_scale {
        let pct = num(k * 100.0);
        let _ = write!(tags, "\\fscx{pct}\\fscy{pct}");
    }
    let before = escape(ft.text[..range.start].trim_start());
    let word = escape(&ft.text[range.clone()]);
    let after = escape(ft.text[range.end..].trim_end());
    format!("{before}{{{tags}}}{word}{{\\r}}{after}")
}

/// Make text safe for an event body: braces would open override blocks and backslashes would
/// start escapes.
fn escape(text: &str) -> String {
    text.replace('\r', "")
        .replace('\\', "/")
        .replace('{', "(")
        .replace('}', ")")
        .replace('\n', "\\N")
}

fn num(v: f64) -> String {
    let r = (v * 100.0).round() / 100.0;
    if r.fract() == 0.0 {
        format!("{}", r as i64)
    } else {
        format!("{r}")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/format/ass.rs"]
mod tests;
