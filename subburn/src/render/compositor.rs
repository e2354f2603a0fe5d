use crate::foundation::core::{Affine, Canvas};
use crate::foundation::error::{SubburnError, SubburnResult};
use crate::layout::text::{FontSpec, SpanStyle, TextBrush, TextLayoutEngine};
use crate::model::color::Color;
use crate::model::segment::Segment;
use crate::model::style::Style;
use crate::model::track::{SegmentCursor, Track};
use crate::render::frame::FrameRGBA;
use crate::render::plan::{FramePlan, align_left_edge, plan_frame};
use std::collections::HashMap;

/// What a [`Compositor::render`] call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Subtitle pixels were drawn.
    Drawn,
    /// No segment is active; the surface is untouched.
    NoSegment,
    /// The surface has a zero dimension; the call was skipped.
    EmptySurface,
    /// The active segment has nothing visible at this instant.
    NothingVisible,
}

/// Opacity of the glow halo relative to the text color.
const GLOW_ALPHA: f64 = 0.35;

/// Draws the active subtitle onto caller-owned frames using `vello_cpu`.
///
/// The render context, scratch pixmap, and converted fonts are cached between calls; a
/// compositor is meant to be reused for every frame of a preview or export.
pub struct Compositor {
    engine: TextLayoutEngine,
    ctx: Option<vello_cpu::RenderContext>,
    scratch: Option<vello_cpu::Pixmap>,
    fonts: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    /// Create a compositor backed by the system font collection.
    pub fn new() -> Self {
        Self::with_engine(TextLayoutEngine::new())
    }

    /// Create a compositor around an existing text engine (e.g. with extra fonts registered).
    pub fn with_engine(engine: TextLayoutEngine) -> Self {
        Self {
            engine,
            ctx: None,
            scratch: None,
            fonts: HashMap::new(),
        }
    }

    /// Text engine used for measuring and shaping.
    pub fn text_engine_mut(&mut self) -> &mut TextLayoutEngine {
        &mut self.engine
    }

    /// Geometry for `seg` on `canvas`, measured with the font that will be drawn.
    pub fn plan(
        &mut self,
        canvas: Canvas,
        seg: &Segment,
        style: &Style,
        elapsed: f64,
    ) -> Option<FramePlan> {
        let spec = FontSpec::from_style(style, canvas.scale_factor());
        let mut measure = self.engine.measurer(&spec);
        plan_frame(canvas, seg, style, elapsed, &mut measure)
    }

    /// Draw `segment` onto `surface` as it appears `elapsed` seconds after becoming active.
    ///
    /// A `None` segment or an empty surface leaves the surface untouched.
    #[tracing::instrument(level = "trace", skip_all, fields(w = surface.width, h = surface.height))]
    pub fn render(
        &mut self,
        surface: &mut FrameRGBA,
        segment: Option<&Segment>,
        style: &Style,
        elapsed: f64,
    ) -> SubburnResult<RenderOutcome> {
        let Some(seg) = segment else {
            return Ok(RenderOutcome::NoSegment);
        };
        let canvas = surface.canvas();
        if canvas.is_empty() {
            tracing::debug!("surface not ready, skipping subtitle draw");
            return Ok(RenderOutcome::EmptySurface);
        }
        let Some(plan) = self.plan(canvas, seg, style, elapsed) else {
            return Ok(RenderOutcome::NothingVisible);
        };

        self.rasterize(&plan, style)?;
        let overlay = self
            .scratch
            .as_ref()
            .ok_or_else(|| SubburnError::evaluation("overlay pixmap missing after rasterize"))?;
        surface.composite_over(overlay.data_as_u8_slice())?;
        Ok(RenderOutcome::Drawn)
    }

    /// Resolve the active segment at `t` and draw it.
    pub fn render_at(
        &mut self,
        surface: &mut FrameRGBA,
        track: &Track,
        cursor: &mut SegmentCursor,
        style: &Style,
        t: f64,
    ) -> SubburnResult<RenderOutcome> {
        match cursor.lookup(track, t) {
            Some((_, seg)) => self.render(surface, Some(seg), style, t - seg.start),
            None => self.render(surface, None, style, 0.0),
        }
    }

    fn rasterize(&mut self, plan: &FramePlan, style: &Style) -> SubburnResult<()> {
        let (w, h) = surface_dims(plan.canvas)?;
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(w, h),
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            Some(_) => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();

        let anchor = plan.anchor.to_vec2();
        let block = Affine::translate(plan.entrance.offset)
            * Affine::translate(anchor)
            * Affine::scale(plan.entrance.scale)
            * Affine::translate(-anchor);

        let opacity = plan.entrance.opacity.clamp(0.0, 1.0) as f32;
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }

        if let Some(bg) = &plan.background {
            use kurbo::Shape;

            ctx.set_transform(affine_to_cpu(block));
            ctx.set_paint(bg.color.to_cpu());
            let rr = kurbo::RoundedRect::from_rect(bg.rect, bg.radius);
            let mut p = vello_cpu::kurbo::BezPath::new();
            for el in rr.path_elements(0.1) {
                p.push(el);
            }
            ctx.fill_path(&p);
        }

        let spec = FontSpec::from_style(style, plan.canvas.scale_factor());
        let base = TextBrush::from(style.color);
        for line in &plan.lines {
            let spans: Vec<SpanStyle> = line
                .highlight
                .clone()
                .map(|range| SpanStyle {
                    range,
                    brush: style.highlight_color.map(TextBrush::from).unwrap_or(base),
                    size_px: spec.size_px * style.highlight_scale.unwrap_or(1.0) as f32,
                })
                .into_iter()
                .collect();
            let layout = self.engine.layout_line(&line.text, &spec, base, &spans);
            let Some(first) = layout.lines().next() else {
                continue;
            };
            let m = first.metrics();
            let middle = f64::from(m.baseline) - f64::from(m.ascent - m.descent) / 2.0;
            let x = align_left_edge(plan.anchor.x, f64::from(layout.width()), style.text_align);
            let line_tr = block * Affine::translate((x, line.center_y - middle));
            ctx.set_transform(affine_to_cpu(line_tr));

            if plan.glow_width_px > 0.0 {
                let glow = style.color.with_opacity(GLOW_ALPHA);
                draw_glyphs(&mut ctx, &mut self.fonts, &layout, GlyphPaint::Stroke {
                    width: plan.glow_width_px,
                    color: glow,
                });
            }
            if plan.outline_width_px > 0.0 {
                draw_glyphs(&mut ctx, &mut self.fonts, &layout, GlyphPaint::Stroke {
                    width: plan.outline_width_px,
                    color: style.outline_color,
                });
            }
            draw_glyphs(&mut ctx, &mut self.fonts, &layout, GlyphPaint::Fill);
        }

        if opacity < 1.0 {
            ctx.pop_layer();
        }

        let mut pixmap = match self.scratch.take() {
            Some(p) if p.width() == w && p.height() == h => p,
            _ => vello_cpu::Pixmap::new(w, h),
        };
        pixmap.data_as_u8_slice_mut().fill(0);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        self.scratch = Some(pixmap);
        self.ctx = Some(ctx);
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum GlyphPaint {
    Fill,
    Stroke { width: f64, color: Color },
}

fn draw_glyphs(
    ctx: &mut vello_cpu::RenderContext,
    fonts: &mut HashMap<(u64, u32), vello_cpu::peniko::FontData>,
    layout: &parley::Layout<TextBrush>,
    paint: GlyphPaint,
) {
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let font = run.run().font();
            let font = fonts
                .entry((font.data.id(), font.index))
                .or_insert_with(|| {
                    vello_cpu::peniko::FontData::new(
                        vello_cpu::peniko::Blob::from(font.data.data().to_vec()),
                        font.index,
                    )
                })
                .clone();

            match paint {
                GlyphPaint::Fill => {
                    let brush = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        brush.r, brush.g, brush.b, brush.a,
                    ));
                }
                GlyphPaint::Stroke { width, color } => {
                    ctx.set_paint(color.to_cpu());
                    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
                }
            }

            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            let builder = ctx.glyph_run(&font).font_size(run.run().font_size());
            match paint {
                GlyphPaint::Fill => builder.fill_glyphs(glyphs),
                GlyphPaint::Stroke { .. } => builder.stroke_glyphs(glyphs),
            }
        }
    }
}

fn surface_dims(canvas: Canvas) -> SubburnResult<(u16, u16)> {
    let w = u16::try_from(canvas.width).map_err(|_| {
        SubburnError::validation(format!("surface width {} exceeds 65535", canvas.width))
    })?;
    let h = u16::try_from(canvas.height).map_err(|_| {
        SubburnError::validation(format!("surface height {} exceeds 65535", canvas.height))
    })?;
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
