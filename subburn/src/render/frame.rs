use crate::foundation::core::Canvas;
use crate::foundation::error::{SubburnError, SubburnResult};
use crate::foundation::math::{flatten_premul_over_bg, premul_over_in_place};

/// A frame as RGBA8 pixels.
///
/// Frames handed to the compositor are **premultiplied alpha**; the flag makes the
/// representation explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent frame.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; byte_len(width, height)],
            premultiplied: true,
        }
    }

    /// Wrap straight-alpha RGBA8 pixels (as decoded from video), premultiplying in place.
    pub fn from_straight_rgba(width: u32, height: u32, mut data: Vec<u8>) -> SubburnResult<Self> {
        if data.len() != byte_len(width, height) {
            return Err(SubburnError::validation(format!(
                "frame data is {} bytes, expected {} for {width}x{height}",
                data.len(),
                byte_len(width, height)
            )));
        }
        for px in data.chunks_exact_mut(4) {
            let a = px[3];
            if a == 255 {
                continue;
            }
            let p = crate::foundation::core::Rgba8Premul::from_straight_rgba(px[0], px[1], px[2], a);
            px.copy_from_slice(&[p.r, p.g, p.b, p.a]);
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    /// Surface dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Composite a premultiplied overlay of the same size over this frame.
    pub fn composite_over(&mut self, overlay_premul: &[u8]) -> SubburnResult<()> {
        if overlay_premul.len() != self.data.len() {
            return Err(SubburnError::evaluation(format!(
                "overlay is {} bytes, frame is {}",
                overlay_premul.len(),
                self.data.len()
            )));
        }
        premul_over_in_place(&mut self.data, overlay_premul);
        Ok(())
    }

    /// Opaque copy flattened over `bg_rgb`, ready for a video encoder.
    pub fn flattened(&self, bg_rgb: [u8; 3]) -> Vec<u8> {
        let mut out = vec![0u8; self.data.len()];
        flatten_premul_over_bg(&mut out, &self.data, bg_rgb);
        out
    }

    /// Straight-alpha copy, for image encoders.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if !self.premultiplied {
            return out;
        }
        for px in out.chunks_exact_mut(4) {
            let a = u32::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in px.iter_mut().take(3) {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize) * 4
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
