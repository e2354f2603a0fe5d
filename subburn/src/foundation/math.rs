pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Source-over for premultiplied RGBA8 buffers of equal length.
pub(crate) fn premul_over_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = u16::from(s[3]);
        if sa == 0 {
            continue;
        }
        if sa == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - sa;
        for c in 0..4 {
            d[c] = s[c].saturating_add(mul_div255_u8(u16::from(d[c]), inv));
        }
    }
}

/// Flatten premultiplied RGBA8 over an opaque background color.
pub(crate) fn flatten_premul_over_bg(dst: &mut [u8], src_premul: &[u8], bg_rgb: [u8; 3]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let inv = 255 - u16::from(s[3]);
        for c in 0..3 {
            let v = u16::from(s[c]) + mul_div255_u16(u16::from(bg_rgb[c]), inv);
            d[c] = v.min(255) as u8;
        }
        d[3] = 255;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
