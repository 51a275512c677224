use rayon::prelude::*;

use crate::foundation::core::{PixelPoint, PremulImage};
use crate::foundation::math::mul_div255_u8;

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Porter-Duff source-over for premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = u16::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let inv = 255u16 - sa;
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Composite `src` over `dst` with its top-left at `at`, clipping to `dst`.
pub fn over_at(dst: &mut PremulImage, src: &PremulImage, at: PixelPoint) {
    if at.x >= dst.width || at.y >= dst.height {
        return;
    }
    let cols = src.width.min(dst.width - at.x) as usize;
    let rows = src.height.min(dst.height - at.y) as usize;
    if cols == 0 || rows == 0 {
        return;
    }

    let dst_stride = dst.width as usize * 4;
    let src_stride = src.width as usize * 4;
    let x0 = at.x as usize * 4;
    dst.data
        .par_chunks_exact_mut(dst_stride)
        .skip(at.y as usize)
        .take(rows)
        .enumerate()
        .for_each(|(row, dst_row)| {
            let src_row = &src.data[row * src_stride..row * src_stride + cols * 4];
            let dst_span = &mut dst_row[x0..x0 + cols * 4];
            for (d, s) in dst_span.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
                d.copy_from_slice(&out);
            }
        });
}

#[cfg(test)]
#[path = "../../tests/unit/composite/blend.rs"]
mod tests;
