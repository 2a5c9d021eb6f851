//! CPU effects: alpha box blur and text drop shadows.

use reel_core::frame::FrameBuffer;
use reel_core::Color;

/// A drop shadow painted beneath glyphs.
///
/// `blur` follows the 2D-canvas convention: the shadow is a gaussian with
/// standard deviation `blur / 2`, approximated by three box blur passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropShadow {
    pub color: Color,
    pub blur: f32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl DropShadow {
    /// Box radius for each of the three passes.
    pub fn box_radius(&self) -> u32 {
        let sigma = (self.blur / 2.0).max(0.0);
        if sigma == 0.0 {
            return 0;
        }
        let width = (12.0 * sigma * sigma / 3.0 + 1.0).sqrt();
        ((width - 1.0) / 2.0).round().max(1.0) as u32
    }

    /// Build the shadow layer for a glyph layer.
    ///
    /// The result is padded on every side so the blur is not clipped; the
    /// returned padding must be subtracted from the draw position.
    pub fn layer_for(&self, glyphs: &FrameBuffer) -> (FrameBuffer, u32) {
        let radius = self.box_radius();
        let pad = radius * 3;
        let mut layer = FrameBuffer::new(glyphs.width + pad * 2, glyphs.height + pad * 2);
        let [r, g, b, a] = self.color.to_rgba8();

        for y in 0..glyphs.height {
            for x in 0..glyphs.width {
                let Some(px) = glyphs.get_pixel(x, y) else {
                    continue;
                };
                if px[3] == 0 {
                    continue;
                }
                let alpha = (px[3] as u32 * a as u32 / 255) as u8;
                layer.set_pixel(x + pad, y + pad, [r, g, b, alpha]);
            }
        }

        // Transparent pixels must carry the shadow color too, or blurred
        // edges would pick up black from the zeroed RGB.
        for px in layer.data.chunks_exact_mut(4) {
            px[0] = r;
            px[1] = g;
            px[2] = b;
        }

        for _ in 0..3 {
            box_blur_alpha(&mut layer, radius);
        }
        (layer, pad)
    }
}

/// Separable box blur over the alpha channel only.
pub fn box_blur_alpha(fb: &mut FrameBuffer, radius: u32) {
    if radius == 0 || fb.width == 0 || fb.height == 0 {
        return;
    }
    let w = fb.width as usize;
    let h = fb.height as usize;
    let r = radius as usize;
    let window = (2 * r + 1) as u32;

    let mut alpha: Vec<u32> = fb.data.chunks_exact(4).map(|p| p[3] as u32).collect();
    let mut scratch = vec![0u32; alpha.len()];

    // Horizontal pass.
    for y in 0..h {
        let row = &alpha[y * w..(y + 1) * w];
        let mut sum: u32 = row[..r.min(w)].iter().sum();
        for x in 0..w {
            if x + r < w {
                sum += row[x + r];
            }
            if x > r {
                sum -= row[x - r - 1];
            }
            scratch[y * w + x] = sum / window;
        }
    }

    // Vertical pass.
    for x in 0..w {
        let mut sum: u32 = (0..r.min(h)).map(|y| scratch[y * w + x]).sum();
        for y in 0..h {
            if y + r < h {
                sum += scratch[(y + r) * w + x];
            }
            if y > r {
                sum -= scratch[(y - r - 1) * w + x];
            }
            alpha[y * w + x] = sum / window;
        }
    }

    for (px, a) in fb.data.chunks_exact_mut(4).zip(alpha) {
        px[3] = a as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caption_shadow() -> DropShadow {
        DropShadow {
            color: Color::BLACK.with_alpha(0.8),
            blur: 4.0,
            offset_x: 2,
            offset_y: 2,
        }
    }

    #[test]
    fn test_box_radius() {
        assert_eq!(caption_shadow().box_radius(), 2);
        let sharp = DropShadow {
            blur: 0.0,
            ..caption_shadow()
        };
        assert_eq!(sharp.box_radius(), 0);
    }

    #[test]
    fn test_blur_spreads_and_conserves_roughly() {
        let mut fb = FrameBuffer::new(11, 11);
        fb.set_pixel(5, 5, [0, 0, 0, 255]);
        box_blur_alpha(&mut fb, 1);
        assert!(fb.get_pixel(5, 5).unwrap()[3] < 255);
        assert!(fb.get_pixel(4, 4).unwrap()[3] > 0);
        assert_eq!(fb.get_pixel(0, 0).unwrap()[3], 0);
    }

    #[test]
    fn test_shadow_layer_padding_and_color() {
        let glyphs = FrameBuffer::solid(10, 10, &Color::WHITE);
        let (layer, pad) = caption_shadow().layer_for(&glyphs);
        assert_eq!(pad, 6);
        assert_eq!((layer.width, layer.height), (22, 22));
        let center = layer.get_pixel(11, 11).unwrap();
        assert_eq!(&center[..3], &[0, 0, 0]);
        assert!(center[3] > 150 && center[3] <= 204);
        assert_eq!(layer.get_pixel(0, 0).unwrap()[3], 0);
    }

    #[test]
    fn test_empty_glyphs_cast_no_shadow() {
        let glyphs = FrameBuffer::new(6, 6);
        let (layer, _) = caption_shadow().layer_for(&glyphs);
        assert!(layer.data.chunks_exact(4).all(|p| p[3] == 0));
    }
}
