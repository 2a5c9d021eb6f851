use crate::Color;

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// A straight-alpha RGBA8 pixel buffer.
///
/// Used for decoded source images, glyph/shadow layers and the render surface
/// that every tick composites into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Raw pixel data, row-major, 4 bytes per pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Create a new frame buffer filled with zeros (transparent black).
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width as usize) * (height as usize) * BYTES_PER_PIXEL;
        Self {
            data: vec![0u8; size],
            width,
            height,
        }
    }

    /// Create a frame buffer filled with a solid color.
    pub fn solid(width: u32, height: u32, color: &Color) -> Self {
        let mut fb = Self::new(width, height);
        fb.fill(color);
        fb
    }

    /// Wrap existing RGBA8 bytes. Returns None when the length does not match.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize) * (height as usize) * BYTES_PER_PIXEL;
        (data.len() == expected).then_some(Self {
            data,
            width,
            height,
        })
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Total byte size of the pixel data.
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: &Color) {
        let pixel = color.to_rgba8();
        for px in self.data.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&pixel);
        }
    }

    /// Get the RGBA value at a pixel coordinate. Returns None if out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        Some([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ])
    }

    /// Set the RGBA value at a pixel coordinate. No-op if out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = self.offset(x, y);
        self.data[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgba);
    }

    /// Source-over blend a single pixel. No-op if out of bounds.
    pub fn blend_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let offset = self.offset(x as u32, y as u32);
        blend_over(&mut self.data[offset..offset + BYTES_PER_PIXEL], rgba);
    }

    /// Source-over blend `rgba` across the whole of row `y`.
    pub fn blend_row(&mut self, y: u32, rgba: [u8; 4]) {
        if y >= self.height || rgba[3] == 0 {
            return;
        }
        let stride = self.width as usize * BYTES_PER_PIXEL;
        let start = y as usize * stride;
        for d in self.data[start..start + stride].chunks_exact_mut(BYTES_PER_PIXEL) {
            blend_over(d, rgba);
        }
    }

    /// Alpha-composite `src` on top of `self` at position (dx, dy).
    /// Uses integer math that auto-vectorizes well.
    pub fn composite_over(&mut self, src: &FrameBuffer, dx: i32, dy: i32) {
        let dst_width = self.width as i32;
        let dst_height = self.height as i32;

        let mut start_y = 0;
        let mut end_y = src.height as i32;
        let mut start_x = 0;
        let mut end_x = src.width as i32;

        if dy < 0 {
            start_y = -dy;
        }
        if dy + end_y > dst_height {
            end_y = dst_height - dy;
        }
        if dx < 0 {
            start_x = -dx;
        }
        if dx + end_x > dst_width {
            end_x = dst_width - dx;
        }

        if start_x >= end_x || start_y >= end_y {
            return;
        }

        let src_stride = src.width as usize * BYTES_PER_PIXEL;
        let dst_stride = self.width as usize * BYTES_PER_PIXEL;

        for sy in start_y..end_y {
            let dst_y = dy + sy;
            let src_row_start = (sy as usize * src_stride) + (start_x as usize * BYTES_PER_PIXEL);
            let dst_row_start =
                (dst_y as usize * dst_stride) + ((dx + start_x) as usize * BYTES_PER_PIXEL);
            let len = (end_x - start_x) as usize * BYTES_PER_PIXEL;

            let src_slice = &src.data[src_row_start..src_row_start + len];
            let dst_slice = &mut self.data[dst_row_start..dst_row_start + len];

            for (s, d) in src_slice
                .chunks_exact(BYTES_PER_PIXEL)
                .zip(dst_slice.chunks_exact_mut(BYTES_PER_PIXEL))
            {
                blend_over(d, [s[0], s[1], s[2], s[3]]);
            }
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * BYTES_PER_PIXEL
    }
}

/// Straight-alpha source-over of `s` onto the pixel `d`.
#[inline]
pub fn blend_over(d: &mut [u8], s: [u8; 4]) {
    let sa = s[3] as u32;
    if sa == 0 {
        return;
    }
    if sa == 255 {
        d.copy_from_slice(&s);
        return;
    }

    let da = d[3] as u32;
    let inv_sa = 255 - sa;
    let out_a = sa + ((da * inv_sa) / 255);
    if out_a == 0 {
        return;
    }

    for c in 0..3 {
        let sc = s[c] as u32;
        let dc = d[c] as u32;
        d[c] = ((sc * sa * 255 + dc * da * inv_sa) / (out_a * 255)) as u8;
    }
    d[3] = out_a as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_buffer_new() {
        let fb = FrameBuffer::new(1080, 1920);
        assert_eq!(fb.byte_size(), 1080 * 1920 * 4);
        assert_eq!(fb.pixel_count(), 1080 * 1920);
        assert_eq!(fb.get_pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_from_rgba8_checks_length() {
        assert!(FrameBuffer::from_rgba8(2, 2, vec![0; 16]).is_some());
        assert!(FrameBuffer::from_rgba8(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn test_fill_overwrites() {
        let mut fb = FrameBuffer::solid(3, 3, &Color::WHITE);
        fb.fill(&Color::BLACK);
        assert!(fb.data.chunks_exact(4).all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn test_frame_buffer_out_of_bounds() {
        let mut fb = FrameBuffer::new(10, 10);
        assert_eq!(fb.get_pixel(10, 0), None);
        fb.set_pixel(0, 10, [1, 2, 3, 4]);
        fb.blend_pixel(-1, 3, [255, 255, 255, 255]);
        assert!(fb.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_blend_row_darkens_opaque_white() {
        let mut fb = FrameBuffer::solid(4, 2, &Color::WHITE);
        fb.blend_row(1, [0, 0, 0, 128]);
        assert_eq!(fb.get_pixel(0, 0), Some([255, 255, 255, 255]));
        let [r, g, b, a] = fb.get_pixel(3, 1).unwrap();
        assert_eq!(a, 255);
        assert!(r < 130 && r > 120);
        assert_eq!((r, g), (g, b));
    }

    #[test]
    fn test_composite_over_opaque() {
        let mut dst = FrameBuffer::solid(4, 4, &Color::rgb(0.0, 0.0, 1.0));
        let src = FrameBuffer::solid(2, 2, &Color::rgb(1.0, 0.0, 0.0));
        dst.composite_over(&src, 1, 1);
        assert_eq!(dst.get_pixel(1, 1), Some([255, 0, 0, 255]));
        assert_eq!(dst.get_pixel(2, 2), Some([255, 0, 0, 255]));
        assert_eq!(dst.get_pixel(0, 0), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_composite_over_clips_negative_offset() {
        let mut dst = FrameBuffer::solid(2, 2, &Color::BLACK);
        let src = FrameBuffer::solid(2, 2, &Color::WHITE);
        dst.composite_over(&src, -1, -1);
        assert_eq!(dst.get_pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(dst.get_pixel(1, 1), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_composite_over_transparent() {
        let mut dst = FrameBuffer::solid(4, 4, &Color::WHITE);
        let src = FrameBuffer::new(2, 2);
        dst.composite_over(&src, 0, 0);
        assert_eq!(dst.get_pixel(0, 0), Some([255, 255, 255, 255]));
    }
}
