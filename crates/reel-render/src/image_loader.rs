//! Image loading module.
//! Decodes PNG, JPEG, WebP, and other formats into FrameBuffers and draws
//! them scaled onto a surface.

use std::path::Path;

use rayon::prelude::*;
use reel_core::frame::{blend_over, FrameBuffer, BYTES_PER_PIXEL};
use reel_core::{ReelError, ReelResult, Rect};

/// Load an image file and convert it to a FrameBuffer.
pub fn load_image(path: &Path) -> ReelResult<FrameBuffer> {
    let img = image::open(path).map_err(|e| {
        ReelError::asset(
            format!("failed to load image: {}", e),
            path.display().to_string(),
        )
    })?;
    into_frame_buffer(img, &path.display().to_string())
}

/// Load an image from raw bytes (e.g. a downloaded or embedded asset).
pub fn load_image_from_bytes(data: &[u8], source_name: &str) -> ReelResult<FrameBuffer> {
    let img = image::load_from_memory(data)
        .map_err(|e| ReelError::asset(format!("failed to decode image: {}", e), source_name))?;
    into_frame_buffer(img, source_name)
}

fn into_frame_buffer(img: image::DynamicImage, source_name: &str) -> ReelResult<FrameBuffer> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(ReelError::asset("image has no pixels", source_name));
    }
    FrameBuffer::from_rgba8(width, height, rgba.into_raw())
        .ok_or_else(|| ReelError::asset("decoded pixel buffer has the wrong size", source_name))
}

/// Bilinear sample at continuous pixel coordinates, clamped to the edges.
pub fn sample_bilinear(image: &FrameBuffer, u: f64, v: f64) -> [u8; 4] {
    let max_x = image.width.saturating_sub(1) as f64;
    let max_y = image.height.saturating_sub(1) as f64;
    let u = u.clamp(0.0, max_x);
    let v = v.clamp(0.0, max_y);

    let x0 = u.floor() as u32;
    let y0 = v.floor() as u32;
    let x1 = (x0 + 1).min(image.width - 1);
    let y1 = (y0 + 1).min(image.height - 1);
    let fx = (u - x0 as f64) as f32;
    let fy = (v - y0 as f64) as f32;

    let p00 = image.get_pixel(x0, y0).unwrap_or_default();
    let p10 = image.get_pixel(x1, y0).unwrap_or_default();
    let p01 = image.get_pixel(x0, y1).unwrap_or_default();
    let p11 = image.get_pixel(x1, y1).unwrap_or_default();

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] as f32 + (p10[c] as f32 - p00[c] as f32) * fx;
        let bottom = p01[c] as f32 + (p11[c] as f32 - p01[c] as f32) * fx;
        out[c] = (top + (bottom - top) * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Draw `image` stretched into `dest` (surface coordinates, may extend past
/// the surface edges). Only the visible part is touched. Rows are resampled
/// in parallel.
pub fn draw_scaled(surface: &mut FrameBuffer, image: &FrameBuffer, dest: Rect) {
    if image.width == 0 || image.height == 0 || dest.width <= 0.0 || dest.height <= 0.0 {
        return;
    }

    let x_start = dest.x.max(0.0).floor() as usize;
    let x_end = dest.right().min(surface.width as f64).ceil().max(0.0) as usize;
    let y_start = dest.y.max(0.0).floor() as usize;
    let y_end = dest.bottom().min(surface.height as f64).ceil().max(0.0) as usize;
    if x_start >= x_end || y_start >= y_end {
        return;
    }

    let scale_x = image.width as f64 / dest.width;
    let scale_y = image.height as f64 / dest.height;
    let stride = surface.width as usize * BYTES_PER_PIXEL;

    surface
        .data
        .par_chunks_exact_mut(stride)
        .enumerate()
        .skip(y_start)
        .take(y_end - y_start)
        .for_each(|(y, row)| {
            let v = (y as f64 + 0.5 - dest.y) * scale_y - 0.5;
            for x in x_start..x_end {
                let u = (x as f64 + 0.5 - dest.x) * scale_x - 0.5;
                let px = sample_bilinear(image, u, v);
                let offset = x * BYTES_PER_PIXEL;
                blend_over(&mut row[offset..offset + BYTES_PER_PIXEL], px);
            }
        });
}
