use std::io::Cursor;
use std::sync::Arc;

use reel_core::hash::hash_frame;
use reel_core::{FrameBuffer, REEL_HEIGHT, REEL_WIDTH};
use reel_render::{load_image_from_bytes, BlockFont, FrameCompositor};

const QUOTE: &str = "Believe you can and you're halfway there.";
const CTA: &str = "Save this for later!";

/// 1260x750 JPEG-sized landscape encoded as PNG bytes.
fn landscape_png() -> Vec<u8> {
    let img = image::RgbaImage::from_fn(1260, 750, |x, y| {
        image::Rgba([(x % 251) as u8, (y % 241) as u8, 80, 255])
    });
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn render_at(compositor: &FrameCompositor, image: &FrameBuffer, progress: f64) -> FrameBuffer {
    let mut surface = FrameBuffer::new(REEL_WIDTH, REEL_HEIGHT);
    compositor.render(&mut surface, image, QUOTE, CTA, progress);
    surface
}

#[test]
fn test_full_size_frames_are_reproducible() {
    let image = load_image_from_bytes(&landscape_png(), "landscape.png").unwrap();
    let first = FrameCompositor::new(Arc::new(BlockFont::default()));
    let second = FrameCompositor::new(Arc::new(BlockFont::default()));

    for progress in [0.0, 0.5, 1.0] {
        let a = render_at(&first, &image, progress);
        let b = render_at(&second, &image, progress);
        assert_eq!(hash_frame(&a), hash_frame(&b), "progress {}", progress);
    }
}

#[test]
fn test_zoom_changes_background_over_time() {
    let image = load_image_from_bytes(&landscape_png(), "landscape.png").unwrap();
    let compositor = FrameCompositor::new(Arc::new(BlockFont::default()));
    let start = render_at(&compositor, &image, 0.0);
    let end = render_at(&compositor, &image, 1.0);

    // Mid-frame, outside both bands, the background moves as it zooms.
    let row = REEL_HEIGHT / 2;
    let differs = (0..REEL_WIDTH).any(|x| start.get_pixel(x, row) != end.get_pixel(x, row));
    assert!(differs);

    // The source never contains pure black, so none may show through at the edges.
    for frame in [&start, &end] {
        for y in [0, row, REEL_HEIGHT - 1] {
            assert_ne!(frame.get_pixel(0, y), Some([0, 0, 0, 255]));
            assert_ne!(frame.get_pixel(REEL_WIDTH - 1, y), Some([0, 0, 0, 255]));
        }
    }
}
