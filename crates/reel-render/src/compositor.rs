//! Frame compositor: zooming cover-fit background, caption scrims and
//! shadowed captions, drawn from scratch on every call.

use std::sync::Arc;

use reel_core::frame::FrameBuffer;
use reel_core::{Color, Rect, Size2D};

use crate::effects::DropShadow;
use crate::image_loader::draw_scaled;
use crate::text::{TextLayoutEngine, TextRasterizer, TextStyle};

/// Total zoom reached at the end of the clip (10%).
pub const ZOOM_RANGE: f64 = 0.1;

/// Horizontal padding on each side of the caption text.
pub const CAPTION_PADDING: f32 = 40.0;

/// Zoom factor for a progress value: `1 + 0.1 * progress`.
pub fn zoom_factor(progress: f64) -> f64 {
    1.0 + ZOOM_RANGE * progress.clamp(0.0, 1.0)
}

/// Cover-fit placement of an image inside a surface, scaled by `zoom` and centered.
///
/// Wider-than-surface images are fitted by height, others by width, so the
/// placement always covers the whole surface for `zoom >= 1`.
pub fn cover_fit(image: Size2D, surface: Size2D, zoom: f64) -> Rect {
    let image_aspect = image.aspect_ratio();
    let (width, height) = if image_aspect > surface.aspect_ratio() {
        let height = surface.height * zoom;
        (height * image_aspect, height)
    } else {
        let width = surface.width * zoom;
        (width, width / image_aspect)
    };
    Rect::new(
        (surface.width - width) / 2.0,
        (surface.height - height) / 2.0,
        width,
        height,
    )
}

/// A full-width vertical translucency gradient behind a caption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scrim {
    pub top: i64,
    pub height: u32,
    /// Black alpha at the band's top edge.
    pub top_alpha: f32,
    /// Black alpha at the band's bottom edge.
    pub bottom_alpha: f32,
}

impl Scrim {
    /// Alpha of the row with index `y` (sampled at the row center).
    pub fn alpha_at(&self, y: i64) -> f32 {
        let t = ((y - self.top) as f32 + 0.5) / self.height.max(1) as f32;
        let start = Color::BLACK.with_alpha(self.top_alpha);
        let end = Color::BLACK.with_alpha(self.bottom_alpha);
        start.lerp(&end, t).a
    }

    pub fn paint(&self, surface: &mut FrameBuffer) {
        for y in self.top.max(0)..(self.top + self.height as i64) {
            if y >= surface.height as i64 {
                break;
            }
            let rgba = Color::BLACK.with_alpha(self.alpha_at(y)).to_rgba8();
            surface.blend_row(y as u32, rgba);
        }
    }
}

/// One caption region: its scrim, where text starts, and how it looks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionBand {
    pub scrim: Scrim,
    pub text_top: f32,
    pub style: TextStyle,
}

/// Placement of both caption bands for a surface size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    pub quote: CaptionBand,
    pub cta: CaptionBand,
    pub max_text_width: f32,
}

impl OverlayLayout {
    pub fn for_surface(width: u32, height: u32) -> Self {
        let h = height as i64;
        let shadow = Some(DropShadow {
            color: Color::BLACK.with_alpha(0.8),
            blur: 4.0,
            offset_x: 2,
            offset_y: 2,
        });

        let quote = CaptionBand {
            scrim: Scrim {
                top: 60,
                height: 140,
                top_alpha: 0.8,
                bottom_alpha: 0.3,
            },
            text_top: 120.0,
            style: TextStyle {
                size_px: 36.0,
                line_height: 44.0,
                color: Color::WHITE,
                shadow,
            },
        };

        let cta = CaptionBand {
            scrim: Scrim {
                top: h - 200,
                height: 200,
                top_alpha: 0.3,
                bottom_alpha: 0.8,
            },
            text_top: (h - 180) as f32,
            style: TextStyle {
                size_px: 28.0,
                line_height: 36.0,
                color: Color::WHITE,
                shadow,
            },
        };

        Self {
            quote,
            cta,
            max_text_width: (width as f32 - CAPTION_PADDING * 2.0).max(1.0),
        }
    }
}

/// Renders complete reel frames. Holds no per-frame state.
#[derive(Clone)]
pub struct FrameCompositor {
    rasterizer: Arc<dyn TextRasterizer>,
}

impl FrameCompositor {
    pub fn new(rasterizer: Arc<dyn TextRasterizer>) -> Self {
        Self { rasterizer }
    }

    /// Overwrite `surface` with the frame at `progress`.
    ///
    /// The result depends only on the arguments, never on what the surface held before.
    pub fn render(
        &self,
        surface: &mut FrameBuffer,
        image: &FrameBuffer,
        quote: &str,
        cta: &str,
        progress: f64,
    ) {
        surface.fill(&Color::BLACK);

        let surface_size = Size2D::new(surface.width as f64, surface.height as f64);
        let image_size = Size2D::new(image.width as f64, image.height as f64);
        let placement = cover_fit(image_size, surface_size, zoom_factor(progress));
        draw_scaled(surface, image, placement);

        let layout = OverlayLayout::for_surface(surface.width, surface.height);
        layout.quote.scrim.paint(surface);
        layout.cta.scrim.paint(surface);

        let engine = TextLayoutEngine::new(self.rasterizer.as_ref());
        let center_x = surface.width as f32 / 2.0;
        for (band, text) in [(&layout.quote, quote), (&layout.cta, cta)] {
            engine.wrap_and_draw(
                surface,
                text,
                center_x,
                band.text_top,
                layout.max_text_width,
                &band.style,
            );
        }
    }
}
