//! Text rendering module.
//! Greedy word wrapping plus line rasterization. Glyphs come from a
//! [`TextRasterizer`]: fontdue-backed [`FontRasterizer`] in production, the
//! deterministic [`BlockFont`] for previews and tests.

use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use reel_core::frame::FrameBuffer;
use reel_core::{Color, ReelError, ReelResult};

use crate::effects::DropShadow;

/// Bold sans-serif faces looked up when no font is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Measures rendered text width.
pub trait TextMeasure {
    /// Advance width of `text` at `size_px`, in pixels.
    fn measure(&self, text: &str, size_px: f32) -> f32;
}

/// Rasterizes a single line of text.
pub trait TextRasterizer: TextMeasure + Send + Sync {
    /// Render `text` into a buffer whose top edge is the top of the line box
    /// (the equivalent of a `top` text baseline). Glyph pixels carry `color`,
    /// everything else is transparent.
    fn render_line(&self, text: &str, size_px: f32, color: &Color) -> FrameBuffer;
}

/// Style for one caption block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size_px: f32,
    pub line_height: f32,
    pub color: Color,
    /// Shadow painted under glyphs only.
    pub shadow: Option<DropShadow>,
}

/// Greedy line breaking.
///
/// Words are accumulated while the candidate line fits in `max_width`. A word
/// that does not fit starts a new line, unless the current line is empty: a
/// single word wider than `max_width` sits alone on its line and is never split.
pub fn wrap_lines(measure: &dyn TextMeasure, text: &str, size_px: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", line, word);
        if measure.measure(&candidate, size_px) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Lays out and draws wrapped, horizontally centered text.
pub struct TextLayoutEngine<'a> {
    rasterizer: &'a dyn TextRasterizer,
}

impl<'a> TextLayoutEngine<'a> {
    pub fn new(rasterizer: &'a dyn TextRasterizer) -> Self {
        Self { rasterizer }
    }

    /// Wrap `text` to `max_width` and draw each line centered on `center_x`,
    /// the first line's top at `start_y`, advancing `style.line_height` per line.
    ///
    /// Returns the vertical cursor after the last line (`start_y` for empty text).
    pub fn wrap_and_draw(
        &self,
        surface: &mut FrameBuffer,
        text: &str,
        center_x: f32,
        start_y: f32,
        max_width: f32,
        style: &TextStyle,
    ) -> f32 {
        let lines = wrap_lines(self.rasterizer, text, style.size_px, max_width);
        let mut cursor_y = start_y;

        for line in &lines {
            let glyphs = self.rasterizer.render_line(line, style.size_px, &style.color);
            let width = self.rasterizer.measure(line, style.size_px);
            let x = (center_x - width / 2.0).round() as i32;
            let y = cursor_y.round() as i32;

            if let Some(shadow) = &style.shadow {
                let (layer, pad) = shadow.layer_for(&glyphs);
                surface.composite_over(
                    &layer,
                    x + shadow.offset_x - pad as i32,
                    y + shadow.offset_y - pad as i32,
                );
            }
            surface.composite_over(&glyphs, x, y);
            cursor_y += style.line_height;
        }

        cursor_y
    }
}

/// fontdue-backed rasterizer.
pub struct FontRasterizer {
    font: Font,
    source: PathBuf,
}

impl FontRasterizer {
    /// Load a font from a file path.
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let data = std::fs::read(path).map_err(|e| {
            ReelError::asset(format!("failed to read font file: {}", e), path.display().to_string())
        })?;
        let font = Font::from_bytes(data, FontSettings::default()).map_err(|e| {
            ReelError::asset(format!("failed to parse font: {}", e), path.display().to_string())
        })?;
        Ok(Self {
            font,
            source: path.to_path_buf(),
        })
    }

    /// Use `configured` when given, otherwise the first bold sans-serif system font found.
    pub fn discover(configured: Option<&Path>) -> ReelResult<Self> {
        if let Some(path) = configured {
            return Self::from_path(path);
        }
        let found = SYSTEM_FONT_CANDIDATES
            .iter()
            .map(Path::new)
            .find(|p| p.is_file())
            .ok_or_else(|| {
                ReelError::asset(
                    "no caption font configured and no known system font found; set [text] font",
                    "<system fonts>",
                )
            })?;
        tracing::debug!("Using system font {}", found.display());
        Self::from_path(found)
    }

    /// Path the font was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    fn ascent_descent(&self, size_px: f32) -> (f32, f32) {
        match self.font.horizontal_line_metrics(size_px) {
            Some(m) => (m.ascent, m.descent),
            None => (size_px * 0.8, -size_px * 0.2),
        }
    }
}

impl TextMeasure for FontRasterizer {
    fn measure(&self, text: &str, size_px: f32) -> f32 {
        text.chars()
            .map(|ch| self.font.metrics(ch, size_px).advance_width)
            .sum()
    }
}

impl TextRasterizer for FontRasterizer {
    fn render_line(&self, text: &str, size_px: f32, color: &Color) -> FrameBuffer {
        let (ascent, descent) = self.ascent_descent(size_px);
        let width = self.measure(text, size_px).ceil().max(1.0) as u32;
        let height = (ascent - descent).ceil().max(1.0) as u32;
        let baseline = ascent.round() as i32;

        let mut fb = FrameBuffer::new(width, height);
        let [r, g, b, a] = color.to_rgba8();
        let mut cursor_x = 0.0f32;

        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, size_px);
            let glyph_x = cursor_x.round() as i32 + metrics.xmin;
            let glyph_y = baseline - (metrics.height as i32 + metrics.ymin);

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let coverage = bitmap[gy * metrics.width + gx];
                    if coverage == 0 {
                        continue;
                    }
                    let alpha = (coverage as u32 * a as u32 / 255) as u8;
                    fb.blend_pixel(glyph_x + gx as i32, glyph_y + gy as i32, [r, g, b, alpha]);
                }
            }

            cursor_x += metrics.advance_width;
        }

        fb
    }
}

/// Deterministic monospace rasterizer: every character advances
/// `size_px * advance_ratio`, non-space characters are solid blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockFont {
    pub advance_ratio: f32,
}

impl BlockFont {
    pub fn new(advance_ratio: f32) -> Self {
        Self { advance_ratio }
    }

    fn advance(&self, size_px: f32) -> f32 {
        size_px * self.advance_ratio
    }
}

impl Default for BlockFont {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl TextMeasure for BlockFont {
    fn measure(&self, text: &str, size_px: f32) -> f32 {
        text.chars().count() as f32 * self.advance(size_px)
    }
}

impl TextRasterizer for BlockFont {
    fn render_line(&self, text: &str, size_px: f32, color: &Color) -> FrameBuffer {
        let advance = self.advance(size_px);
        let width = self.measure(text, size_px).ceil().max(1.0) as u32;
        let height = size_px.ceil().max(1.0) as u32;
        let mut fb = FrameBuffer::new(width, height);
        let pixel = color.to_rgba8();

        let top = (size_px * 0.15).round() as u32;
        let bottom = (size_px * 0.85).round() as u32;
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x0 = (i as f32 * advance).round() as u32;
            let x1 = ((i + 1) as f32 * advance).round() as u32;
            for y in top..bottom {
                for x in (x0 + 1)..x1.saturating_sub(1) {
                    fb.set_pixel(x, y, pixel);
                }
            }
        }
        fb
    }
}
