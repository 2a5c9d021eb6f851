//! # reel-render
//!
//! CPU renderer for reel frames. Decodes the source image, then composites
//! the zooming background, caption scrims and shadowed, wrapped captions onto
//! an RGBA surface for any progress value.

pub mod compositor;
pub mod effects;
pub mod image_loader;
pub mod text;

pub use compositor::{cover_fit, zoom_factor, FrameCompositor, OverlayLayout};
pub use effects::DropShadow;
pub use image_loader::{load_image, load_image_from_bytes};
pub use text::{wrap_lines, BlockFont, FontRasterizer, TextLayoutEngine, TextRasterizer, TextStyle};
