use crate::frame::FrameBuffer;
use crate::time::ReelTiming;
use crate::{ReelError, ReelResult};

/// Output width of every reel.
pub const REEL_WIDTH: u32 = 1080;
/// Output height of every reel.
pub const REEL_HEIGHT: u32 = 1920;

/// Immutable description of one video generation request, with the image already decoded.
#[derive(Debug, Clone)]
pub struct ReelSpec {
    image: FrameBuffer,
    quote: String,
    cta: String,
    width: u32,
    height: u32,
    timing: ReelTiming,
}

impl ReelSpec {
    /// A 1080x1920, 8 second, 30 fps reel.
    pub fn new(image: FrameBuffer, quote: impl Into<String>, cta: impl Into<String>) -> ReelResult<Self> {
        Self::with_format(image, quote, cta, REEL_WIDTH, REEL_HEIGHT, ReelTiming::default())
    }

    /// Same as [`ReelSpec::new`] with explicit surface size and timing.
    ///
    /// Dimensions must be non-zero and even (yuv420p output).
    pub fn with_format(
        image: FrameBuffer,
        quote: impl Into<String>,
        cta: impl Into<String>,
        width: u32,
        height: u32,
        timing: ReelTiming,
    ) -> ReelResult<Self> {
        if image.width == 0 || image.height == 0 {
            return Err(ReelError::asset("image has no pixels", "<decoded>"));
        }
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            return Err(ReelError::InvalidArgument(format!(
                "reel dimensions must be non-zero and even, got {}x{}",
                width, height
            )));
        }
        ReelTiming::new(timing.duration_ms, timing.fps)?;
        Ok(Self {
            image,
            quote: quote.into(),
            cta: cta.into(),
            width,
            height,
            timing,
        })
    }

    pub fn image(&self) -> &FrameBuffer {
        &self.image
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    pub fn cta(&self) -> &str {
        &self.cta
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timing(&self) -> ReelTiming {
        self.timing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    #[test]
    fn test_defaults() {
        let spec = ReelSpec::new(FrameBuffer::solid(4, 4, &Color::WHITE), "q", "c").unwrap();
        assert_eq!((spec.width(), spec.height()), (1080, 1920));
        assert_eq!(spec.timing().duration_ms, 8000);
        assert_eq!(spec.timing().fps, 30);
        assert_eq!(spec.quote(), "q");
        assert_eq!(spec.cta(), "c");
    }

    #[test]
    fn test_rejects_odd_dimensions() {
        let img = FrameBuffer::solid(4, 4, &Color::WHITE);
        let err = ReelSpec::with_format(img, "", "", 107, 192, ReelTiming::default()).unwrap_err();
        assert!(err.to_string().contains("107x192"));
    }

    #[test]
    fn test_rejects_empty_image() {
        let err = ReelSpec::new(FrameBuffer::new(0, 0), "", "").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::AssetLoad);
    }
}
