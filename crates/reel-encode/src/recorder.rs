//! Constant-frame-rate recorder sitting between the animation loop and a
//! capture stream.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reel_core::{FrameBuffer, ReelError, ReelResult, ReelTiming};

use crate::backend::{CaptureBackend, CaptureConfig, CaptureStream};
use crate::format::{reel_filename, CodecDescriptor};

/// The finished artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedReel {
    pub bytes: Vec<u8>,
    /// `reel-<unix-ms>.<mp4|webm>`
    pub filename: String,
    pub codec: CodecDescriptor,
    pub frame_count: u64,
}

/// Samples the render surface into a capture stream.
///
/// The stream is constant-rate: whenever the surface is captured at elapsed
/// time `t`, it is repeated until the stream holds every frame due by `t`.
/// Frames are never dropped or reordered.
pub struct Recorder {
    stream: Box<dyn CaptureStream>,
    codec: CodecDescriptor,
    timing: ReelTiming,
    width: u32,
    height: u32,
    frames_written: u64,
}

impl Recorder {
    /// Bind to `codec` and start the backend's capture.
    pub async fn start(
        backend: &dyn CaptureBackend,
        codec: CodecDescriptor,
        width: u32,
        height: u32,
        timing: ReelTiming,
        crf: Option<u32>,
    ) -> ReelResult<Self> {
        let config = CaptureConfig {
            codec: codec.clone(),
            width,
            height,
            fps: timing.fps,
            crf,
        };
        let stream = backend.start(config).await?;
        tracing::info!(
            "Capture started: {} {}x{} @ {} fps via {}",
            codec,
            width,
            height,
            timing.fps,
            backend.name()
        );
        Ok(Self {
            stream,
            codec,
            timing,
            width,
            height,
            frames_written: 0,
        })
    }

    pub fn codec(&self) -> &CodecDescriptor {
        &self.codec
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Capture `surface` as the picture at `elapsed`. Returns how many frames
    /// were appended (at least one until the clip is full).
    pub async fn capture(&mut self, surface: &FrameBuffer, elapsed: Duration) -> ReelResult<u64> {
        self.check_surface(surface)?;
        let total = self.timing.total_frames();
        let target = self
            .timing
            .frames_due(elapsed)
            .max(self.frames_written + 1)
            .min(total);
        self.write_until(surface, target).await
    }

    /// Pad the tail with `last` up to the full frame count, close the stream
    /// and assemble the artifact.
    pub async fn stop(mut self, last: &FrameBuffer) -> ReelResult<EncodedReel> {
        self.check_surface(last)?;
        let total = self.timing.total_frames();
        let padded = self.write_until(last, total).await?;
        if padded > 0 {
            tracing::debug!("Padded {} trailing frames", padded);
        }

        let stream = self.stream.finish().await?;
        if stream.is_empty() {
            return Err(ReelError::encoding("encoder produced no output"));
        }

        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let filename = reel_filename(&self.codec, timestamp_ms);
        tracing::info!(
            "Capture finished: {} frames, {} chunks, {} bytes -> {}",
            self.frames_written,
            stream.chunk_count(),
            stream.len(),
            filename
        );

        Ok(EncodedReel {
            bytes: stream.into_bytes(),
            filename,
            codec: self.codec,
            frame_count: self.frames_written,
        })
    }

    async fn write_until(&mut self, surface: &FrameBuffer, target: u64) -> ReelResult<u64> {
        let mut written = 0;
        while self.frames_written < target {
            self.stream.write_frame(&surface.data).await?;
            self.frames_written += 1;
            written += 1;
        }
        Ok(written)
    }

    fn check_surface(&self, surface: &FrameBuffer) -> ReelResult<()> {
        if surface.width != self.width || surface.height != self.height {
            return Err(ReelError::encoding(format!(
                "surface is {}x{}, capture expects {}x{}",
                surface.width, surface.height, self.width, self.height
            )));
        }
        Ok(())
    }
}
