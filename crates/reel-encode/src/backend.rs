//! Capture backend seam: anything that can turn a stream of raw RGBA frames
//! into a compressed container.

use async_trait::async_trait;
use reel_core::{ReelError, ReelResult};

use crate::format::CodecDescriptor;

/// Parameters fixed for the lifetime of one capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    pub codec: CodecDescriptor,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Encoder quality override; backend default when None.
    pub crf: Option<u32>,
}

impl CaptureConfig {
    /// Byte length of one RGBA frame.
    pub fn frame_size(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Ordered, append-only sequence of compressed chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedStream {
    chunks: Vec<Vec<u8>>,
}

impl EncodedStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk. Empty chunks are ignored.
    pub fn push(&mut self, chunk: Vec<u8>) {
        if !chunk.is_empty() {
            self.chunks.push(chunk);
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total byte length across chunks.
    pub fn len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Concatenate every chunk, in order, into one blob.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for chunk in self.chunks {
            out.extend_from_slice(&chunk);
        }
        out
    }
}

/// A platform encoder.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Whether this backend can produce `codec`.
    fn supports(&self, codec: &CodecDescriptor) -> bool;

    /// Begin a capture. Frames written to the returned stream must be
    /// exactly `config.frame_size()` bytes.
    async fn start(&self, config: CaptureConfig) -> ReelResult<Box<dyn CaptureStream>>;
}

/// An in-progress capture.
#[async_trait]
pub trait CaptureStream: Send {
    async fn write_frame(&mut self, rgba: &[u8]) -> ReelResult<()>;

    /// End of input. Resolves once the encoder has flushed everything.
    async fn finish(self: Box<Self>) -> ReelResult<EncodedStream>;
}

/// Pick the first candidate the backend supports.
///
/// Candidates that do not parse are skipped with a warning. The choice is
/// made once; callers hold on to it for the whole capture.
pub fn negotiate<S: AsRef<str>>(
    candidates: &[S],
    backend: &dyn CaptureBackend,
) -> ReelResult<CodecDescriptor> {
    for candidate in candidates {
        let candidate = candidate.as_ref();
        let descriptor = match candidate.parse::<CodecDescriptor>() {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!("Skipping format candidate {:?}: {}", candidate, e);
                continue;
            }
        };
        if backend.supports(&descriptor) {
            tracing::info!("Negotiated {} via {}", descriptor, backend.name());
            return Ok(descriptor);
        }
        tracing::debug!("{} does not support {}", backend.name(), descriptor);
    }

    let tried: Vec<&str> = candidates.iter().map(AsRef::as_ref).collect();
    Err(ReelError::UnsupportedFormat(format!(
        "{} supports none of [{}]",
        backend.name(),
        tried.join(", ")
    )))
}
