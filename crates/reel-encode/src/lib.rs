//! # reel-encode
//!
//! Encoding: parses and negotiates `(container, codec)` descriptors, streams
//! rendered frames into a capture backend at a constant frame rate and
//! assembles the compressed output into a named artifact.
//! The production backend shells out to FFmpeg.

pub mod backend;
pub mod ffmpeg;
pub mod format;
pub mod recorder;

pub use backend::{negotiate, CaptureBackend, CaptureConfig, CaptureStream, EncodedStream};
pub use ffmpeg::{FfmpegBackend, FfmpegCapabilities};
pub use format::{reel_filename, CodecDescriptor, Container, VideoCodec};
pub use recorder::{EncodedReel, Recorder};
