//! # reel-session
//!
//! Orchestration for reel generation: the wall-clock animation driver, the
//! caption and image sources, and the [`GenerationSession`] state machine
//! that ties rendering and encoding into one artifact or one typed failure.

pub mod captions;
pub mod driver;
pub mod session;
pub mod source;

pub use captions::{CaptionDeck, CaptionSource, FixedCaptions};
pub use driver::{AnimationDriver, IntervalScheduler, Tick, TickScheduler};
pub use session::{
    FailureReason, GenerationSession, ReelRequest, RenderTarget, SessionOptions, SessionState,
    SessionStatus, SurfaceLease,
};
pub use source::{FileImage, ImageAsset, ImageData, ImageSource, MemoryImage};
