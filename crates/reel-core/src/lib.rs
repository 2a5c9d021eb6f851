//! # reel-core
//!
//! Core types shared by every reelgen crate: the RGBA frame buffer used as the
//! render surface, colors, reel timing and frame state, the immutable
//! [`ReelSpec`], configuration and the error type.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod hash;
pub mod math;
pub mod spec;
pub mod time;

pub use config::*;

pub use color::Color;
pub use error::{ErrorKind, ReelError, ReelResult};
pub use frame::FrameBuffer;
pub use math::{Rect, Size2D};
pub use spec::{ReelSpec, REEL_HEIGHT, REEL_WIDTH};
pub use time::{FrameState, ReelTiming, DEFAULT_DURATION_MS, DEFAULT_FPS};
