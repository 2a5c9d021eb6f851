use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{ReelError, ReelResult};

/// Clip length used for every reel.
pub const DEFAULT_DURATION_MS: u64 = 8_000;
/// Target frame rate used for every reel.
pub const DEFAULT_FPS: u32 = 30;

/// Duration and frame rate of a reel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelTiming {
    /// Total clip length in milliseconds.
    pub duration_ms: u64,
    /// Target frames per second.
    pub fps: u32,
}

impl ReelTiming {
    /// Create a timing, rejecting zero duration or zero fps.
    pub fn new(duration_ms: u64, fps: u32) -> ReelResult<Self> {
        if duration_ms == 0 {
            return Err(ReelError::InvalidArgument("duration must be non-zero".into()));
        }
        if fps == 0 {
            return Err(ReelError::InvalidArgument("fps must be non-zero".into()));
        }
        Ok(Self { duration_ms, fps })
    }

    /// Clip length.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Target spacing between ticks (1000 / fps milliseconds).
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }

    /// Number of frames in the finished clip.
    pub fn total_frames(&self) -> u64 {
        (self.duration_ms * self.fps as u64).div_ceil(1000)
    }

    /// Frames a constant-rate stream must contain once `elapsed` has been reached:
    /// the frame starting at or before `elapsed`, counted from frame zero.
    pub fn frames_due(&self, elapsed: Duration) -> u64 {
        let due = (elapsed.as_micros() as u64).saturating_mul(self.fps as u64) / 1_000_000 + 1;
        due.min(self.total_frames())
    }

    /// Progress in [0, 1] for a given elapsed time.
    pub fn progress_at(&self, elapsed: Duration) -> f64 {
        (elapsed.as_secs_f64() * 1000.0 / self.duration_ms as f64).clamp(0.0, 1.0)
    }
}

impl Default for ReelTiming {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            fps: DEFAULT_FPS,
        }
    }
}

/// Animation state for one tick. Produced by the driver, consumed by the compositor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// Wall-clock time since the animation started.
    pub elapsed: Duration,
    /// `elapsed / duration`, clamped to [0, 1].
    pub progress: f64,
}

impl FrameState {
    pub fn at(elapsed: Duration, timing: &ReelTiming) -> Self {
        Self {
            elapsed,
            progress: timing.progress_at(elapsed),
        }
    }

    /// Elapsed time in (fractional) milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    /// Progress as a percentage in [0, 100].
    pub fn percent(&self) -> f64 {
        self.progress * 100.0
    }
}
