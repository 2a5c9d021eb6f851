//! Generation session: one request, one surface, one artifact or one failure.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reel_core::{
    EncoderConfig, ErrorKind, FrameBuffer, ReelError, ReelResult, ReelSpec, ReelTiming,
    REEL_HEIGHT, REEL_WIDTH,
};
use reel_encode::{negotiate, CaptureBackend, EncodedReel, Recorder};
use reel_render::FrameCompositor;
use serde::Serialize;
use tokio::sync::watch;

use crate::captions::CaptionSource;
use crate::driver::{AnimationDriver, IntervalScheduler, Tick, TickScheduler};
use crate::source::ImageSource;

/// Log a per-tick line every this many frames.
const TICK_LOG_EVERY: u64 = 30;

/// Why a session failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReason {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ReelError> for FailureReason {
    fn from(err: &ReelError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Lifecycle of a generation session. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    LoadingImage,
    Recording,
    Finalizing,
    Completed,
    Failed(FailureReason),
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Failed(_))
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => f.write_str("idle"),
            SessionState::LoadingImage => f.write_str("loading image"),
            SessionState::Recording => f.write_str("recording"),
            SessionState::Finalizing => f.write_str("finalizing"),
            SessionState::Completed => f.write_str("completed"),
            SessionState::Failed(reason) => write!(f, "failed ({})", reason.kind),
        }
    }
}

/// Snapshot published to observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,
    /// Percent in [0, 100]; 100 only once completed.
    pub progress: f64,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            progress: 0.0,
        }
    }
}

/// The drawing surface slot sessions render into.
///
/// Only one session may hold it at a time.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    width: u32,
    height: u32,
    busy: Arc<AtomicBool>,
}

impl RenderTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The 1080x1920 reel surface.
    pub fn reel() -> Self {
        Self::new(REEL_WIDTH, REEL_HEIGHT)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Take exclusive use of the surface.
    pub fn acquire(&self) -> ReelResult<SurfaceLease> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::SurfaceUnavailable(format!(
                "surface has no pixels ({}x{})",
                self.width, self.height
            )));
        }
        // yuv420p needs even dimensions.
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(ReelError::SurfaceUnavailable(format!(
                "surface dimensions must be even ({}x{})",
                self.width, self.height
            )));
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ReelError::SurfaceBusy);
        }
        Ok(SurfaceLease {
            busy: Arc::clone(&self.busy),
            surface: FrameBuffer::new(self.width, self.height),
        })
    }
}

/// Exclusive hold on a [`RenderTarget`] plus its pixel buffer. Released on drop.
#[derive(Debug)]
pub struct SurfaceLease {
    busy: Arc<AtomicBool>,
    surface: FrameBuffer,
}

impl SurfaceLease {
    pub fn surface(&self) -> &FrameBuffer {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut FrameBuffer {
        &mut self.surface
    }
}

impl Drop for SurfaceLease {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Everything a session needs to produce one reel.
pub struct ReelRequest {
    pub image: Arc<dyn ImageSource>,
    pub quote: String,
    pub cta: String,
}

impl ReelRequest {
    pub fn new(image: Arc<dyn ImageSource>, quote: impl Into<String>, cta: impl Into<String>) -> Self {
        Self {
            image,
            quote: quote.into(),
            cta: cta.into(),
        }
    }

    /// Draw the captions from `captions`.
    pub fn with_captions(image: Arc<dyn ImageSource>, captions: &mut dyn CaptionSource) -> Self {
        let quote = captions.next_quote();
        let cta = captions.next_cta();
        Self::new(image, quote, cta)
    }
}

/// Encoder settings for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// Codec preference list, most preferred first.
    pub formats: Vec<String>,
    pub crf: Option<u32>,
    pub timing: ReelTiming,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&EncoderConfig::default())
    }
}

impl From<&EncoderConfig> for SessionOptions {
    fn from(config: &EncoderConfig) -> Self {
        Self {
            formats: config.formats.clone(),
            crf: config.crf,
            timing: ReelTiming::default(),
        }
    }
}

/// Drives one reel from request to artifact.
///
/// The surface lease is taken when generation starts and held until it ends;
/// running consumes the session, so a finished or failed session cannot be
/// reused.
pub struct GenerationSession {
    target: RenderTarget,
    compositor: FrameCompositor,
    backend: Arc<dyn CaptureBackend>,
    options: SessionOptions,
    status: watch::Sender<SessionStatus>,
}

impl GenerationSession {
    pub fn new(
        target: &RenderTarget,
        compositor: FrameCompositor,
        backend: Arc<dyn CaptureBackend>,
        options: SessionOptions,
    ) -> Self {
        let (status, _) = watch::channel(SessionStatus::default());
        Self {
            target: target.clone(),
            compositor,
            backend,
            options,
            status,
        }
    }

    /// Watch state and progress changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    /// Generate with real-time pacing.
    pub async fn generate(self, request: ReelRequest) -> ReelResult<EncodedReel> {
        self.generate_with(request, IntervalScheduler::new()).await
    }

    /// Generate, pacing ticks with `scheduler`.
    pub async fn generate_with<S: TickScheduler>(
        self,
        request: ReelRequest,
        scheduler: S,
    ) -> ReelResult<EncodedReel> {
        match self.run(request, scheduler).await {
            Ok(reel) => Ok(reel),
            Err(err) => {
                tracing::warn!("Reel generation failed: {}", err);
                self.status.send_replace(SessionStatus {
                    state: SessionState::Failed(FailureReason::from(&err)),
                    progress: 0.0,
                });
                Err(err)
            }
        }
    }

    async fn run<S: TickScheduler>(
        &self,
        request: ReelRequest,
        scheduler: S,
    ) -> ReelResult<EncodedReel> {
        let mut lease = self.target.acquire()?;

        self.transition(SessionState::LoadingImage, 0.0);
        let asset = request.image.fetch().await?;
        tracing::debug!("Fetched image {:?}", asset.alt_text);
        let image = asset.decode().await?;

        let (width, height) = (lease.surface().width, lease.surface().height);
        let spec = ReelSpec::with_format(
            image,
            request.quote,
            request.cta,
            width,
            height,
            self.options.timing,
        )?;
        let timing = spec.timing();

        let codec = negotiate(&self.options.formats, self.backend.as_ref())?;
        let mut recorder = Recorder::start(
            self.backend.as_ref(),
            codec,
            width,
            height,
            timing,
            self.options.crf,
        )
        .await?;

        self.transition(SessionState::Recording, 0.0);
        let mut driver = AnimationDriver::new(timing, scheduler);
        let mut progress = 0.0;
        while let Some(tick) = driver.next_tick().await {
            let state = match tick {
                Tick::Frame(state) => state,
                Tick::Complete(_) => break,
            };
            self.compositor.render(
                lease.surface_mut(),
                spec.image(),
                spec.quote(),
                spec.cta(),
                state.progress,
            );
            recorder.capture(lease.surface(), state.elapsed).await?;

            progress = state.percent().min(100.0);
            self.status.send_modify(|status| status.progress = progress);
            if driver.frames() % TICK_LOG_EVERY == 1 {
                tracing::debug!(
                    "Frame {} at {:.0} ms ({:.1}%)",
                    driver.frames(),
                    state.elapsed_ms(),
                    progress
                );
            }
        }

        self.transition(SessionState::Finalizing, progress);
        let reel = recorder.stop(lease.surface()).await?;

        self.transition(SessionState::Completed, 100.0);
        tracing::info!(
            "Reel ready: {} ({} bytes, {} frames)",
            reel.filename,
            reel.bytes.len(),
            reel.frame_count
        );
        Ok(reel)
    }

    fn transition(&self, state: SessionState, progress: f64) {
        tracing::info!("Session {}", state);
        self.status.send_replace(SessionStatus { state, progress });
    }
}
