//! Wall-clock paced animation loop.

use std::time::Duration;

use async_trait::async_trait;
use reel_core::{FrameState, ReelTiming};
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Source of time and tick pacing for the animation loop.
#[async_trait]
pub trait TickScheduler: Send {
    fn now(&self) -> Instant;

    /// Resolve when the next tick is due, `interval` after the previous one.
    async fn schedule_tick(&mut self, interval: Duration);
}

/// Tokio interval pacing. Late ticks push later ones back instead of
/// bursting, so the tick rate never exceeds the target.
#[derive(Debug, Default)]
pub struct IntervalScheduler {
    interval: Option<Interval>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TickScheduler for IntervalScheduler {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn schedule_tick(&mut self, interval: Duration) {
        if self.interval.as_ref().map(Interval::period) != Some(interval) {
            let mut fresh = tokio::time::interval_at(Instant::now() + interval, interval);
            fresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.interval = Some(fresh);
        }
        if let Some(ticker) = self.interval.as_mut() {
            ticker.tick().await;
        }
    }
}

/// One step of the animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// Render this state.
    Frame(FrameState),
    /// Elapsed time reached the duration. Emitted once, nothing follows.
    Complete(FrameState),
}

/// Advances progress from 0 to 1 over the clip duration.
///
/// Progress is derived from elapsed time, not from a frame count: slow
/// ticks mean fewer frames, never a longer clip.
pub struct AnimationDriver<S = IntervalScheduler> {
    scheduler: S,
    timing: ReelTiming,
    start: Option<Instant>,
    last_progress: f64,
    finished: bool,
    frames: u64,
}

impl AnimationDriver<IntervalScheduler> {
    pub fn with_interval(timing: ReelTiming) -> Self {
        Self::new(timing, IntervalScheduler::new())
    }
}

impl<S: TickScheduler> AnimationDriver<S> {
    pub fn new(timing: ReelTiming, scheduler: S) -> Self {
        Self {
            scheduler,
            timing,
            start: None,
            last_progress: 0.0,
            finished: false,
            frames: 0,
        }
    }

    /// Frames emitted so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Wait for and return the next step; `None` once complete.
    ///
    /// The first call starts the clock and returns immediately.
    pub async fn next_tick(&mut self) -> Option<Tick> {
        if self.finished {
            return None;
        }

        let start = match self.start {
            Some(start) => {
                self.scheduler
                    .schedule_tick(self.timing.frame_interval())
                    .await;
                start
            }
            None => {
                let now = self.scheduler.now();
                self.start = Some(now);
                now
            }
        };

        let elapsed = self.scheduler.now().saturating_duration_since(start);
        let mut state = FrameState::at(elapsed, &self.timing);
        state.progress = state.progress.max(self.last_progress);
        self.last_progress = state.progress;

        if elapsed >= self.timing.duration() {
            self.finished = true;
            return Some(Tick::Complete(state));
        }
        self.frames += 1;
        Some(Tick::Frame(state))
    }

    /// Drive the whole animation: `on_tick` for every frame, then
    /// `on_complete` exactly once.
    pub async fn run<F, C>(mut self, mut on_tick: F, on_complete: C)
    where
        F: FnMut(FrameState),
        C: FnOnce(FrameState),
    {
        while let Some(tick) = self.next_tick().await {
            match tick {
                Tick::Frame(state) => on_tick(state),
                Tick::Complete(state) => {
                    on_complete(state);
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Virtual clock advancing by a fixed step per tick, whatever was asked.
    struct SteppingScheduler {
        base: Instant,
        now: Duration,
        step: Duration,
        requested: Vec<Duration>,
    }

    impl SteppingScheduler {
        fn new(step: Duration) -> Self {
            Self {
                base: Instant::now(),
                now: Duration::ZERO,
                step,
                requested: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl TickScheduler for SteppingScheduler {
        fn now(&self) -> Instant {
            self.base + self.now
        }

        async fn schedule_tick(&mut self, interval: Duration) {
            self.requested.push(interval);
            self.now += self.step;
        }
    }

    #[tokio::test]
    async fn test_first_tick_is_immediate_at_zero() {
        let mut driver = AnimationDriver::new(
            ReelTiming::default(),
            SteppingScheduler::new(Duration::from_millis(100)),
        );
        match driver.next_tick().await {
            Some(Tick::Frame(state)) => {
                assert_eq!(state.progress, 0.0);
                assert_eq!(state.elapsed, Duration::ZERO);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(driver.scheduler.requested.is_empty());
    }

    #[tokio::test]
    async fn test_slow_ticks_still_finish_on_duration() {
        let timing = ReelTiming::default();
        let mut driver = AnimationDriver::new(timing, SteppingScheduler::new(Duration::from_millis(500)));
        let mut frames = 0;
        let mut completed = None;
        while let Some(tick) = driver.next_tick().await {
            match tick {
                Tick::Frame(_) => frames += 1,
                Tick::Complete(state) => completed = Some(state),
            }
        }
        // 0, 500, ..., 7500 ms render; 8000 ms completes.
        assert_eq!(frames, 16);
        let completed = completed.unwrap();
        assert_eq!(completed.elapsed, Duration::from_millis(8000));
        assert_eq!(completed.progress, 1.0);
        assert!(driver.next_tick().await.is_none());
    }

    #[tokio::test]
    async fn test_requests_frame_interval() {
        let timing = ReelTiming::new(100, 50).unwrap();
        let mut driver = AnimationDriver::new(timing, SteppingScheduler::new(Duration::from_millis(20)));
        while driver.next_tick().await.is_some() {}
        assert!(driver
            .scheduler
            .requested
            .iter()
            .all(|d| *d == timing.frame_interval()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_paces_to_target_rate() {
        let timing = ReelTiming::default();
        let started = Instant::now();
        let mut progress = Vec::new();
        let mut completions = Vec::new();

        AnimationDriver::with_interval(timing)
            .run(|state| progress.push(state.progress), |state| completions.push(state))
            .await;

        assert_eq!(completions.len(), 1);
        assert!(completions[0].elapsed >= Duration::from_millis(8000));
        assert!(started.elapsed() >= Duration::from_millis(8000));
        assert!(started.elapsed() < Duration::from_millis(8100));

        // Roughly 30 frames per second and never more.
        assert!(progress.len() >= 230 && progress.len() <= 241, "{} frames", progress.len());
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert!(progress.iter().all(|p| (0.0..1.0).contains(p)));
    }
}
