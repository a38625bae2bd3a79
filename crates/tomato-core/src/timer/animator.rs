//! Linear progress animation for the countdown ring.

use std::time::Duration;

/// Dash array length of the progress ring (`r = 115`).
pub const RING_DASH_ARRAY: f64 = 722.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimatorEvent {
    /// A frame was rendered with the given progress.
    Frame(f64),
    /// Progress reached 1. Emitted once per run, never after `stop()`.
    Finished,
}

#[derive(Debug, Clone)]
struct AnimationRun {
    total: Duration,
    elapsed: Duration,
}

/// Drives a single progress value from 0 to 1 over a fixed duration.
///
/// Each call to [`advance`](Self::advance) while running is one animation
/// frame.
#[derive(Debug, Clone, Default)]
pub struct ProgressAnimator {
    run: Option<AnimationRun>,
    progress: f64,
}

impl ProgressAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run, resetting progress to 0 first.
    pub fn animate(&mut self, total: Duration) {
        self.stop();
        self.progress = 0.0;
        self.run = Some(AnimationRun {
            total,
            elapsed: Duration::ZERO,
        });
    }

    /// Halt updates, keeping the last value. No-op when idle.
    pub fn stop(&mut self) {
        self.run = None;
    }

    /// Clear the visible value without starting a run.
    pub fn reset(&mut self) {
        self.stop();
        self.progress = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Ring offset for the current progress: the full dash array at 0,
    /// zero at 1.
    pub fn dash_offset(&self) -> f64 {
        RING_DASH_ARRAY * (1.0 - self.progress)
    }

    pub fn advance(&mut self, elapsed: Duration) -> Vec<AnimatorEvent> {
        let Some(run) = self.run.as_mut() else {
            return Vec::new();
        };

        run.elapsed = run.elapsed.saturating_add(elapsed);
        self.progress = linear(run.elapsed, run.total);

        if self.progress >= 1.0 {
            self.progress = 1.0;
            self.run = None;
            vec![AnimatorEvent::Frame(1.0), AnimatorEvent::Finished]
        } else {
            vec![AnimatorEvent::Frame(self.progress)]
        }
    }
}

/// `clamp(t / total, 0, 1)`; a zero total is already finished.
fn linear(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}
