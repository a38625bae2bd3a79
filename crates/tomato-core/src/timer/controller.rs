//! Session state machine.
//!
//! Like the countdown and animation drivers it owns, the controller has no
//! internal thread: the host reports elapsed time with [`advance`] (or
//! [`tick`] for exactly one second) and renders whatever the queries return.
//!
//! ## State Transitions
//!
//! ```text
//! Idle | Succeeded --start--> Working
//! Working --complete--> Resting (auto_rest) | Succeeded
//! Resting --complete--> Working (auto_resume, auto-started) | Idle
//! Working | Resting --cancel--> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = SessionController::headless(SessionConfig::default());
//! session.start()?;
//! // In a loop:
//! let events = session.advance(elapsed);
//! ```
//!
//! [`advance`]: SessionController::advance
//! [`tick`]: SessionController::tick

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::animator::{AnimatorEvent, ProgressAnimator};
use super::session::{format_remaining, PhaseKind, SessionConfig, SessionMode};
use super::ticker::{CountdownTicker, TickerEvent};
use crate::effects::{SideEffectAdapter, Transition};
use crate::error::SessionError;
use crate::events::Event;

/// Render-ready view of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub mode: SessionMode,
    pub remaining_secs: Option<u64>,
    /// `MM:SS`, present whenever `remaining_secs` is.
    pub remaining_display: Option<String>,
    pub progress: f64,
    pub ring_dash_offset: f64,
    pub ambient_playing: bool,
    pub at: DateTime<Utc>,
}

/// Owns the session mode, the countdown, the progress ring and the side
/// effect adapter, and keeps them in step.
#[derive(Debug)]
pub struct SessionController {
    config: SessionConfig,
    mode: SessionMode,
    ticker: CountdownTicker,
    animator: ProgressAnimator,
    effects: SideEffectAdapter,
    /// Whether the current work phase came from an explicit `start()`.
    user_initiated: bool,
}

impl SessionController {
    pub fn new(config: SessionConfig, effects: SideEffectAdapter) -> Self {
        Self {
            config,
            mode: SessionMode::Idle,
            ticker: CountdownTicker::new(),
            animator: ProgressAnimator::new(),
            effects,
            user_initiated: false,
        }
    }

    /// Controller whose side effects go nowhere.
    pub fn headless(config: SessionConfig) -> Self {
        Self::new(config, SideEffectAdapter::headless())
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Seconds left in the current phase; `None` outside Working/Resting.
    pub fn remaining_secs(&self) -> Option<u64> {
        if self.mode.is_counting() {
            self.ticker.remaining_secs()
        } else {
            None
        }
    }

    pub fn remaining_display(&self) -> Option<String> {
        self.remaining_secs().map(format_remaining)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        match self.mode {
            SessionMode::Idle => 0.0,
            _ => self.animator.progress(),
        }
    }

    pub fn ring_dash_offset(&self) -> f64 {
        match self.mode {
            SessionMode::Idle => super::animator::RING_DASH_ARRAY,
            _ => self.animator.dash_offset(),
        }
    }

    pub fn ambient_playing(&self) -> bool {
        self.effects.ambient_playing()
    }

    pub fn full_screen_active(&self) -> bool {
        self.effects.full_screen_active()
    }

    /// False while an auto-chained work phase (or any rest phase) runs.
    pub fn phase_user_initiated(&self) -> bool {
        self.user_initiated
    }

    /// True while the countdown or the progress animation holds a run.
    pub fn has_active_timers(&self) -> bool {
        self.ticker.is_active() || self.animator.is_running()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let remaining_secs = self.remaining_secs();
        SessionSnapshot {
            mode: self.mode,
            remaining_secs,
            remaining_display: remaining_secs.map(format_remaining),
            progress: self.progress(),
            ring_dash_offset: self.ring_dash_offset(),
            ambient_playing: self.ambient_playing(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the configuration used by the next `start()`.
    pub fn set_config(&mut self, config: SessionConfig) -> Result<(), SessionError> {
        if self.mode.is_counting() {
            return Err(SessionError::AlreadyRunning { mode: self.mode });
        }
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Begin a user-initiated work phase from Idle or Succeeded.
    pub fn start(&mut self) -> Result<Vec<Event>, SessionError> {
        if self.mode.is_counting() {
            return Err(SessionError::AlreadyRunning { mode: self.mode });
        }
        self.config.validate()?;
        let events = self.start_phase(PhaseKind::Work, true);
        self.check_invariants();
        Ok(events)
    }

    /// Abort the running phase and return to Idle.
    ///
    /// Returns `None` (and changes nothing) outside Working/Resting.
    pub fn cancel(&mut self) -> Option<Event> {
        if !self.mode.is_counting() {
            debug!(mode = %self.mode, "cancel ignored");
            return None;
        }
        let from = self.mode;
        self.ticker.stop();
        self.animator.reset();
        self.mode = SessionMode::Idle;
        self.user_initiated = false;
        self.effects.notify(Transition::Canceled, &self.config);
        info!(%from, "session canceled");
        self.check_invariants();
        Some(Event::SessionCanceled {
            from,
            at: Utc::now(),
        })
    }

    /// Flip ambient playback. Returns `None` when ambient sound is disabled
    /// in the configuration.
    pub fn toggle_ambient_playback(&mut self) -> Option<Event> {
        if !self.config.play_ambient_on_start {
            return None;
        }
        let playing = self.effects.toggle_ambient(&self.config);
        Some(Event::AmbientToggled {
            playing,
            at: Utc::now(),
        })
    }

    /// Advance by exactly one second.
    pub fn tick(&mut self) -> Vec<Event> {
        self.advance(Duration::from_secs(1))
    }

    /// Feed elapsed time into the running phase.
    ///
    /// Phase boundaries inside `elapsed` are handled at the instant they
    /// occur and the leftover time flows into the next phase.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        let mut left = elapsed;

        while let Some(until_done) = self.ticker.until_completion() {
            let step = left.min(until_done);
            left -= step;

            let ring_full = self
                .animator
                .advance(step)
                .contains(&AnimatorEvent::Finished);
            for tick in self.ticker.advance(step) {
                match tick {
                    TickerEvent::Tick(remaining_secs) => {
                        debug!(mode = %self.mode, remaining_secs, "tick");
                        events.push(Event::Tick {
                            mode: self.mode,
                            remaining_secs,
                            at: Utc::now(),
                        });
                    }
                    TickerEvent::Completed => {
                        debug_assert!(ring_full, "ring and countdown finish together");
                        events.extend(self.complete_phase());
                    }
                }
            }

            if left.is_zero() {
                break;
            }
        }

        self.check_invariants();
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn start_phase(&mut self, kind: PhaseKind, user_initiated: bool) -> Vec<Event> {
        self.ticker.stop();
        self.animator.stop();

        let duration_secs = self.config.duration_secs(kind);
        self.mode = kind.mode();
        self.user_initiated = kind == PhaseKind::Work && user_initiated;
        self.animator.animate(Duration::from_secs(duration_secs));
        let immediate = self.ticker.begin(duration_secs);
        debug_assert!(immediate.is_none(), "phase durations are validated");

        let transition = match kind {
            PhaseKind::Work => Transition::EnteredWorking {
                user_initiated: self.user_initiated,
            },
            PhaseKind::Rest => Transition::EnteredResting,
        };
        self.effects.notify(transition, &self.config);
        info!(phase = ?kind, duration_secs, user_initiated = self.user_initiated, "phase started");

        vec![Event::PhaseStarted {
            phase: kind,
            duration_secs,
            user_initiated: self.user_initiated,
            at: Utc::now(),
        }]
    }

    fn complete_phase(&mut self) -> Vec<Event> {
        let finished = match self.mode {
            SessionMode::Working => PhaseKind::Work,
            SessionMode::Resting => PhaseKind::Rest,
            SessionMode::Idle | SessionMode::Succeeded => return Vec::new(),
        };
        self.ticker.stop();
        self.animator.stop();

        let (next, chained) = match finished {
            PhaseKind::Work if self.config.auto_rest => (SessionMode::Resting, Some(PhaseKind::Rest)),
            PhaseKind::Work => (SessionMode::Succeeded, None),
            PhaseKind::Rest if self.config.auto_resume => (SessionMode::Working, Some(PhaseKind::Work)),
            PhaseKind::Rest => (SessionMode::Idle, None),
        };
        info!(phase = ?finished, %next, "phase completed");

        let mut events = vec![Event::PhaseCompleted {
            phase: finished,
            next,
            at: Utc::now(),
        }];
        match chained {
            Some(kind) => events.extend(self.start_phase(kind, false)),
            None => {
                self.mode = next;
                self.user_initiated = false;
                let transition = if next == SessionMode::Succeeded {
                    Transition::EnteredSucceeded
                } else {
                    self.animator.reset();
                    Transition::RestFinished
                };
                self.effects.notify(transition, &self.config);
            }
        }
        events
    }

    fn check_invariants(&self) {
        debug_assert_eq!(
            self.mode.is_counting(),
            self.ticker.is_active(),
            "a countdown runs iff the session is working or resting"
        );
        debug_assert!((0.0..=1.0).contains(&self.animator.progress()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(work: u64, rest: u64, auto_rest: bool, auto_resume: bool) -> SessionConfig {
        SessionConfig {
            work_duration_secs: work,
            rest_duration_secs: rest,
            auto_rest,
            auto_resume,
            ..SessionConfig::default()
        }
    }

    fn tick_n(session: &mut SessionController, n: u64) -> Vec<Event> {
        (0..n).flat_map(|_| session.tick()).collect()
    }

    #[test]
    fn start_enters_working() {
        let mut session = SessionController::headless(SessionConfig::default());
        assert_eq!(session.mode(), SessionMode::Idle);
        assert_eq!(session.remaining_secs(), None);

        let events = session.start().unwrap();
        assert!(matches!(
            events[0],
            Event::PhaseStarted {
                phase: PhaseKind::Work,
                duration_secs: 1500,
                user_initiated: true,
                ..
            }
        ));
        assert_eq!(session.mode(), SessionMode::Working);
        assert_eq!(session.remaining_secs(), Some(1500));
        assert_eq!(session.remaining_display().as_deref(), Some("25:00"));
        assert_eq!(session.progress(), 0.0);
    }

    #[test]
    fn display_after_61_ticks() {
        let mut session = SessionController::headless(SessionConfig::default());
        session.start().unwrap();
        tick_n(&mut session, 61);
        assert_eq!(session.remaining_secs(), Some(1439));
        assert_eq!(session.remaining_display().as_deref(), Some("23:59"));
    }

    #[test]
    fn work_without_auto_rest_succeeds() {
        let mut session = SessionController::headless(config(3, 2, false, false));
        session.start().unwrap();
        tick_n(&mut session, 3);

        assert_eq!(session.mode(), SessionMode::Succeeded);
        assert_eq!(session.remaining_secs(), None);
        assert!(!session.has_active_timers());
        assert_eq!(session.progress(), 1.0);

        // Succeeded is only left by an explicit start.
        assert!(tick_n(&mut session, 10).is_empty());
        assert_eq!(session.mode(), SessionMode::Succeeded);
    }

    #[test]
    fn start_from_succeeded() {
        let mut session = SessionController::headless(config(1, 1, false, false));
        session.start().unwrap();
        session.tick();
        assert_eq!(session.mode(), SessionMode::Succeeded);

        session.start().unwrap();
        assert_eq!(session.mode(), SessionMode::Working);
        assert_eq!(session.progress(), 0.0);
        assert!(session.phase_user_initiated());
    }

    #[test]
    fn auto_rest_then_idle() {
        let mut session = SessionController::headless(config(3, 2, true, false));
        session.start().unwrap();
        tick_n(&mut session, 3);
        assert_eq!(session.mode(), SessionMode::Resting);
        assert_eq!(session.remaining_secs(), Some(2));
        assert_eq!(session.progress(), 0.0);

        tick_n(&mut session, 2);
        assert_eq!(session.mode(), SessionMode::Idle);
        assert_eq!(session.remaining_secs(), None);
        assert!(!session.has_active_timers());
    }

    #[test]
    fn auto_resume_cycles_until_canceled() {
        let mut session = SessionController::headless(config(2, 1, true, true));
        session.start().unwrap();

        for _ in 0..5 {
            tick_n(&mut session, 2);
            assert_eq!(session.mode(), SessionMode::Resting);
            tick_n(&mut session, 1);
            assert_eq!(session.mode(), SessionMode::Working);
            assert!(!session.phase_user_initiated());
        }

        assert!(session.cancel().is_some());
        assert_eq!(session.mode(), SessionMode::Idle);
    }

    #[test]
    fn cancel_stops_everything() {
        let mut session = SessionController::headless(config(10, 5, true, true));
        session.start().unwrap();
        session.tick();

        let event = session.cancel().unwrap();
        assert!(matches!(
            event,
            Event::SessionCanceled {
                from: SessionMode::Working,
                ..
            }
        ));
        assert_eq!(session.mode(), SessionMode::Idle);
        assert_eq!(session.remaining_secs(), None);
        assert!(!session.has_active_timers());
        assert!(session.advance(Duration::from_secs(30)).is_empty());
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut session = SessionController::headless(config(10, 5, true, true));
        assert!(session.cancel().is_none());
        session.start().unwrap();
        assert!(session.cancel().is_some());
        assert!(session.cancel().is_none());
        assert_eq!(session.mode(), SessionMode::Idle);
    }

    #[test]
    fn cancel_while_succeeded_is_noop() {
        let mut session = SessionController::headless(config(1, 1, false, false));
        session.start().unwrap();
        session.tick();
        assert!(session.cancel().is_none());
        assert_eq!(session.mode(), SessionMode::Succeeded);
    }

    #[test]
    fn start_while_running_is_rejected() {
        let mut session = SessionController::headless(config(10, 5, true, true));
        session.start().unwrap();
        session.tick();
        assert_eq!(
            session.start().unwrap_err(),
            SessionError::AlreadyRunning {
                mode: SessionMode::Working
            }
        );
        assert_eq!(session.remaining_secs(), Some(9));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut session = SessionController::headless(config(0, 5, true, true));
        assert!(matches!(
            session.start(),
            Err(SessionError::InvalidDuration { .. })
        ));
        assert_eq!(session.mode(), SessionMode::Idle);
        assert!(!session.has_active_timers());
    }

    #[test]
    fn advance_carries_time_across_boundary() {
        let mut session = SessionController::headless(config(2, 10, true, false));
        session.start().unwrap();
        let events = session.advance(Duration::from_secs(5));

        assert_eq!(session.mode(), SessionMode::Resting);
        assert_eq!(session.remaining_secs(), Some(7));
        let completed = events
            .iter()
            .filter(|e| matches!(e, Event::PhaseCompleted { .. }))
            .count();
        assert_eq!(completed, 1);
    }

    #[test]
    fn progress_tracks_countdown() {
        let mut session = SessionController::headless(config(4, 4, false, false));
        session.start().unwrap();
        session.advance(Duration::from_secs(2));
        assert!((session.progress() - 0.5).abs() < 1e-9);
        session.advance(Duration::from_millis(500));
        assert!((session.progress() - 0.625).abs() < 1e-9);
    }

    #[test]
    fn set_config_rejected_while_running() {
        let mut session = SessionController::headless(config(10, 5, true, true));
        session.start().unwrap();
        assert!(session.set_config(config(20, 5, true, true)).is_err());
        assert_eq!(session.config().work_duration_secs, 10);
    }

    #[test]
    fn toggle_ambient_requires_feature() {
        let mut session = SessionController::headless(SessionConfig {
            play_ambient_on_start: false,
            ..SessionConfig::default()
        });
        assert!(session.toggle_ambient_playback().is_none());
        assert!(!session.ambient_playing());
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut session = SessionController::headless(config(90, 5, true, true));
        let idle = session.snapshot();
        assert_eq!(idle.mode, SessionMode::Idle);
        assert_eq!(idle.remaining_display, None);

        session.start().unwrap();
        let snap = session.snapshot();
        assert_eq!(snap.remaining_display.as_deref(), Some("01:30"));
        assert!(snap.ambient_playing);
        assert_eq!(snap.ring_dash_offset, super::super::animator::RING_DASH_ARRAY);
    }

    #[test]
    fn ring_fills_on_the_completing_step() {
        let mut session = SessionController::headless(config(2, 5, false, false));
        session.start().unwrap();
        session.advance(Duration::from_millis(1999));
        assert_eq!(session.mode(), SessionMode::Working);
        assert!(session.progress() < 1.0);

        session.advance(Duration::from_millis(1));
        assert_eq!(session.mode(), SessionMode::Succeeded);
        assert_eq!(session.progress(), 1.0);
        assert_eq!(session.ring_dash_offset(), 0.0);
        assert!(!session.has_active_timers());
    }
}
