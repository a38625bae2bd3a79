//! One-second countdown ticker.
//!
//! Like the rest of the timer module, the ticker has no thread of its own:
//! the owner reports elapsed time through [`CountdownTicker::advance`] and
//! receives the tick events that elapsed time produced.

use std::time::Duration;

const SECOND: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerEvent {
    /// One second elapsed; carries the seconds still remaining.
    Tick(u64),
    /// The countdown reached zero. Emitted exactly once per run.
    Completed,
}

/// The single in-flight countdown.
#[derive(Debug, Clone)]
struct TickerRun {
    remaining_secs: u64,
    /// Time accumulated towards the next tick.
    carry: Duration,
}

/// Countdown that emits one decrement per elapsed second.
///
/// At most one run exists at a time; [`begin`](Self::begin) releases any
/// prior run, including its partially elapsed second.
#[derive(Debug, Clone, Default)]
pub struct CountdownTicker {
    run: Option<TickerRun>,
}

impl CountdownTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting down from `duration_secs`.
    ///
    /// A zero duration completes immediately and returns
    /// `Some(TickerEvent::Completed)` without leaving a run behind.
    pub fn begin(&mut self, duration_secs: u64) -> Option<TickerEvent> {
        self.stop();
        if duration_secs == 0 {
            return Some(TickerEvent::Completed);
        }
        self.run = Some(TickerRun {
            remaining_secs: duration_secs,
            carry: Duration::ZERO,
        });
        None
    }

    /// Cancel any pending tick. No-op when idle.
    pub fn stop(&mut self) {
        self.run = None;
    }

    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    pub fn remaining_secs(&self) -> Option<u64> {
        self.run.as_ref().map(|r| r.remaining_secs)
    }

    /// Time until the next tick fires, if running.
    pub fn until_next_event(&self) -> Option<Duration> {
        self.run.as_ref().map(|r| SECOND.saturating_sub(r.carry))
    }

    /// Time until the run completes, if running.
    pub fn until_completion(&self) -> Option<Duration> {
        self.run.as_ref().map(|r| {
            Duration::from_secs(r.remaining_secs).saturating_sub(r.carry)
        })
    }

    /// Feed elapsed time into the current run.
    ///
    /// Time past the completion instant is discarded; owners that chain runs
    /// should split their advance at [`until_completion`](Self::until_completion).
    pub fn advance(&mut self, elapsed: Duration) -> Vec<TickerEvent> {
        let mut events = Vec::new();
        let Some(run) = self.run.as_mut() else {
            return events;
        };

        run.carry += elapsed;
        while run.carry >= SECOND && run.remaining_secs > 0 {
            run.carry -= SECOND;
            run.remaining_secs -= 1;
            events.push(TickerEvent::Tick(run.remaining_secs));
        }

        if run.remaining_secs == 0 {
            events.push(TickerEvent::Completed);
            self.run = None;
        }
        events
    }
}
