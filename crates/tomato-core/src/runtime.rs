//! Async host loop for a [`SessionController`].
//!
//! The runner owns the controller inside a single task, so commands and
//! frame updates are applied one at a time and never interleave.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::effects::SideEffectAdapter;
use crate::error::Result;
use crate::events::Event;
use crate::storage::Config;
use crate::timer::{SessionController, SessionMode, SessionSnapshot};

/// Requests a host can send to a running [`SessionRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerCommand {
    Start,
    Cancel,
    ToggleAmbient,
    Shutdown,
}

pub struct SessionRunner {
    controller: SessionController,
    frame_interval: Duration,
    events: Option<mpsc::UnboundedSender<Event>>,
    exit_when_idle: bool,
}

impl SessionRunner {
    pub fn new(controller: SessionController, frame_interval: Duration) -> Self {
        Self {
            controller,
            frame_interval: frame_interval.max(Duration::from_millis(1)),
            events: None,
            exit_when_idle: false,
        }
    }

    /// Runner for the configured session, refreshing at the configured
    /// frame rate. Fails on a zero phase duration or an unusable frame rate.
    pub fn from_config(config: &Config, effects: SideEffectAdapter) -> Result<Self> {
        config.validate()?;
        let session = config.session_config();
        session.validate()?;
        let controller = SessionController::new(session, effects);
        Ok(Self::new(controller, config.frame_interval()))
    }

    /// Forward every controller event to `tx`.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<Event>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Return from [`run`](Self::run) once a started session is back to Idle.
    pub fn exit_when_idle(mut self, enabled: bool) -> Self {
        self.exit_when_idle = enabled;
        self
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Drive the controller until shutdown, publishing a snapshot after every
    /// frame and command. Returns the controller, canceled if it was still
    /// counting down.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<RunnerCommand>,
        snapshots: watch::Sender<SessionSnapshot>,
    ) -> SessionController {
        let mut frames = tokio::time::interval(self.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();
        let mut started = self.controller.mode() != SessionMode::Idle;
        snapshots.send_replace(self.controller.snapshot());
        info!(frame_ms = self.frame_interval.as_millis() as u64, "session runner started");

        loop {
            tokio::select! {
                biased;
                command = commands.recv() => {
                    last = self.flush(last);
                    match command {
                        None | Some(RunnerCommand::Shutdown) => break,
                        Some(command) => self.apply(command),
                    }
                }
                _ = frames.tick() => {
                    last = self.flush(last);
                }
            }

            snapshots.send_replace(self.controller.snapshot());
            if self.controller.mode() != SessionMode::Idle {
                started = true;
            } else if started && self.exit_when_idle {
                debug!("session returned to idle");
                break;
            }
        }

        if let Some(event) = self.controller.cancel() {
            self.emit(event);
        }
        snapshots.send_replace(self.controller.snapshot());
        info!("session runner stopped");
        self.controller
    }

    fn flush(&mut self, last: Instant) -> Instant {
        let now = Instant::now();
        let events = self.controller.advance(now.duration_since(last));
        events.into_iter().for_each(|e| self.emit(e));
        now
    }

    fn apply(&mut self, command: RunnerCommand) {
        debug!(?command, "runner command");
        match command {
            RunnerCommand::Start => match self.controller.start() {
                Ok(events) => events.into_iter().for_each(|e| self.emit(e)),
                Err(e) => warn!("start rejected: {e}"),
            },
            RunnerCommand::Cancel => {
                if let Some(event) = self.controller.cancel() {
                    self.emit(event);
                }
            }
            RunnerCommand::ToggleAmbient => {
                if let Some(event) = self.controller.toggle_ambient_playback() {
                    self.emit(event);
                }
            }
            RunnerCommand::Shutdown => {}
        }
    }

    fn emit(&self, event: Event) {
        if let Some(tx) = &self.events {
            // A host that stopped listening is not an error for the session.
            let _ = tx.send(event);
        }
    }
}
