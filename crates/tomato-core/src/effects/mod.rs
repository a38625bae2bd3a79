//! Side effects triggered by session transitions.
//!
//! The controller only issues intents. [`SideEffectAdapter`] owns the audio
//! and display backends, applies the start/stop policy, and swallows every
//! backend failure so that a refused full-screen request or a missing audio
//! device never reaches the state machine.

mod ambient;

pub use ambient::AmbientSound;

use tracing::{debug, warn};

use crate::error::EffectError;
use crate::timer::SessionConfig;

/// Mode transitions reported to the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A work phase began. `user_initiated` is false for phases chained
    /// automatically after a rest.
    EnteredWorking { user_initiated: bool },
    EnteredResting,
    EnteredSucceeded,
    Canceled,
    /// A rest phase ended without auto-resume; the session is over.
    RestFinished,
}

/// Ambient audio backend.
pub trait AmbientPlayer {
    /// Start `sound` from its beginning, replacing anything playing.
    fn play(&mut self, sound: AmbientSound) -> Result<(), EffectError>;
    fn pause(&mut self) -> Result<(), EffectError>;
}

/// Full-screen presentation backend.
pub trait FullScreen {
    fn enter(&mut self) -> Result<(), EffectError>;
    fn exit(&mut self) -> Result<(), EffectError>;
    fn is_active(&self) -> bool;
}

/// Player for hosts without audio output.
#[derive(Debug, Default)]
pub struct NullPlayer;

impl AmbientPlayer for NullPlayer {
    fn play(&mut self, _sound: AmbientSound) -> Result<(), EffectError> {
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EffectError> {
        Ok(())
    }
}

/// Screen that only remembers whether it was asked to be full screen.
#[derive(Debug, Default)]
pub struct NullScreen {
    active: bool,
}

impl FullScreen for NullScreen {
    fn enter(&mut self) -> Result<(), EffectError> {
        self.active = true;
        Ok(())
    }

    fn exit(&mut self) -> Result<(), EffectError> {
        self.active = false;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

pub struct SideEffectAdapter {
    player: Box<dyn AmbientPlayer>,
    screen: Box<dyn FullScreen>,
    ambient_playing: bool,
}

impl SideEffectAdapter {
    pub fn new(player: Box<dyn AmbientPlayer>, screen: Box<dyn FullScreen>) -> Self {
        Self {
            player,
            screen,
            ambient_playing: false,
        }
    }

    /// Adapter with no-op backends.
    pub fn headless() -> Self {
        Self::new(Box::new(NullPlayer), Box::new(NullScreen::default()))
    }

    pub fn ambient_playing(&self) -> bool {
        self.ambient_playing
    }

    pub fn full_screen_active(&self) -> bool {
        self.screen.is_active()
    }

    pub fn notify(&mut self, transition: Transition, config: &SessionConfig) {
        debug!(?transition, "side effects notified");
        match transition {
            Transition::EnteredWorking {
                user_initiated: true,
            } => {
                if config.full_screen_on_start && !self.screen.is_active() {
                    if let Err(e) = self.screen.enter() {
                        warn!("full screen request failed: {e}");
                    }
                }
                if config.play_ambient_on_start {
                    self.start_ambient(config.ambient_sound);
                }
            }
            Transition::Canceled | Transition::RestFinished => {
                self.stop_ambient();
                if self.screen.is_active() {
                    if let Err(e) = self.screen.exit() {
                        warn!("leaving full screen failed: {e}");
                    }
                }
            }
            // Auto-chained phases never prompt without a user gesture.
            Transition::EnteredWorking {
                user_initiated: false,
            }
            | Transition::EnteredResting
            | Transition::EnteredSucceeded => {}
        }
    }

    /// Flip ambient playback. Ignored unless ambient sound is enabled in
    /// `config`. Returns whether ambient playback is now active.
    pub fn toggle_ambient(&mut self, config: &SessionConfig) -> bool {
        if !config.play_ambient_on_start {
            return self.ambient_playing;
        }
        if self.ambient_playing {
            self.stop_ambient();
        } else {
            self.start_ambient(config.ambient_sound);
        }
        self.ambient_playing
    }

    fn start_ambient(&mut self, sound: AmbientSound) {
        match self.player.play(sound) {
            Ok(()) => self.ambient_playing = true,
            Err(e) => {
                warn!(%sound, "ambient playback failed: {e}");
                self.ambient_playing = false;
            }
        }
    }

    fn stop_ambient(&mut self) {
        if !self.ambient_playing {
            return;
        }
        self.ambient_playing = false;
        if let Err(e) = self.player.pause() {
            warn!("pausing ambient playback failed: {e}");
        }
    }
}

impl Default for SideEffectAdapter {
    fn default() -> Self {
        Self::headless()
    }
}

impl std::fmt::Debug for SideEffectAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SideEffectAdapter")
            .field("ambient_playing", &self.ambient_playing)
            .field("full_screen", &self.screen.is_active())
            .finish_non_exhaustive()
    }
}
