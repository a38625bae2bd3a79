use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{PhaseKind, SessionMode};

/// Every observable state change of a session produces an Event.
/// Hosts render them or forward them as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PhaseStarted {
        phase: PhaseKind,
        duration_secs: u64,
        /// False for work phases chained automatically after a rest.
        user_initiated: bool,
        at: DateTime<Utc>,
    },
    Tick {
        mode: SessionMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    PhaseCompleted {
        phase: PhaseKind,
        /// Mode the session moved into.
        next: SessionMode,
        at: DateTime<Utc>,
    },
    SessionCanceled {
        from: SessionMode,
        at: DateTime<Utc>,
    },
    AmbientToggled {
        playing: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::PhaseStarted { at, .. }
            | Event::Tick { at, .. }
            | Event::PhaseCompleted { at, .. }
            | Event::SessionCanceled { at, .. }
            | Event::AmbientToggled { at, .. } => *at,
        }
    }
}
