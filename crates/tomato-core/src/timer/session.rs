use std::fmt;

use serde::{Deserialize, Serialize};

use crate::effects::AmbientSound;
use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    #[default]
    Idle,
    Working,
    Resting,
    Succeeded,
}

impl SessionMode {
    /// Working and Resting are the only modes with a countdown.
    pub fn is_counting(&self) -> bool {
        matches!(self, SessionMode::Working | SessionMode::Resting)
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionMode::Idle => "idle",
            SessionMode::Working => "working",
            SessionMode::Resting => "resting",
            SessionMode::Succeeded => "succeeded",
        };
        f.write_str(s)
    }
}

/// The two countdown phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Work,
    Rest,
}

impl PhaseKind {
    pub fn mode(&self) -> SessionMode {
        match self {
            PhaseKind::Work => SessionMode::Working,
            PhaseKind::Rest => SessionMode::Resting,
        }
    }
}

/// User-supplied session parameters, fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub work_duration_secs: u64,
    pub rest_duration_secs: u64,
    /// Go straight into a rest phase when work completes.
    pub auto_rest: bool,
    /// Go straight into the next work phase when rest completes.
    pub auto_resume: bool,
    pub play_ambient_on_start: bool,
    pub full_screen_on_start: bool,
    #[serde(default)]
    pub ambient_sound: AmbientSound,
}

impl SessionConfig {
    pub fn from_minutes(work_min: u64, rest_min: u64) -> Self {
        Self {
            work_duration_secs: work_min.saturating_mul(60),
            rest_duration_secs: rest_min.saturating_mul(60),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.work_duration_secs == 0 {
            return Err(SessionError::InvalidDuration {
                field: "work_duration_secs",
            });
        }
        if self.rest_duration_secs == 0 {
            return Err(SessionError::InvalidDuration {
                field: "rest_duration_secs",
            });
        }
        Ok(())
    }

    pub fn duration_secs(&self, kind: PhaseKind) -> u64 {
        match kind {
            PhaseKind::Work => self.work_duration_secs,
            PhaseKind::Rest => self.rest_duration_secs,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_duration_secs: 25 * 60,
            rest_duration_secs: 5 * 60,
            auto_rest: true,
            auto_resume: true,
            play_ambient_on_start: true,
            full_screen_on_start: true,
            ambient_sound: AmbientSound::default(),
        }
    }
}

/// Format seconds as zero-padded `MM:SS`.
///
/// Minutes are not capped, so 100 minutes renders as `100:00`.
pub fn format_remaining(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_mm_ss() {
        assert_eq!(format_remaining(1500), "25:00");
        assert_eq!(format_remaining(1439), "23:59");
        assert_eq!(format_remaining(59), "00:59");
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(6000), "100:00");
    }

    #[test]
    fn rejects_zero_durations() {
        let mut cfg = SessionConfig::from_minutes(0, 5);
        assert_eq!(
            cfg.validate(),
            Err(SessionError::InvalidDuration {
                field: "work_duration_secs"
            })
        );
        cfg.work_duration_secs = 60;
        cfg.rest_duration_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn defaults_match_classic_pomodoro() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.work_duration_secs, 1500);
        assert_eq!(cfg.rest_duration_secs, 300);
        assert!(cfg.validate().is_ok());
    }
}
