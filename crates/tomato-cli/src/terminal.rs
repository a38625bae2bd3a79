//! Terminal presentation: the full-screen backend and the status line.

use std::io::{self, IsTerminal, Write};

use chrono::Local;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use tomato_core::{format_remaining, EffectError, Event, FullScreen, SessionMode, SessionSnapshot};

const BAR_WIDTH: usize = 30;

/// Full screen for a terminal: the alternate screen buffer.
#[derive(Debug, Default)]
pub struct TerminalScreen {
    active: bool,
}

impl TerminalScreen {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FullScreen for TerminalScreen {
    fn enter(&mut self) -> Result<(), EffectError> {
        let mut stdout = io::stdout();
        if !stdout.is_terminal() {
            return Err(EffectError::FullScreenRefused(
                "stdout is not a terminal".into(),
            ));
        }
        execute!(stdout, EnterAlternateScreen, Clear(ClearType::All), MoveTo(0, 0), Hide)
            .map_err(|e| EffectError::FullScreenRefused(e.to_string()))?;
        self.active = true;
        Ok(())
    }

    fn exit(&mut self) -> Result<(), EffectError> {
        execute!(io::stdout(), Show, LeaveAlternateScreen)
            .map_err(|e| EffectError::FullScreenRefused(e.to_string()))?;
        self.active = false;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for TerminalScreen {
    fn drop(&mut self) {
        if self.active {
            let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        }
    }
}

/// Writes a single, self-overwriting status line.
#[derive(Debug, Default)]
pub struct StatusLine {
    last: String,
    show_ring: bool,
}

impl StatusLine {
    pub fn new(show_ring: bool) -> Self {
        Self {
            last: String::new(),
            show_ring,
        }
    }

    pub fn draw(&mut self, snapshot: &SessionSnapshot) -> io::Result<()> {
        let line = status_line(snapshot, self.show_ring);
        if line == self.last {
            return Ok(());
        }
        let mut stdout = io::stdout();
        write!(stdout, "\r{line:<width$}", width = self.last.chars().count().max(line.chars().count()))?;
        stdout.flush()?;
        self.last = line;
        Ok(())
    }

    /// Print a notice on its own line, then redraw the status below it.
    pub fn notice(&mut self, event: &Event) -> io::Result<()> {
        let Some(text) = describe(event) else {
            return Ok(());
        };
        let time = event.at().with_timezone(&Local).format("%H:%M:%S");
        let mut stdout = io::stdout();
        if !self.last.is_empty() {
            writeln!(stdout)?;
        }
        writeln!(stdout, "[{time}] {text}")?;
        self.last.clear();
        Ok(())
    }

    pub fn finish(&mut self) -> io::Result<()> {
        if !self.last.is_empty() {
            writeln!(io::stdout())?;
            self.last.clear();
        }
        Ok(())
    }
}

fn describe(event: &Event) -> Option<String> {
    match event {
        Event::PhaseStarted {
            phase,
            duration_secs,
            user_initiated,
            ..
        } => {
            let origin = if *user_initiated { "" } else { " (auto)" };
            Some(format!(
                "{phase:?} phase started{origin}: {}",
                format_remaining(*duration_secs)
            ))
        }
        Event::PhaseCompleted { phase, next, .. } => {
            Some(format!("{phase:?} phase completed, now {next}"))
        }
        Event::SessionCanceled { from, .. } => Some(format!("canceled while {from}")),
        Event::AmbientToggled { playing, .. } => Some(
            if *playing {
                "ambient sound on"
            } else {
                "ambient sound off"
            }
            .to_string(),
        ),
        Event::Tick { .. } => None,
    }
}

pub fn status_line(snapshot: &SessionSnapshot, show_ring: bool) -> String {
    let label = match snapshot.mode {
        SessionMode::Idle => "IDLE",
        SessionMode::Working => "WORKING",
        SessionMode::Resting => "RESTING",
        SessionMode::Succeeded => "DONE",
    };
    let clock = snapshot.remaining_display.as_deref().unwrap_or("--:--");
    let ambient = if snapshot.ambient_playing { " ♪" } else { "" };

    if !show_ring {
        return format!("{label:<8} {clock}{ambient}");
    }
    let filled = ((snapshot.progress * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!(
        "{label:<8} {clock} [{}{}] {:>3}%{ambient}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        (snapshot.progress * 100.0).floor() as u32,
    )
}
