use chrono::prelude::*;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::app_dirs::AppDirs;

/// Score/timer/game-over bookkeeping for one arcade play session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub score: u32,
    pub time_remaining: u32,
    pub started: bool,
    pub game_over: bool,
    session_secs: u32,
}

impl SessionState {
    pub fn new(session_secs: u32) -> Self {
        Self {
            score: 0,
            time_remaining: session_secs,
            started: false,
            game_over: false,
            session_secs,
        }
    }

    pub fn start(&mut self) {
        self.started = true;
    }

    /// Restore a fresh, not-yet-started session with the same duration.
    pub fn reset(&mut self) {
        *self = Self::new(self.session_secs);
    }

    pub fn add_score(&mut self, value: u32) {
        self.score += value;
    }

    /// One-second driver: decrement the clock, flipping to game over at
    /// zero. No-op unless the session is live.
    pub fn tick_second(&mut self) {
        if !self.started || self.game_over {
            return;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.game_over = true;
        }
    }

    pub fn is_live(&self) -> bool {
        self.started && !self.game_over
    }

    /// Append this session's result to the results log. Non-fatal:
    /// callers discard the error after it is logged.
    pub fn save_results(&self) -> io::Result<()> {
        if let Some(path) = AppDirs::results_path() {
            self.write_results_csv(&path)?;
        }
        Ok(())
    }

    fn write_results_csv(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // If the log doesn't exist yet, we need to emit a header
        let needs_header = !path.exists();

        let mut log_file = OpenOptions::new().append(true).create(true).open(path)?;

        if needs_header {
            writeln!(log_file, "date,duration_secs,score")?;
        }

        writeln!(
            log_file,
            "{},{},{}",
            Local::now().format("%c"),
            self.session_secs,
            self.score,
        )?;

        Ok(())
    }
}
