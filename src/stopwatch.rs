use std::time::{Duration, Instant};

/// Pausable elapsed-time accumulator behind the overlay's `hh:mm:ss` readout.
/// Time is passed in explicitly, same as the chord display, so the arithmetic
/// is testable without sleeping.
#[derive(Debug, Default)]
pub struct Stopwatch {
    accumulated: Duration,
    started_at: Option<Instant>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    pub fn pause(&mut self, now: Instant) {
        if let Some(started) = self.started_at.take() {
            self.accumulated += now.saturating_duration_since(started);
        }
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.is_running() {
            self.pause(now);
        } else {
            self.start(now);
        }
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.started_at = None;
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(started) => self.accumulated + now.saturating_duration_since(started),
            None => self.accumulated,
        }
    }
}

/// Format a duration as `hh:mm:ss`, hours widening past two digits if the
/// overlay runs that long.
pub fn format_hms(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
