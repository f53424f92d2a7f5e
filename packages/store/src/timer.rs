//! Rest timer that survives page visibility changes.
//!
//! Only the absolute start time and the duration are persisted; the remaining time is
//! always derived from the wall clock. A hidden tab that stops receiving ticks, or a
//! full reload, resumes at the correct second.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RestTimer {
    pub exercise_id: String,
    pub exercise_name: String,
    /// Milliseconds since the Unix epoch.
    pub started_at: i64,
    pub duration_secs: u32,
}

impl RestTimer {
    pub fn start(exercise_id: &str, exercise_name: &str, duration_secs: u32, now: i64) -> Self {
        Self {
            exercise_id: exercise_id.to_string(),
            exercise_name: exercise_name.to_string(),
            started_at: now,
            duration_secs,
        }
    }

    pub fn ends_at(&self) -> i64 {
        self.started_at + i64::from(self.duration_secs) * 1000
    }

    /// Whole seconds left, rounded up so the display never shows 0 early.
    pub fn remaining_secs(&self, now: i64) -> u32 {
        let left_ms = (self.ends_at() - now).max(0);
        ((left_ms + 999) / 1000) as u32
    }

    pub fn is_finished(&self, now: i64) -> bool {
        now >= self.ends_at()
    }

    /// Elapsed fraction in `0.0..=1.0`.
    pub fn progress(&self, now: i64) -> f64 {
        if self.duration_secs == 0 {
            return 1.0;
        }
        let elapsed = (now - self.started_at).max(0) as f64;
        (elapsed / (f64::from(self.duration_secs) * 1000.0)).min(1.0)
    }

    /// Push the end time back by `secs`.
    pub fn extend(&mut self, secs: u32) {
        self.duration_secs = self.duration_secs.saturating_add(secs);
    }
}

/// `m:ss` display of a second count.
pub fn format_countdown(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_is_wall_clock_based() {
        let timer = RestTimer::start("ex", "Squat", 90, 1_000_000);
        assert_eq!(timer.remaining_secs(1_000_000), 90);
        // 40.2 s later, with no ticks in between
        assert_eq!(timer.remaining_secs(1_040_200), 50);
        assert!(!timer.is_finished(1_089_999));
        assert!(timer.is_finished(1_090_000));
        assert_eq!(timer.remaining_secs(2_000_000), 0);
    }

    #[test]
    fn test_progress_and_extend() {
        let mut timer = RestTimer::start("ex", "Squat", 60, 0);
        assert_eq!(timer.progress(30_000), 0.5);
        timer.extend(60);
        assert_eq!(timer.progress(30_000), 0.25);
        assert_eq!(timer.progress(500_000), 1.0);
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(90), "1:30");
        assert_eq!(format_countdown(5), "0:05");
    }
}
