// ── Alarm window tracker ──
//
// Sliding lower bound for alarm queries. The first query reaches back over
// a long catch-up span; afterwards each query starts a short look-back
// before the end of the previous one, so alerts that arrive upstream late
// are still picked up. Overlap is harmless because the alarm set dedups.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Default catch-up span for the first query.
pub const DEFAULT_CATCH_UP: Duration = Duration::minutes(120);
/// Default overlap between consecutive queries.
pub const DEFAULT_LOOK_BACK: Duration = Duration::minutes(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WindowPhase {
    CatchUp,
    Steady,
}

/// Half-open query range `[from, till)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub from: DateTime<Utc>,
    pub till: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmWindow {
    phase: WindowPhase,
    lower: DateTime<Utc>,
    look_back: Duration,
}

impl AlarmWindow {
    /// Catch-up window with the default spans.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_spans(now, DEFAULT_CATCH_UP, DEFAULT_LOOK_BACK)
    }

    pub fn with_spans(now: DateTime<Utc>, catch_up: Duration, look_back: Duration) -> Self {
        Self {
            phase: WindowPhase::CatchUp,
            lower: now - catch_up,
            look_back,
        }
    }

    pub fn phase(&self) -> WindowPhase {
        self.phase
    }

    pub fn lower_bound(&self) -> DateTime<Utc> {
        self.lower
    }

    /// Range to query at `now`. A clock that went backwards yields an
    /// empty range rather than an inverted one.
    pub fn next_window(&self, now: DateTime<Utc>) -> Window {
        Window {
            from: self.lower.min(now),
            till: now,
        }
    }

    /// Record a completed query ending at `till`. The lower bound never
    /// moves backwards.
    pub fn advance(&self, till: DateTime<Utc>) -> AlarmWindow {
        Self {
            phase: WindowPhase::Steady,
            lower: self.lower.max(till - self.look_back),
            look_back: self.look_back,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(minutes: i64) -> DateTime<Utc> {
        DateTime::UNIX_EPOCH + Duration::minutes(minutes)
    }

    #[test]
    fn first_window_catches_up_two_hours() {
        let window = AlarmWindow::new(at(1_000));
        assert_eq!(window.phase(), WindowPhase::CatchUp);

        let range = window.next_window(at(1_000));
        assert_eq!(range.from, at(880));
        assert_eq!(range.till, at(1_000));
    }

    #[test]
    fn advance_moves_to_steady_with_look_back() {
        let window = AlarmWindow::new(at(1_000)).advance(at(1_000));
        assert_eq!(window.phase(), WindowPhase::Steady);
        assert_eq!(window.lower_bound(), at(995));

        let range = window.next_window(at(1_001));
        assert_eq!(range.from, at(995));
        assert_eq!(range.till, at(1_001));
    }

    #[test]
    fn lower_bound_never_decreases() {
        let mut window = AlarmWindow::new(at(1_000));
        let mut last = window.lower_bound();
        for till in [1_000, 1_010, 1_003, 1_020, 900] {
            window = window.advance(at(till));
            assert!(window.lower_bound() >= last);
            last = window.lower_bound();
        }
        assert_eq!(last, at(1_015));
    }

    #[test]
    fn backwards_clock_gives_empty_range() {
        let window = AlarmWindow::new(at(1_000)).advance(at(1_000));
        let range = window.next_window(at(990));
        assert!(range.from <= range.till);
    }
}
