//! Client-side minimum interval between accepted posts to one board.
//!
//! The limiter itself holds no state. The last accepted time lives in the
//! board's stored index, so the window survives restarts and is shared by
//! every poster using the same store.

use chrono::{DateTime, TimeDelta, Utc};

/// Minimum spacing between accepted submissions to the same board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    min_interval: TimeDelta,
}

impl RateWindow {
    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        let secs = i64::try_from(secs).unwrap_or(i64::MAX);
        Self {
            min_interval: TimeDelta::try_seconds(secs).unwrap_or(TimeDelta::MAX),
        }
    }

    #[must_use]
    pub const fn min_interval(&self) -> TimeDelta {
        self.min_interval
    }

    /// Time still to wait after an accepted post at `last`, or `None` if a
    /// new submission may go out at `now`.
    #[must_use]
    pub fn remaining(&self, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<TimeDelta> {
        let last = last?;
        let elapsed = now.signed_duration_since(last);
        // A clock that went backwards counts as "just posted".
        let elapsed = elapsed.max(TimeDelta::zero());
        (elapsed < self.min_interval).then(|| self.min_interval - elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn never_posted_is_open() {
        assert_eq!(RateWindow::from_secs(30).remaining(None, at(0)), None);
    }

    #[test]
    fn inside_window_reports_remaining() {
        let window = RateWindow::from_secs(30);
        assert_eq!(window.remaining(Some(at(0)), at(10)), Some(TimeDelta::seconds(20)));
        assert_eq!(window.remaining(Some(at(0)), at(30)), None);
        assert_eq!(window.remaining(Some(at(0)), at(31)), None);
    }

    #[test]
    fn backwards_clock_waits_the_full_window() {
        let window = RateWindow::from_secs(30);
        assert_eq!(window.remaining(Some(at(100)), at(0)), Some(TimeDelta::seconds(30)));
    }

    #[test]
    fn zero_window_never_limits() {
        assert_eq!(RateWindow::from_secs(0).remaining(Some(at(0)), at(0)), None);
    }
}
