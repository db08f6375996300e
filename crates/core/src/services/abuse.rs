//! Rapid-copy detection.
//!
//! A pure decision function over a time-ordered window of a user's recent
//! copy events. The repository query applies both input bounds (the
//! [`RECENT_WINDOW_SECS`] cutoff and the [`MAX_RECENT_COPIES`] limit); the
//! detector itself is free of I/O and trusts its input, so it can be
//! unit-tested without a store.

use chrono::{DateTime, Utc};

/// Only copies within this many seconds of "now" feed the detector.
pub const RECENT_WINDOW_SECS: i64 = 2 * 60;

/// At most this many recent copies are considered.
pub const MAX_RECENT_COPIES: u64 = 5;

/// Fewer qualifying events than this never triggers.
pub const MIN_RAPID_EVENTS: usize = 3;

/// A window of 3 events qualifies only if its full span fits in this bound.
pub const SEQUENCE_SPAN_SECS: i64 = 60;

/// ...and at least one adjacent pair is within this bound.
pub const ADJACENT_GAP_SECS: i64 = 20;

/// How long a detected offender is locked out.
pub const SUSPENSION_MINUTES: i64 = 30;

/// Decide whether a sequence of copy timestamps matches the rapid-copying
/// pattern.
///
/// `timestamps` must be ordered newest first. A sliding window of 3
/// consecutive events (t1 newest, t3 oldest) qualifies as a rapid sequence
/// if `t1 - t3 <= 60s` and at least one adjacent pair is within 20s; the
/// input is abusive iff at least one window qualifies.
#[must_use]
pub fn is_rapid_copying(timestamps: &[DateTime<Utc>]) -> bool {
    if timestamps.len() < MIN_RAPID_EVENTS {
        return false;
    }

    timestamps.windows(MIN_RAPID_EVENTS).any(|w| {
        let span_ms = (w[0] - w[2]).num_milliseconds();
        let gap_newer_ms = (w[0] - w[1]).num_milliseconds();
        let gap_older_ms = (w[1] - w[2]).num_milliseconds();

        span_ms <= SEQUENCE_SPAN_SECS * 1000
            && (gap_newer_ms <= ADJACENT_GAP_SECS * 1000
                || gap_older_ms <= ADJACENT_GAP_SECS * 1000)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    /// Timestamps `secs_ago` seconds in the past, newest first.
    fn events(secs_ago: &[i64]) -> Vec<DateTime<Utc>> {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        secs_ago
            .iter()
            .map(|s| base - Duration::seconds(*s))
            .collect()
    }

    #[test]
    fn fires_on_tight_span_with_close_pair() {
        // span 35s, newest gap 15s
        assert!(is_rapid_copying(&events(&[0, 15, 35])));
    }

    #[test]
    fn fires_when_only_older_pair_is_close() {
        // span 60s, gaps 40s and 20s
        assert!(is_rapid_copying(&events(&[0, 40, 60])));
    }

    #[test]
    fn does_not_fire_when_span_exceeds_limit() {
        // span 90s
        assert!(!is_rapid_copying(&events(&[0, 40, 90])));
    }

    #[test]
    fn does_not_fire_when_both_gaps_exceed_limit() {
        // span 50s but gaps 25s each
        assert!(!is_rapid_copying(&events(&[0, 25, 50])));
    }

    #[test]
    fn boundary_span_and_gap_are_inclusive() {
        // span exactly 60s, older gap exactly 20s
        assert!(is_rapid_copying(&events(&[0, 40, 60])));
        // span exactly 60s, both gaps over 20s
        assert!(!is_rapid_copying(&events(&[0, 29, 60])));
    }

    #[test]
    fn fewer_than_three_events_never_trigger() {
        assert!(!is_rapid_copying(&events(&[])));
        assert!(!is_rapid_copying(&events(&[0])));
        assert!(!is_rapid_copying(&events(&[0, 1])));
    }

    #[test]
    fn five_events_evaluate_overlapping_windows() {
        // Windows: (0,50,70) span 70 no; (50,70,110) span 60, gap 20 -> yes
        assert!(is_rapid_copying(&events(&[0, 50, 70, 110, 119])));
        // All spaced 50s apart: every window spans 100s
        assert!(!is_rapid_copying(&events(&[0, 50, 100, 150, 200])));
    }

    #[test]
    fn deterministic_for_identical_input() {
        let ts = events(&[0, 10, 30, 80, 110]);
        let first = is_rapid_copying(&ts);
        for _ in 0..10 {
            assert_eq!(is_rapid_copying(&ts), first);
        }
    }
}
