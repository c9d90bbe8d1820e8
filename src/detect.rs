//! Departure detection from status revision history.
//!
//! A member's departure date is the timestamp of the EARLIEST revision whose
//! status snapshot equals the departed sentinel. A later reactivation does
//! not reset detection, and a member with no departed revision is treated as
//! still active regardless of its current status label.

use chrono::{DateTime, Utc};

use crate::models::StatusRevision;

/// Terminal status value indicating a member has left ("ausgetreten").
pub const DEPARTED_STATUS: &str = "ausgetreten";

/// Whether a status label is the departed sentinel.
pub fn is_departed(status: &str) -> bool {
    status.eq_ignore_ascii_case(DEPARTED_STATUS)
}

/// Scan chronologically ordered status snapshots and return the timestamp of
/// the first one showing the departed status. First match wins; ties on
/// timestamp resolve to the snapshot appearing first in the slice.
pub fn departure_date(revisions: &[StatusRevision]) -> Option<DateTime<Utc>> {
    revisions
        .iter()
        .find(|r| is_departed(&r.status))
        .map(|r| r.at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot(y: i32, m: u32, d: u32, status: &str) -> StatusRevision {
        StatusRevision {
            at: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_no_departed_revision_means_active() {
        let revs = vec![snapshot(2022, 1, 1, "Anwärter"), snapshot(2022, 3, 1, "Mitglied")];
        assert_eq!(departure_date(&revs), None);
    }

    #[test]
    fn test_zero_revisions_means_active() {
        assert_eq!(departure_date(&[]), None);
    }

    #[test]
    fn test_single_departed_revision() {
        let revs = vec![
            snapshot(2022, 1, 1, "Mitglied"),
            snapshot(2023, 6, 15, "ausgetreten"),
        ];
        assert_eq!(departure_date(&revs), Some(revs[1].at));
    }

    #[test]
    fn test_earliest_departed_wins_over_toggling() {
        // departed -> active -> departed: the first departure stands
        let revs = vec![
            snapshot(2022, 2, 1, "ausgetreten"),
            snapshot(2022, 5, 1, "Mitglied"),
            snapshot(2022, 9, 1, "ausgetreten"),
        ];
        assert_eq!(departure_date(&revs), Some(revs[0].at));
    }

    #[test]
    fn test_same_timestamp_first_in_order_wins() {
        let at = Utc.with_ymd_and_hms(2022, 7, 1, 9, 0, 0).unwrap();
        let revs = vec![
            StatusRevision {
                at,
                status: "ausgetreten".to_string(),
            },
            StatusRevision {
                at,
                status: "Mitglied".to_string(),
            },
        ];
        assert_eq!(departure_date(&revs), Some(at));
    }

    #[test]
    fn test_sentinel_match_is_case_insensitive() {
        let revs = vec![snapshot(2022, 4, 1, "Ausgetreten")];
        assert_eq!(departure_date(&revs), Some(revs[0].at));
        assert!(is_departed("AUSGETRETEN"));
        assert!(!is_departed("ausgetreten?"));
    }
}
