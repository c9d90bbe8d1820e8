//! Monthly active-member aggregation.
//!
//! Buckets span contiguously from the earliest join month to the current
//! month. A member counts as active in month M when their join date is on or
//! before the last day of M and their departure (if any) is after the last
//! day of M - a departure any time within M removes the member from M's
//! count.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};

use crate::models::Member;

/// A calendar month key (year + month), ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following calendar month.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Last day of this month (handles leap years via chrono).
    pub fn last_day(self) -> NaiveDate {
        let next = self.next();
        NaiveDate::from_ymd_opt(next.year, next.month, 1)
            .expect("month is always in 1..=12")
            .pred_opt()
            .expect("first of a month always has a predecessor")
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = anyhow::Error;

    /// Parse a `YYYY-MM` month label.
    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s
            .split_once('-')
            .with_context(|| format!("Invalid month label: {:?}", s))?;
        let year: i32 = year
            .parse()
            .with_context(|| format!("Invalid year in month label: {:?}", s))?;
        let month: u32 = month
            .parse()
            .with_context(|| format!("Invalid month in month label: {:?}", s))?;
        if !(1..=12).contains(&month) {
            bail!("Month out of range in label: {:?}", s);
        }
        Ok(Self { year, month })
    }
}

/// One month's active-member count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBucket {
    pub month: Month,
    pub active: u32,
}

/// Count active members for every month from the earliest join month to
/// `today`'s month inclusive, with no gaps. An empty roster yields an empty
/// series.
///
/// O(members x months); fine for a club-sized roster.
pub fn monthly_active(members: &[Member], today: NaiveDate) -> Vec<MonthBucket> {
    let Some(first_join) = members.iter().map(|m| m.join_date.date_naive()).min() else {
        return Vec::new();
    };

    let last = Month::from_date(today);
    let mut month = Month::from_date(first_join);
    let mut buckets = Vec::new();

    while month <= last {
        let month_end = month.last_day();
        let active = members
            .iter()
            .filter(|m| m.join_date.date_naive() <= month_end)
            .filter(|m| match m.leave_date {
                Some(leave) => leave.date_naive() > month_end,
                None => true,
            })
            .count() as u32;
        buckets.push(MonthBucket { month, active });
        month = month.next();
    }

    buckets
}

/// Headline numbers for the run log: current count, peak month, average.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub current: u32,
    pub peak: MonthBucket,
    pub average: f64,
}

pub fn summary(buckets: &[MonthBucket]) -> Option<Summary> {
    let last = buckets.last()?;
    let peak = *buckets
        .iter()
        .max_by_key(|b| b.active)?;
    let total: u64 = buckets.iter().map(|b| u64::from(b.active)).sum();
    Some(Summary {
        current: last.active,
        peak,
        average: total as f64 / buckets.len() as f64,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn member(id: i64, join: (i32, u32, u32), leave: Option<(i32, u32, u32)>) -> Member {
        Member {
            item_id: id,
            name: None,
            join_date: Utc
                .with_ymd_and_hms(join.0, join.1, join.2, 0, 0, 0)
                .unwrap(),
            status: None,
            leave_date: leave
                .map(|(y, m, d)| Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn count_at(buckets: &[MonthBucket], year: i32, month: u32) -> u32 {
        buckets
            .iter()
            .find(|b| b.month == Month { year, month })
            .map(|b| b.active)
            .unwrap_or_else(|| panic!("no bucket for {:04}-{:02}", year, month))
    }

    #[test]
    fn test_month_ordering_and_next() {
        let dec = Month {
            year: 2022,
            month: 12,
        };
        assert_eq!(dec.next(), Month { year: 2023, month: 1 });
        assert!(dec < dec.next());
    }

    #[test]
    fn test_month_last_day() {
        assert_eq!(
            Month { year: 2023, month: 6 }.last_day(),
            date(2023, 6, 30)
        );
        // Leap year February
        assert_eq!(
            Month { year: 2024, month: 2 }.last_day(),
            date(2024, 2, 29)
        );
        assert_eq!(
            Month { year: 2022, month: 12 }.last_day(),
            date(2022, 12, 31)
        );
    }

    #[test]
    fn test_month_label_round_trip() {
        let m = Month { year: 2023, month: 6 };
        assert_eq!(m.to_string(), "2023-06");
        assert_eq!("2023-06".parse::<Month>().unwrap(), m);
        assert!("2023-13".parse::<Month>().is_err());
        assert!("202306".parse::<Month>().is_err());
        assert!("2023-".parse::<Month>().is_err());
    }

    #[test]
    fn test_empty_roster_yields_empty_series() {
        let buckets = monthly_active(&[], date(2023, 6, 15));
        assert!(buckets.is_empty());
        assert_eq!(summary(&buckets), None);
    }

    #[test]
    fn test_range_is_contiguous_to_current_month() {
        let members = vec![member(1, (2022, 11, 5), None)];
        let buckets = monthly_active(&members, date(2023, 2, 10));
        let months: Vec<String> = buckets.iter().map(|b| b.month.to_string()).collect();
        assert_eq!(months, ["2022-11", "2022-12", "2023-01", "2023-02"]);
        assert!(buckets.iter().all(|b| b.active == 1));
    }

    #[test]
    fn test_departure_month_no_longer_counts_member() {
        // Joined January, departed June 15th: active through May,
        // inactive from June onward.
        let members = vec![member(1, (2023, 1, 10), Some((2023, 6, 15)))];
        let buckets = monthly_active(&members, date(2023, 8, 1));
        assert_eq!(count_at(&buckets, 2023, 1), 1);
        assert_eq!(count_at(&buckets, 2023, 5), 1);
        assert_eq!(count_at(&buckets, 2023, 6), 0);
        assert_eq!(count_at(&buckets, 2023, 7), 0);
    }

    #[test]
    fn test_departure_after_month_end_counts_member() {
        // Departure on the 1st of July leaves June intact.
        let members = vec![member(1, (2023, 1, 10), Some((2023, 7, 1)))];
        let buckets = monthly_active(&members, date(2023, 8, 1));
        assert_eq!(count_at(&buckets, 2023, 6), 1);
        assert_eq!(count_at(&buckets, 2023, 7), 0);
    }

    #[test]
    fn test_three_member_scenario() {
        // A joined 2022-01, never departed; B joined 2022-03, departed
        // 2022-09; C joined 2022-06, departed 2022-06-10 (before month end).
        let members = vec![
            member(1, (2022, 1, 15), None),
            member(2, (2022, 3, 1), Some((2022, 9, 20))),
            member(3, (2022, 6, 1), Some((2022, 6, 10))),
        ];
        let buckets = monthly_active(&members, date(2022, 10, 31));

        assert_eq!(count_at(&buckets, 2022, 1), 1); // A
        assert_eq!(count_at(&buckets, 2022, 3), 2); // A, B
        assert_eq!(count_at(&buckets, 2022, 6), 2); // C departed within June
        assert_eq!(count_at(&buckets, 2022, 8), 2); // A, B
        assert_eq!(count_at(&buckets, 2022, 9), 1); // B departed in September
        assert_eq!(count_at(&buckets, 2022, 10), 1); // A
    }

    #[test]
    fn test_summary_numbers() {
        let members = vec![
            member(1, (2022, 1, 1), None),
            member(2, (2022, 2, 1), Some((2022, 3, 10))),
        ];
        let buckets = monthly_active(&members, date(2022, 4, 1));
        // Counts: Jan 1, Feb 2, Mar 1, Apr 1
        let s = summary(&buckets).unwrap();
        assert_eq!(s.current, 1);
        assert_eq!(s.peak.month, Month { year: 2022, month: 2 });
        assert_eq!(s.peak.active, 2);
        assert!((s.average - 1.25).abs() < f64::EPSILON);
    }
}
