use crate::results::TestResult;
use chrono::{Days, NaiveDate, Utc};
use itertools::Itertools;
use serde::Serialize;

/// Source of "today" for streak evaluation
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Current UTC calendar date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock pinned to one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// Distinct UTC calendar dates with at least one result, ascending
pub fn distinct_dates(results: &[TestResult]) -> Vec<NaiveDate> {
    results
        .iter()
        .map(|r| r.created_at.date_naive())
        .sorted()
        .dedup()
        .collect()
}

fn is_next_day(prev: NaiveDate, next: NaiveDate) -> bool {
    prev.checked_add_days(Days::new(1)) == Some(next)
}

/// Streaks over ascending, distinct practice dates
///
/// The current streak only counts when the latest date is `today`; a user
/// who practised every day up to yesterday has a current streak of zero.
pub fn compute_streaks(dates: &[NaiveDate], today: NaiveDate) -> Streaks {
    let Some(&last) = dates.last() else {
        return Streaks::default();
    };

    let mut longest = 1;
    let mut run = 1;
    for (prev, next) in dates.iter().tuple_windows() {
        if is_next_day(*prev, *next) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }

    let current = if last == today {
        let preceding = dates
            .iter()
            .rev()
            .tuple_windows()
            .take_while(|(later, earlier)| is_next_day(**earlier, **later))
            .count();
        1 + u32::try_from(preceding).unwrap_or(u32::MAX - 1)
    } else {
        0
    };

    Streaks { current, longest }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{CharCounts, FeatureFlags, UserId};
    use chrono::TimeZone;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    fn result_at(year: i32, month: u32, day: u32, hour: u32) -> TestResult {
        TestResult {
            user_id: UserId(1),
            wpm: 50,
            raw_wpm: 55,
            accuracy: 95,
            duration_seconds: 30,
            chars: CharCounts::default(),
            language: None,
            flags: FeatureFlags::default(),
            created_at: Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_no_dates() {
        assert_eq!(compute_streaks(&[], jan(5)), Streaks::default());
    }

    #[test]
    fn test_gap_before_today() {
        let streaks = compute_streaks(&[jan(1), jan(2), jan(3), jan(5)], jan(5));
        assert_eq!(streaks, Streaks { current: 1, longest: 3 });
    }

    #[test]
    fn test_unbroken_run_through_today() {
        let streaks = compute_streaks(&[jan(1), jan(2), jan(3)], jan(3));
        assert_eq!(streaks, Streaks { current: 3, longest: 3 });
    }

    #[test]
    fn test_stale_history_has_no_current_streak() {
        let streaks = compute_streaks(&[jan(1), jan(2)], jan(5));
        assert_eq!(streaks, Streaks { current: 0, longest: 2 });
    }

    #[test]
    fn test_yesterday_is_not_enough() {
        let streaks = compute_streaks(&[jan(2), jan(3), jan(4)], jan(5));
        assert_eq!(streaks, Streaks { current: 0, longest: 3 });
    }

    #[test]
    fn test_single_date() {
        assert_eq!(
            compute_streaks(&[jan(5)], jan(5)),
            Streaks { current: 1, longest: 1 }
        );
        assert_eq!(
            compute_streaks(&[jan(4)], jan(5)),
            Streaks { current: 0, longest: 1 }
        );
    }

    #[test]
    fn test_longest_run_earlier_than_current() {
        let dates = [jan(1), jan(2), jan(3), jan(4), jan(10), jan(11)];
        let streaks = compute_streaks(&dates, jan(11));
        assert_eq!(streaks, Streaks { current: 2, longest: 4 });
    }

    #[test]
    fn test_run_across_month_boundary() {
        let dates = [
            NaiveDate::from_ymd_opt(2025, 12, 30).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            jan(1),
        ];
        let streaks = compute_streaks(&dates, jan(1));
        assert_eq!(streaks, Streaks { current: 3, longest: 3 });
    }

    #[test]
    fn test_distinct_dates_collapses_same_day() {
        let results = vec![
            result_at(2026, 1, 3, 23),
            result_at(2026, 1, 1, 8),
            result_at(2026, 1, 3, 1),
            result_at(2026, 1, 1, 20),
        ];
        assert_eq!(distinct_dates(&results), vec![jan(1), jan(3)]);
    }

    #[test]
    fn test_distinct_dates_empty() {
        assert!(distinct_dates(&[]).is_empty());
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock::new(jan(9)).today(), jan(9));
    }
}
