use crate::error::StoreResult;
use crate::results::{TestResult, UserId};
use crate::store::ResultStore;
use crate::streak::{compute_streaks, distinct_dates, Clock, SystemClock};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Personal statistics derived from a user's full result history
///
/// Recomputed from scratch on every request; every field is zero for a
/// user without results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub avg_wpm: u32,
    pub avg_accuracy: u32,
    pub fastest_wpm: u32,
    pub fastest_raw_wpm: u32,
    pub best_accuracy: u32,
    pub total_tests: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub correct_chars: u64,
    pub incorrect_chars: u64,
    pub extra_chars: u64,
    pub missed_chars: u64,
}

impl UserSummary {
    /// Aggregate one fetched result set
    pub fn from_results(results: &[TestResult], today: NaiveDate) -> Self {
        let streaks = compute_streaks(&distinct_dates(results), today);

        let mut summary = results.iter().fold(Self::default(), |mut acc, r| {
            acc.fastest_wpm = acc.fastest_wpm.max(r.wpm);
            acc.fastest_raw_wpm = acc.fastest_raw_wpm.max(r.raw_wpm);
            acc.best_accuracy = acc.best_accuracy.max(r.accuracy);
            acc.total_tests += 1;
            acc.correct_chars += u64::from(r.chars.correct);
            acc.incorrect_chars += u64::from(r.chars.incorrect);
            acc.extra_chars += u64::from(r.chars.extra);
            acc.missed_chars += u64::from(r.chars.missed);
            acc
        });

        summary.avg_wpm = rounded_mean(results.iter().map(|r| r.wpm));
        summary.avg_accuracy = rounded_mean(results.iter().map(|r| r.accuracy));
        summary.current_streak = streaks.current;
        summary.longest_streak = streaks.longest;
        summary
    }
}

impl fmt::Display for UserSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tests          {}", self.total_tests)?;
        writeln!(f, "average wpm    {}", self.avg_wpm)?;
        writeln!(f, "fastest wpm    {} (raw {})", self.fastest_wpm, self.fastest_raw_wpm)?;
        writeln!(f, "accuracy       {}% avg, {}% best", self.avg_accuracy, self.best_accuracy)?;
        writeln!(
            f,
            "streak         {} current, {} longest",
            self.current_streak, self.longest_streak
        )?;
        write!(
            f,
            "characters     {} correct, {} incorrect, {} extra, {} missed",
            self.correct_chars, self.incorrect_chars, self.extra_chars, self.missed_chars
        )
    }
}

/// Arithmetic mean rounded to the nearest integer, 0 for no values
fn rounded_mean<I: Iterator<Item = u32>>(values: I) -> u32 {
    let (sum, count) = values.fold((0_u64, 0_u64), |(sum, count), v| {
        (sum + u64::from(v), count + 1)
    });
    if count == 0 {
        return 0;
    }
    // Integer round-half-up; inputs are non-negative
    let mean = (2 * sum + count) / (2 * count);
    u32::try_from(mean).unwrap_or(u32::MAX)
}

/// Builds [`UserSummary`] values from the result store
pub struct StatsEngine<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: ResultStore> StatsEngine<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: ResultStore, C: Clock> StatsEngine<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Summarize everything the user has recorded, from a single fetch
    pub fn summarize(&self, user_id: UserId) -> StoreResult<UserSummary> {
        let results = self.store.fetch_results_for_user(user_id)?;
        let summary = UserSummary::from_results(&results, self.clock.today());
        debug!(
            %user_id,
            total_tests = summary.total_tests,
            current_streak = summary.current_streak,
            "computed summary"
        );
        Ok(summary)
    }
}
