//! Writing streaks and badges.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Serialize, Serializer};

use crate::model::WordLog;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct Streaks {
    /// Consecutive days ending today; 0 when today has no activity.
    pub current: u32,
    pub longest: u32,
}

/// Days with positive word counts, sorted and deduplicated.
pub fn active_dates<'a>(logs: impl IntoIterator<Item = &'a WordLog>) -> Vec<NaiveDate> {
    logs.into_iter()
        .filter(|log| log.words > 0)
        .map(|log| log.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Streaks over a set of active days. Input order and duplicates don't
/// matter.
pub fn compute_streaks(dates: &[NaiveDate], today: NaiveDate) -> Streaks {
    let days: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    if days.is_empty() {
        return Streaks::default();
    }

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    for day in &days {
        run = match previous {
            Some(prev) if *day == prev + Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*day);
    }

    let mut current = 0u32;
    let mut cursor = today;
    while days.contains(&cursor) {
        current += 1;
        cursor -= Duration::days(1);
    }

    Streaks { current, longest }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Badge {
    Streak3,
    Streak7,
    Streak14,
    Streak30,
    Words1k,
    Words5k,
    Words10k,
}

const STREAK_BADGES: [(u32, Badge); 4] = [
    (3, Badge::Streak3),
    (7, Badge::Streak7),
    (14, Badge::Streak14),
    (30, Badge::Streak30),
];

const WORD_BADGES: [(u64, Badge); 3] = [
    (1_000, Badge::Words1k),
    (5_000, Badge::Words5k),
    (10_000, Badge::Words10k),
];

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Badge::Streak3 => "Streak 3+",
            Badge::Streak7 => "Streak 7+",
            Badge::Streak14 => "Streak 14+",
            Badge::Streak30 => "Streak 30+",
            Badge::Words1k => "1k Words",
            Badge::Words5k => "5k Words",
            Badge::Words10k => "10k Words",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Badge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Every threshold reached, streak badges first.
pub fn compute_badges(current_streak: u32, lifetime_words: u64) -> Vec<Badge> {
    let streaks = STREAK_BADGES
        .iter()
        .filter(|(days, _)| current_streak >= *days)
        .map(|(_, badge)| *badge);
    let words = WORD_BADGES
        .iter()
        .filter(|(threshold, _)| lifetime_words >= *threshold)
        .map(|(_, badge)| *badge);
    streaks.chain(words).collect()
}
