//! Quote of the day for the writing dashboard.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
}

const QUOTES: [Quote; 10] = [
    Quote {
        text: "You don't have to be great to start, but you have to start to be great.",
        author: "Zig Ziglar",
    },
    Quote {
        text: "The secret of getting ahead is getting started.",
        author: "Mark Twain",
    },
    Quote {
        text: "Little by little, a little becomes a lot.",
        author: "Tanzanian Proverb",
    },
    Quote {
        text: "Done is better than perfect.",
        author: "Sheryl Sandberg",
    },
    Quote {
        text: "If I waited for perfection, I would never write a word.",
        author: "Margaret Atwood",
    },
    Quote {
        text: "A journey of a thousand miles begins with a single step.",
        author: "Lao Tzu",
    },
    Quote {
        text: "If you can't write well, write badly. Just write.",
        author: "Anonymous",
    },
    Quote {
        text: "Your future self will thank you for today's effort.",
        author: "Anonymous",
    },
    Quote {
        text: "The way to get started is to quit talking and begin doing.",
        author: "Walt Disney",
    },
    Quote {
        text: "Write a little, every day.",
        author: "Anonymous",
    },
];

pub fn all() -> &'static [Quote] {
    &QUOTES
}

/// Same quote all day, next one tomorrow.
pub fn quote_for(date: NaiveDate) -> Quote {
    let day = date.num_days_from_ce().rem_euclid(QUOTES.len() as i32) as usize;
    QUOTES[day]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn quote_is_stable_within_a_day() {
        let day = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        assert_eq!(quote_for(day), quote_for(day));
    }

    #[test]
    fn consecutive_days_cycle_through_every_quote() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut seen: Vec<Quote> = (0..QUOTES.len() as i64)
            .map(|offset| quote_for(start + Duration::days(offset)))
            .collect();
        seen.sort_by_key(|quote| quote.text);
        seen.dedup();
        assert_eq!(seen.len(), all().len());
    }
}
