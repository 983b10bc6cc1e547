use chrono::{Duration, NaiveDate};

use crate::models::Record;

pub const WEEK_DAYS: i64 = 7;

#[derive(Debug, Default)]
pub struct WeeklyWindows<'a> {
    /// `(today - 7d, today]`
    pub current: Vec<&'a Record>,
    /// `(today - 14d, today - 7d]`
    pub prior: Vec<&'a Record>,
}

/// Stable sort by date, so same-day entries keep their insertion order.
pub fn sort_chronological(records: &[Record]) -> Vec<&Record> {
    let mut sorted: Vec<&Record> = records.iter().collect();
    sorted.sort_by_key(|record| record.date);
    sorted
}

pub fn records_for_owner(records: &[Record], owner: &str) -> Vec<Record> {
    records
        .iter()
        .filter(|record| record.owner == owner)
        .cloned()
        .collect()
}

pub fn weekly_windows(records: &[Record], today: NaiveDate) -> WeeklyWindows<'_> {
    let current_start = today - Duration::days(WEEK_DAYS);
    let prior_start = today - Duration::days(WEEK_DAYS * 2);
    let mut windows = WeeklyWindows::default();

    for record in sort_chronological(records) {
        if record.date > current_start && record.date <= today {
            windows.current.push(record);
        } else if record.date > prior_start && record.date <= current_start {
            windows.prior.push(record);
        }
    }

    windows
}

/// Records in `(today - days, today]`, chronologically.
pub fn trailing_window(records: &[Record], today: NaiveDate, days: i64) -> Vec<&Record> {
    let start = today - Duration::days(days.max(0));
    sort_chronological(records)
        .into_iter()
        .filter(|record| record.date > start && record.date <= today)
        .collect()
}

/// Arithmetic mean of the scores, `None` for an empty set.
pub fn mean_score<'a, I>(records: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Record>,
{
    let (sum, count) = records
        .into_iter()
        .fold((0u64, 0usize), |(sum, count), record| {
            (sum + u64::from(record.score), count + 1)
        });
    if count == 0 {
        None
    } else {
        Some(sum as f64 / count as f64)
    }
}
